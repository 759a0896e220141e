//! CLI configuration.
//!
//! One optional YAML file layered over defaults. The runtime block is the
//! library's [`RuntimeConfig`]; everything else is process wiring.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};

use facttrace_runtime::RuntimeConfig;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub runtime: RuntimeConfig,
    pub provider: ProviderSettings,

    /// CSV with `claim` and `truth` columns
    pub corpus_path: PathBuf,

    /// Latest-verdict record, overwritten after every run
    pub result_path: PathBuf,

    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            runtime: RuntimeConfig::default(),
            provider: ProviderSettings::default(),
            corpus_path: PathBuf::from("Atlas.csv"),
            result_path: PathBuf::from("result.json"),
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Defaults when `path` is `None`; otherwise the file must exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_yaml(&raw).with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.runtime.validate()?;
        Ok(config)
    }
}

/// Which provider to build and how.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    #[serde(rename = "type")]
    pub kind: String,

    pub base_url: Option<String>,

    /// Falls back to `OPENAI_API_KEY` when absent
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            kind: "openai".to_string(),
            base_url: None,
            api_key: None,
        }
    }
}

impl ProviderSettings {
    /// JSON handed to the provider factory.
    pub fn factory_config(&self) -> JsonValue {
        let mut config = json!({});
        if let Some(url) = &self.base_url {
            config["base_url"] = json!(url);
        }
        if let Some(key) = &self.api_key {
            config["api_key"] = json!(key);
        }
        config
    }
}
