//! Runtime configuration.
//!
//! Every field has a default, so an empty YAML document is a valid config.
//! Durations are written in human form (`"500ms"`, `"8s"`, `"1m"`).

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Errors from loading or validating configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Model identifiers per tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Used for every persona call
    pub fast: String,

    /// Used for single-judge verdict extraction
    pub judge: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            fast: "gpt-4.1-mini".to_string(),
            judge: "gpt-5.2".to_string(),
        }
    }
}

/// Model tier selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelTier {
    Fast,
    Judge,
}

impl ModelConfig {
    pub fn model_for(&self, tier: ModelTier) -> &str {
        match tier {
            ModelTier::Fast => &self.fast,
            ModelTier::Judge => &self.judge,
        }
    }
}

/// Sampling temperatures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemperatureConfig {
    /// Free-text persona turns
    pub persona: f32,

    /// Single structured extractions (meta-controller, single judge)
    pub extraction: f32,

    /// Jurors; elevated to diversify otherwise identical calls
    pub juror: f32,
}

impl Default for TemperatureConfig {
    fn default() -> Self {
        Self {
            persona: 0.3,
            extraction: 0.2,
            juror: 0.95,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebateConfig {
    /// Rounds used when a request does not specify one
    pub rounds: u32,

    /// Hard cap on rounds per run
    pub max_rounds: u32,

    /// Add a Mediator turn at the end of each round
    pub mediator: bool,
}

impl Default for DebateConfig {
    fn default() -> Self {
        Self {
            rounds: 2,
            max_rounds: 8,
            mediator: false,
        }
    }
}

/// Optional pipeline stages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StageConfig {
    pub evidence_scout: bool,
    pub pre_analysis: bool,
    pub context_analyst: bool,
    pub meta_controller: bool,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            evidence_scout: true,
            pre_analysis: true,
            context_analyst: false,
            meta_controller: false,
        }
    }
}

/// How the final verdict is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerdictMode {
    /// K concurrent jurors and a majority vote
    Jury,
    /// One structured extraction against the judge tier
    SingleJudge,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerdictConfig {
    pub mode: VerdictMode,

    /// Number of jurors (K)
    pub jurors: usize,

    /// Juror concurrency limit; defaults to K
    pub max_parallel: Option<usize>,

    /// Model tier used by jurors
    pub tier: ModelTier,
}

impl Default for VerdictConfig {
    fn default() -> Self {
        Self {
            mode: VerdictMode::Jury,
            jurors: 5,
            max_parallel: None,
            tier: ModelTier::Fast,
        }
    }
}

impl VerdictConfig {
    /// Effective concurrency: `max_parallel` clamped to [1, K].
    pub fn parallelism(&self) -> usize {
        self.max_parallel
            .unwrap_or(self.jurors)
            .clamp(1, self.jurors.max(1))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    pub max_attempts: u32,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self { max_attempts: 3 }
    }
}

/// Backoff for retryable transport failures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Retries after the first attempt (0 disables retrying)
    pub max_retries: u32,

    #[serde(with = "humantime_duration")]
    pub min_delay: Duration,

    #[serde(with = "humantime_duration")]
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            min_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(8),
        }
    }
}

/// Top-level runtime configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub models: ModelConfig,
    pub temperatures: TemperatureConfig,
    pub debate: DebateConfig,
    pub stages: StageConfig,
    pub verdict: VerdictConfig,
    pub extraction: ExtractionConfig,
    pub retry: RetryConfig,

    /// Per-call network timeout handed to the provider
    #[serde(with = "humantime_duration")]
    pub request_timeout: Duration,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            models: ModelConfig::default(),
            temperatures: TemperatureConfig::default(),
            debate: DebateConfig::default(),
            stages: StageConfig::default(),
            verdict: VerdictConfig::default(),
            extraction: ExtractionConfig::default(),
            retry: RetryConfig::default(),
            request_timeout: Duration::from_secs(60),
        }
    }
}

impl RuntimeConfig {
    /// Parse and validate a YAML document.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Reject configurations the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.verdict.jurors == 0 {
            return Err(ConfigError::Invalid(
                "verdict.jurors must be at least 1".to_string(),
            ));
        }
        if self.verdict.max_parallel == Some(0) {
            return Err(ConfigError::Invalid(
                "verdict.max_parallel must be at least 1".to_string(),
            ));
        }
        if self.extraction.max_attempts == 0 {
            return Err(ConfigError::Invalid(
                "extraction.max_attempts must be at least 1".to_string(),
            ));
        }
        if self.debate.rounds > self.debate.max_rounds {
            return Err(ConfigError::Invalid(format!(
                "debate.rounds ({}) exceeds debate.max_rounds ({})",
                self.debate.rounds, self.debate.max_rounds
            )));
        }
        for (name, value) in [
            ("persona", self.temperatures.persona),
            ("extraction", self.temperatures.extraction),
            ("juror", self.temperatures.juror),
        ] {
            if !(0.0..=2.0).contains(&value) {
                return Err(ConfigError::Invalid(format!(
                    "temperatures.{name} must be between 0 and 2, got {value}"
                )));
            }
        }
        if self.retry.min_delay > self.retry.max_delay {
            return Err(ConfigError::Invalid(
                "retry.min_delay must not exceed retry.max_delay".to_string(),
            ));
        }
        Ok(())
    }
}

/// Serde adapter for `Duration` as a humantime string.
mod humantime_duration {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&humantime::format_duration(*value).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let raw = String::deserialize(deserializer)?;
        humantime::parse_duration(raw.trim()).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RuntimeConfig::default();
        assert_eq!(config.models.fast, "gpt-4.1-mini");
        assert_eq!(config.models.judge, "gpt-5.2");
        assert_eq!(config.temperatures.juror, 0.95);
        assert_eq!(config.debate.rounds, 2);
        assert_eq!(config.verdict.jurors, 5);
        assert_eq!(config.verdict.parallelism(), 5);
        assert_eq!(config.extraction.max_attempts, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_yaml_is_default() {
        let config = RuntimeConfig::from_yaml("{}").unwrap();
        assert_eq!(config, RuntimeConfig::default());
    }

    #[test]
    fn test_partial_yaml_with_durations() {
        let yaml = r#"
debate:
  rounds: 3
  mediator: true
verdict:
  mode: single_judge
  jurors: 10
  max_parallel: 4
retry:
  min_delay: 250ms
  max_delay: 2s
request_timeout: 90s
"#;
        let config = RuntimeConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.debate.rounds, 3);
        assert!(config.debate.mediator);
        assert_eq!(config.debate.max_rounds, 8);
        assert_eq!(config.verdict.mode, VerdictMode::SingleJudge);
        assert_eq!(config.verdict.parallelism(), 4);
        assert_eq!(config.retry.min_delay, Duration::from_millis(250));
        assert_eq!(config.request_timeout, Duration::from_secs(90));
        assert_eq!(config.retry.max_retries, 2);
    }

    #[test]
    fn test_zero_jurors_rejected() {
        let result = RuntimeConfig::from_yaml("verdict:\n  jurors: 0\n");
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_zero_attempts_rejected() {
        let result = RuntimeConfig::from_yaml("extraction:\n  max_attempts: 0\n");
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_rounds_over_cap_rejected() {
        let result = RuntimeConfig::from_yaml("debate:\n  rounds: 9\n  max_rounds: 8\n");
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_temperatures_out_of_range_rejected() {
        for yaml in [
            "temperatures:\n  juror: -0.1\n",
            "temperatures:\n  persona: .nan\n",
            "temperatures:\n  extraction: 2.5\n",
        ] {
            let result = RuntimeConfig::from_yaml(yaml);
            assert!(matches!(result, Err(ConfigError::Invalid(_))), "accepted {yaml:?}");
        }
        assert!(RuntimeConfig::from_yaml("temperatures:\n  juror: 0.0\n").is_ok());
    }

    #[test]
    fn test_bad_duration_rejected() {
        let result = RuntimeConfig::from_yaml("request_timeout: soon\n");
        assert!(matches!(result, Err(ConfigError::Yaml(_))));
    }

    #[test]
    fn test_parallelism_clamped_to_jurors() {
        let verdict = VerdictConfig {
            jurors: 3,
            max_parallel: Some(50),
            ..Default::default()
        };
        assert_eq!(verdict.parallelism(), 3);
    }

    #[test]
    fn test_round_trip_yaml() {
        let config = RuntimeConfig::default();
        let yaml = serde_yaml::to_string(&config).unwrap();
        let parsed = RuntimeConfig::from_yaml(&yaml).unwrap();
        assert_eq!(parsed, config);
    }
}
