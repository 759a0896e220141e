//! Persona runner: invokes one persona through the gateway.
//!
//! Every persona call goes through here. Retryable transport failures are
//! retried with backoff. `speak` then degrades to a fallback text so the
//! run continues; `extract` reports the error and lets the caller fall back.

use std::sync::Arc;

use serde_json::Value;
use tracing::warn;

use crate::config::{ModelConfig, ModelTier, RuntimeConfig, TemperatureConfig};
use crate::extractor::StructuredExtractor;
use crate::gateway::Gateway;
use crate::personas::{Persona, PersonaTable};
use crate::resilience::{LlmUsage, RetryPolicy};

use super::AgentError;

/// Shared, clonable persona invoker for one pipeline run.
#[derive(Debug, Clone)]
pub struct PersonaRunner {
    gateway: Gateway,
    extractor: StructuredExtractor,
    personas: Arc<PersonaTable>,
    models: ModelConfig,
    temperatures: TemperatureConfig,
    retry: RetryPolicy,
}

impl PersonaRunner {
    pub fn new(gateway: Gateway, personas: Arc<PersonaTable>, config: &RuntimeConfig) -> Self {
        Self {
            extractor: StructuredExtractor::new(gateway.clone(), config.extraction.max_attempts)
                .with_retry(RetryPolicy::from(&config.retry)),
            gateway,
            personas,
            models: config.models.clone(),
            temperatures: config.temperatures.clone(),
            retry: RetryPolicy::from(&config.retry),
        }
    }

    /// Same settings, fresh usage accounting.
    pub fn fork(&self) -> Self {
        let gateway = self.gateway.fork();
        Self {
            extractor: StructuredExtractor::new(gateway.clone(), self.extractor.max_attempts())
                .with_retry(self.retry.clone()),
            gateway,
            personas: Arc::clone(&self.personas),
            models: self.models.clone(),
            temperatures: self.temperatures.clone(),
            retry: self.retry.clone(),
        }
    }

    pub fn model(&self, tier: ModelTier) -> &str {
        self.models.model_for(tier)
    }

    pub fn temperatures(&self) -> &TemperatureConfig {
        &self.temperatures
    }

    pub fn usage(&self) -> LlmUsage {
        self.gateway.usage()
    }

    /// Free-text persona call, with transport retry.
    pub async fn try_speak(&self, persona: Persona, user_prompt: &str) -> Result<String, AgentError> {
        let system = self.personas.instructions(persona);
        let model = self.models.model_for(persona.tier());
        let temperature = self.temperatures.persona;
        let gateway = &self.gateway;

        self.retry
            .run(persona.display_name(), || async move {
                gateway.generate(system, user_prompt, model, temperature).await
            })
            .await
            .map_err(|source| AgentError::Provider { persona, source })
    }

    /// Free-text persona call that never fails.
    ///
    /// After retries are exhausted the text becomes
    /// `[<Persona> unavailable: <error>]`.
    pub async fn speak(&self, persona: Persona, user_prompt: &str) -> String {
        match self.try_speak(persona, user_prompt).await {
            Ok(text) => text,
            Err(e) => {
                warn!(persona = %persona, error = %e, "Persona call failed, using fallback text");
                e.fallback_text()
            }
        }
    }

    /// Structured persona call.
    ///
    /// Transport retries happen per call inside the extractor, so they never
    /// reset the parse budget. `Ok(None)` means every parse attempt failed.
    pub async fn extract(
        &self,
        persona: Persona,
        user_prompt: &str,
        model: &str,
        temperature: f32,
    ) -> Result<Option<Value>, AgentError> {
        let system = self.personas.instructions(persona);

        self.extractor
            .extract(system, user_prompt, model, temperature)
            .await
            .map_err(|source| AgentError::Provider { persona, source })
    }
}
