//! Structured-Response Extractor.
//!
//! Wraps the gateway to force a parseable JSON object out of free-form
//! generation. On a parse failure the corrective instruction is appended to
//! the original user prompt and the call is repeated, up to `max_attempts`
//! calls in total. Exhaustion yields `Ok(None)`; callers supply a fallback.
//!
//! Transport errors are not parse failures. Each call is retried under the
//! extractor's [`RetryPolicy`] with the same prompt, without spending a
//! parse attempt; once retries are exhausted the error propagates.

use serde_json::Value;
use tracing::{debug, warn};

use facttrace_core::{corrective_prompt, parse_structured};

use crate::gateway::Gateway;
use crate::providers::ProviderError;
use crate::resilience::RetryPolicy;

/// Parse-retrying wrapper over the gateway.
#[derive(Debug, Clone)]
pub struct StructuredExtractor {
    gateway: Gateway,
    max_attempts: u32,
    retry: RetryPolicy,
}

impl StructuredExtractor {
    /// `max_attempts` below 1 is treated as 1.
    pub fn new(gateway: Gateway, max_attempts: u32) -> Self {
        Self {
            gateway,
            max_attempts: max_attempts.max(1),
            retry: RetryPolicy::none(),
        }
    }

    /// Retry transport failures of each call under `retry`.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Extract one JSON object.
    pub async fn extract(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        model: &str,
        temperature: f32,
    ) -> Result<Option<Value>, ProviderError> {
        let mut prompt = user_prompt.to_string();

        for attempt in 1..=self.max_attempts {
            let gateway = &self.gateway;
            let current = prompt.as_str();
            let raw = self
                .retry
                .run("structured extraction", || async move {
                    gateway.generate(system_prompt, current, model, temperature).await
                })
                .await?;

            match parse_structured(&raw) {
                Ok(value) => {
                    debug!(attempt, "Structured response parsed");
                    return Ok(Some(value));
                }
                Err(e) => {
                    warn!(
                        attempt,
                        max_attempts = self.max_attempts,
                        error = %e,
                        "Structured response parse failed"
                    );
                    prompt = corrective_prompt(user_prompt);
                }
            }
        }

        Ok(None)
    }
}
