//! Generation Gateway: the single point every model call passes through.
//!
//! `generate(system, user, model, temperature)` returns the trimmed text of
//! the first completion choice. Each call is bounded by the request timeout.
//! The gateway never retries; retry policy lives one layer up.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::providers::{ChatMessage, CompletionConfig, LlmProvider, ProviderError};
use crate::resilience::{LlmUsage, UsageTracker};

/// Cheap-to-clone handle over a provider plus the run's usage tracker.
#[derive(Clone)]
pub struct Gateway {
    provider: Arc<dyn LlmProvider>,
    usage: Arc<UsageTracker>,
    timeout: Duration,
}

impl Gateway {
    pub fn new(provider: Arc<dyn LlmProvider>, timeout: Duration) -> Self {
        Self {
            provider,
            usage: Arc::new(UsageTracker::new()),
            timeout,
        }
    }

    /// Same provider and timeout, fresh usage accounting.
    pub fn fork(&self) -> Self {
        Self {
            provider: Arc::clone(&self.provider),
            usage: Arc::new(UsageTracker::new()),
            timeout: self.timeout,
        }
    }

    /// Issue one completion request.
    pub async fn generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        model: &str,
        temperature: f32,
    ) -> Result<String, ProviderError> {
        let config = CompletionConfig {
            model: model.to_string(),
            temperature,
            timeout: self.timeout,
            ..Default::default()
        };
        let messages = vec![
            ChatMessage::system(system_prompt),
            ChatMessage::user(user_prompt),
        ];

        let started = Instant::now();
        let result = tokio::time::timeout(self.timeout, self.provider.complete(messages, &config))
            .await
            .unwrap_or(Err(ProviderError::Timeout(self.timeout)));

        match result {
            Ok(response) => {
                self.usage.record(&response.usage, &response.model);
                debug!(
                    provider = self.provider.name(),
                    model,
                    temperature,
                    prompt_chars = user_prompt.len(),
                    latency_ms = started.elapsed().as_millis() as u64,
                    "Completion received"
                );
                Ok(response.content.trim().to_string())
            }
            Err(e) => {
                self.usage.record_failure();
                Err(e)
            }
        }
    }

    pub fn usage(&self) -> LlmUsage {
        self.usage.snapshot()
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }
}

impl std::fmt::Debug for Gateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gateway")
            .field("provider", &self.provider.name())
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::{CompletionResponse, TokenUsage};
    use async_trait::async_trait;
    use parking_lot::Mutex;

    /// Records the last request and returns padded text.
    struct RecordingProvider {
        last: Mutex<Option<(Vec<ChatMessage>, CompletionConfig)>>,
        fail: bool,
    }

    #[async_trait]
    impl LlmProvider for RecordingProvider {
        async fn complete(
            &self,
            messages: Vec<ChatMessage>,
            config: &CompletionConfig,
        ) -> Result<CompletionResponse, ProviderError> {
            *self.last.lock() = Some((messages, config.clone()));
            if self.fail {
                return Err(ProviderError::HttpError("unreachable".to_string()));
            }
            Ok(CompletionResponse {
                content: "\n  The claim is faithful.  \n".to_string(),
                usage: TokenUsage {
                    prompt_tokens: 10,
                    completion_tokens: 5,
                },
                model: config.model.clone(),
                finish_reason: Some("stop".to_string()),
            })
        }

        async fn health_check(&self) -> bool {
            true
        }

        fn name(&self) -> &str {
            "recording"
        }
    }

    #[tokio::test]
    async fn test_generate_trims_and_forwards() {
        let provider = Arc::new(RecordingProvider {
            last: Mutex::new(None),
            fail: false,
        });
        let gateway = Gateway::new(provider.clone(), Duration::from_secs(5));

        let text = gateway
            .generate("You are a Judge.", "CLAIM: x", "gpt-4.1-mini", 0.95)
            .await
            .unwrap();
        assert_eq!(text, "The claim is faithful.");

        let (messages, config) = provider.last.lock().clone().unwrap();
        assert_eq!(messages[0], ChatMessage::system("You are a Judge."));
        assert_eq!(messages[1], ChatMessage::user("CLAIM: x"));
        assert_eq!(config.model, "gpt-4.1-mini");
        assert_eq!(config.temperature, 0.95);
        assert_eq!(config.timeout, Duration::from_secs(5));

        assert_eq!(gateway.usage().llm_calls, 1);
        assert_eq!(gateway.usage().total_tokens, 15);
    }

    #[tokio::test]
    async fn test_transport_error_surfaces_and_is_counted() {
        let provider = Arc::new(RecordingProvider {
            last: Mutex::new(None),
            fail: true,
        });
        let gateway = Gateway::new(provider, Duration::from_secs(5));

        let result = gateway.generate("s", "u", "m", 0.3).await;
        assert!(matches!(result, Err(ProviderError::HttpError(_))));
        assert_eq!(gateway.usage().failed_calls, 1);
        assert_eq!(gateway.usage().llm_calls, 0);
    }

    /// Never answers within any reasonable timeout.
    struct StalledProvider;

    #[async_trait]
    impl LlmProvider for StalledProvider {
        async fn complete(
            &self,
            _messages: Vec<ChatMessage>,
            _config: &CompletionConfig,
        ) -> Result<CompletionResponse, ProviderError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Err(ProviderError::EmptyCompletion)
        }

        async fn health_check(&self) -> bool {
            true
        }

        fn name(&self) -> &str {
            "stalled"
        }
    }

    #[tokio::test]
    async fn test_stalled_call_times_out() {
        let gateway = Gateway::new(Arc::new(StalledProvider), Duration::from_millis(20));

        let result = gateway.generate("s", "u", "m", 0.3).await;
        assert!(matches!(
            result,
            Err(ProviderError::Timeout(d)) if d == Duration::from_millis(20)
        ));
        assert_eq!(gateway.usage().failed_calls, 1);
    }

    #[tokio::test]
    async fn test_fork_has_independent_usage() {
        let provider = Arc::new(RecordingProvider {
            last: Mutex::new(None),
            fail: false,
        });
        let gateway = Gateway::new(provider, Duration::from_secs(5));
        gateway.generate("s", "u", "m", 0.3).await.unwrap();

        let forked = gateway.fork();
        assert_eq!(forked.usage().llm_calls, 0);
        assert_eq!(gateway.usage().llm_calls, 1);
    }
}
