//! Retry with exponential backoff for transport failures.
//!
//! Only errors classified by [`ProviderError::is_retryable`] are retried.
//! Malformed model output is not a transport failure and never reaches here.

use std::future::Future;
use std::time::Duration;

use backon::{ExponentialBuilder, Retryable};
use tracing::warn;

use crate::config::RetryConfig;
use crate::providers::ProviderError;

/// Backoff policy for one call site.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    max_retries: u32,
    min_delay: Duration,
    max_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, min_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_retries,
            min_delay,
            max_delay,
        }
    }

    /// Single attempt, no retries.
    pub fn none() -> Self {
        Self::new(0, Duration::ZERO, Duration::ZERO)
    }

    fn backoff(&self) -> ExponentialBuilder {
        ExponentialBuilder::default()
            .with_min_delay(self.min_delay)
            .with_max_delay(self.max_delay)
            .with_max_times(self.max_retries as usize)
    }

    /// Run `op`, retrying retryable failures with backoff.
    ///
    /// The last error is returned once retries are exhausted, or immediately
    /// for non-retryable errors.
    pub async fn run<T, F, Fut>(&self, operation: &str, op: F) -> Result<T, ProviderError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ProviderError>>,
    {
        op.retry(self.backoff())
            .when(|e: &ProviderError| e.is_retryable())
            .notify(|e: &ProviderError, delay: Duration| {
                warn!(operation, error = %e, delay = ?delay, "Retrying after transport failure");
            })
            .await
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self::new(config.max_retries, config.min_delay, config.max_delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast_policy(retries: u32) -> RetryPolicy {
        RetryPolicy::new(retries, Duration::from_millis(1), Duration::from_millis(2))
    }

    #[tokio::test]
    async fn test_retryable_error_is_retried_until_success() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result = fast_policy(3)
            .run("test", || async move {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                if n < 2 {
                    Err(ProviderError::Timeout(Duration::from_secs(1)))
                } else {
                    Ok("done")
                }
            })
            .await;

        assert_eq!(result.unwrap(), "done");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_non_retryable_error_fails_fast() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result: Result<(), _> = fast_policy(3)
            .run("test", || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(ProviderError::AuthError)
            })
            .await;

        assert!(matches!(result, Err(ProviderError::AuthError)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retries_are_bounded() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result: Result<(), _> = fast_policy(2)
            .run("test", || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(ProviderError::HttpError("connection reset".to_string()))
            })
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_none_is_single_attempt() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let _: Result<(), _> = RetryPolicy::none()
            .run("test", || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(ProviderError::HttpError("down".to_string()))
            })
            .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
