//! Resilience for model calls.
//!
//! - Retry with backoff for retryable transport failures
//! - Usage accounting per run

mod retry;
mod usage;

pub use retry::RetryPolicy;
pub use usage::{LlmUsage, UsageTracker};
