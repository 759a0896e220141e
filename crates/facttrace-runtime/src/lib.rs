//! # facttrace-runtime
//!
//! Multi-agent claim verification on top of `facttrace-core`.
//!
//! A claim is checked against a source truth by a fixed pipeline of
//! language-model personas:
//!
//! - Evidence scout and isolated claim/truth pre-analysis
//! - An Advocate/Skeptic debate, optionally mediated
//! - A neutral fact-check over the whole debate
//! - A jury of K independent judges reduced by majority vote
//!
//! Every model call passes through one [`Gateway`]. Structured outputs go
//! through the [`StructuredExtractor`], which re-prompts on malformed JSON.
//! All vote arithmetic is delegated to the deterministic core.
//!
//! ## Example
//!
//! ```rust,ignore
//! use facttrace_runtime::{Orchestrator, RuntimeConfig, VerifyRequest};
//! use facttrace_runtime::providers::OpenAiProvider;
//!
//! let provider = Arc::new(OpenAiProvider::from_env()?);
//! let orchestrator = Orchestrator::new(provider, RuntimeConfig::default())?;
//!
//! let run = orchestrator
//!     .verify(VerifyRequest::new(
//!         "Remote work increases productivity by over 10%.",
//!         "Remote workers were approximately 8.5% more productive.",
//!     ))
//!     .await?;
//! println!("{} ({:.2})", run.verdict.decision, run.verdict.confidence);
//! ```

pub mod agents;
pub mod config;
pub mod context;
pub mod events;
pub mod extractor;
pub mod gateway;
pub mod orchestrator;
pub mod personas;
pub mod providers;
pub mod resilience;
pub mod run;
pub mod stages;
pub mod store;

pub use agents::{AgentError, PersonaRunner};
pub use config::{ConfigError, ModelTier, RuntimeConfig, VerdictMode};
pub use context::CaseContext;
pub use events::PipelineEvent;
pub use extractor::StructuredExtractor;
pub use gateway::Gateway;
pub use orchestrator::{Orchestrator, RuntimeError, VerifyRequest};
pub use personas::{Persona, PersonaTable};
pub use providers::{LlmProvider, ProviderError, ProviderRegistry};
pub use resilience::LlmUsage;
pub use run::PipelineRun;
pub use store::{StoreError, VerdictStore};
