//! Persona agents.
//!
//! The runner is the only place persona calls are issued; stages build
//! prompts and decide what to do with the output.

mod runner;

pub use runner::PersonaRunner;

use thiserror::Error;

use crate::personas::Persona;
use crate::providers::ProviderError;

/// Errors from a persona call.
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("{persona} call failed: {source}")]
    Provider {
        persona: Persona,
        #[source]
        source: ProviderError,
    },
}

impl AgentError {
    pub fn persona(&self) -> Persona {
        match self {
            AgentError::Provider { persona, .. } => *persona,
        }
    }

    /// Transcript text standing in for a persona that produced nothing.
    pub fn fallback_text(&self) -> String {
        match self {
            AgentError::Provider { persona, source } => {
                format!("[{} unavailable: {}]", persona.display_name(), source)
            }
        }
    }
}
