//! Evidence scout: surfaces the facts and hedges a faithful claim must keep.

use tracing::info;

use facttrace_core::{AgentRole, TranscriptEntry};

use crate::agents::PersonaRunner;
use crate::personas::Persona;

pub fn scout_prompt(claim: &str, truth: &str) -> String {
    format!("SOURCE TRUTH:\n{}\n\nCLAIM being evaluated:\n{}", truth, claim)
}

/// One scout call; its text later joins the shared context as evidence.
pub async fn scout(runner: &PersonaRunner, claim: &str, truth: &str) -> TranscriptEntry {
    info!("Stage: evidence scout");
    let text = runner
        .speak(Persona::EvidenceScout, &scout_prompt(claim, truth))
        .await;
    TranscriptEntry::new(AgentRole::EvidenceScout, text)
}
