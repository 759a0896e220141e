//! Pre-analysis: the claim and the truth, each analyzed alone.
//!
//! The claim analyst never sees the truth and the truth analyst never sees
//! the claim, so neither analysis is anchored on the other's phrasing.

use tracing::info;

use facttrace_core::PreAnalysis;

use crate::agents::PersonaRunner;
use crate::personas::Persona;

pub fn claim_prompt(claim: &str) -> String {
    format!("Claim to Analyze:\n{}", claim)
}

pub fn truth_prompt(truth: &str) -> String {
    format!("Source Truth to Analyze:\n{}", truth)
}

/// Run both analysts. Each call is independent of the other.
pub async fn analyze(runner: &PersonaRunner, claim: &str, truth: &str) -> PreAnalysis {
    info!("Stage: pre-analysis");
    let claim_analysis = runner
        .speak(Persona::ClaimAnalyst, &claim_prompt(claim))
        .await;
    let truth_analysis = runner
        .speak(Persona::TruthAnalyst, &truth_prompt(truth))
        .await;

    PreAnalysis {
        claim_analysis,
        truth_analysis,
    }
}
