//! Meta-controller: classifies the claim and weighs each persona's output.

use tracing::{info, warn};

use facttrace_core::{OutputSchema, TrustWeights};

use crate::agents::PersonaRunner;
use crate::config::ModelTier;
use crate::personas::Persona;

pub fn meta_prompt(claim: &str) -> String {
    format!(
        r#"Claim:
{}

Return JSON of the form:
{{
  "claim_type": "...",
  "weights": {{
    "evidence_scout": 0.xx,
    "fact_checker": 0.xx,
    "advocate": 0.xx,
    "skeptic": 0.xx,
    "context_analyst": 0.xx
  }},
  "rationale": "..."
}}"#,
        claim
    )
}

/// Trust weights for the claim. Never fails: any problem yields the uniform fallback.
pub async fn assign_trust_weights(runner: &PersonaRunner, claim: &str) -> TrustWeights {
    info!("Stage: meta-controller");
    let extracted = runner
        .extract(
            Persona::MetaController,
            &meta_prompt(claim),
            runner.model(ModelTier::Fast),
            runner.temperatures().extraction,
        )
        .await;

    let value = match extracted {
        Ok(Some(value)) => value,
        Ok(None) => {
            warn!("Meta-controller produced no parseable JSON, using fallback weights");
            return TrustWeights::fallback();
        }
        Err(e) => {
            warn!(error = %e, "Meta-controller call failed, using fallback weights");
            return TrustWeights::fallback();
        }
    };

    if let Err(issues) = OutputSchema::TrustWeights.validate(&value) {
        warn!(?issues, "Meta-controller output failed schema check, using fallback weights");
        return TrustWeights::fallback();
    }

    TrustWeights::from_value(&value).unwrap_or_else(TrustWeights::fallback)
}
