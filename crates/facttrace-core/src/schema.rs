//! JSON Schema validation for structured model outputs.
//!
//! Judge verdicts and meta-controller trust weights are checked against
//! the schemas in `schemas/`. Validation failures are reported, not fatal:
//! callers decide whether to coerce or fall back.

use std::sync::OnceLock;
use thiserror::Error;

/// Embedded schemas (loaded at compile time).
const JUDGE_VERDICT_SCHEMA_JSON: &str = include_str!("../schemas/judge_verdict.schema.json");
const TRUST_WEIGHTS_SCHEMA_JSON: &str = include_str!("../schemas/trust_weights.schema.json");

static JUDGE_VERDICT_SCHEMA: OnceLock<Result<jsonschema::Validator, String>> = OnceLock::new();
static TRUST_WEIGHTS_SCHEMA: OnceLock<Result<jsonschema::Validator, String>> = OnceLock::new();

/// Errors from schema loading.
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("Failed to load schema: {0}")]
    LoadError(String),
}

/// Which structured output is being validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputSchema {
    JudgeVerdict,
    TrustWeights,
}

impl OutputSchema {
    fn source(&self) -> &'static str {
        match self {
            OutputSchema::JudgeVerdict => JUDGE_VERDICT_SCHEMA_JSON,
            OutputSchema::TrustWeights => TRUST_WEIGHTS_SCHEMA_JSON,
        }
    }

    fn cell(&self) -> &'static OnceLock<Result<jsonschema::Validator, String>> {
        match self {
            OutputSchema::JudgeVerdict => &JUDGE_VERDICT_SCHEMA,
            OutputSchema::TrustWeights => &TRUST_WEIGHTS_SCHEMA,
        }
    }

    /// Get or initialize the compiled validator.
    fn validator(&self) -> Result<&'static jsonschema::Validator, SchemaError> {
        let source = self.source();
        let result = self.cell().get_or_init(|| {
            let schema_value: serde_json::Value = match serde_json::from_str(source) {
                Ok(v) => v,
                Err(e) => return Err(format!("Invalid schema JSON: {}", e)),
            };

            match jsonschema::options().build(&schema_value) {
                Ok(v) => Ok(v),
                Err(e) => Err(format!("Failed to compile schema: {}", e)),
            }
        });

        match result {
            Ok(v) => Ok(v),
            Err(e) => Err(SchemaError::LoadError(e.clone())),
        }
    }

    /// Validate a value, collecting every violation.
    pub fn validate(&self, value: &serde_json::Value) -> Result<(), Vec<String>> {
        let validator = self.validator().map_err(|e| vec![e.to_string()])?;

        let errors: Vec<String> = validator
            .iter_errors(value)
            .map(|e| format!("{} at {}", e, e.instance_path))
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    pub fn is_valid(&self, value: &serde_json::Value) -> bool {
        self.validator()
            .map(|v| v.is_valid(value))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_valid_judge_verdict_passes() {
        let value = json!({
            "decision": "mutated",
            "confidence": 0.85,
            "summary": "The claim inflates the reported effect.",
            "disclaimers": ["Single trial"]
        });
        assert!(OutputSchema::JudgeVerdict.validate(&value).is_ok());
    }

    #[test]
    fn test_judge_verdict_missing_decision_fails() {
        let value = json!({"confidence": 0.5});
        let errors = OutputSchema::JudgeVerdict.validate(&value).unwrap_err();
        assert!(!errors.is_empty());
    }

    #[test]
    fn test_judge_verdict_out_of_range_confidence_fails() {
        let value = json!({"decision": "faithful", "confidence": 3.0});
        assert!(!OutputSchema::JudgeVerdict.is_valid(&value));
    }

    #[test]
    fn test_trust_weights_schema() {
        let good = json!({
            "claim_type": "Statistical",
            "weights": {"fact_checker": 0.5, "advocate": 0.25, "skeptic": 0.25},
            "rationale": "Numbers dominate."
        });
        assert!(OutputSchema::TrustWeights.is_valid(&good));

        let bad = json!({"weights": {"advocate": "high"}});
        assert!(OutputSchema::TrustWeights.validate(&bad).is_err());
    }
}
