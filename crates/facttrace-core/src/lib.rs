//! # facttrace-core
//!
//! Deterministic data model and vote aggregation for FactTrace claim
//! verification.
//!
//! This crate holds everything in a verification run that does not talk to
//! a model:
//! - The transcript, verdict and vote tally types
//! - Parsing of fenced or raw JSON model responses
//! - Schema checks for judge verdicts and trust weights
//! - The majority-vote reduction over juror ballots
//! - The CSV case corpus
//!
//! ## Key Guarantees
//!
//! 1. **Deterministic**: Same ballots always produce the same verdict
//! 2. **Order-independent**: Completion order of jurors never affects the result
//! 3. **Closed vocabulary**: Decisions are always one of three canonical values
//!
//! ## Example
//!
//! ```rust
//! use facttrace_core::{aggregate, Ballot, Decision};
//!
//! let ballots = vec![
//!     Ballot::from_value(0, &serde_json::json!({"decision": "mutated", "summary": "Inflated."})),
//!     Ballot::from_value(1, &serde_json::json!({"decision": "mutated"})),
//!     Ballot::failed(2),
//! ];
//! let outcome = aggregate(ballots);
//! assert_eq!(outcome.verdict.decision, Decision::Mutated);
//! assert_eq!(outcome.verdict.summary, "Inflated.");
//! ```

pub mod corpus;
pub mod extraction;
pub mod schema;
pub mod synthesizer;
pub mod types;

// Re-export main types at crate root
pub use corpus::{CaseCorpus, CaseItem, CorpusError};
pub use extraction::{corrective_prompt, parse_structured, strip_code_fences, ExtractionError};
pub use schema::{OutputSchema, SchemaError};
pub use synthesizer::{JuryOutcome, Synthesizer};
pub use types::{
    AgentRole, Ballot, Decision, PreAnalysis, Transcript, TranscriptEntry, TrustWeights, Verdict,
    VoteTally,
};

use tracing::debug;

/// Reduce juror ballots into a verdict.
///
/// This is the main entry point for jury aggregation. See [`Synthesizer`]
/// for the exact rules.
pub fn aggregate(ballots: Vec<Ballot>) -> JuryOutcome {
    Synthesizer::new().synthesize(ballots)
}

/// Turn one juror's extracted JSON into a ballot.
///
/// `None` (nothing parseable) produces a failed-juror ballot. Schema
/// violations are logged and the value is coerced anyway.
pub fn ballot_from_response(index: usize, value: Option<&serde_json::Value>) -> Ballot {
    match value {
        Some(value) => {
            if let Err(issues) = OutputSchema::JudgeVerdict.validate(value) {
                debug!(juror = index, ?issues, "Juror verdict deviates from schema, coercing");
            }
            Ballot::from_value(index, value)
        }
        None => Ballot::failed(index),
    }
}
