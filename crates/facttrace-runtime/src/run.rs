//! Pipeline run record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use facttrace_core::{Ballot, PreAnalysis, Transcript, TrustWeights, Verdict, VoteTally};

use crate::resilience::LlmUsage;

/// Everything one verification produced.
///
/// This is the record that the verdict event carries and the store persists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineRun {
    pub claim: String,
    pub truth: String,
    pub debate_rounds: u32,

    /// Absent when the pre-analysis stage is disabled
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<PreAnalysis>,

    /// Present only when the meta-controller ran
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trust_weights: Option<TrustWeights>,

    pub transcript: Transcript,

    pub tally: VoteTally,

    /// Juror ballots in submission order
    #[serde(default)]
    pub ballots: Vec<Ballot>,

    pub verdict: Verdict,

    #[serde(default)]
    pub usage: LlmUsage,

    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

impl PipelineRun {
    pub fn duration_ms(&self) -> i64 {
        (self.completed_at - self.started_at).num_milliseconds()
    }
}
