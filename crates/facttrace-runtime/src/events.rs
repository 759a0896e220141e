//! Pipeline events for incremental mode.
//!
//! Wire shape: `{"type": "analysis" | "agent" | "verdict", "data": ...}`.
//! For one run the order is fixed: evidence scout (agent, when enabled),
//! analysis, debate turns, fact-checker, context analyst (when enabled),
//! judge, verdict. The verdict event is always last.

use serde::{Deserialize, Serialize};

use facttrace_core::{PreAnalysis, TranscriptEntry};

use crate::run::PipelineRun;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum PipelineEvent {
    Analysis(PreAnalysis),
    Agent(TranscriptEntry),
    Verdict(Box<PipelineRun>),
}

impl PipelineEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineEvent::Analysis(_) => "analysis",
            PipelineEvent::Agent(_) => "agent",
            PipelineEvent::Verdict(_) => "verdict",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineEvent::Verdict(_))
    }

    /// Server-sent-event framing: `data: <json>\n\n`.
    pub fn to_sse(&self) -> Result<String, serde_json::Error> {
        Ok(format!("data: {}\n\n", serde_json::to_string(self)?))
    }
}
