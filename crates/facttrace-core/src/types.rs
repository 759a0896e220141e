//! Core types for FactTrace verification runs.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The three canonical outcomes of a verification.
///
/// Declaration order is the canonical order used for tie-breaking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    /// The claim accurately represents the source truth
    Faithful,

    /// The claim distorts, exaggerates, omits context, or misrepresents
    Mutated,

    /// The evidence is ambiguous or the claim is partially accurate
    Uncertain,
}

impl Decision {
    /// All decisions in canonical order.
    pub const CANONICAL: [Decision; 3] = [Decision::Faithful, Decision::Mutated, Decision::Uncertain];

    /// Lowercase wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Faithful => "faithful",
            Decision::Mutated => "mutated",
            Decision::Uncertain => "uncertain",
        }
    }

    /// Coerce a raw model-produced decision into a canonical one.
    ///
    /// Anything outside the three known values becomes `Uncertain`.
    pub fn coerce(raw: &str) -> Self {
        raw.parse().unwrap_or(Decision::Uncertain)
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Decision {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "faithful" => Ok(Decision::Faithful),
            "mutated" => Ok(Decision::Mutated),
            "uncertain" => Ok(Decision::Uncertain),
            other => Err(format!("Unknown decision: {}", other)),
        }
    }
}

/// Persona roles that can appear in a transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentRole {
    EvidenceScout,
    Advocate,
    Skeptic,
    Mediator,
    FactChecker,
    Judge,
    ContextAnalyst,
}

impl AgentRole {
    /// Human-readable name, as shown to users and used in history tags.
    pub fn display_name(&self) -> &'static str {
        match self {
            AgentRole::EvidenceScout => "Evidence Scout",
            AgentRole::Advocate => "Advocate",
            AgentRole::Skeptic => "Skeptic",
            AgentRole::Mediator => "Mediator",
            AgentRole::FactChecker => "Fact-Checker",
            AgentRole::Judge => "Judge",
            AgentRole::ContextAnalyst => "Context Analyst",
        }
    }
}

impl fmt::Display for AgentRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// One persona output. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    role: AgentRole,
    text: String,
    emitted_at: DateTime<Utc>,
}

impl TranscriptEntry {
    /// Create an entry stamped with the current time.
    pub fn new(role: AgentRole, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
            emitted_at: Utc::now(),
        }
    }

    pub fn role(&self) -> AgentRole {
        self.role
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn emitted_at(&self) -> DateTime<Utc> {
        self.emitted_at
    }
}

/// Ordered, append-only sequence of persona outputs for one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry. Existing entries are never modified.
    pub fn push(&mut self, entry: TranscriptEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &TranscriptEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Count entries written by a given role.
    pub fn count_role(&self, role: AgentRole) -> usize {
        self.entries.iter().filter(|e| e.role == role).count()
    }
}

/// Isolated analyses of the claim and the truth, produced before debate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreAnalysis {
    /// Analysis of the claim alone
    pub claim_analysis: String,

    /// Analysis of the source truth alone
    pub truth_analysis: String,
}

/// Terminal artifact of a verification run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub decision: Decision,

    /// Confidence in [0, 1]
    pub confidence: f64,

    pub summary: String,

    /// Deduplicated caveats, in order of first appearance
    pub disclaimers: Vec<String>,
}

impl Verdict {
    /// Uncertain verdict used when no usable judgment exists.
    pub fn uncertain(confidence: f64, summary: impl Into<String>, disclaimers: Vec<String>) -> Self {
        Self {
            decision: Decision::Uncertain,
            confidence: clamp_unit(confidence),
            summary: summary.into(),
            disclaimers,
        }
    }
}

/// Vote counts keyed by the three canonical decisions.
///
/// The struct shape guarantees exactly three keys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteTally {
    pub faithful: u32,
    pub mutated: u32,
    pub uncertain: u32,
}

impl VoteTally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one vote.
    pub fn record(&mut self, decision: Decision) {
        match decision {
            Decision::Faithful => self.faithful += 1,
            Decision::Mutated => self.mutated += 1,
            Decision::Uncertain => self.uncertain += 1,
        }
    }

    pub fn count(&self, decision: Decision) -> u32 {
        match decision {
            Decision::Faithful => self.faithful,
            Decision::Mutated => self.mutated,
            Decision::Uncertain => self.uncertain,
        }
    }

    pub fn total(&self) -> u32 {
        self.faithful + self.mutated + self.uncertain
    }

    /// Counts in canonical order.
    pub fn counts(&self) -> [(Decision, u32); 3] {
        Decision::CANONICAL.map(|d| (d, self.count(d)))
    }

    /// Decision with the highest count.
    ///
    /// Ties go to the decision that comes first in canonical order
    /// (faithful, mutated, uncertain).
    pub fn majority(&self) -> (Decision, u32) {
        let mut best = (Decision::Faithful, self.faithful);
        for (decision, count) in self.counts() {
            if count > best.1 {
                best = (decision, count);
            }
        }
        best
    }
}

/// One juror's vote, tagged with its submission index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ballot {
    /// Position in submission order (0-based)
    pub index: usize,

    pub decision: Decision,

    pub confidence: f64,

    pub summary: String,

    #[serde(default)]
    pub disclaimers: Vec<String>,

    /// True when this ballot was synthesized for a failed juror
    #[serde(default)]
    pub failed: bool,
}

impl Ballot {
    /// Summary text carried by a failed juror's synthetic ballot.
    pub const FAILED_SUMMARY: &'static str = "Judge failed";

    /// Synthetic uncertain vote standing in for a juror that produced nothing usable.
    pub fn failed(index: usize) -> Self {
        Self {
            index,
            decision: Decision::Uncertain,
            confidence: 0.5,
            summary: Self::FAILED_SUMMARY.to_string(),
            disclaimers: Vec::new(),
            failed: true,
        }
    }

    /// Build a ballot from an extracted JSON object.
    ///
    /// Missing or malformed fields are coerced: unknown decisions become
    /// uncertain, confidence defaults to 0.5 and is clamped to [0, 1],
    /// non-string disclaimers are dropped.
    pub fn from_value(index: usize, value: &serde_json::Value) -> Self {
        let decision = value
            .get("decision")
            .and_then(|d| d.as_str())
            .map(Decision::coerce)
            .unwrap_or(Decision::Uncertain);

        let confidence = value
            .get("confidence")
            .and_then(|c| c.as_f64())
            .map(clamp_unit)
            .unwrap_or(0.5);

        let summary = value
            .get("summary")
            .and_then(|s| s.as_str())
            .unwrap_or_default()
            .to_string();

        let disclaimers = value
            .get("disclaimers")
            .and_then(|d| d.as_array())
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| item.as_str())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Self {
            index,
            decision,
            confidence,
            summary,
            disclaimers,
            failed: false,
        }
    }
}

/// Persona keys used in trust weights.
pub const TRUST_WEIGHT_KEYS: [&str; 5] = [
    "evidence_scout",
    "fact_checker",
    "advocate",
    "skeptic",
    "context_analyst",
];

/// Meta-controller output: claim classification and per-persona trust.
///
/// Advocate and skeptic weights are always equal after construction.
/// Weights are intended to sum to roughly 1.0 but this is not enforced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrustWeights {
    pub claim_type: String,

    pub weights: BTreeMap<String, f64>,

    pub rationale: String,
}

impl TrustWeights {
    /// Uniform weights used when the meta-controller produces nothing usable.
    pub fn fallback() -> Self {
        Self {
            claim_type: "General".to_string(),
            weights: TRUST_WEIGHT_KEYS
                .iter()
                .map(|k| (k.to_string(), 0.2))
                .collect(),
            rationale: "Fallback due to JSON error.".to_string(),
        }
    }

    /// Read trust weights from an extracted object.
    ///
    /// Returns `None` when the `weights` object is missing. Non-numeric
    /// weight entries are skipped.
    pub fn from_value(value: &serde_json::Value) -> Option<Self> {
        let raw_weights = value.get("weights")?.as_object()?;

        let weights = raw_weights
            .iter()
            .filter_map(|(k, v)| v.as_f64().map(|w| (k.clone(), w)))
            .collect();

        let claim_type = value
            .get("claim_type")
            .and_then(|c| c.as_str())
            .unwrap_or("General")
            .to_string();

        let rationale = value
            .get("rationale")
            .and_then(|r| r.as_str())
            .unwrap_or_default()
            .to_string();

        Some(
            Self {
                claim_type,
                weights,
                rationale,
            }
            .balance_adversaries(),
        )
    }

    /// Replace advocate and skeptic weights with their average.
    ///
    /// A side the model omitted counts as 0.2.
    pub fn balance_adversaries(mut self) -> Self {
        let advocate = self.weight("advocate").unwrap_or(0.2);
        let skeptic = self.weight("skeptic").unwrap_or(0.2);
        let average = (advocate + skeptic) / 2.0;
        self.weights.insert("advocate".to_string(), average);
        self.weights.insert("skeptic".to_string(), average);
        self
    }

    pub fn weight(&self, persona: &str) -> Option<f64> {
        self.weights.get(persona).copied()
    }

    pub fn total(&self) -> f64 {
        self.weights.values().sum()
    }
}

/// Clamp a value into [0, 1], mapping NaN to 0.5.
pub fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.5
    } else {
        value.clamp(0.0, 1.0)
    }
}
