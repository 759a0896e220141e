//! Synthesizer: reduces juror ballots into one verdict.
//!
//! The reduction is deterministic and applies fixed rules:
//! 1. Ballots are ordered by submission index, not completion order
//! 2. The decision with the most votes wins; ties go to the decision that
//!    comes first in canonical order (faithful, mutated, uncertain)
//! 3. Confidence is the winning count divided by the number of ballots
//! 4. The summary comes from the earliest-submitted ballot that voted with
//!    the majority
//! 5. Disclaimers are the union of every ballot's disclaimers, deduplicated
//!    in order of first appearance

use serde::{Deserialize, Serialize};

use crate::types::{Ballot, Verdict, VoteTally};

/// Summary used when there are no ballots at all.
pub const EMPTY_JURY_SUMMARY: &str = "No juror ballots were cast.";

/// Result of a jury reduction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JuryOutcome {
    pub verdict: Verdict,

    pub tally: VoteTally,

    /// Ballots in submission order
    pub ballots: Vec<Ballot>,
}

/// The Synthesizer aggregates juror ballots into a final verdict.
#[derive(Debug, Default, Clone, Copy)]
pub struct Synthesizer;

impl Synthesizer {
    pub fn new() -> Self {
        Self
    }

    /// Reduce ballots into a verdict.
    ///
    /// Ballots may arrive in any order; they are sorted by `index` first.
    pub fn synthesize(&self, mut ballots: Vec<Ballot>) -> JuryOutcome {
        ballots.sort_by_key(|b| b.index);

        let tally = self.tally(&ballots);

        if ballots.is_empty() {
            return JuryOutcome {
                verdict: Verdict::uncertain(0.0, EMPTY_JURY_SUMMARY, Vec::new()),
                tally,
                ballots,
            };
        }

        let (decision, count) = tally.majority();
        let confidence = f64::from(count) / ballots.len() as f64;

        let summary = ballots
            .iter()
            .find(|b| b.decision == decision)
            .map(|b| b.summary.clone())
            .unwrap_or_default();

        let disclaimers = self.merge_disclaimers(&ballots);

        JuryOutcome {
            verdict: Verdict {
                decision,
                confidence,
                summary,
                disclaimers,
            },
            tally,
            ballots,
        }
    }

    fn tally(&self, ballots: &[Ballot]) -> VoteTally {
        let mut tally = VoteTally::new();
        for ballot in ballots {
            tally.record(ballot.decision);
        }
        tally
    }

    /// Union of disclaimers, first appearance wins. Blank entries are dropped.
    fn merge_disclaimers(&self, ballots: &[Ballot]) -> Vec<String> {
        let mut merged: Vec<String> = Vec::new();
        for disclaimer in ballots.iter().flat_map(|b| b.disclaimers.iter()) {
            let trimmed = disclaimer.trim();
            if trimmed.is_empty() || merged.iter().any(|d| d == trimmed) {
                continue;
            }
            merged.push(trimmed.to_string());
        }
        merged
    }
}
