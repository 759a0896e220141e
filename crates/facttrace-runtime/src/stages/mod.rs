//! Pipeline stages, in execution order.
//!
//! 1. Meta-controller (optional): trust weights for the judge
//! 2. Evidence scout (optional): key facts from the source truth
//! 3. Pre-analysis: claim and truth analyzed in isolation
//! 4. Debate: advocate/skeptic rounds, optionally mediated
//! 5. Fact-check: neutral comparison over the full debate
//! 6. Context analyst (optional): framing and background
//! 7. Verdict: jury majority vote or a single judge

pub mod context_analyst;
pub mod debate;
pub mod evidence;
pub mod fact_check;
pub mod jury;
pub mod meta;
pub mod pre_analysis;

#[cfg(test)]
pub(crate) mod testing;

pub use debate::{DebateEngine, DebateHistory};
pub use jury::{JuryAggregator, SingleJudge};
