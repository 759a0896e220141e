//! Jury Aggregator and single-judge verdicts.
//!
//! K jurors receive the identical judge prompt at a high temperature so
//! their votes are independent samples. Jurors run concurrently, bounded by
//! a semaphore. Ballots are placed by submission index, never by completion
//! order, so the reduction is deterministic. A juror that yields nothing
//! usable is replaced by the synthetic uncertain ballot.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use facttrace_core::{
    aggregate, ballot_from_response, Ballot, Decision, JuryOutcome, Verdict, VoteTally,
};

use crate::agents::PersonaRunner;
use crate::config::{ModelTier, VerdictConfig};
use crate::personas::Persona;

/// Summary carried by the single judge's fallback verdict.
pub const JUDGE_FAILED_SUMMARY: &str = "The judge failed to produce a valid verdict.";

/// Disclaimer attached to the single judge's fallback verdict.
pub const SYSTEM_ERROR_DISCLAIMER: &str = "System Error";

/// Concurrent majority-vote jury.
#[derive(Debug, Clone)]
pub struct JuryAggregator {
    runner: PersonaRunner,
    jurors: usize,
    parallelism: usize,
    model: String,
    temperature: f32,
}

impl JuryAggregator {
    pub fn new(runner: PersonaRunner, config: &VerdictConfig) -> Self {
        Self {
            model: runner.model(config.tier).to_string(),
            temperature: runner.temperatures().juror,
            jurors: config.jurors.max(1),
            parallelism: config.parallelism().max(1),
            runner,
        }
    }

    pub fn jurors(&self) -> usize {
        self.jurors
    }

    /// Poll every juror on `judge_prompt` and reduce the votes.
    pub async fn run_majority_vote(&self, judge_prompt: &str) -> JuryOutcome {
        info!(
            jurors = self.jurors,
            parallelism = self.parallelism,
            "Stage: jury"
        );

        let sem = Arc::new(Semaphore::new(self.parallelism));
        let prompt: Arc<str> = Arc::from(judge_prompt);
        let mut join_set: JoinSet<Ballot> = JoinSet::new();

        for index in 0..self.jurors {
            let sem = Arc::clone(&sem);
            let prompt = Arc::clone(&prompt);
            let runner = self.runner.clone();
            let model = self.model.clone();
            let temperature = self.temperature;

            join_set.spawn(async move {
                let Ok(_permit) = sem.acquire_owned().await else {
                    return Ballot::failed(index);
                };
                cast_ballot(&runner, index, &prompt, &model, temperature).await
            });
        }

        let mut slots: Vec<Option<Ballot>> = vec![None; self.jurors];
        while let Some(res) = join_set.join_next().await {
            match res {
                Ok(ballot) => {
                    debug!(
                        juror = ballot.index,
                        decision = %ballot.decision,
                        failed = ballot.failed,
                        "Juror finished"
                    );
                    let index = ballot.index;
                    if let Some(slot) = slots.get_mut(index) {
                        *slot = Some(ballot);
                    }
                }
                Err(e) => warn!(error = %e, "Juror task aborted"),
            }
        }

        let ballots = slots
            .into_iter()
            .enumerate()
            .map(|(index, ballot)| ballot.unwrap_or_else(|| Ballot::failed(index)))
            .collect();

        let outcome = aggregate(ballots);
        info!(
            decision = %outcome.verdict.decision,
            confidence = outcome.verdict.confidence,
            "Jury verdict"
        );
        outcome
    }
}

async fn cast_ballot(
    runner: &PersonaRunner,
    index: usize,
    prompt: &str,
    model: &str,
    temperature: f32,
) -> Ballot {
    match runner.extract(Persona::Judge, prompt, model, temperature).await {
        Ok(Some(value)) => ballot_from_response(index, Some(&value)),
        Ok(None) => {
            warn!(juror = index, "Juror produced no parseable verdict");
            Ballot::failed(index)
        }
        Err(e) => {
            warn!(juror = index, error = %e, "Juror call failed");
            Ballot::failed(index)
        }
    }
}

/// One structured judgment on the judge tier.
#[derive(Debug, Clone)]
pub struct SingleJudge {
    runner: PersonaRunner,
}

impl SingleJudge {
    pub fn new(runner: PersonaRunner) -> Self {
        Self { runner }
    }

    /// Confidence is the judge's own, clamped. The tally holds one vote.
    pub async fn judge(&self, judge_prompt: &str) -> JuryOutcome {
        info!("Stage: single judge");
        let extracted = self
            .runner
            .extract(
                Persona::Judge,
                judge_prompt,
                self.runner.model(ModelTier::Judge),
                self.runner.temperatures().extraction,
            )
            .await;

        let ballot = match extracted {
            Ok(Some(value)) => ballot_from_response(0, Some(&value)),
            Ok(None) => {
                warn!("Judge produced no parseable verdict, using fallback");
                fallback_ballot()
            }
            Err(e) => {
                warn!(error = %e, "Judge call failed, using fallback");
                fallback_ballot()
            }
        };

        let mut tally = VoteTally::new();
        tally.record(ballot.decision);

        let mut disclaimers: Vec<String> = Vec::new();
        for d in &ballot.disclaimers {
            if !disclaimers.contains(d) {
                disclaimers.push(d.clone());
            }
        }

        JuryOutcome {
            verdict: Verdict {
                decision: ballot.decision,
                confidence: ballot.confidence,
                summary: ballot.summary.clone(),
                disclaimers,
            },
            tally,
            ballots: vec![ballot],
        }
    }
}

fn fallback_ballot() -> Ballot {
    Ballot {
        index: 0,
        decision: Decision::Uncertain,
        confidence: 0.5,
        summary: JUDGE_FAILED_SUMMARY.to_string(),
        disclaimers: vec![SYSTEM_ERROR_DISCLAIMER.to_string()],
        failed: true,
    }
}
