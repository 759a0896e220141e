//! Pipeline orchestrator.
//!
//! Drives one verification through every stage in order. Data flows
//! strictly forward and the transcript only grows. Sync mode
//! ([`Orchestrator::verify`]) and incremental mode
//! ([`Orchestrator::verify_streaming`], [`Orchestrator::stream`]) share a
//! single execution path, so both produce the same run for the same model
//! outputs.
//!
//! Concurrent runs own independent transcripts and usage. The verdict store
//! is the only state they share.

use std::sync::Arc;

use chrono::Utc;
use serde_json::Value as JsonValue;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use facttrace_core::{AgentRole, Transcript, TranscriptEntry};

use crate::agents::PersonaRunner;
use crate::config::{ConfigError, RuntimeConfig, VerdictMode};
use crate::context::{judge_prompt, CaseContext};
use crate::events::PipelineEvent;
use crate::gateway::Gateway;
use crate::personas::PersonaTable;
use crate::providers::{LlmProvider, ProviderError, ProviderRegistry};
use crate::run::PipelineRun;
use crate::stages::{
    context_analyst, evidence, fact_check, meta, pre_analysis, DebateEngine, JuryAggregator,
    SingleJudge,
};
use crate::store::{StoreError, VerdictStore};

/// Buffer size of the channel returned by [`Orchestrator::stream`].
const EVENT_BUFFER: usize = 32;

/// Errors from the runtime orchestrator.
#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Provider not configured: {0}")]
    ProviderNotConfigured(#[from] ProviderError),

    #[error("Verdict store error: {0}")]
    Store(#[from] StoreError),
}

/// One verification request.
#[derive(Debug, Clone, PartialEq)]
pub struct VerifyRequest {
    pub claim: String,
    pub truth: String,

    /// Falls back to `debate.rounds` when absent
    pub debate_rounds: Option<u32>,
}

impl VerifyRequest {
    pub fn new(claim: impl Into<String>, truth: impl Into<String>) -> Self {
        Self {
            claim: claim.into(),
            truth: truth.into(),
            debate_rounds: None,
        }
    }

    pub fn with_rounds(mut self, rounds: u32) -> Self {
        self.debate_rounds = Some(rounds);
        self
    }
}

/// Forwards events when a receiver is attached.
struct EventSink<'a>(Option<&'a mpsc::Sender<PipelineEvent>>);

impl EventSink<'_> {
    async fn emit(&self, event: PipelineEvent) {
        if let Some(tx) = self.0 {
            let kind = event.kind();
            if tx.send(event).await.is_err() {
                debug!(event = kind, "Event receiver dropped, continuing run");
            }
        }
    }
}

/// The pipeline driver.
///
/// Cheap to clone; clones share the provider and the verdict store.
#[derive(Debug, Clone)]
pub struct Orchestrator {
    gateway: Gateway,
    personas: Arc<PersonaTable>,
    config: Arc<RuntimeConfig>,
    store: Option<Arc<VerdictStore>>,
}

impl Orchestrator {
    /// Create an orchestrator over `provider`. The config is validated here.
    pub fn new(provider: Arc<dyn LlmProvider>, config: RuntimeConfig) -> Result<Self, RuntimeError> {
        config.validate()?;
        Ok(Self {
            gateway: Gateway::new(provider, config.request_timeout),
            personas: Arc::new(PersonaTable::new()),
            config: Arc::new(config),
            store: None,
        })
    }

    /// Create the provider through a registry, then the orchestrator.
    pub fn from_registry(
        registry: &ProviderRegistry,
        provider_type: &str,
        provider_config: &JsonValue,
        config: RuntimeConfig,
    ) -> Result<Self, RuntimeError> {
        let provider = registry.create(provider_type, provider_config)?;
        Self::new(provider, config)
    }

    pub fn with_personas(mut self, personas: PersonaTable) -> Self {
        self.personas = Arc::new(personas);
        self
    }

    pub fn with_store(mut self, store: Arc<VerdictStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn store(&self) -> Option<&Arc<VerdictStore>> {
        self.store.as_ref()
    }

    /// Latest completed run, per the store's lookup order.
    pub fn latest_verdict(&self) -> Result<PipelineRun, RuntimeError> {
        match &self.store {
            Some(store) => Ok(store.latest()?),
            None => Err(StoreError::NotFound.into()),
        }
    }

    /// Sync mode: run to completion and return the full run.
    pub async fn verify(&self, request: VerifyRequest) -> Result<PipelineRun, RuntimeError> {
        let rounds = self.validate(&request)?;
        Ok(self.execute(request, rounds, EventSink(None)).await)
    }

    /// Incremental mode: emit events on `tx` as stages complete.
    ///
    /// The last event sent is always the verdict. A dropped receiver does
    /// not stop the run.
    pub async fn verify_streaming(
        &self,
        request: VerifyRequest,
        tx: &mpsc::Sender<PipelineEvent>,
    ) -> Result<PipelineRun, RuntimeError> {
        let rounds = self.validate(&request)?;
        Ok(self.execute(request, rounds, EventSink(Some(tx))).await)
    }

    /// Incremental mode on a spawned task.
    ///
    /// Validation happens before spawning, so an invalid request fails here
    /// rather than producing an empty stream. Must be called inside a Tokio
    /// runtime.
    pub fn stream(&self, request: VerifyRequest) -> Result<mpsc::Receiver<PipelineEvent>, RuntimeError> {
        let rounds = self.validate(&request)?;
        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        let this = self.clone();

        tokio::spawn(async move {
            this.execute(request, rounds, EventSink(Some(&tx))).await;
        });
        Ok(rx)
    }

    fn validate(&self, request: &VerifyRequest) -> Result<u32, RuntimeError> {
        if request.claim.trim().is_empty() {
            return Err(RuntimeError::InvalidRequest("claim is empty".to_string()));
        }
        if request.truth.trim().is_empty() {
            return Err(RuntimeError::InvalidRequest("truth is empty".to_string()));
        }

        let rounds = request.debate_rounds.unwrap_or(self.config.debate.rounds);
        if rounds > self.config.debate.max_rounds {
            return Err(RuntimeError::InvalidRequest(format!(
                "debate_rounds {} exceeds the limit of {}",
                rounds, self.config.debate.max_rounds
            )));
        }
        Ok(rounds)
    }

    async fn execute(&self, request: VerifyRequest, rounds: u32, sink: EventSink<'_>) -> PipelineRun {
        let started_at = Utc::now();
        let config = &self.config;
        // Fresh usage accounting for this run
        let runner = PersonaRunner::new(self.gateway.fork(), Arc::clone(&self.personas), config);
        let mut transcript = Transcript::new();

        info!(
            provider = self.gateway.provider_name(),
            rounds,
            mediator = config.debate.mediator,
            mode = ?config.verdict.mode,
            "Starting verification"
        );

        let trust_weights = if config.stages.meta_controller {
            Some(meta::assign_trust_weights(&runner, &request.claim).await)
        } else {
            None
        };

        let mut context = CaseContext::new(request.claim.as_str(), request.truth.as_str());

        if config.stages.evidence_scout {
            let entry = evidence::scout(&runner, &request.claim, &request.truth).await;
            context = context.with_evidence(entry.text());
            transcript.push(entry.clone());
            sink.emit(PipelineEvent::Agent(entry)).await;
        }

        let analysis = if config.stages.pre_analysis {
            let analysis = pre_analysis::analyze(&runner, &request.claim, &request.truth).await;
            context = context.with_analysis(analysis.clone());
            sink.emit(PipelineEvent::Analysis(analysis.clone())).await;
            Some(analysis)
        } else {
            None
        };

        info!(rounds, "Stage: debate");
        let mut debate = DebateEngine::new(rounds, config.debate.mediator);
        while let Some(entry) = debate.step(&runner, &context).await {
            transcript.push(entry.clone());
            sink.emit(PipelineEvent::Agent(entry)).await;
        }

        let entry = fact_check::check(&runner, &context, debate.history().as_str()).await;
        transcript.push(entry.clone());
        sink.emit(PipelineEvent::Agent(entry)).await;

        if config.stages.context_analyst {
            let entry = context_analyst::analyze(&runner, &context).await;
            transcript.push(entry.clone());
            sink.emit(PipelineEvent::Agent(entry)).await;
        }

        let prompt = judge_prompt(&context, &transcript, trust_weights.as_ref());
        let outcome = match config.verdict.mode {
            VerdictMode::Jury => {
                JuryAggregator::new(runner.clone(), &config.verdict)
                    .run_majority_vote(&prompt)
                    .await
            }
            VerdictMode::SingleJudge => SingleJudge::new(runner.clone()).judge(&prompt).await,
        };

        let entry = TranscriptEntry::new(AgentRole::Judge, outcome.verdict.summary.as_str());
        transcript.push(entry.clone());
        sink.emit(PipelineEvent::Agent(entry)).await;

        let run = PipelineRun {
            claim: request.claim,
            truth: request.truth,
            debate_rounds: rounds,
            analysis,
            trust_weights,
            transcript,
            tally: outcome.tally,
            ballots: outcome.ballots,
            verdict: outcome.verdict,
            usage: runner.usage(),
            started_at,
            completed_at: Utc::now(),
        };

        info!(
            decision = %run.verdict.decision,
            confidence = run.verdict.confidence,
            entries = run.transcript.len(),
            llm_calls = run.usage.llm_calls,
            duration_ms = run.duration_ms(),
            "Verification complete"
        );

        if let Some(store) = &self.store {
            if let Err(e) = store.record(&run) {
                warn!(error = %e, "Failed to persist verdict");
            }
        }

        sink.emit(PipelineEvent::Verdict(Box::new(run.clone()))).await;
        run
    }
}
