//! `facttrace`: verify claims against source truths with a multi-agent pipeline.
//!
//! ```bash
//! facttrace verify --claim "..." --truth "..." --rounds 3
//! facttrace case list
//! facttrace case verify 12 --stream
//! facttrace verdict
//! ```
//!
//! Results go to stdout as JSON (or `data: {json}` event frames with
//! `--stream`); logs go to stderr.

mod config;

use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use facttrace_core::CaseCorpus;
use facttrace_runtime::{
    Orchestrator, PersonaTable, PipelineRun, ProviderRegistry, VerdictStore, VerifyRequest,
};

use crate::config::AppConfig;

#[derive(Parser, Debug)]
#[command(name = "facttrace", author, version, about, long_about = None)]
struct Cli {
    /// YAML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level when RUST_LOG is unset (overrides the config file)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Verify one claim against a source truth
    Verify {
        #[arg(long)]
        claim: String,

        #[arg(long)]
        truth: String,

        /// Debate rounds (defaults to the configured value)
        #[arg(long)]
        rounds: Option<u32>,

        /// Emit events as they happen
        #[arg(long)]
        stream: bool,
    },

    /// Work with the case corpus
    Case {
        #[command(subcommand)]
        command: CaseCommand,
    },

    /// Print the latest completed run
    Verdict,

    /// Record a run from a JSON file as the latest verdict
    Submit { path: PathBuf },

    /// List personas with their tier and output shape
    Personas,
}

#[derive(Subcommand, Debug)]
enum CaseCommand {
    /// List every case
    List,

    /// Show one case by its 1-based id
    Show { id: usize },

    /// Verify one case by its 1-based id
    Verify {
        id: usize,

        #[arg(long)]
        rounds: Option<u32>,

        #[arg(long)]
        stream: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is fine
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref())?;
    init_logging(cli.log_level.as_deref().unwrap_or(&config.log_level));

    info!(version = env!("CARGO_PKG_VERSION"), "facttrace starting");

    match cli.command {
        Command::Verify {
            claim,
            truth,
            rounds,
            stream,
        } => {
            let request = VerifyRequest {
                claim,
                truth,
                debate_rounds: rounds,
            };
            run_verification(&config, request, stream).await
        }
        Command::Case { command } => run_case(&config, command).await,
        Command::Verdict => {
            let run = store(&config)
                .latest()
                .context("No verdict available")?;
            print_json(&run)
        }
        Command::Submit { path } => {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let run: PipelineRun = serde_json::from_str(&raw)
                .with_context(|| format!("{} is not a pipeline run record", path.display()))?;
            store(&config).submit(run)?;
            info!(path = %config.result_path.display(), "Verdict recorded");
            Ok(())
        }
        Command::Personas => {
            let table = PersonaTable::new();
            let mut out = io::stdout().lock();
            for descriptor in table.descriptors() {
                writeln!(
                    out,
                    "{:<16} {:<6} {:?}",
                    descriptor.name,
                    format!("{:?}", descriptor.tier).to_lowercase(),
                    descriptor.output
                )?;
            }
            Ok(())
        }
    }
}

async fn run_case(config: &AppConfig, command: CaseCommand) -> Result<()> {
    let corpus = CaseCorpus::load(&config.corpus_path)
        .with_context(|| format!("Failed to load corpus {}", config.corpus_path.display()))?;

    match command {
        CaseCommand::List => print_json(corpus.list()),
        CaseCommand::Show { id } => print_json(corpus.get(id)?),
        CaseCommand::Verify { id, rounds, stream } => {
            let case = corpus.get(id)?;
            let request = VerifyRequest {
                claim: case.claim.clone(),
                truth: case.truth.clone(),
                debate_rounds: rounds,
            };
            run_verification(config, request, stream).await
        }
    }
}

async fn run_verification(config: &AppConfig, request: VerifyRequest, stream: bool) -> Result<()> {
    let registry = ProviderRegistry::with_defaults();
    let orchestrator = Orchestrator::from_registry(
        &registry,
        &config.provider.kind,
        &config.provider.factory_config(),
        config.runtime.clone(),
    )
    .context("Failed to set up the pipeline")?
    .with_store(Arc::new(store(config)));

    if !stream {
        let run = orchestrator.verify(request).await?;
        return print_json(&run);
    }

    let mut rx = orchestrator.stream(request)?;
    while let Some(event) = rx.recv().await {
        let mut out = io::stdout().lock();
        out.write_all(event.to_sse()?.as_bytes())?;
        out.flush()?;
    }
    Ok(())
}

fn store(config: &AppConfig) -> VerdictStore {
    VerdictStore::persistent(&config.result_path)
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let mut out = io::stdout().lock();
    serde_json::to_writer_pretty(&mut out, value)?;
    writeln!(out)?;
    Ok(())
}

fn init_logging(level: &str) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(io::stderr))
        .init();
}
