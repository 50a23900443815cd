//! # saga
//!
//! Command-line entry point: loads settings once, builds the Gemini-backed
//! generation client, and runs one pipeline.

#![deny(unsafe_code)]

mod provider_factory;

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use saga_pipelines::{
    ChatSynthesizer, DataLayout, DecisionTracer, JourneySummarizer, StatusReport, consolidate,
};
use saga_settings::SagaSettings;
use tracing::{error, info, warn};

/// Synthetic chat history generator and analyzer.
#[derive(Parser, Debug)]
#[command(name = "saga", about = "Synthetic chat history generator and analyzer")]
struct Cli {
    /// Settings file (defaults to `./saga.json` when present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Root of every generated artifact (overrides settings).
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Directory holding the prompt templates (overrides settings).
    #[arg(long, global = true)]
    prompts_dir: Option<PathBuf>,

    /// Log level when `RUST_LOG` is unset (overrides settings).
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    /// Generate monthly chats and summaries, then consolidate them.
    Synthesize,
    /// Merge the monthly chat files into `all_chats.json`.
    Consolidate,
    /// Trace every decision marker into `decisions/{id}.json`.
    Trace,
    /// Summarize the consolidated log into weekly episodes.
    Journey,
    /// Report which artifacts exist. Makes no model calls.
    Status,
}

impl Command {
    fn needs_model(self) -> bool {
        matches!(self, Self::Synthesize | Self::Trace | Self::Journey)
    }
}

/// Load settings and apply command-line overrides.
fn resolve_settings(cli: &Cli) -> Result<SagaSettings> {
    let path = match &cli.config {
        Some(path) => {
            if !path.exists() {
                bail!("settings file not found: {}", path.display());
            }
            path.clone()
        }
        None => saga_settings::settings_path(),
    };
    let mut settings = saga_settings::load_settings_from_path(&path)
        .with_context(|| format!("Failed to load settings from {}", path.display()))?;

    if let Some(dir) = &cli.data_dir {
        settings.data_dir.clone_from(dir);
    }
    if let Some(dir) = &cli.prompts_dir {
        settings.prompts_dir.clone_from(dir);
    }
    if let Some(level) = &cli.log_level {
        settings.logging.level.clone_from(level);
    }
    Ok(settings)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Settings first: the log level comes from them.
    let settings = resolve_settings(&cli)?;
    saga_core::logging::init_subscriber(&settings.logging.level);
    info!(
        data_dir = %settings.data_dir.display(),
        months = settings.months.len(),
        "settings loaded"
    );

    if let Err(err) = run(cli.command, &settings).await {
        error!(error = %err, "run aborted");
        return Err(err);
    }
    Ok(())
}

async fn run(command: Command, settings: &SagaSettings) -> Result<()> {
    let layout = DataLayout::new(&settings.data_dir);
    let client = if command.needs_model() {
        Some(provider_factory::generation_client(&settings.model)?)
    } else {
        None
    };

    match (command, client) {
        (Command::Synthesize, Some(client)) => {
            let report = ChatSynthesizer::new(client, settings)
                .run()
                .await
                .context("Chat synthesis failed")?;
            if !report.failed.is_empty() {
                warn!(months = ?report.failed, "some months could not be generated");
            }
            let _ = consolidate(&layout, &settings.months)
                .await
                .context("Consolidation failed")?;
        }
        (Command::Consolidate, _) => {
            let report = consolidate(&layout, &settings.months)
                .await
                .context("Consolidation failed")?;
            info!(total = report.total_messages, "consolidation complete");
        }
        (Command::Trace, Some(client)) => {
            let report = DecisionTracer::new(client, settings)
                .run()
                .await
                .context("Decision tracing failed")?;
            if !report.failed.is_empty() {
                warn!(decisions = ?report.failed, "some decisions could not be traced");
            }
        }
        (Command::Journey, Some(client)) => {
            let report = JourneySummarizer::new(client, settings)
                .run()
                .await
                .context("Journey summarization failed")?;
            info!(
                weeks = report.weeks,
                episodes = report.episodes,
                "journey summarization complete"
            );
        }
        (Command::Status, _) => {
            let report = StatusReport::gather(&layout, &settings.months)
                .await
                .context("Failed to inspect data directory")?;
            println!("{report}");
        }
        (Command::Synthesize | Command::Trace | Command::Journey, None) => {
            bail!("no generation client for {command:?}");
        }
    }
    Ok(())
}
