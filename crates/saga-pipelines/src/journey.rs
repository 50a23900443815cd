//! Journey summarizer: one episode per calendar week of the consolidated log.
//!
//! There is no checkpoint inside this job. Episodes are collected in memory
//! and written once, after the last week; an interrupted run starts over.

use std::path::PathBuf;

use saga_core::{Result, RetryPolicy};
use saga_llm::GenerationClient;
use saga_settings::{PacingSettings, SagaSettings};
use serde_json::Value;
use tracing::{error, info, warn};

use crate::layout::{DataLayout, read_messages, write_json};
use crate::prompts::{JOURNEY_TEMPLATE, journey_prompt, load_template};
use crate::weeks::partition_by_week;

/// Outcome of a journey run.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct JourneyReport {
    /// Weekly chunks in the log.
    pub weeks: usize,
    /// Episodes produced.
    pub episodes: usize,
    /// 1-based numbers of the weeks that produced no episode.
    pub failed_weeks: Vec<usize>,
    /// The episodes file, when one was written.
    pub output: Option<PathBuf>,
}

/// Weekly journey summarization pipeline.
pub struct JourneySummarizer {
    client: GenerationClient,
    layout: DataLayout,
    prompts_dir: PathBuf,
    retry: RetryPolicy,
    pacing: PacingSettings,
}

impl JourneySummarizer {
    /// Build from settings. Weeks back off linearly.
    pub fn new(client: GenerationClient, settings: &SagaSettings) -> Self {
        Self {
            client,
            layout: DataLayout::new(&settings.data_dir),
            prompts_dir: settings.prompts_dir.clone(),
            retry: settings.retry.linear_policy(),
            pacing: settings.pacing.clone(),
        }
    }

    /// Summarize every week of `all_chats.json`.
    ///
    /// A missing log, a missing template, or an unparseable timestamp is
    /// fatal. A week that exhausts its retries is dropped. When no episode
    /// is produced no file is written and the report carries no output.
    pub async fn run(&self) -> Result<JourneyReport> {
        let template = load_template(&self.prompts_dir, JOURNEY_TEMPLATE).await?;
        let input = self.layout.all_chats_path();
        info!(path = %input.display(), "loading consolidated chats");
        let messages = read_messages(&input).await?;

        let chunks = partition_by_week(&messages)?;
        info!(weeks = chunks.len(), messages = messages.len(), "grouped messages into weeks");

        let mut report = JourneyReport {
            weeks: chunks.len(),
            ..JourneyReport::default()
        };
        let mut episodes: Vec<Value> = Vec::new();

        for (index, chunk) in chunks.iter().enumerate() {
            let week = index + 1;
            let first = chunk.first().map_or("", |m| m.ts.as_str());
            let last = chunk.last().map_or("", |m| m.ts.as_str());
            info!(week, from = date_part(first), to = date_part(last), messages = chunk.len(), "processing week");

            let outcome = self
                .client
                .generate_object(&format!("week {week}"), &journey_prompt(&template, chunk), &self.retry)
                .await;
            match outcome.result {
                Ok(episode) => {
                    info!(week, "episode generated");
                    episodes.push(Value::Object(episode));
                }
                Err(_) => {
                    warn!(week, "no episode for week, skipping");
                    report.failed_weeks.push(week);
                }
            }

            if week < chunks.len() {
                tokio::time::sleep(self.pacing.chunk_pause()).await;
            }
        }

        report.episodes = episodes.len();
        if episodes.is_empty() {
            error!("no journey episodes were generated");
            return Ok(report);
        }

        let output = self.layout.episodes_path();
        write_json(&output, &episodes).await?;
        info!(path = %output.display(), episodes = episodes.len(), "journey episodes saved");
        report.output = Some(output);
        Ok(report)
    }
}

/// Date portion of a timestamp for log lines (`2025-01-05 18:30` -> `2025-01-05`).
fn date_part(ts: &str) -> &str {
    ts.split([' ', 'T']).next().unwrap_or(ts)
}
