//! Chat synthesizer: one month at a time, each conditioned on the summary of
//! the month before.
//!
//! Per month:
//! 1. `chats_{Month}.json` exists: reuse it. Load its cached summary, or
//!    summarize it now and persist that. A failure here stops the run.
//! 2. Otherwise generate the month (retried unit), apply the length policy
//!    with up to `maxContinuations` continuation rounds, persist the chats,
//!    then summarize them (second retried unit) and persist the summary.
//! 3. Pause `monthPauseMs` before the next month.
//!
//! A month that exhausts its retries is skipped and the next month is told
//! its summary could not be generated. The run never aborts for a transient
//! failure.

use std::collections::HashSet;
use std::path::PathBuf;

use saga_core::{Message, Result, RetryPolicy, SagaError};
use saga_llm::GenerationClient;
use saga_settings::{PacingSettings, SagaSettings, SynthesisSettings};
use tracing::{debug, info, instrument, warn};

use crate::layout::{DataLayout, exists, read_messages, read_text, write_json, write_text};
use crate::length::{LengthCheck, LengthPolicy};
use crate::prompts::{
    CHAT_TEMPLATE, chat_prompt, continuation_prompt, failed_month_summary, load_template,
    summary_prompt,
};

/// What happened to each month in a synthesis run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SynthesisReport {
    /// Months generated in this run.
    pub generated: Vec<String>,
    /// Months whose chat file already existed.
    pub cached: Vec<String>,
    /// Months that exhausted their retries.
    pub failed: Vec<String>,
    /// Generated months accepted below the message floor.
    pub short: Vec<String>,
    /// Generated months whose summary call failed (chats were kept).
    pub unsummarized: Vec<String>,
}

/// Outcome of generating one month.
#[derive(Debug)]
enum MonthOutcome {
    Summarized(String),
    Unsummarized,
    Failed,
}

/// Monthly chat synthesis pipeline.
pub struct ChatSynthesizer {
    client: GenerationClient,
    layout: DataLayout,
    prompts_dir: PathBuf,
    months: Vec<String>,
    year: i32,
    retry: RetryPolicy,
    length: LengthPolicy,
    synthesis: SynthesisSettings,
    pacing: PacingSettings,
}

impl ChatSynthesizer {
    /// Build from settings. Month generation backs off linearly.
    pub fn new(client: GenerationClient, settings: &SagaSettings) -> Self {
        Self {
            client,
            layout: DataLayout::new(&settings.data_dir),
            prompts_dir: settings.prompts_dir.clone(),
            months: settings.months.clone(),
            year: settings.year,
            retry: settings.retry.linear_policy(),
            length: LengthPolicy::from(&settings.synthesis),
            synthesis: settings.synthesis.clone(),
            pacing: settings.pacing.clone(),
        }
    }

    /// Run every configured month in order.
    ///
    /// Errors only for a missing template, file system faults, or a failed
    /// summary reconciliation of an existing month.
    pub async fn run(&self) -> Result<SynthesisReport> {
        self.layout.ensure_root().await?;
        let template = load_template(&self.prompts_dir, CHAT_TEMPLATE).await?;
        let mut report = SynthesisReport::default();
        let mut previous: Option<String> = None;

        for (index, month) in self.months.iter().enumerate() {
            if exists(&self.layout.chats_path(month)).await {
                info!(month = %month, "chat file already exists");
                previous = Some(self.reconcile_summary(month).await?);
                report.cached.push(month.clone());
                continue;
            }

            let outcome = self
                .generate_month(&template, month, previous.as_deref(), &mut report)
                .await?;
            previous = Some(match outcome {
                MonthOutcome::Summarized(summary) => summary,
                MonthOutcome::Unsummarized | MonthOutcome::Failed => failed_month_summary(month),
            });

            if index + 1 < self.months.len() {
                info!(
                    pause_secs = self.pacing.month_pause().as_secs(),
                    "pausing to respect API rate limits"
                );
                tokio::time::sleep(self.pacing.month_pause()).await;
            }
        }

        info!(
            generated = report.generated.len(),
            cached = report.cached.len(),
            failed = report.failed.len(),
            "chat synthesis finished"
        );
        Ok(report)
    }

    /// Summary for a month whose chats already exist.
    #[instrument(skip_all, fields(month = %month))]
    async fn reconcile_summary(&self, month: &str) -> Result<String> {
        let summary_path = self.layout.summary_path(month);
        if exists(&summary_path).await {
            info!("loading cached summary");
            return read_text(&summary_path).await;
        }

        info!("summarizing existing chat file");
        let wrap = |source: SagaError| SagaError::SummaryReconciliation {
            month: month.to_string(),
            source: Box::new(source),
        };
        let messages = read_messages(&self.layout.chats_path(month))
            .await
            .map_err(wrap)?;
        let outcome = self
            .client
            .generate_text(&format!("summary {month}"), &summary_prompt(&messages), &self.retry)
            .await;
        let summary = outcome.result.map_err(|e| wrap(e.into()))?;
        write_text(&summary_path, &summary).await.map_err(wrap)?;
        info!(path = %summary_path.display(), "summary saved");
        Ok(summary)
    }

    /// Generate, length-check, persist, and summarize one month.
    #[instrument(skip_all, fields(month = %month))]
    async fn generate_month(
        &self,
        template: &str,
        month: &str,
        previous: Option<&str>,
        report: &mut SynthesisReport,
    ) -> Result<MonthOutcome> {
        let prompt = chat_prompt(
            template,
            previous,
            month,
            self.year,
            (self.length.min, self.length.max),
        );
        info!("generating chats");
        let outcome = self
            .client
            .generate_array_of::<Message>(&format!("chats {month}"), &prompt, &self.retry)
            .await;
        let Ok(mut messages) = outcome.result else {
            warn!("all attempts failed, skipping month");
            report.failed.push(month.to_string());
            return Ok(MonthOutcome::Failed);
        };
        info!(count = messages.len(), attempts = outcome.attempts, "chats generated");

        self.enforce_length(template, month, &mut messages).await;
        if messages.len() < self.length.min {
            report.short.push(month.to_string());
        }

        let chats_path = self.layout.chats_path(month);
        write_json(&chats_path, &messages).await?;
        info!(path = %chats_path.display(), count = messages.len(), "chats saved");
        report.generated.push(month.to_string());

        tokio::time::sleep(self.pacing.summary_pause()).await;
        let outcome = self
            .client
            .generate_text(&format!("summary {month}"), &summary_prompt(&messages), &self.retry)
            .await;
        let Ok(summary) = outcome.result else {
            warn!("summary failed; chats kept, summary will be rebuilt on the next run");
            report.unsummarized.push(month.to_string());
            return Ok(MonthOutcome::Unsummarized);
        };

        let summary_path = self.layout.summary_path(month);
        write_text(&summary_path, &summary).await?;
        info!(path = %summary_path.display(), "summary saved");
        Ok(MonthOutcome::Summarized(summary))
    }

    /// Truncate long months; ask for more messages on short ones.
    async fn enforce_length(&self, template: &str, month: &str, messages: &mut Vec<Message>) {
        for round in 1..=self.synthesis.max_continuations {
            let LengthCheck::Short { missing } = self.length.check(messages.len()) else {
                break;
            };
            info!(round, have = messages.len(), missing, "month is short, requesting continuation");
            tokio::time::sleep(self.pacing.summary_pause()).await;

            let context_len = self.synthesis.continuation_context_messages.min(messages.len());
            let recent = &messages[messages.len() - context_len..];
            let prompt = continuation_prompt(template, month, self.year, recent, missing);
            let outcome = self
                .client
                .generate_array_of::<Message>(
                    &format!("chats {month} continuation {round}"),
                    &prompt,
                    &self.retry,
                )
                .await;
            let Ok(extra) = outcome.result else {
                warn!(round, "continuation failed");
                break;
            };
            let added = append_new(messages, extra);
            debug!(round, added, "continuation appended");
            if added == 0 {
                warn!(round, "continuation produced no new messages");
                break;
            }
        }

        match self.length.check(messages.len()) {
            LengthCheck::Long { .. } => {
                let dropped = self.length.truncate(messages);
                info!(dropped, kept = messages.len(), "truncated month to ceiling");
            }
            LengthCheck::Short { missing } => {
                warn!(
                    count = messages.len(),
                    missing, "accepting month below the message floor"
                );
            }
            LengthCheck::Within => {}
        }
    }
}

/// Append messages whose ids are not present yet; returns how many were added.
fn append_new(messages: &mut Vec<Message>, extra: Vec<Message>) -> usize {
    let mut seen: HashSet<String> = messages.iter().map(|m| m.id.clone()).collect();
    let before = messages.len();
    for msg in extra {
        if seen.insert(msg.id.clone()) {
            messages.push(msg);
        }
    }
    messages.len() - before
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(id: &str) -> Message {
        Message::new(id, "2025-01-01 10:00", "hello")
    }

    #[test]
    fn append_new_skips_known_ids() {
        let mut messages = vec![msg("M1"), msg("M2")];
        let added = append_new(&mut messages, vec![msg("M2"), msg("M3"), msg("M3"), msg("M4")]);
        assert_eq!(added, 2);
        let ids: Vec<&str> = messages.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["M1", "M2", "M3", "M4"]);
    }
}
