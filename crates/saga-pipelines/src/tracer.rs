//! Decision tracer.
//!
//! Scans each month's chats for decision markers and asks the model for a
//! causal trace of every decision, using the cited driver messages as
//! context. `decisions/{id}.json` is the completion marker: a decision whose
//! file exists is never regenerated, so reruns only fill the gaps.
//!
//! Months and decisions are independent units. An unreadable month or a
//! decision whose trace cannot be generated or saved is logged and counted,
//! and the run moves on.

use std::collections::HashMap;
use std::path::PathBuf;

use saga_core::{Message, Result, RetryPolicy};
use saga_llm::GenerationClient;
use saga_settings::{PacingSettings, SagaSettings};
use tracing::{debug, error, info, instrument, warn};

use crate::layout::{DataLayout, ensure_dir, exists, read_messages, write_json};
use crate::marker::{DecisionMarker, parse_marker};
use crate::prompts::{DECISION_TEMPLATE, decision_prompt, load_template};

/// Counts from a tracing run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TraceReport {
    /// Months that had a chat file.
    pub months_scanned: usize,
    /// Markers found across all scanned months.
    pub decisions_found: usize,
    /// Traces written in this run.
    pub generated: usize,
    /// Decisions skipped because their trace already existed.
    pub skipped_existing: usize,
    /// Decisions whose trace could not be generated or saved.
    pub failed: Vec<String>,
    /// Months whose chat file exists but could not be read.
    pub unreadable_months: Vec<String>,
    /// Messages whose decision tag could not be used.
    pub malformed: usize,
}

/// A decision found in a month, with the message that carries it.
struct PendingDecision<'a> {
    marker: DecisionMarker,
    message: &'a Message,
}

/// Decision tracing pipeline.
pub struct DecisionTracer {
    client: GenerationClient,
    layout: DataLayout,
    prompts_dir: PathBuf,
    months: Vec<String>,
    retry: RetryPolicy,
    pacing: PacingSettings,
}

impl DecisionTracer {
    /// Build from settings. Decisions retry on a fixed delay.
    pub fn new(client: GenerationClient, settings: &SagaSettings) -> Self {
        Self {
            client,
            layout: DataLayout::new(&settings.data_dir),
            prompts_dir: settings.prompts_dir.clone(),
            months: settings.months.clone(),
            retry: settings.retry.fixed_policy(),
            pacing: settings.pacing.clone(),
        }
    }

    /// Trace every decision of every configured month.
    pub async fn run(&self) -> Result<TraceReport> {
        let template = load_template(&self.prompts_dir, DECISION_TEMPLATE).await?;
        ensure_dir(&self.layout.decisions_dir()).await?;

        let mut report = TraceReport::default();
        for month in &self.months {
            self.process_month(&template, month, &mut report).await;
        }
        info!(
            found = report.decisions_found,
            generated = report.generated,
            skipped = report.skipped_existing,
            failed = report.failed.len(),
            unreadable_months = report.unreadable_months.len(),
            "decision tracing finished"
        );
        Ok(report)
    }

    #[instrument(skip_all, fields(month = %month))]
    async fn process_month(&self, template: &str, month: &str, report: &mut TraceReport) {
        let chats_path = self.layout.chats_path(month);
        if !exists(&chats_path).await {
            info!("no chat file, skipping");
            return;
        }
        let messages = match read_messages(&chats_path).await {
            Ok(messages) => messages,
            Err(err) => {
                error!(error = %err, "cannot read chat file, skipping month");
                report.unreadable_months.push(month.to_string());
                return;
            }
        };
        report.months_scanned += 1;

        let by_id: HashMap<&str, &Message> = messages.iter().map(|m| (m.id.as_str(), m)).collect();
        let mut pending = Vec::new();
        for message in &messages {
            match parse_marker(&message.text) {
                Ok(Some(marker)) => pending.push(PendingDecision { marker, message }),
                Ok(None) => {}
                Err(err) => {
                    warn!(message_id = %message.id, error = %err, "skipping unusable decision tag");
                    report.malformed += 1;
                }
            }
        }

        if pending.is_empty() {
            info!("no decisions found");
            return;
        }
        info!(count = pending.len(), "decisions found");
        report.decisions_found += pending.len();

        for decision in pending {
            self.trace_decision(template, &decision, &by_id, report).await;
        }
    }

    #[instrument(skip_all, fields(decision_id = %decision.marker.decision_id))]
    async fn trace_decision(
        &self,
        template: &str,
        decision: &PendingDecision<'_>,
        by_id: &HashMap<&str, &Message>,
        report: &mut TraceReport,
    ) {
        let decision_id = &decision.marker.decision_id;
        let out_path = self.layout.decision_path(decision_id);
        if exists(&out_path).await {
            info!("trace already exists, skipping");
            report.skipped_existing += 1;
            return;
        }

        let drivers: Vec<&Message> = decision
            .marker
            .driver_ids
            .iter()
            .filter_map(|id| {
                let found = by_id.get(id.as_str()).copied();
                if found.is_none() {
                    debug!(driver_id = %id, "driver not found in month, dropping");
                }
                found
            })
            .collect();

        let prompt = decision_prompt(template, decision.message, &drivers);
        let outcome = self
            .client
            .generate_object(&format!("decision {decision_id}"), &prompt, &self.retry)
            .await;
        match outcome.result {
            Ok(trace) => match write_json(&out_path, &trace).await {
                Ok(()) => {
                    info!(path = %out_path.display(), drivers = drivers.len(), "decision trace saved");
                    report.generated += 1;
                }
                Err(err) => {
                    error!(error = %err, "failed to save trace");
                    report.failed.push(decision_id.clone());
                }
            },
            Err(err) => {
                error!(error = %err, "failed to generate trace");
                report.failed.push(decision_id.clone());
            }
        }

        tokio::time::sleep(self.pacing.decision_pause()).await;
    }
}
