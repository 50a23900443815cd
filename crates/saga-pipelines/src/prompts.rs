//! Prompt templates and the prompt builders for each pipeline.
//!
//! Templates are opaque text files read from the prompts directory; the
//! builders append the structured context after them.

use std::path::Path;

use saga_core::{Message, Result, SagaError};
use serde::Serialize;

/// Template for monthly chat synthesis.
pub const CHAT_TEMPLATE: &str = "chat_generation.md";
/// Template for decision traces.
pub const DECISION_TEMPLATE: &str = "decision_trace.md";
/// Template for weekly journey episodes.
pub const JOURNEY_TEMPLATE: &str = "journey_summary.md";

/// Sentinel used in place of a previous-month summary for the first month.
pub const FIRST_MONTH: &str = "This is the first month.";

/// Load a template verbatim. A missing file is [`SagaError::MissingInput`].
pub async fn load_template(prompts_dir: &Path, name: &str) -> Result<String> {
    let path = prompts_dir.join(name);
    tokio::fs::read_to_string(&path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            SagaError::missing(&path)
        } else {
            SagaError::io(&path, e)
        }
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Chat synthesis
// ─────────────────────────────────────────────────────────────────────────────

/// Prompt for a month's chats, conditioned on the previous month's summary.
pub fn chat_prompt(
    template: &str,
    previous_summary: Option<&str>,
    month: &str,
    year: i32,
    (min, max): (usize, usize),
) -> String {
    let previous = previous_summary.filter(|s| !s.trim().is_empty()).unwrap_or(FIRST_MONTH);
    format!(
        "{template}\n\n\
         Last month summary: {previous}\n\n\
         Now generate ~{min}–{max} chat messages for {month} {year}. \
         Strict JSON array only, no explanation."
    )
}

/// Prompt asking for `needed` more messages continuing `recent`.
pub fn continuation_prompt(
    template: &str,
    month: &str,
    year: i32,
    recent: &[Message],
    needed: usize,
) -> String {
    let last_id = recent.last().map_or("(none)", |m| m.id.as_str());
    format!(
        "{template}\n\n\
         The chat log for {month} {year} is incomplete. These are its most recent messages:\n\
         {recent}\n\n\
         Continue the same conversation with {needed} more chat messages for {month} {year}, \
         picking up after message {last_id} with new, unused ids and later timestamps. \
         Strict JSON array only, no explanation.",
        recent = pretty(recent)
    )
}

/// Prompt for a month's free-text summary.
pub fn summary_prompt(messages: &[Message]) -> String {
    let compact = serde_json::to_string(messages).unwrap_or_default();
    format!("Summarize key events from these chats in 3-4 sentences:\n\n{compact}")
}

/// Context handed to the next month when a month could not be generated.
pub fn failed_month_summary(month: &str) -> String {
    format!("Summary for {month} could not be generated.")
}

// ─────────────────────────────────────────────────────────────────────────────
// Decision traces and journey episodes
// ─────────────────────────────────────────────────────────────────────────────

/// Prompt for one decision trace.
pub fn decision_prompt(template: &str, decision: &Message, drivers: &[&Message]) -> String {
    format!(
        "{template}\n\n\
         ## Input to Analyze:\n\n\
         ### Decision Message:\n\
         {decision}\n\n\
         ### Driver Messages (Context):\n\
         {drivers}",
        decision = pretty(decision),
        drivers = pretty(drivers)
    )
}

/// Prompt for one weekly episode.
pub fn journey_prompt(template: &str, chunk: &[Message]) -> String {
    format!(
        "{template}\n\n## Messages to Summarize:\n{chunk}",
        chunk = pretty(chunk)
    )
}

fn pretty<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_default()
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
