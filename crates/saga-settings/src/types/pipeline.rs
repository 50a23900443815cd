//! Pacing and synthesis settings.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Rate-limit pauses between units of work.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PacingSettings {
    /// Pause after each synthesized month.
    pub month_pause_ms: u64,
    /// Pause between a fresh month and its summary call.
    pub summary_pause_ms: u64,
    /// Pause after each decision, success or failure.
    pub decision_pause_ms: u64,
    /// Pause between weekly chunks (not after the last).
    pub chunk_pause_ms: u64,
}

impl Default for PacingSettings {
    fn default() -> Self {
        Self {
            month_pause_ms: 65_000,
            summary_pause_ms: 5_000,
            decision_pause_ms: 10_000,
            chunk_pause_ms: 20_000,
        }
    }
}

impl PacingSettings {
    /// Month pause as a [`Duration`].
    pub fn month_pause(&self) -> Duration {
        Duration::from_millis(self.month_pause_ms)
    }

    /// Summary pause as a [`Duration`].
    pub fn summary_pause(&self) -> Duration {
        Duration::from_millis(self.summary_pause_ms)
    }

    /// Decision pause as a [`Duration`].
    pub fn decision_pause(&self) -> Duration {
        Duration::from_millis(self.decision_pause_ms)
    }

    /// Chunk pause as a [`Duration`].
    pub fn chunk_pause(&self) -> Duration {
        Duration::from_millis(self.chunk_pause_ms)
    }
}

/// Length policy for synthesized months.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SynthesisSettings {
    /// Floor; shorter months trigger continuation requests.
    pub min_messages: usize,
    /// Ceiling; longer months are truncated.
    pub max_messages: usize,
    /// Continuation rounds before a short month is accepted as-is.
    pub max_continuations: u32,
    /// Trailing messages quoted in a continuation prompt.
    pub continuation_context_messages: usize,
}

impl Default for SynthesisSettings {
    fn default() -> Self {
        Self {
            min_messages: 120,
            max_messages: 150,
            max_continuations: 2,
            continuation_context_messages: 10,
        }
    }
}
