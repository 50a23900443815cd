//! Retry policy and backoff calculation.
//!
//! Provides the types and math for retry logic. The async retry loop lives in
//! `saga-llm` (which has access to tokio); this module holds the portable,
//! sync-only building blocks:
//!
//! - [`Backoff`]: fixed or linearly increasing delay between attempts
//! - [`RetryPolicy`]: attempt budget, backoff, quota delay, retryable kinds
//! - [`RetryOutcome`]: result of a retried unit of work

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::{GenerationError, GenerationErrorKind};

// ─────────────────────────────────────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Default attempts per unit of work.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
/// Default base delay between attempts in milliseconds.
pub const DEFAULT_BASE_DELAY_MS: u64 = 5_000;
/// Default delay after a quota fault in milliseconds.
pub const DEFAULT_QUOTA_DELAY_MS: u64 = 60_000;

/// Delay shape between attempts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Backoff {
    /// Same delay after every failed attempt.
    Fixed {
        /// Delay in milliseconds.
        delay_ms: u64,
    },
    /// `step_ms × attempt`, so 5s, 10s, 15s for a 5s step.
    Linear {
        /// Per-attempt increment in milliseconds.
        step_ms: u64,
    },
}

impl Backoff {
    /// Delay after the given failed attempt (1-based).
    pub fn delay(&self, attempt: u32) -> Duration {
        let ms = match *self {
            Self::Fixed { delay_ms } => delay_ms,
            Self::Linear { step_ms } => step_ms.saturating_mul(u64::from(attempt.max(1))),
        };
        Duration::from_millis(ms)
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::Fixed {
            delay_ms: DEFAULT_BASE_DELAY_MS,
        }
    }
}

/// Bounded retry policy for one unit of work.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetryPolicy {
    /// Total attempts, including the first (at least 1).
    pub max_attempts: u32,
    /// Delay shape for ordinary failures.
    pub backoff: Backoff,
    /// Fixed delay after a quota fault, independent of the attempt number.
    pub quota_delay_ms: u64,
    /// Error kinds worth another attempt.
    pub retryable: Vec<GenerationErrorKind>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff: Backoff::default(),
            quota_delay_ms: DEFAULT_QUOTA_DELAY_MS,
            retryable: vec![
                GenerationErrorKind::EmptyResponse,
                GenerationErrorKind::Transport,
                GenerationErrorKind::MalformedOutput,
            ],
        }
    }
}

impl RetryPolicy {
    /// Policy with a fixed delay between attempts.
    pub fn fixed(max_attempts: u32, delay_ms: u64) -> Self {
        Self {
            max_attempts,
            backoff: Backoff::Fixed { delay_ms },
            ..Self::default()
        }
    }

    /// Policy whose delay grows linearly with the attempt number.
    pub fn linear(max_attempts: u32, step_ms: u64) -> Self {
        Self {
            max_attempts,
            backoff: Backoff::Linear { step_ms },
            ..Self::default()
        }
    }

    /// Replace the quota delay.
    #[must_use]
    pub fn with_quota_delay_ms(mut self, quota_delay_ms: u64) -> Self {
        self.quota_delay_ms = quota_delay_ms;
        self
    }

    /// Whether `err` belongs to a retryable kind.
    pub fn is_retryable(&self, err: &GenerationError) -> bool {
        self.retryable.contains(&err.kind())
    }

    /// Delay to wait before the attempt that follows failed `attempt` (1-based).
    ///
    /// Returns `None` when the unit should be abandoned: the error is not
    /// retryable or the attempt budget is spent. Quota faults use
    /// [`RetryPolicy::quota_delay_ms`] regardless of the attempt number.
    pub fn next_delay(&self, attempt: u32, err: &GenerationError) -> Option<Duration> {
        if !self.is_retryable(err) || attempt >= self.max_attempts.max(1) {
            return None;
        }
        if err.is_quota() {
            return Some(Duration::from_millis(self.quota_delay_ms));
        }
        Some(self.backoff.delay(attempt))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Result
// ─────────────────────────────────────────────────────────────────────────────

/// Outcome of a retried unit of work.
#[derive(Debug)]
pub struct RetryOutcome<T> {
    /// The value, or the error of the final attempt.
    pub result: Result<T, GenerationError>,
    /// Attempts made (1-based).
    pub attempts: u32,
    /// Total time spent sleeping between attempts.
    pub total_delay: Duration,
}

impl<T> RetryOutcome<T> {
    /// Whether the unit eventually succeeded.
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    /// The value, discarding error details.
    pub fn ok(self) -> Option<T> {
        self.result.ok()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
