//! # Retry Executor
//!
//! Runs one unit of work under a [`RetryPolicy`]. The delay math lives in
//! `saga_core::retry`; this module owns the async loop, the sleeps, the
//! counters, and the log lines.
//!
//! The loop:
//! 1. Calls the operation with the 1-based attempt number
//! 2. On success, returns immediately
//! 3. On failure, asks the policy for the next delay; `None` ends the unit
//! 4. Otherwise sleeps (quota faults get the long fixed delay) and goes again
//!
//! No sleep follows the final attempt.

use std::future::Future;
use std::time::Duration;

use saga_core::{GenerationError, RetryOutcome, RetryPolicy};
use tracing::{error, warn};

/// Run `op` until it succeeds or `policy` gives up.
///
/// `unit` names the work in log lines (e.g. `"chats March"`).
pub async fn run_with_retry<T, F, Fut>(policy: &RetryPolicy, unit: &str, mut op: F) -> RetryOutcome<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, GenerationError>>,
{
    let mut attempt = 1u32;
    let mut total_delay = Duration::ZERO;

    loop {
        let err = match op(attempt).await {
            Ok(value) => {
                return RetryOutcome {
                    result: Ok(value),
                    attempts: attempt,
                    total_delay,
                };
            }
            Err(err) => err,
        };

        let Some(delay) = policy.next_delay(attempt, &err) else {
            metrics::counter!("generation_failures_total").increment(1);
            error!(
                unit,
                attempts = attempt,
                kind = %err.kind(),
                error = %err,
                "unit of work failed after all attempts"
            );
            return RetryOutcome {
                result: Err(err),
                attempts: attempt,
                total_delay,
            };
        };

        metrics::counter!("generation_retries_total", "kind" => err.kind().to_string())
            .increment(1);
        if err.is_quota() {
            warn!(
                unit,
                attempt,
                max_attempts = policy.max_attempts,
                delay_secs = delay.as_secs(),
                "quota exhausted, backing off"
            );
        } else {
            warn!(
                unit,
                attempt,
                max_attempts = policy.max_attempts,
                delay_secs = delay.as_secs(),
                kind = %err.kind(),
                error = %err,
                "attempt failed, retrying"
            );
        }

        tokio::time::sleep(delay).await;
        total_delay += delay;
        attempt += 1;
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
