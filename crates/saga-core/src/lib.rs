//! # saga-core
//!
//! Foundation types, errors, retry policy, and logging for the saga pipelines.
//!
//! This crate provides the shared vocabulary that all other saga crates depend on:
//!
//! - **Messages**: [`Message`](messages::Message), one synthetic chat line with free-form extras
//! - **Errors**: [`GenerationError`](errors::GenerationError) for model calls and
//!   [`SagaError`](errors::SagaError) for pipeline-level failures, via `thiserror`
//! - **Retry**: [`RetryPolicy`](retry::RetryPolicy) and [`Backoff`](retry::Backoff),
//!   the sync building blocks of the retry loop
//! - **Logging**: `tracing` subscriber setup and in-memory capture for tests

#![deny(unsafe_code)]

pub mod errors;
pub mod logging;
pub mod messages;
pub mod retry;

pub use errors::{GenerationError, GenerationErrorKind, Result, SagaError};
pub use messages::Message;
pub use retry::{Backoff, RetryOutcome, RetryPolicy};
