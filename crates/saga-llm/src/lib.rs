//! # saga-llm
//!
//! The generation client shared by every saga pipeline.
//!
//! - [`Generator`]: one call to a text-generation endpoint
//! - [`google::GoogleProvider`]: Gemini `generateContent` over HTTP with API-key auth
//! - [`extract`]: greedy JSON object/array extraction from free-form model text
//! - [`retry::run_with_retry`]: async retry loop driven by a [`saga_core::RetryPolicy`]
//! - [`GenerationClient`]: invoke + extract + retry as a single unit of work
//! - [`testing::ScriptedGenerator`]: canned responses for pipeline tests

#![deny(unsafe_code)]

pub mod client;
pub mod error_parsing;
pub mod extract;
pub mod google;
pub mod provider;
pub mod retry;
pub mod testing;

pub use client::GenerationClient;
pub use extract::{extract_json_array, extract_json_object};
pub use provider::{GenerateResponse, Generator};
pub use retry::run_with_retry;
