//! # Generator Trait
//!
//! Core abstraction for the text-generation endpoint. The Gemini provider and
//! the scripted test generator both implement [`Generator`], so the pipelines
//! never know which one they are talking to.

use async_trait::async_trait;
use saga_core::GenerationError;
use serde::{Deserialize, Serialize};

/// Raw answer of one generation call.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    /// Text parts of the first candidate, in order.
    pub parts: Vec<String>,
    /// Candidate finish reason (e.g. `STOP`, `SAFETY`, `MAX_TOKENS`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
    /// Prompt-level block reason, when the prompt itself was rejected.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_reason: Option<String>,
}

impl GenerateResponse {
    /// A response holding a single text part.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            parts: vec![text.into()],
            finish_reason: Some("STOP".into()),
            block_reason: None,
        }
    }

    /// A response with no parts, as returned for blocked prompts.
    pub fn blocked(reason: impl Into<String>) -> Self {
        Self {
            parts: Vec::new(),
            finish_reason: None,
            block_reason: Some(reason.into()),
        }
    }

    /// Whether the response carries no content parts.
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Concatenated text of every part.
    pub fn joined_text(&self) -> String {
        self.parts.concat()
    }

    /// Human-readable reason for an empty response.
    pub fn empty_reason(&self) -> String {
        match (&self.block_reason, &self.finish_reason) {
            (Some(block), _) => format!("prompt blocked ({block})"),
            (None, Some(finish)) => format!("no content parts (finish reason {finish})"),
            (None, None) => "no content parts".to_string(),
        }
    }
}

/// One text-generation endpoint.
///
/// Implementors must be `Send + Sync`; the pipelines hold them behind an
/// `Arc<dyn Generator>`.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Model identifier (e.g. `"gemini-2.5-pro"`).
    fn model(&self) -> &str;

    /// Send `prompt` as a single user turn and return the raw response.
    ///
    /// Transport, quota, and server faults map to
    /// [`GenerationError::Transport`]. An empty response is returned as-is;
    /// classifying it is the caller's job.
    async fn generate(&self, prompt: &str) -> Result<GenerateResponse, GenerationError>;
}
