//! Google Gemini provider implementing the [`Generator`] trait.
//!
//! One non-streaming `generateContent` call per prompt, authenticated with an
//! `x-goog-api-key` header; the key never appears in the URL or in error
//! messages. HTTP failures are parsed into transport faults carrying the
//! status; quota answers keep the word "quota" in their message so the retry
//! policy can recognise them.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, HeaderValue};
use saga_core::GenerationError;
use tracing::{debug, error, info, instrument};

use crate::error_parsing::parse_api_error;
use crate::provider::{GenerateResponse, Generator};

use super::types::{
    DEFAULT_API_KEY_BASE_URL, GeminiContent, GeminiPart, GenerateContentRequest,
    GenerateContentResponse, GenerationConfig, GoogleConfig, uniform_safety_settings,
};

/// Header carrying the API key.
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Google Gemini generator.
pub struct GoogleProvider {
    /// Provider configuration.
    config: GoogleConfig,
    /// HTTP client (reused across requests).
    client: reqwest::Client,
}

impl GoogleProvider {
    /// Create a new Google provider.
    #[must_use]
    pub fn new(config: GoogleConfig) -> Self {
        Self::with_client(config, reqwest::Client::new())
    }

    /// Create a new Google provider with a shared HTTP client.
    #[must_use]
    pub fn with_client(config: GoogleConfig, client: reqwest::Client) -> Self {
        info!(
            model = %config.model,
            timeout_ms = config.request_timeout_ms,
            safety = ?config.safety_threshold,
            "Google provider initialized"
        );
        Self { config, client }
    }

    /// Get the API URL for a given action.
    fn get_api_url(&self, action: &str) -> String {
        let base = self
            .config
            .base_url
            .as_deref()
            .unwrap_or(DEFAULT_API_KEY_BASE_URL)
            .trim_end_matches('/');
        format!("{base}/models/{}:{action}", self.config.model)
    }

    /// Build the request body for a single user turn.
    fn build_request_body(&self, prompt: &str) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![GeminiContent {
                role: Some("user".into()),
                parts: vec![GeminiPart {
                    text: Some(prompt.to_string()),
                    thought: None,
                }],
            }],
            generation_config: GenerationConfig {
                max_output_tokens: self.config.max_output_tokens,
                temperature: self.config.temperature,
            },
            safety_settings: self
                .config
                .safety_threshold
                .map(uniform_safety_settings)
                .unwrap_or_default(),
        }
    }

    /// Reduce a wire response to text parts and reasons.
    fn into_generate_response(response: GenerateContentResponse) -> GenerateResponse {
        let block_reason = response.prompt_feedback.and_then(|f| f.block_reason);
        let Some(candidate) = response.candidates.into_iter().next() else {
            return GenerateResponse {
                parts: Vec::new(),
                finish_reason: None,
                block_reason,
            };
        };
        let parts = candidate
            .content
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter(|part| part.thought != Some(true))
                    .filter_map(|part| part.text)
                    .collect()
            })
            .unwrap_or_default();
        GenerateResponse {
            parts,
            finish_reason: candidate.finish_reason,
            block_reason,
        }
    }
}

/// Map a reqwest failure (connect, timeout, body) to a transport fault.
///
/// The URL is stripped from the message before it reaches any log line.
fn transport_error(err: reqwest::Error) -> GenerationError {
    let status = err.status().map(|s| s.as_u16());
    GenerationError::Transport {
        message: err.without_url().to_string(),
        status,
    }
}

#[async_trait]
impl Generator for GoogleProvider {
    fn model(&self) -> &str {
        &self.config.model
    }

    #[instrument(skip_all, fields(provider = "google", model = %self.config.model))]
    async fn generate(&self, prompt: &str) -> Result<GenerateResponse, GenerationError> {
        let body = self.build_request_body(prompt);
        let url = self.get_api_url("generateContent");
        debug!(prompt_chars = prompt.len(), "sending generateContent");

        let response = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .header(API_KEY_HEADER, &self.config.api_key)
            .timeout(Duration::from_millis(self.config.request_timeout_ms))
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            let info = parse_api_error(&body_text, status.as_u16());
            error!(
                status = status.as_u16(),
                code = info.code.as_deref().unwrap_or("unknown"),
                "Google API error"
            );
            return Err(info.into_transport(status.as_u16()));
        }

        let parsed: GenerateContentResponse = response.json().await.map_err(|e| {
            GenerationError::Transport {
                message: format!("unreadable generateContent response: {}", e.without_url()),
                status: Some(status.as_u16()),
            }
        })?;
        if let Some(usage) = &parsed.usage_metadata {
            debug!(
                input_tokens = usage.prompt_token_count,
                output_tokens = usage.candidates_token_count,
                "generateContent usage"
            );
        }
        Ok(Self::into_generate_response(parsed))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
