//! Generative endpoint and retry settings.

use saga_core::retry::{Backoff, RetryPolicy};
use serde::{Deserialize, Serialize};

/// Generative endpoint settings (Google Gemini, API-key auth).
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ModelSettings {
    /// Model ID.
    pub model: String,
    /// API key. Usually supplied through `GEMINI_API_KEY`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Base URL override (defaults to the public v1beta endpoint).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Sampling temperature.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Max output tokens.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
    /// Per-request timeout in milliseconds.
    pub request_timeout_ms: u64,
    /// Block threshold applied to every harm category (e.g. `BLOCK_NONE`).
    /// Unset leaves the endpoint defaults in place.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub safety_threshold: Option<String>,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            model: "gemini-2.5-pro".to_string(),
            api_key: None,
            base_url: None,
            temperature: None,
            max_output_tokens: None,
            request_timeout_ms: 300_000,
            safety_threshold: None,
        }
    }
}

/// Retry configuration for generation calls.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RetrySettings {
    /// Attempts per unit of work, including the first.
    pub max_attempts: u32,
    /// Base delay between attempts in milliseconds.
    pub base_delay_ms: u64,
    /// Delay after a quota fault in milliseconds.
    pub quota_delay_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: saga_core::retry::DEFAULT_MAX_ATTEMPTS,
            base_delay_ms: saga_core::retry::DEFAULT_BASE_DELAY_MS,
            quota_delay_ms: saga_core::retry::DEFAULT_QUOTA_DELAY_MS,
        }
    }
}

impl RetrySettings {
    /// Policy waiting `baseDelayMs` between every attempt.
    pub fn fixed_policy(&self) -> RetryPolicy {
        self.policy(Backoff::Fixed {
            delay_ms: self.base_delay_ms,
        })
    }

    /// Policy waiting `baseDelayMs × attempt` between attempts.
    pub fn linear_policy(&self) -> RetryPolicy {
        self.policy(Backoff::Linear {
            step_ms: self.base_delay_ms,
        })
    }

    fn policy(&self, backoff: Backoff) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            backoff,
            quota_delay_ms: self.quota_delay_ms,
            ..RetryPolicy::default()
        }
    }
}
