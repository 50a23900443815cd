//! API error response parsing.
//!
//! Handles the error envelopes the generative endpoint (and proxies in front
//! of it) produce:
//! - Google:   `{"error": {"code": 429, "message": "...", "status": "RESOURCE_EXHAUSTED"}}`
//! - Array:    `[{"error": {...}}]` (some v1beta gateways wrap the envelope)
//! - Flat:     `{"message": "...", "code": "..."}`

use saga_core::GenerationError;
use serde_json::Value;

/// Parsed API error information.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiErrorInfo {
    /// Human-readable error message.
    pub message: String,
    /// Provider status code (e.g. `"RESOURCE_EXHAUSTED"`, `"NOT_FOUND"`).
    pub code: Option<String>,
}

impl ApiErrorInfo {
    /// Convert into a transport fault carrying the HTTP status.
    ///
    /// The provider status is folded into the message so that quota
    /// detection sees `RESOURCE_EXHAUSTED` answers whose text omits the word.
    pub fn into_transport(self, status: u16) -> GenerationError {
        let names_quota = self.message.to_lowercase().contains("quota");
        let message = match self.code {
            Some(code) if code == "RESOURCE_EXHAUSTED" && !names_quota => {
                format!("{} (quota: {code})", self.message)
            }
            Some(code) => format!("{} ({code})", self.message),
            None => self.message,
        };
        GenerationError::Transport {
            message,
            status: Some(status),
        }
    }
}

/// Parse an API error response body into structured error info.
///
/// Tries the known envelopes in order, falling back to the raw body text.
pub fn parse_api_error(body: &str, status: u16) -> ApiErrorInfo {
    if let Ok(json) = serde_json::from_str::<Value>(body) {
        let envelope = match &json {
            Value::Array(items) => items.first().cloned().unwrap_or(Value::Null),
            other => other.clone(),
        };

        if let Some(msg) = envelope["error"]["message"].as_str() {
            let code = envelope["error"]["status"].as_str().map(String::from);
            return ApiErrorInfo {
                message: msg.to_string(),
                code,
            };
        }

        if let Some(msg) = envelope["message"].as_str() {
            return ApiErrorInfo {
                message: msg.to_string(),
                code: envelope["code"].as_str().map(String::from),
            };
        }
    }

    ApiErrorInfo {
        message: format!("HTTP {status}: {body}"),
        code: None,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
