//! Settings type definitions.
//!
//! All types use `#[serde(rename_all = "camelCase")]` for the JSON settings
//! file. Each type implements [`Default`] with production values, and every
//! struct is `#[serde(default)]` so partial JSON fills in the rest.

mod model;
mod pipeline;

pub use model::*;
pub use pipeline::*;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::errors::{Result, SettingsError};

/// Months synthesized by default, in processing order.
pub const DEFAULT_MONTHS: &[&str] = &[
    "January", "February", "March", "April", "May", "June", "July", "August",
];

/// Root settings type.
///
/// # JSON Format
///
/// ```json
/// {
///   "dataDir": "./data",
///   "model": { "model": "gemini-2.5-flash" },
///   "pacing": { "monthPauseMs": 30000 }
/// }
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SagaSettings {
    /// Root of every generated artifact.
    pub data_dir: PathBuf,
    /// Directory holding the prompt templates.
    pub prompts_dir: PathBuf,
    /// Calendar year the synthetic history is set in.
    pub year: i32,
    /// Months to synthesize, in order.
    pub months: Vec<String>,
    /// Generative endpoint settings.
    pub model: ModelSettings,
    /// Retry budget and backoff.
    pub retry: RetrySettings,
    /// Rate-limit pauses between units of work.
    pub pacing: PacingSettings,
    /// Chat synthesis length policy.
    pub synthesis: SynthesisSettings,
    /// Logging configuration.
    pub logging: LoggingSettings,
}

impl Default for SagaSettings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            prompts_dir: PathBuf::from("./prompts"),
            year: 2025,
            months: DEFAULT_MONTHS.iter().map(|m| (*m).to_string()).collect(),
            model: ModelSettings::default(),
            retry: RetrySettings::default(),
            pacing: PacingSettings::default(),
            synthesis: SynthesisSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}

impl SagaSettings {
    /// Check cross-field constraints serde cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.months.is_empty() {
            return Err(SettingsError::InvalidValue("months must not be empty".into()));
        }
        if self.retry.max_attempts == 0 {
            return Err(SettingsError::InvalidValue(
                "retry.maxAttempts must be at least 1".into(),
            ));
        }
        let synthesis = &self.synthesis;
        if synthesis.min_messages == 0 || synthesis.min_messages > synthesis.max_messages {
            return Err(SettingsError::InvalidValue(format!(
                "synthesis.minMessages ({}) must be between 1 and maxMessages ({})",
                synthesis.min_messages, synthesis.max_messages
            )));
        }
        Ok(())
    }
}

/// Logging configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingSettings {
    /// Default filter when `RUST_LOG` is unset.
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_produces_defaults() {
        let settings: SagaSettings = serde_json::from_str("{}").unwrap();
        let defaults = SagaSettings::default();
        assert_eq!(settings.data_dir, defaults.data_dir);
        assert_eq!(settings.months, defaults.months);
        assert_eq!(settings.retry.max_attempts, defaults.retry.max_attempts);
    }

    #[test]
    fn json_field_names_are_camel_case() {
        let json = serde_json::to_value(SagaSettings::default()).unwrap();
        assert!(json.get("dataDir").is_some());
        assert!(json.get("promptsDir").is_some());
        assert!(json["pacing"].get("monthPauseMs").is_some());
        assert!(json["synthesis"].get("maxContinuations").is_some());
        assert!(json["model"].get("requestTimeoutMs").is_some());
    }

    #[test]
    fn partial_nested_section() {
        let settings: SagaSettings =
            serde_json::from_str(r#"{"pacing": {"chunkPauseMs": 1}}"#).unwrap();
        assert_eq!(settings.pacing.chunk_pause_ms, 1);
        assert_eq!(settings.pacing.month_pause_ms, 65_000);
    }

    #[test]
    fn validate_rejects_empty_months() {
        let settings = SagaSettings {
            months: vec![],
            ..SagaSettings::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn validate_rejects_inverted_bounds() {
        let mut settings = SagaSettings::default();
        settings.synthesis.min_messages = 200;
        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("minMessages"));
    }

    #[test]
    fn validate_rejects_zero_attempts() {
        let mut settings = SagaSettings::default();
        settings.retry.max_attempts = 0;
        assert!(settings.validate().is_err());
    }
}
