//! # saga-settings
//!
//! Configuration management with layered sources for the saga pipelines.
//!
//! Settings are loaded from three layers (in priority order):
//! 1. **Compiled defaults** — [`SagaSettings::default()`]
//! 2. **Settings file** — `./saga.json` or an explicit path (deep-merged over defaults)
//! 3. **Environment variables** — `GEMINI_API_KEY` and `SAGA_*` overrides (highest priority)
//!
//! The binary loads settings once at startup and passes them explicitly to
//! every pipeline; there is no global instance.

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{deep_merge, load_settings, load_settings_from_path, settings_path};
pub use types::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn re_exports_work() {
        let _settings = SagaSettings::default();
        let _path = settings_path();
    }

    #[test]
    fn default_settings_are_valid() {
        let settings = SagaSettings::default();
        assert_eq!(settings.model.model, "gemini-2.5-pro");
        assert_eq!(settings.retry.max_attempts, 3);
        assert_eq!(settings.pacing.month_pause_ms, 65_000);
        assert_eq!(settings.synthesis.min_messages, 120);
        assert_eq!(settings.synthesis.max_messages, 150);
        assert_eq!(settings.months.len(), 8);
        assert!(settings.validate().is_ok());
    }
}
