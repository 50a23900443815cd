//! Settings loading with deep merge and environment variable overrides.
//!
//! Loading flow:
//! 1. Start with compiled [`SagaSettings::default()`]
//! 2. If `./saga.json` (or the given path) exists, deep-merge its values over defaults
//! 3. Apply environment variable overrides (highest priority)
//! 4. Validate cross-field constraints
//!
//! Deep merge rules:
//! - Objects are merged recursively (source overrides target per-key)
//! - Arrays and primitives are replaced entirely by source
//! - Null values in source are skipped (preserving target)

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::errors::Result;
use crate::types::SagaSettings;

/// Settings file name looked up in the working directory.
pub const SETTINGS_FILE: &str = "saga.json";

/// Resolve the path to the default settings file (`./saga.json`).
pub fn settings_path() -> PathBuf {
    PathBuf::from(".").join(SETTINGS_FILE)
}

/// Load settings from the default path with env var overrides.
pub fn load_settings() -> Result<SagaSettings> {
    load_settings_from_path(&settings_path())
}

/// Load settings from a specific path with env var overrides.
///
/// If the file does not exist, returns defaults. If the file contains
/// invalid JSON or the merged result fails validation, returns an error.
pub fn load_settings_from_path(path: &Path) -> Result<SagaSettings> {
    let defaults = serde_json::to_value(SagaSettings::default())?;

    let merged = if path.exists() {
        debug!(?path, "loading settings from file");
        let content = std::fs::read_to_string(path)?;
        let user: Value = serde_json::from_str(&content)?;
        deep_merge(defaults, user)
    } else {
        debug!(?path, "settings file not found, using defaults");
        defaults
    };

    let mut settings: SagaSettings = serde_json::from_value(merged)?;
    apply_env_overrides(&mut settings);
    settings.validate()?;
    Ok(settings)
}

/// Recursive deep merge of two JSON values.
///
/// - Objects are merged recursively (source overrides target per-key)
/// - Arrays and primitives are replaced entirely by source
/// - Null values in source are skipped (preserving target)
pub fn deep_merge(target: Value, source: Value) -> Value {
    match (target, source) {
        (Value::Object(mut target_map), Value::Object(source_map)) => {
            for (key, source_val) in source_map {
                if source_val.is_null() {
                    continue;
                }
                let merged = if let Some(target_val) = target_map.remove(&key) {
                    deep_merge(target_val, source_val)
                } else {
                    source_val
                };
                let _ = target_map.insert(key, merged);
            }
            Value::Object(target_map)
        }
        (_, source) => source,
    }
}

/// Apply environment variable overrides to loaded settings.
///
/// Integers must parse and fall within range; invalid values are logged
/// and ignored (falling back to file/default).
pub fn apply_env_overrides(settings: &mut SagaSettings) {
    apply_overrides_from(settings, |name| std::env::var(name).ok());
}

/// Apply overrides from an arbitrary lookup (testable without env vars).
pub fn apply_overrides_from<F>(settings: &mut SagaSettings, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let read_string = |name: &str| lookup(name).filter(|v| !v.is_empty());

    // ── Model ───────────────────────────────────────────────────────
    if let Some(v) = read_string("GEMINI_API_KEY") {
        settings.model.api_key = Some(v);
    }
    if let Some(v) = read_string("SAGA_MODEL") {
        settings.model.model = v;
    }

    // ── Paths ───────────────────────────────────────────────────────
    if let Some(v) = read_string("SAGA_DATA_DIR") {
        settings.data_dir = PathBuf::from(v);
    }
    if let Some(v) = read_string("SAGA_PROMPTS_DIR") {
        settings.prompts_dir = PathBuf::from(v);
    }

    // ── Logging / retry ─────────────────────────────────────────────
    if let Some(v) = read_string("SAGA_LOG_LEVEL") {
        settings.logging.level = v;
    }
    if let Some(val) = lookup("SAGA_MAX_ATTEMPTS") {
        match parse_u32_range(&val, 1, 10) {
            Some(n) => settings.retry.max_attempts = n,
            None => {
                tracing::warn!(key = "SAGA_MAX_ATTEMPTS", value = %val, "invalid u32 env var, ignoring");
            }
        }
    }
}

// ── Pure parsing functions ──────────────────────────────────────────────────

/// Parse a string as a `u32` within a range.
pub fn parse_u32_range(val: &str, min: u32, max: u32) -> Option<u32> {
    let n: u32 = val.trim().parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
