//! Chat message type shared by every pipeline.
//!
//! A [`Message`] carries the three fields the pipelines rely on (`id`, `ts`,
//! `text`) and keeps every other field the model produced in [`Message::extra`],
//! so files round-trip without losing model-authored attributes.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Timestamp layouts accepted besides RFC 3339, tried in order.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
];

/// One synthetic chat message.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Message identifier (e.g. `M42`).
    pub id: String,
    /// ISO-8601 timestamp.
    pub ts: String,
    /// Message body. May embed a decision marker.
    pub text: String,
    /// Remaining model-authored fields (sender, channel, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Message {
    /// Create a message with no extra fields.
    pub fn new(id: impl Into<String>, ts: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ts: ts.into(),
            text: text.into(),
            extra: Map::new(),
        }
    }

    /// Calendar date of [`Message::ts`], if it parses.
    pub fn date(&self) -> Option<NaiveDate> {
        parse_message_date(&self.ts)
    }
}

/// Parse the calendar date out of a message timestamp.
///
/// Accepts RFC 3339, `YYYY-MM-DD HH:MM[:SS]`, the `T`-separated variants, and
/// bare `YYYY-MM-DD` dates. Offsets are ignored: the date is the local date
/// written in the timestamp.
pub fn parse_message_date(ts: &str) -> Option<NaiveDate> {
    let ts = ts.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(ts) {
        return Some(dt.date_naive());
    }
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(ts, format) {
            return Some(dt.date());
        }
    }
    NaiveDate::parse_from_str(ts, "%Y-%m-%d").ok()
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
