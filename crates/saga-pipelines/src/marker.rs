//! Decision marker parser.
//!
//! A decision message carries an inline tag and, somewhere in the same text,
//! the list of messages that drove it:
//!
//! ```text
//! Going with Postgres. [DECISION:id=D-db-choice] drivers:M12,M15,M31
//! ```
//!
//! [`parse_marker`] distinguishes three outcomes: no tag at all, a usable
//! marker, and a tag that is present but unusable.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

/// Prefix that identifies a decision tag.
pub const DECISION_TAG: &str = "[DECISION:";

static DECISION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[DECISION:id=([^\]]+)\]").expect("decision pattern is valid"));

static DRIVERS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"drivers:([M\d,]+)").expect("drivers pattern is valid"));

/// A decision point found in a message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecisionMarker {
    /// Identifier of the decision; names its trace file.
    pub decision_id: String,
    /// Ids of the messages cited as drivers, in written order.
    pub driver_ids: Vec<String>,
}

/// A decision tag that cannot be used.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum MarkerError {
    /// The tag is present but has no `id=...]` part.
    #[error("malformed decision tag: {0}")]
    Malformed(String),
    /// The id would escape the decisions directory.
    #[error("decision id {0:?} is not a valid file name")]
    UnsafeId(String),
}

/// Parse the decision marker in `text`.
///
/// Returns `Ok(None)` when the text has no decision tag. A missing drivers
/// list is not an error; the marker simply has no drivers.
pub fn parse_marker(text: &str) -> Result<Option<DecisionMarker>, MarkerError> {
    let Some(tag_start) = text.find(DECISION_TAG) else {
        return Ok(None);
    };

    let Some(caps) = DECISION_RE.captures(text) else {
        let snippet: String = text[tag_start..].chars().take(40).collect();
        return Err(MarkerError::Malformed(snippet));
    };
    let decision_id = caps[1].to_string();
    if !is_safe_file_stem(&decision_id) {
        return Err(MarkerError::UnsafeId(decision_id));
    }

    let driver_ids = DRIVERS_RE
        .captures(text)
        .map(|caps| {
            caps[1]
                .split(',')
                .filter(|id| !id.is_empty())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default();

    Ok(Some(DecisionMarker {
        decision_id,
        driver_ids,
    }))
}

fn is_safe_file_stem(id: &str) -> bool {
    !id.trim().is_empty()
        && id != "."
        && id != ".."
        && !id.contains(['/', '\\'])
        && !id.chars().any(char::is_control)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
