//! Error hierarchy for the saga pipelines.
//!
//! Two layers, both built on [`thiserror`]:
//!
//! - [`GenerationError`]: what can go wrong in one call to the text-generation
//!   endpoint. Every variant is transient and handled by the retry loop.
//! - [`SagaError`]: pipeline-level failures (missing upstream inputs, file
//!   system and JSON faults) plus a wrapped [`GenerationError`] for callers
//!   that surface an exhausted unit of work.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, SagaError>;

// ─────────────────────────────────────────────────────────────────────────────
// GenerationError
// ─────────────────────────────────────────────────────────────────────────────

/// Discriminant of [`GenerationError`], used for retry classification and
/// metric labels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationErrorKind {
    /// The endpoint returned no content parts.
    EmptyResponse,
    /// Network, quota, or server-side fault.
    Transport,
    /// The text held no parseable JSON payload of the expected shape.
    MalformedOutput,
}

impl std::fmt::Display for GenerationErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyResponse => write!(f, "empty_response"),
            Self::Transport => write!(f, "transport"),
            Self::MalformedOutput => write!(f, "malformed_output"),
        }
    }
}

/// Failure of a single generation call.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum GenerationError {
    /// The endpoint answered without content parts (e.g. safety-filtered).
    #[error("response was blocked or empty: {reason}")]
    EmptyResponse {
        /// Why the response is considered empty (block reason, finish reason).
        reason: String,
    },

    /// Transport, quota, or server-side fault.
    #[error("transport error: {message}")]
    Transport {
        /// Underlying error message.
        message: String,
        /// HTTP status, when the endpoint answered at all.
        status: Option<u16>,
    },

    /// The response text does not hold the expected JSON payload.
    #[error("malformed model output: {message}")]
    MalformedOutput {
        /// What was wrong with the payload.
        message: String,
    },
}

impl GenerationError {
    /// Build an [`GenerationError::EmptyResponse`].
    pub fn empty(reason: impl Into<String>) -> Self {
        Self::EmptyResponse {
            reason: reason.into(),
        }
    }

    /// Build a [`GenerationError::Transport`] without a status code.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            status: None,
        }
    }

    /// Build a [`GenerationError::MalformedOutput`].
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedOutput {
            message: message.into(),
        }
    }

    /// The variant discriminant.
    pub fn kind(&self) -> GenerationErrorKind {
        match self {
            Self::EmptyResponse { .. } => GenerationErrorKind::EmptyResponse,
            Self::Transport { .. } => GenerationErrorKind::Transport,
            Self::MalformedOutput { .. } => GenerationErrorKind::MalformedOutput,
        }
    }

    /// Whether the fault is quota exhaustion.
    ///
    /// Only transport faults qualify; the check is a case-insensitive
    /// `quota` substring of the underlying message.
    pub fn is_quota(&self) -> bool {
        match self {
            Self::Transport { message, .. } => message.to_lowercase().contains("quota"),
            Self::EmptyResponse { .. } | Self::MalformedOutput { .. } => false,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// SagaError
// ─────────────────────────────────────────────────────────────────────────────

/// Pipeline-level error.
#[derive(Debug, Error)]
pub enum SagaError {
    /// A generation unit exhausted its retries.
    #[error(transparent)]
    Generation(#[from] GenerationError),

    /// A required upstream file is absent.
    #[error("required input not found: {}", path.display())]
    MissingInput {
        /// The missing file.
        path: PathBuf,
    },

    /// Reading or writing a file failed.
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        /// The file involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// A file held JSON of the wrong shape.
    #[error("invalid JSON in {}: {source}", path.display())]
    Json {
        /// The file involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },

    /// A message timestamp could not be parsed into a date.
    #[error("message {id} has an unparseable timestamp {ts:?}")]
    Timestamp {
        /// Message id.
        id: String,
        /// The offending timestamp.
        ts: String,
    },

    /// Summarizing an already generated month failed; the run stops.
    #[error("could not summarize existing chats for {month}: {source}")]
    SummaryReconciliation {
        /// Month whose summary was being rebuilt.
        month: String,
        /// What went wrong.
        #[source]
        source: Box<SagaError>,
    },
}

impl SagaError {
    /// Wrap an I/O error with the path it concerns.
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Wrap a JSON error with the path it concerns.
    pub fn json(path: impl AsRef<Path>, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// A missing-input error for `path`.
    pub fn missing(path: impl AsRef<Path>) -> Self {
        Self::MissingInput {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Short category string for log fields.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Generation(_) => "generation",
            Self::MissingInput { .. } => "missing_input",
            Self::Io { .. } => "io",
            Self::Json { .. } => "json",
            Self::Timestamp { .. } => "timestamp",
            Self::SummaryReconciliation { .. } => "summary_reconciliation",
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
