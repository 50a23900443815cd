//! On-disk layout of the data root and the file helpers every pipeline uses.
//!
//! ```text
//! {data_dir}/
//!   chats_{Month}.json        array of Message
//!   summary_{Month}.txt       free text
//!   all_chats.json            array of Message, months concatenated
//!   decisions/{id}.json       one trace object per decision
//!   journey_episodes.json     array of episode objects
//! ```
//!
//! JSON is written pretty-printed with non-ASCII text kept as-is. Every write
//! goes to a sibling temp file first and is renamed into place, so an
//! interrupted run never leaves a half-written file that a later run would
//! mistake for a completion marker.

use std::path::{Path, PathBuf};

use saga_core::{Message, Result, SagaError};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// File name of the consolidated chat log.
pub const ALL_CHATS_FILE: &str = "all_chats.json";
/// File name of the journey episodes.
pub const EPISODES_FILE: &str = "journey_episodes.json";
/// Directory holding one trace per decision.
pub const DECISIONS_DIR: &str = "decisions";

/// Paths under the data root.
#[derive(Clone, Debug)]
pub struct DataLayout {
    root: PathBuf,
}

impl DataLayout {
    /// Layout rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The data root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `chats_{Month}.json`.
    pub fn chats_path(&self, month: &str) -> PathBuf {
        self.root.join(format!("chats_{month}.json"))
    }

    /// `summary_{Month}.txt`.
    pub fn summary_path(&self, month: &str) -> PathBuf {
        self.root.join(format!("summary_{month}.txt"))
    }

    /// `all_chats.json`.
    pub fn all_chats_path(&self) -> PathBuf {
        self.root.join(ALL_CHATS_FILE)
    }

    /// `decisions/`.
    pub fn decisions_dir(&self) -> PathBuf {
        self.root.join(DECISIONS_DIR)
    }

    /// `decisions/{decision_id}.json`.
    pub fn decision_path(&self, decision_id: &str) -> PathBuf {
        self.decisions_dir().join(format!("{decision_id}.json"))
    }

    /// `journey_episodes.json`.
    pub fn episodes_path(&self) -> PathBuf {
        self.root.join(EPISODES_FILE)
    }

    /// Create the data root if needed.
    pub async fn ensure_root(&self) -> Result<()> {
        ensure_dir(&self.root).await
    }
}

/// Whether `path` exists. An unreadable location counts as absent.
pub async fn exists(path: &Path) -> bool {
    tokio::fs::try_exists(path).await.unwrap_or(false)
}

/// Create `dir` and its parents.
pub async fn ensure_dir(dir: &Path) -> Result<()> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| SagaError::io(dir, e))
}

/// Read and deserialize a JSON file.
///
/// A missing file is [`SagaError::MissingInput`].
pub async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = tokio::fs::read_to_string(path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            SagaError::missing(path)
        } else {
            SagaError::io(path, e)
        }
    })?;
    serde_json::from_str(&content).map_err(|e| SagaError::json(path, e))
}

/// Read a message array.
pub async fn read_messages(path: &Path) -> Result<Vec<Message>> {
    read_json(path).await
}

/// Read a text file, trimming surrounding whitespace.
pub async fn read_text(path: &Path) -> Result<String> {
    let content = tokio::fs::read_to_string(path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            SagaError::missing(path)
        } else {
            SagaError::io(path, e)
        }
    })?;
    Ok(content.trim().to_string())
}

/// Serialize `value` as pretty JSON and write it atomically.
pub async fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let mut text = serde_json::to_string_pretty(value).map_err(|e| SagaError::json(path, e))?;
    text.push('\n');
    write_atomic(path, text.as_bytes()).await
}

/// Write text atomically.
pub async fn write_text(path: &Path, text: &str) -> Result<()> {
    write_atomic(path, text.as_bytes()).await
}

async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut tmp_name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    tmp_name.push(".tmp");
    let tmp = path.with_file_name(tmp_name);
    tokio::fs::write(&tmp, bytes)
        .await
        .map_err(|e| SagaError::io(&tmp, e))?;
    tokio::fs::rename(&tmp, path)
        .await
        .map_err(|e| SagaError::io(path, e))
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn paths() {
        let layout = DataLayout::new("/data");
        assert_eq!(layout.chats_path("March"), PathBuf::from("/data/chats_March.json"));
        assert_eq!(layout.summary_path("March"), PathBuf::from("/data/summary_March.txt"));
        assert_eq!(layout.all_chats_path(), PathBuf::from("/data/all_chats.json"));
        assert_eq!(
            layout.decision_path("D-12"),
            PathBuf::from("/data/decisions/D-12.json")
        );
        assert_eq!(layout.episodes_path(), PathBuf::from("/data/journey_episodes.json"));
    }

    #[tokio::test]
    async fn exists_reports_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary_May.txt");
        assert!(!exists(&path).await);
        write_text(&path, "ok").await.unwrap();
        assert!(exists(&path).await);
    }

    #[tokio::test]
    async fn json_is_pretty_and_keeps_unicode() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chats_May.json");
        let messages = vec![Message::new("M1", "2025-05-01 09:00", "Déjà vu ☕")];
        write_json(&path, &messages).await.unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("Déjà vu ☕"));
        assert!(raw.contains("\n  {"));
        assert!(!dir.path().join("chats_May.json.tmp").exists());

        let back = read_messages(&path).await.unwrap();
        assert_eq!(back, messages);
    }

    #[tokio::test]
    async fn missing_file_is_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_messages(&dir.path().join("all_chats.json")).await.unwrap_err();
        assert_matches!(err, SagaError::MissingInput { .. });
    }

    #[tokio::test]
    async fn wrong_shape_is_json_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chats_June.json");
        std::fs::write(&path, r#"{"not": "an array"}"#).unwrap();
        assert_matches!(read_messages(&path).await, Err(SagaError::Json { .. }));
    }

    #[tokio::test]
    async fn text_round_trip_trims() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary_July.txt");
        write_text(&path, "A busy month.\n").await.unwrap();
        assert_eq!(read_text(&path).await.unwrap(), "A busy month.");
    }
}
