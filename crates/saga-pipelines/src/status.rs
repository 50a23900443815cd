//! Artifact status of a data root. Makes no model calls.

use std::fmt;
use std::path::Path;

use saga_core::Result;
use serde_json::Value;

use crate::layout::{DataLayout, exists, read_json};

/// State of one JSON array artifact.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Artifact {
    /// The file does not exist.
    Missing,
    /// The file holds an array of this many items.
    Items(usize),
    /// The file exists but is not a readable JSON array.
    Unreadable,
}

impl fmt::Display for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => write!(f, "missing"),
            Self::Items(n) => write!(f, "{n} items"),
            Self::Unreadable => write!(f, "unreadable"),
        }
    }
}

/// Per-month artifacts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MonthStatus {
    /// Month name.
    pub month: String,
    /// `chats_{Month}.json`.
    pub chats: Artifact,
    /// Whether `summary_{Month}.txt` exists.
    pub summary: bool,
}

/// Everything the pipelines have produced so far.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusReport {
    /// One entry per configured month.
    pub months: Vec<MonthStatus>,
    /// `all_chats.json`.
    pub consolidated: Artifact,
    /// Number of `decisions/*.json` files.
    pub decision_traces: usize,
    /// `journey_episodes.json`.
    pub episodes: Artifact,
}

impl StatusReport {
    /// Inspect `layout` for the given months.
    pub async fn gather(layout: &DataLayout, months: &[String]) -> Result<Self> {
        let mut month_status = Vec::with_capacity(months.len());
        for month in months {
            month_status.push(MonthStatus {
                month: month.clone(),
                chats: array_artifact(&layout.chats_path(month)).await,
                summary: exists(&layout.summary_path(month)).await,
            });
        }
        Ok(Self {
            months: month_status,
            consolidated: array_artifact(&layout.all_chats_path()).await,
            decision_traces: count_json_files(&layout.decisions_dir()).await?,
            episodes: array_artifact(&layout.episodes_path()).await,
        })
    }
}

impl fmt::Display for StatusReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for m in &self.months {
            writeln!(
                f,
                "{:<10} chats: {:<12} summary: {}",
                m.month,
                m.chats.to_string(),
                if m.summary { "yes" } else { "no" }
            )?;
        }
        writeln!(f, "all_chats.json:        {}", self.consolidated)?;
        writeln!(f, "decision traces:       {}", self.decision_traces)?;
        write!(f, "journey_episodes.json: {}", self.episodes)
    }
}

async fn array_artifact(path: &Path) -> Artifact {
    if !exists(path).await {
        return Artifact::Missing;
    }
    match read_json::<Value>(path).await {
        Ok(Value::Array(items)) => Artifact::Items(items.len()),
        _ => Artifact::Unreadable,
    }
}

async fn count_json_files(dir: &Path) -> Result<usize> {
    if !exists(dir).await {
        return Ok(0);
    }
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .map_err(|e| saga_core::SagaError::io(dir, e))?;
    let mut count = 0;
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| saga_core::SagaError::io(dir, e))?
    {
        if entry.path().extension().is_some_and(|ext| ext == "json") {
            count += 1;
        }
    }
    Ok(count)
}
