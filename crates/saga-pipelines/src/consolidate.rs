//! Concatenate the monthly chat files into one ordered log.

use std::path::PathBuf;

use saga_core::{Message, Result};
use tracing::{info, warn};

use crate::layout::{DataLayout, exists, read_messages, write_json};

/// Outcome of a consolidation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConsolidationReport {
    /// Months whose chat file was read.
    pub loaded: Vec<String>,
    /// Months with no chat file.
    pub missing: Vec<String>,
    /// Messages written.
    pub total_messages: usize,
    /// The consolidated file, when one was written.
    pub output: Option<PathBuf>,
}

/// Read `chats_{Month}.json` for every month in order and write
/// `all_chats.json`.
///
/// Missing months are skipped with a warning. Nothing is written when no
/// message was collected.
pub async fn consolidate(layout: &DataLayout, months: &[String]) -> Result<ConsolidationReport> {
    info!("consolidating monthly chat files");
    let mut report = ConsolidationReport::default();
    let mut all: Vec<Message> = Vec::new();

    for month in months {
        let path = layout.chats_path(month);
        if !exists(&path).await {
            warn!(month = %month, path = %path.display(), "chat file not found, skipping");
            report.missing.push(month.clone());
            continue;
        }
        let messages = read_messages(&path).await?;
        info!(month = %month, count = messages.len(), "loaded chat file");
        all.extend(messages);
        report.loaded.push(month.clone());
    }

    if all.is_empty() {
        warn!("no messages to consolidate");
        return Ok(report);
    }

    let output = layout.all_chats_path();
    write_json(&output, &all).await?;
    info!(path = %output.display(), total = all.len(), "all chats consolidated");
    report.total_messages = all.len();
    report.output = Some(output);
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn months(names: &[&str]) -> Vec<String> {
        names.iter().map(|m| (*m).to_string()).collect()
    }

    #[tokio::test]
    async fn concatenates_in_month_order_and_skips_missing() {
        let dir = tempfile::tempdir().unwrap();
        let layout = DataLayout::new(dir.path());
        write_json(
            &layout.chats_path("February"),
            &vec![Message::new("M3", "2025-02-01", "c")],
        )
        .await
        .unwrap();
        write_json(
            &layout.chats_path("January"),
            &vec![
                Message::new("M1", "2025-01-01", "a"),
                Message::new("M2", "2025-01-02", "b"),
            ],
        )
        .await
        .unwrap();

        let report = consolidate(&layout, &months(&["January", "February", "March"]))
            .await
            .unwrap();
        assert_eq!(report.loaded, months(&["January", "February"]));
        assert_eq!(report.missing, months(&["March"]));
        assert_eq!(report.total_messages, 3);

        let all = read_messages(&layout.all_chats_path()).await.unwrap();
        let ids: Vec<&str> = all.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["M1", "M2", "M3"]);
    }

    #[tokio::test]
    async fn nothing_written_without_messages() {
        let dir = tempfile::tempdir().unwrap();
        let layout = DataLayout::new(dir.path());
        write_json(&layout.chats_path("January"), &Vec::<Message>::new())
            .await
            .unwrap();

        let report = consolidate(&layout, &months(&["January", "February"]))
            .await
            .unwrap();
        assert_eq!(report.output, None);
        assert!(!layout.all_chats_path().exists());
    }
}
