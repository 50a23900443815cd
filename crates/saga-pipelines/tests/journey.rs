//! Journey summarization runs against a scripted generator.

mod common;

use std::time::Duration;

use assert_matches::assert_matches;
use common::{Workspace, client};
use saga_core::{GenerationError, Message, SagaError};
use saga_llm::GenerateResponse;
use saga_llm::testing::ScriptedGenerator;
use saga_pipelines::JourneySummarizer;

/// Wed Jan 1 and Sun Jan 5 share a week; Mon Jan 6 opens the next.
fn two_weeks() -> Vec<Message> {
    vec![
        Message::new("M1", "2025-01-01 09:00", "new year"),
        Message::new("M2", "2025-01-05 22:00", "sunday night"),
        Message::new("M3", "2025-01-06 08:00", "monday again"),
    ]
}

fn episode_reply() -> ScriptedGenerator {
    ScriptedGenerator::from_fn(|prompt, _| {
        let week = if prompt.contains("\"M3\"") { 2 } else { 1 };
        Ok(GenerateResponse::text(format!("{{\"week\": {week}, \"title\": \"episode\"}}")))
    })
}

#[tokio::test(start_paused = true)]
async fn one_episode_per_week_in_order() {
    let ws = Workspace::new(&["January"]);
    ws.write_messages("all_chats.json", &two_weeks());
    let generator = episode_reply();

    let start = tokio::time::Instant::now();
    let report = JourneySummarizer::new(client(&generator), &ws.settings)
        .run()
        .await
        .unwrap();

    assert_eq!(report.weeks, 2);
    assert_eq!(report.episodes, 2);
    assert!(report.failed_weeks.is_empty());
    assert_eq!(report.output, Some(ws.data().join("journey_episodes.json")));

    let episodes = ws.read_json("journey_episodes.json");
    let weeks: Vec<i64> = episodes
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["week"].as_i64().unwrap())
        .collect();
    assert_eq!(weeks, vec![1, 2]);

    let first = &generator.prompts()[0];
    assert!(first.contains("\"M1\"") && first.contains("\"M2\"") && !first.contains("\"M3\""));
    // One pause between the two weeks, none after the last.
    assert_eq!(start.elapsed(), Duration::from_secs(20));
}

#[tokio::test(start_paused = true)]
async fn failed_week_is_dropped() {
    let ws = Workspace::new(&["January"]);
    ws.write_messages("all_chats.json", &two_weeks());
    let generator = ScriptedGenerator::from_fn(|prompt, _| {
        if prompt.contains("\"M3\"") {
            Ok(GenerateResponse::text("no payload here"))
        } else {
            Ok(GenerateResponse::text("{\"week\": 1}"))
        }
    });

    let start = tokio::time::Instant::now();
    let report = JourneySummarizer::new(client(&generator), &ws.settings)
        .run()
        .await
        .unwrap();

    assert_eq!(report.episodes, 1);
    assert_eq!(report.failed_weeks, vec![2]);
    assert_eq!(ws.read_json("journey_episodes.json").as_array().unwrap().len(), 1);
    // 20s between the weeks, then 5s and 10s of linear backoff on the last week.
    assert_eq!(start.elapsed(), Duration::from_secs(35));
}

#[tokio::test(start_paused = true)]
async fn no_file_when_every_week_fails() {
    let ws = Workspace::new(&["January"]);
    ws.write_messages("all_chats.json", &two_weeks());
    let generator = ScriptedGenerator::always_failing(GenerationError::empty("SAFETY"));

    let report = JourneySummarizer::new(client(&generator), &ws.settings)
        .run()
        .await
        .unwrap();

    assert_eq!(report.episodes, 0);
    assert_eq!(report.output, None);
    assert_eq!(report.failed_weeks, vec![1, 2]);
    assert!(!ws.data().join("journey_episodes.json").exists());
}

#[tokio::test]
async fn missing_consolidated_log_is_fatal() {
    let ws = Workspace::new(&["January"]);
    let generator = episode_reply();

    let result = JourneySummarizer::new(client(&generator), &ws.settings).run().await;

    assert_matches!(result, Err(SagaError::MissingInput { .. }));
    assert_eq!(generator.calls(), 0);
}

#[tokio::test]
async fn unparseable_timestamp_is_fatal() {
    let ws = Workspace::new(&["January"]);
    ws.write_messages(
        "all_chats.json",
        &[
            Message::new("M1", "2025-01-01 09:00", "fine"),
            Message::new("M2", "last tuesday", "broken"),
        ],
    );
    let generator = episode_reply();

    let result = JourneySummarizer::new(client(&generator), &ws.settings).run().await;

    assert_matches!(result, Err(SagaError::Timestamp { ref id, .. }) if id == "M2");
    assert_eq!(generator.calls(), 0);
}

#[tokio::test]
async fn empty_log_produces_nothing() {
    let ws = Workspace::new(&["January"]);
    ws.write_messages("all_chats.json", &[]);
    let generator = episode_reply();

    let report = JourneySummarizer::new(client(&generator), &ws.settings)
        .run()
        .await
        .unwrap();

    assert_eq!(report.weeks, 0);
    assert_eq!(report.output, None);
}
