//! Decision tracing runs against a scripted generator.

mod common;

use std::time::Duration;

use common::{Workspace, client};
use saga_core::{GenerationError, Message};
use saga_llm::GenerateResponse;
use saga_llm::testing::ScriptedGenerator;
use saga_pipelines::DecisionTracer;

fn january() -> Vec<Message> {
    vec![
        Message::new("M1", "2025-01-02 09:00", "Lisbon has great light."),
        Message::new("M2", "2025-01-03 10:00", "Rent there is half of ours."),
        Message::new(
            "M3",
            "2025-01-04 11:00",
            "We're moving. [DECISION:id=D-move] drivers:M1,M2,M404",
        ),
        Message::new("M4", "2025-01-05 12:00", "Keeping the car. [DECISION:id=D-car]"),
        Message::new("M5", "2025-01-06 12:00", "[DECISION: oops"),
    ]
}

fn trace_reply() -> ScriptedGenerator {
    ScriptedGenerator::from_fn(|_, index| {
        Ok(GenerateResponse::text(format!(
            "Here is the trace:\n{{\"trace\": {index}, \"summary\": \"why\"}}\nDone."
        )))
    })
}

#[tokio::test(start_paused = true)]
async fn traces_every_decision_and_drops_unknown_drivers() {
    let ws = Workspace::new(&["January", "February"]);
    ws.write_messages("chats_January.json", &january());
    let generator = trace_reply();

    let report = DecisionTracer::new(client(&generator), &ws.settings)
        .run()
        .await
        .unwrap();

    assert_eq!(report.months_scanned, 1);
    assert_eq!(report.decisions_found, 2);
    assert_eq!(report.generated, 2);
    assert_eq!(report.malformed, 1);
    assert!(report.failed.is_empty());

    let trace = ws.read_json("decisions/D-move.json");
    assert_eq!(trace["summary"], "why");

    let prompts = generator.prompts();
    let move_prompt = prompts.iter().find(|p| p.contains("D-move")).unwrap();
    assert!(move_prompt.contains("Lisbon has great light."));
    assert!(move_prompt.contains("Rent there is half of ours."));
    let (_, drivers) = move_prompt.split_once("### Driver Messages (Context):\n").unwrap();
    let drivers: Vec<Message> = serde_json::from_str(drivers).unwrap();
    let ids: Vec<&str> = drivers.iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, vec!["M1", "M2"]);
    let car_prompt = prompts.iter().find(|p| p.contains("D-car")).unwrap();
    assert!(car_prompt.ends_with("(Context):\n[]"));
}

#[tokio::test(start_paused = true)]
async fn rerun_skips_existing_traces() {
    let ws = Workspace::new(&["January"]);
    ws.write_messages("chats_January.json", &january());
    let generator = trace_reply();
    let tracer = DecisionTracer::new(client(&generator), &ws.settings);

    let _ = tracer.run().await.unwrap();
    let calls_after_first = generator.calls();
    let start = tokio::time::Instant::now();
    let second = tracer.run().await.unwrap();

    assert_eq!(generator.calls(), calls_after_first);
    assert_eq!(second.generated, 0);
    assert_eq!(second.skipped_existing, 2);
    assert_eq!(start.elapsed(), std::time::Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn failed_decision_writes_nothing_and_is_retried_next_run() {
    let ws = Workspace::new(&["January"]);
    ws.write_messages("chats_January.json", &january());
    let failing = ScriptedGenerator::always_failing(GenerationError::transport("backend error"));

    let report = DecisionTracer::new(client(&failing), &ws.settings)
        .run()
        .await
        .unwrap();

    assert_eq!(report.failed, vec!["D-move", "D-car"]);
    assert_eq!(failing.calls(), 6);
    assert!(!ws.data().join("decisions/D-move.json").exists());

    let generator = trace_reply();
    let report = DecisionTracer::new(client(&generator), &ws.settings)
        .run()
        .await
        .unwrap();
    assert_eq!(report.generated, 2);
    assert!(ws.data().join("decisions/D-car.json").exists());
}

#[tokio::test(start_paused = true)]
async fn reply_without_object_counts_as_failure() {
    let ws = Workspace::new(&["January"]);
    ws.write_messages(
        "chats_January.json",
        &[Message::new("M1", "2025-01-01", "[DECISION:id=D1]")],
    );
    let generator = ScriptedGenerator::texts(["no json", "still none", "[1, 2]"]);

    let report = DecisionTracer::new(client(&generator), &ws.settings)
        .run()
        .await
        .unwrap();

    assert_eq!(report.failed, vec!["D1"]);
    assert_eq!(generator.calls(), 3);
}

#[tokio::test(start_paused = true)]
async fn month_without_chat_file_is_skipped() {
    let ws = Workspace::new(&["March"]);
    let generator = trace_reply();

    let report = DecisionTracer::new(client(&generator), &ws.settings)
        .run()
        .await
        .unwrap();

    assert_eq!(report.months_scanned, 0);
    assert_eq!(generator.calls(), 0);
    assert!(ws.data().join("decisions").is_dir());
}

#[tokio::test(start_paused = true)]
async fn pause_follows_every_attempted_decision() {
    let ws = Workspace::new(&["January"]);
    ws.write_messages(
        "chats_January.json",
        &[
            Message::new("M1", "2025-01-01", "[DECISION:id=D-ok]"),
            Message::new("M2", "2025-01-02", "[DECISION:id=D-fail]"),
        ],
    );
    let generator = ScriptedGenerator::from_fn(|prompt, _| {
        if prompt.contains("D-fail") {
            Err(GenerationError::transport("backend error"))
        } else {
            Ok(GenerateResponse::text("{\"summary\": \"ok\"}"))
        }
    });

    let start = tokio::time::Instant::now();
    let report = DecisionTracer::new(client(&generator), &ws.settings)
        .run()
        .await
        .unwrap();

    assert_eq!(report.generated, 1);
    assert_eq!(report.failed, vec!["D-fail"]);
    // 10s after the success; 5s + 5s fixed backoff then 10s after the failure.
    assert_eq!(start.elapsed(), Duration::from_secs(30));
}

#[tokio::test(start_paused = true)]
async fn unsavable_trace_does_not_stop_the_run() {
    let ws = Workspace::new(&["January"]);
    let long_id = "x".repeat(300);
    ws.write_messages(
        "chats_January.json",
        &[
            Message::new("M1", "2025-01-01", format!("[DECISION:id={long_id}]")),
            Message::new("M2", "2025-01-02", "[DECISION:id=D-after]"),
        ],
    );
    let generator = trace_reply();

    let start = tokio::time::Instant::now();
    let report = DecisionTracer::new(client(&generator), &ws.settings)
        .run()
        .await
        .unwrap();

    assert_eq!(report.failed, vec![long_id]);
    assert_eq!(report.generated, 1);
    assert!(ws.data().join("decisions/D-after.json").exists());
    assert_eq!(start.elapsed(), Duration::from_secs(20));
}

#[tokio::test(start_paused = true)]
async fn unreadable_month_is_skipped() {
    let ws = Workspace::new(&["January", "February"]);
    std::fs::write(ws.data().join("chats_January.json"), "{ not json").unwrap();
    ws.write_messages(
        "chats_February.json",
        &[Message::new("M1", "2025-02-01", "[DECISION:id=D-feb]")],
    );
    let generator = trace_reply();

    let report = DecisionTracer::new(client(&generator), &ws.settings)
        .run()
        .await
        .unwrap();

    assert_eq!(report.unreadable_months, vec!["January"]);
    assert_eq!(report.months_scanned, 1);
    assert_eq!(report.generated, 1);
    assert!(ws.data().join("decisions/D-feb.json").exists());
}
