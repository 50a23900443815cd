//! Fixtures shared by the pipeline integration tests.

#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use saga_core::Message;
use saga_llm::GenerationClient;
use saga_llm::testing::ScriptedGenerator;
use saga_settings::SagaSettings;
use serde_json::{Value, json};
use tempfile::TempDir;

/// A temporary data root and prompts directory with stub templates.
pub struct Workspace {
    pub dir: TempDir,
    pub settings: SagaSettings,
}

impl Workspace {
    pub fn new(months: &[&str]) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let prompts = dir.path().join("prompts");
        std::fs::create_dir_all(&prompts).unwrap();
        for name in ["chat_generation.md", "decision_trace.md", "journey_summary.md"] {
            std::fs::write(prompts.join(name), "TEMPLATE").unwrap();
        }
        let settings = SagaSettings {
            data_dir: dir.path().join("data"),
            prompts_dir: prompts,
            months: months.iter().map(|m| (*m).to_string()).collect(),
            ..SagaSettings::default()
        };
        std::fs::create_dir_all(&settings.data_dir).unwrap();
        Self { dir, settings }
    }

    pub fn data(&self) -> &Path {
        &self.settings.data_dir
    }

    pub fn write_messages(&self, file: &str, messages: &[Message]) {
        let body = serde_json::to_string_pretty(messages).unwrap();
        std::fs::write(self.data().join(file), body).unwrap();
    }

    pub fn read_json(&self, file: &str) -> Value {
        let body = std::fs::read_to_string(self.data().join(file)).unwrap();
        serde_json::from_str(&body).unwrap()
    }
}

pub fn client(generator: &ScriptedGenerator) -> GenerationClient {
    GenerationClient::new(Arc::new(generator.clone()))
}

/// `count` messages with ids `M{start}..`, as model output text.
pub fn chat_batch(start: usize, count: usize) -> String {
    let items: Vec<Value> = (start..start + count)
        .map(|i| json!({ "id": format!("M{i}"), "ts": "2025-01-10 10:00", "text": format!("message {i}") }))
        .collect();
    format!("```json\n{}\n```", Value::Array(items))
}
