//! # Generation Client
//!
//! Invoke + validate + extract, wrapped in the retry executor. Every
//! pipeline goes through this type; it holds the generator explicitly
//! instead of reaching for a process-wide client.

use std::sync::Arc;

use saga_core::{GenerationError, RetryOutcome, RetryPolicy};
use serde_json::{Map, Value};
use tracing::{debug, instrument};

use crate::extract::{extract_json_array, extract_json_object};
use crate::provider::Generator;
use crate::retry::run_with_retry;

/// Shared generation client.
#[derive(Clone)]
pub struct GenerationClient {
    generator: Arc<dyn Generator>,
}

impl GenerationClient {
    /// Wrap a generator.
    pub fn new(generator: Arc<dyn Generator>) -> Self {
        Self { generator }
    }

    /// Model identifier of the underlying generator.
    pub fn model(&self) -> &str {
        self.generator.model()
    }

    /// One call, no retry. An answer without content parts is an
    /// [`GenerationError::EmptyResponse`].
    #[instrument(skip_all, fields(model = %self.generator.model(), prompt_chars = prompt.len()))]
    pub async fn invoke(&self, prompt: &str) -> Result<String, GenerationError> {
        let response = self.generator.generate(prompt).await?;
        if response.is_empty() {
            return Err(GenerationError::empty(response.empty_reason()));
        }
        let text = response.joined_text();
        debug!(response_chars = text.len(), "generation returned");
        Ok(text)
    }

    /// Free text under `policy`. Blank text counts as an empty response.
    pub async fn generate_text(
        &self,
        unit: &str,
        prompt: &str,
        policy: &RetryPolicy,
    ) -> RetryOutcome<String> {
        run_with_retry(policy, unit, move |_| async move {
            let text = self.invoke(prompt).await?;
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return Err(GenerationError::empty("blank text"));
            }
            Ok(trimmed.to_string())
        })
        .await
    }

    /// A JSON object under `policy`.
    pub async fn generate_object(
        &self,
        unit: &str,
        prompt: &str,
        policy: &RetryPolicy,
    ) -> RetryOutcome<Map<String, Value>> {
        run_with_retry(policy, unit, move |_| async move {
            let text = self.invoke(prompt).await?;
            extract_json_object(&text)
        })
        .await
    }

    /// A JSON array under `policy`.
    pub async fn generate_array(
        &self,
        unit: &str,
        prompt: &str,
        policy: &RetryPolicy,
    ) -> RetryOutcome<Vec<Value>> {
        run_with_retry(policy, unit, move |_| async move {
            let text = self.invoke(prompt).await?;
            extract_json_array(&text)
        })
        .await
    }

    /// A JSON array whose items must each deserialize into `T`.
    ///
    /// A payload with any item of the wrong shape is malformed as a whole.
    pub async fn generate_array_of<T>(
        &self,
        unit: &str,
        prompt: &str,
        policy: &RetryPolicy,
    ) -> RetryOutcome<Vec<T>>
    where
        T: serde::de::DeserializeOwned,
    {
        run_with_retry(policy, unit, move |_| async move {
            let text = self.invoke(prompt).await?;
            let items = extract_json_array(&text)?;
            items
                .into_iter()
                .enumerate()
                .map(|(index, item)| {
                    serde_json::from_value(item).map_err(|e| {
                        GenerationError::malformed(format!("item {index} has the wrong shape: {e}"))
                    })
                })
                .collect()
        })
        .await
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::provider::GenerateResponse;
    use crate::testing::ScriptedGenerator;
    use assert_matches::assert_matches;

    fn client(generator: &ScriptedGenerator) -> GenerationClient {
        GenerationClient::new(Arc::new(generator.clone()))
    }

    #[tokio::test]
    async fn invoke_rejects_empty_parts() {
        let generator = ScriptedGenerator::new([Ok(GenerateResponse::blocked("SAFETY"))]);
        let err = client(&generator).invoke("p").await.unwrap_err();
        assert_matches!(err, GenerationError::EmptyResponse { ref reason } if reason.contains("SAFETY"));
    }

    #[tokio::test]
    async fn invoke_passes_transport_faults_through() {
        let generator = ScriptedGenerator::always_failing(GenerationError::transport("reset"));
        let err = client(&generator).invoke("p").await.unwrap_err();
        assert_eq!(err, GenerationError::transport("reset"));
    }

    #[tokio::test(start_paused = true)]
    async fn object_retries_past_malformed_output() {
        let generator = ScriptedGenerator::texts([
            "Sorry, here is some prose.",
            "Result: {\"decision_id\": \"D-7\"} end",
        ]);
        let outcome = client(&generator)
            .generate_object("decision D-7", "p", &RetryPolicy::fixed(3, 5_000))
            .await;
        assert_eq!(outcome.attempts, 2);
        assert_eq!(outcome.total_delay, Duration::from_secs(5));
        assert_eq!(outcome.ok().unwrap()["decision_id"], "D-7");
        assert_eq!(generator.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn array_exhausts_attempts() {
        let generator = ScriptedGenerator::texts(["no", "still no", "never"]);
        let outcome = client(&generator)
            .generate_array("chats March", "p", &RetryPolicy::fixed(3, 5_000))
            .await;
        assert_matches!(outcome.result, Err(GenerationError::MalformedOutput { .. }));
        assert_eq!(outcome.attempts, 3);
        assert_eq!(generator.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn blank_text_is_empty() {
        let generator = ScriptedGenerator::texts(["   \n", "A quiet month."]);
        let outcome = client(&generator)
            .generate_text("summary", "p", &RetryPolicy::fixed(3, 1))
            .await;
        assert_eq!(outcome.attempts, 2);
        assert_eq!(outcome.ok().as_deref(), Some("A quiet month."));
    }

    #[tokio::test(start_paused = true)]
    async fn typed_array_rejects_wrong_items() {
        #[derive(serde::Deserialize)]
        struct Item {
            #[allow(dead_code)]
            id: String,
        }

        let generator = ScriptedGenerator::texts(["[{\"id\": 1}]", "[{\"id\": \"M1\"}]"]);
        let outcome = client(&generator)
            .generate_array_of::<Item>("chats", "p", &RetryPolicy::fixed(3, 1))
            .await;
        assert_eq!(outcome.attempts, 2);
        assert_eq!(outcome.ok().map(|items| items.len()), Some(1));
    }
}
