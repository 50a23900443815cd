//! Builds the generation client from model settings.

use std::sync::Arc;

use anyhow::{Result, bail};
use saga_llm::GenerationClient;
use saga_llm::google::{GoogleConfig, GoogleProvider, HarmBlockThreshold};
use saga_settings::ModelSettings;
use tracing::warn;

/// Translate [`ModelSettings`] into a provider configuration.
///
/// Fails when no API key is configured. An unknown safety threshold is
/// ignored with a warning and the endpoint defaults apply.
pub fn google_config(model: &ModelSettings) -> Result<GoogleConfig> {
    let Some(api_key) = model.api_key.as_deref().filter(|k| !k.trim().is_empty()) else {
        bail!("no API key configured: set GEMINI_API_KEY or model.apiKey in the settings file");
    };

    let mut config = GoogleConfig::new(&model.model, api_key);
    config.base_url.clone_from(&model.base_url);
    config.temperature = model.temperature;
    config.max_output_tokens = model.max_output_tokens;
    config.request_timeout_ms = model.request_timeout_ms;
    config.safety_threshold = model.safety_threshold.as_deref().and_then(|raw| {
        let parsed = HarmBlockThreshold::parse(raw);
        if parsed.is_none() {
            warn!(value = raw, "unknown safety threshold, using endpoint defaults");
        }
        parsed
    });
    Ok(config)
}

/// A [`GenerationClient`] backed by the Gemini `generateContent` endpoint.
pub fn generation_client(model: &ModelSettings) -> Result<GenerationClient> {
    let provider = GoogleProvider::new(google_config(model)?);
    Ok(GenerationClient::new(Arc::new(provider)))
}
