//! Google Gemini provider (`generateContent`, API-key auth).

pub mod provider;
pub mod types;

pub use provider::GoogleProvider;
pub use types::{GoogleConfig, HarmBlockThreshold};
