use std::fmt;
use thiserror::Error;

use crate::constants;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("OPENAI_API_KEY is not set (pass --api-key or add it to .env)")]
    MissingApiKey,
}

/// Everything needed to talk to the chat-completion endpoint.
#[derive(Clone)]
pub struct Settings {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}

impl Settings {
    /// Validates raw CLI/env values. A blank key counts as missing.
    pub fn new(
        api_key: Option<String>,
        base_url: Option<String>,
        model: Option<String>,
    ) -> Result<Self, ConfigError> {
        let api_key = api_key
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
            .ok_or(ConfigError::MissingApiKey)?;

        // A bad URL is not fatal here; it surfaces as a failed turn.
        let base_url = base_url.unwrap_or_else(|| constants::OPENAI_BASE_URL.clone());

        Ok(Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.unwrap_or_else(|| constants::ORDER_DESK_MODEL.clone()),
        })
    }
}
