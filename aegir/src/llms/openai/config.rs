//! Configuration for OpenAI-compatible endpoints.

use crate::error::LlmError;

/// Configuration for the OpenAI-compatible client.
///
/// Atoma, OpenAI and most hosted inference services speak the same
/// `/chat/completions` protocol; only the base URL, key and label differ.
#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    /// API key for bearer authentication.
    pub api_key: String,
    /// Base URL for the API, without the trailing `/chat/completions`.
    pub base_url: String,
    /// Default model to use.
    pub model: String,
    /// Label used in logs and error messages.
    pub label: &'static str,
    /// Whether the endpoint honours `response_format: json_object`.
    pub json_mode: bool,
    /// Request timeout in seconds.
    pub timeout_secs: Option<u64>,
}

impl OpenAIConfig {
    /// Atoma inference API base URL.
    pub const ATOMA_BASE_URL: &'static str = "https://api.atoma.network/v1";
    /// Default Atoma model.
    pub const ATOMA_MODEL: &'static str = "meta-llama/Llama-3.3-70B-Instruct";
    /// OpenAI API base URL.
    pub const OPENAI_BASE_URL: &'static str = "https://api.openai.com/v1";
    /// Default OpenAI model.
    pub const OPENAI_MODEL: &'static str = "gpt-4o-mini";

    /// Creates an Atoma configuration with the given API key.
    #[must_use]
    pub fn atoma(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: Self::ATOMA_BASE_URL.to_owned(),
            model: Self::ATOMA_MODEL.to_owned(),
            label: "atoma",
            json_mode: false,
            timeout_secs: Some(60),
        }
    }

    /// Creates an OpenAI configuration with the given API key.
    #[must_use]
    pub fn openai(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: Self::OPENAI_BASE_URL.to_owned(),
            model: Self::OPENAI_MODEL.to_owned(),
            label: "openai",
            json_mode: true,
            timeout_secs: Some(60),
        }
    }

    /// Creates an Atoma configuration from environment variables.
    ///
    /// Reads from:
    /// - `ATOMA_API_KEY` - Required API key
    /// - `ATOMA_BASE_URL` - Optional base URL
    /// - `ATOMA_MODEL` - Optional default model
    ///
    /// # Errors
    ///
    /// Returns an authentication error when `ATOMA_API_KEY` is not set.
    pub fn from_env() -> Result<Self, LlmError> {
        let api_key = std::env::var("ATOMA_API_KEY")
            .map_err(|_| LlmError::auth("atoma", "ATOMA_API_KEY environment variable not set"))?;

        let mut config = Self::atoma(api_key);
        if let Ok(base_url) = std::env::var("ATOMA_BASE_URL") {
            config.base_url = base_url;
        }
        if let Ok(model) = std::env::var("ATOMA_MODEL") {
            config.model = model;
        }
        Ok(config)
    }

    /// Sets the base URL.
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the default model.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Enables or disables JSON mode.
    #[must_use]
    pub const fn with_json_mode(mut self, json_mode: bool) -> Self {
        self.json_mode = json_mode;
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }
}
