//! HTTP client for OpenAI-compatible chat completion endpoints.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;

use crate::chat::{ChatRequest, ResponseFormat};
use crate::error::LlmError;

use super::config::OpenAIConfig;
use super::types::{OpenAIChatRequest, OpenAIErrorResponse, OpenAIMessage, OpenAIResponseFormat};

/// Client for an OpenAI-compatible API such as Atoma.
#[derive(Debug, Clone)]
pub struct OpenAI {
    pub(crate) config: Arc<OpenAIConfig>,
    pub(crate) client: Client,
}

impl OpenAI {
    /// Create a new client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an authentication error for an empty API key, or an internal
    /// error if the HTTP client cannot be built.
    pub fn new(config: OpenAIConfig) -> Result<Self, LlmError> {
        if config.api_key.is_empty() {
            return Err(LlmError::auth(config.label, "API key is required"));
        }

        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(timeout));
        }

        let client = builder
            .build()
            .map_err(|e| LlmError::internal(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            config: Arc::new(config),
            client,
        })
    }

    /// Create an Atoma client from environment variables.
    ///
    /// # Errors
    ///
    /// See [`OpenAIConfig::from_env`] and [`OpenAI::new`].
    pub fn from_env() -> Result<Self, LlmError> {
        Self::new(OpenAIConfig::from_env()?)
    }

    /// Get the base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Get the default model.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.config.model
    }

    pub(crate) fn chat_url(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }

    pub(crate) fn build_request(&self, url: &str) -> reqwest::RequestBuilder {
        self.client
            .post(url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("Content-Type", "application/json")
    }

    pub(crate) fn build_body(&self, request: &ChatRequest) -> OpenAIChatRequest {
        let model = if request.model.is_empty() {
            self.config.model.clone()
        } else {
            request.model.clone()
        };

        let response_format = request.response_format.and_then(|format| match format {
            ResponseFormat::JsonObject if self.config.json_mode => {
                Some(OpenAIResponseFormat::JsonObject)
            }
            ResponseFormat::JsonObject => None,
            ResponseFormat::Text => Some(OpenAIResponseFormat::Text),
        });

        OpenAIChatRequest {
            model,
            messages: request
                .messages
                .iter()
                .map(|m| OpenAIMessage {
                    role: m.role.as_str().to_owned(),
                    content: m.content.clone(),
                })
                .collect(),
            temperature: request.temperature,
            response_format,
            stream: false,
        }
    }

    pub(crate) fn parse_error(&self, status: u16, body: &str) -> LlmError {
        let label = self.config.label;
        if let Ok(error_response) = serde_json::from_str::<OpenAIErrorResponse>(body) {
            let error = error_response.error;
            let code = error
                .code
                .map(|c| match c {
                    serde_json::Value::String(s) => s,
                    other => other.to_string(),
                })
                .or(error.error_type)
                .unwrap_or_else(|| status.to_string());

            return match status {
                400 => LlmError::invalid_request(label, error.message),
                401 | 403 => LlmError::auth(label, error.message),
                429 => LlmError::rate_limited(label),
                _ => LlmError::provider_code(label, code, error.message),
            };
        }

        match status {
            400 => LlmError::invalid_request(label, body.to_owned()),
            401 | 403 => LlmError::auth(label, body.to_owned()),
            429 => LlmError::rate_limited(label),
            _ => LlmError::http_status(status, body.to_owned()).with_provider(label),
        }
    }
}
