//! Chat types, traits, and the shared LLM backend handle.
//!
//! This module provides:
//! - [`ChatRequest`]: Request parameters for chat completions
//! - [`ChatResponse`]: Response from chat completions
//! - [`ChatProvider`]: Core trait for LLM providers
//! - [`LlmBackend`]: The long-lived provider + model + deadline bundle that
//!   the intent classifier and the response formatter share
//!
//! # Example
//!
//! ```rust,ignore
//! use aegir::prelude::*;
//!
//! let request = ChatRequest::new("meta-llama/Llama-3.3-70B-Instruct")
//!     .system("You are helpful.")
//!     .user("Hello!")
//!     .temperature(0.2);
//!
//! let response = provider.chat(&request).await?;
//! println!("{}", response.text().unwrap_or_default());
//! ```

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::LlmError;

/// Role of a chat message author.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System instructions.
    System,
    /// End-user input.
    User,
    /// Model output.
    Assistant,
}

impl Role {
    /// Returns the wire name of the role.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// A single text chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Author role.
    pub role: Role,
    /// Text content.
    pub content: String,
}

impl Message {
    /// Create a system message.
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    /// Create a user message.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Create an assistant message.
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Response format requested from the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseFormat {
    /// Plain text response.
    #[default]
    Text,
    /// JSON object response.
    JsonObject,
}

/// A chat completion request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Model identifier. Empty means the provider default.
    pub model: String,
    /// Conversation messages.
    pub messages: Vec<Message>,
    /// Sampling temperature.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Requested output format.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ResponseFormat>,
}

impl ChatRequest {
    /// Creates a new request for the given model.
    #[must_use]
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Self::default()
        }
    }

    /// Appends a system message.
    #[must_use]
    pub fn system(mut self, content: impl Into<String>) -> Self {
        self.messages.push(Message::system(content));
        self
    }

    /// Appends a user message.
    #[must_use]
    pub fn user(mut self, content: impl Into<String>) -> Self {
        self.messages.push(Message::user(content));
        self
    }

    /// Sets the sampling temperature.
    #[must_use]
    pub const fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Sets the response format.
    #[must_use]
    pub const fn response_format(mut self, format: ResponseFormat) -> Self {
        self.response_format = Some(format);
        self
    }
}

/// A chat completion response from an LLM.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatResponse {
    /// The generated message, if the provider returned one.
    pub message: Option<Message>,
    /// Model identifier used for this response.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Unique completion ID.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl ChatResponse {
    /// Creates a response from text content.
    #[must_use]
    pub fn from_text(content: impl Into<String>) -> Self {
        Self {
            message: Some(Message::assistant(content)),
            model: None,
            id: None,
        }
    }

    /// Sets the model identifier.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Sets the completion ID.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Returns the text content of the response.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.message.as_ref().map(|m| m.content.as_str())
    }
}

/// Trait for providers that support chat completions.
#[async_trait]
pub trait ChatProvider: Send + Sync + fmt::Debug {
    /// Send a chat completion request and receive a complete response.
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, LlmError>;

    /// Get the name of this provider.
    ///
    /// Used for error messages and logging.
    fn provider_name(&self) -> &'static str;

    /// Get the default model for this provider.
    fn default_model(&self) -> &str;

    /// Check if this provider honours [`ResponseFormat::JsonObject`].
    fn supports_json_mode(&self) -> bool {
        false
    }
}

/// Extension trait for `ChatProvider` with convenience methods.
#[async_trait]
pub trait ChatProviderExt: ChatProvider {
    /// Send a system prompt and a user prompt to `model` and return the text.
    ///
    /// An empty `model` selects the provider default. A response without text
    /// content yields an empty string; callers treat that as malformed output.
    async fn complete(&self, system: &str, user: &str, model: &str) -> Result<String, LlmError> {
        let model = if model.is_empty() {
            self.default_model()
        } else {
            model
        };
        let request = ChatRequest::new(model).system(system).user(user);
        let response = self.chat(&request).await?;
        Ok(response.text().unwrap_or_default().to_owned())
    }
}

impl<T: ChatProvider + ?Sized> ChatProviderExt for T {}

/// Type alias for an Arc-wrapped `ChatProvider`.
pub type SharedChatProvider = Arc<dyn ChatProvider>;

/// The single long-lived handle to the LLM backend.
///
/// Bundles the provider with the model identifier, sampling settings and the
/// per-call deadline. Cloning is cheap; the classifier and the formatter hold
/// clones of the same backend.
#[derive(Clone)]
pub struct LlmBackend {
    provider: SharedChatProvider,
    model: String,
    temperature: Option<f32>,
    timeout: Option<Duration>,
}

impl LlmBackend {
    /// Create a backend using the provider's default model and no deadline.
    #[must_use]
    pub fn new(provider: SharedChatProvider) -> Self {
        let model = provider.default_model().to_owned();
        Self {
            provider,
            model,
            temperature: None,
            timeout: None,
        }
    }

    /// Override the model identifier.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the sampling temperature.
    #[must_use]
    pub const fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the per-call deadline.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// The model identifier sent with every request.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// The provider name, for logs.
    #[must_use]
    pub fn provider_name(&self) -> &'static str {
        self.provider.provider_name()
    }

    /// Run one completion, asking for JSON when the provider supports it.
    ///
    /// # Errors
    ///
    /// Returns the provider's [`LlmError`], or an [`LlmErrorKind::Timeout`]
    /// error when the deadline elapses.
    ///
    /// [`LlmErrorKind::Timeout`]: crate::error::LlmErrorKind::Timeout
    pub async fn complete_json(&self, system: &str, user: &str) -> Result<String, LlmError> {
        let mut request = ChatRequest::new(&self.model).system(system).user(user);
        if let Some(temperature) = self.temperature {
            request = request.temperature(temperature);
        }
        if self.provider.supports_json_mode() {
            request = request.response_format(ResponseFormat::JsonObject);
        }

        debug!(
            provider = self.provider.provider_name(),
            model = %self.model,
            "sending completion request"
        );

        let call = self.provider.chat(&request);
        let response = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .map_err(|_| LlmError::timeout(limit))??,
            None => call.await?,
        };

        Ok(response.text().unwrap_or_default().to_owned())
    }
}

impl fmt::Debug for LlmBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmBackend")
            .field("provider", &self.provider.provider_name())
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::llms::MockProvider;

    mod chat_request {
        use super::*;

        #[test]
        fn builder_appends_messages_in_order() {
            let req = ChatRequest::new("m").system("sys").user("hi");
            assert_eq!(req.model, "m");
            assert_eq!(req.messages.len(), 2);
            assert_eq!(req.messages[0].role, Role::System);
            assert_eq!(req.messages[1].role, Role::User);
        }

        #[test]
        fn optional_fields_are_skipped() {
            let json = serde_json::to_value(ChatRequest::new("m").user("x")).unwrap();
            assert!(json.get("temperature").is_none());
            assert!(json.get("response_format").is_none());
        }
    }

    mod backend {
        use super::*;

        #[tokio::test]
        async fn complete_json_returns_text() {
            let provider = Arc::new(MockProvider::new(["{\"ok\":true}"]));
            let backend = LlmBackend::new(provider.clone()).with_model("test-model");

            let text = backend.complete_json("sys", "user").await.unwrap();
            assert_eq!(text, "{\"ok\":true}");

            let seen = provider.requests();
            assert_eq!(seen.len(), 1);
            assert_eq!(seen[0].model, "test-model");
        }

        #[tokio::test]
        async fn complete_json_times_out() {
            let provider =
                Arc::new(MockProvider::new(["late"]).with_delay(Duration::from_millis(200)));
            let backend =
                LlmBackend::new(provider).with_timeout(Duration::from_millis(10));

            let err = backend.complete_json("sys", "user").await.unwrap_err();
            assert_eq!(err.kind, crate::error::LlmErrorKind::Timeout);
            assert!(err.message.contains("10ms"), "{}", err.message);
        }

        #[tokio::test]
        async fn ext_complete_uses_default_model() {
            let provider = MockProvider::new(["hello"]);
            let text = provider.complete("sys", "user", "").await.unwrap();
            assert_eq!(text, "hello");
            assert_eq!(provider.requests()[0].model, provider.default_model());
        }
    }
}
