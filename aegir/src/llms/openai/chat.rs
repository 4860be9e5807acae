//! [`ChatProvider`] implementation for OpenAI-compatible endpoints.

use async_trait::async_trait;
use tracing::debug;

use crate::chat::{ChatProvider, ChatRequest, ChatResponse};
use crate::error::LlmError;

use super::client::OpenAI;
use super::types::OpenAIChatResponse;

impl OpenAI {
    /// Convert a wire response into a [`ChatResponse`].
    pub(crate) fn parse_response(
        &self,
        response: OpenAIChatResponse,
    ) -> Result<ChatResponse, LlmError> {
        let choice = response.choices.into_iter().next().ok_or_else(|| {
            LlmError::response_format("at least one choice", "empty choices")
                .with_provider(self.config.label)
        })?;

        let text = match (choice.message.content, choice.message.refusal) {
            (Some(content), _) => content,
            (None, Some(refusal)) => {
                return Err(LlmError::provider(
                    self.config.label,
                    format!("model refused: {refusal}"),
                ));
            }
            (None, None) => String::new(),
        };

        let mut out = ChatResponse::from_text(text);
        if let Some(model) = response.model {
            out = out.with_model(model);
        }
        if let Some(id) = response.id {
            out = out.with_id(id);
        }
        Ok(out)
    }
}

#[async_trait]
impl ChatProvider for OpenAI {
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, LlmError> {
        let url = self.chat_url();
        let body = self.build_body(request);
        debug!(provider = self.config.label, model = %body.model, "POST chat/completions");

        let response = self
            .build_request(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::from(e).with_provider(self.config.label))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(self.parse_error(status.as_u16(), &error_text));
        }

        let response_text = response
            .text()
            .await
            .map_err(|e| LlmError::from(e).with_provider(self.config.label))?;
        let parsed: OpenAIChatResponse = serde_json::from_str(&response_text).map_err(|e| {
            LlmError::response_format(
                "valid chat completion response",
                format!("parse error: {e}, response: {response_text}"),
            )
            .with_provider(self.config.label)
        })?;

        self.parse_response(parsed)
    }

    fn provider_name(&self) -> &'static str {
        self.config.label
    }

    fn default_model(&self) -> &str {
        &self.config.model
    }

    fn supports_json_mode(&self) -> bool {
        self.config.json_mode
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::error::LlmErrorKind;
    use crate::llms::OpenAIConfig;

    async fn provider(server: &MockServer) -> OpenAI {
        OpenAI::new(OpenAIConfig::atoma("test-key").with_base_url(format!("{}/v1", server.uri())))
            .unwrap()
    }

    #[tokio::test]
    async fn chat_returns_first_choice() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("Authorization", "Bearer test-key"))
            .and(body_partial_json(json!({"model": "m1", "stream": false})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "cmpl-1",
                "model": "m1",
                "choices": [{
                    "index": 0,
                    "message": {"role": "assistant", "content": "{\"success\":true}"},
                    "finish_reason": "stop"
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let p = provider(&server).await;
        let response = p
            .chat(&ChatRequest::new("m1").system("s").user("u"))
            .await
            .unwrap();

        assert_eq!(response.text(), Some("{\"success\":true}"));
        assert_eq!(response.id.as_deref(), Some("cmpl-1"));
    }

    #[tokio::test]
    async fn unauthorized_maps_to_auth() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": {"message": "invalid api key", "type": "invalid_request_error"}
            })))
            .mount(&server)
            .await;

        let err = provider(&server)
            .await
            .chat(&ChatRequest::new("m").user("u"))
            .await
            .unwrap_err();
        assert_eq!(err.kind, LlmErrorKind::Auth);
        assert!(err.to_string().contains("invalid api key"));
    }

    #[tokio::test]
    async fn empty_choices_is_response_format_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
            .mount(&server)
            .await;

        let err = provider(&server)
            .await
            .chat(&ChatRequest::new("m").user("u"))
            .await
            .unwrap_err();
        assert_eq!(err.kind, LlmErrorKind::ResponseFormat);
    }

    #[tokio::test]
    async fn garbage_body_is_response_format_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = provider(&server)
            .await
            .chat(&ChatRequest::new("m").user("u"))
            .await
            .unwrap_err();
        assert_eq!(err.kind, LlmErrorKind::ResponseFormat);
    }
}
