//! Second LLM pass: raw tool output into a user-facing [`AgentResponse`].

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::chat::LlmBackend;
use crate::intent::{extract_json, single_object};
use crate::prompts::{PromptTemplates, final_answer_user_message};
use crate::response::{AgentResponse, Status};

/// Longest reasoning kept, in characters.
pub const MAX_REASONING_CHARS: usize = 50;

/// Name prefixes the model sometimes puts in front of its answer.
const PERSONA_PREFIXES: &[&str] = &["Midas Rex:", "Midas:", "Aegir:"];

/// The object the formatter prompt asks for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct AnswerPayload {
    /// Why the answer looks the way it does, under 50 characters.
    #[serde(default)]
    pub reasoning: String,
    /// The answer shown to the user.
    pub response: String,
    /// `success` or `failure`.
    #[serde(default)]
    pub status: Status,
    /// The user's query, echoed back.
    #[serde(default)]
    pub query: String,
    /// Error messages, empty on success.
    #[serde(default)]
    pub errors: Vec<String>,
}

/// Outcome of parsing formatter text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedAnswer {
    /// Well-formed answer.
    Ok(AnswerPayload),
    /// The text could not be read as an answer.
    ParseFailure(String),
}

/// Parse formatter text into an [`AnswerPayload`].
///
/// Same envelope rules as classifier output. An empty `response` counts as
/// malformed.
#[must_use]
pub fn parse_answer(text: &str) -> ParsedAnswer {
    let parsed = extract_json(text)
        .and_then(single_object)
        .and_then(|map| {
            serde_json::from_value::<AnswerPayload>(map.into())
                .map_err(|err| format!("invalid answer object: {err}"))
        })
        .and_then(|payload| {
            if payload.response.trim().is_empty() {
                Err("empty response".to_owned())
            } else {
                Ok(payload)
            }
        });

    match parsed {
        Ok(payload) => ParsedAnswer::Ok(payload),
        Err(reason) => ParsedAnswer::ParseFailure(reason),
    }
}

/// Remove a leading persona name such as `Aegir:`.
fn strip_persona(text: &str) -> &str {
    let trimmed = text.trim_start();
    PERSONA_PREFIXES
        .iter()
        .find_map(|prefix| {
            let head = trimmed.get(..prefix.len())?;
            head.eq_ignore_ascii_case(prefix)
                .then(|| trimmed[prefix.len()..].trim_start())
        })
        .unwrap_or(trimmed)
}

fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_owned(),
        None => text.to_owned(),
    }
}

/// Formats tool output through the LLM backend.
#[derive(Debug, Clone)]
pub struct ResponseFormatter {
    backend: LlmBackend,
    system_prompt: String,
}

impl ResponseFormatter {
    /// Create a formatter with the default prompt templates.
    #[must_use]
    pub fn new(backend: LlmBackend) -> Self {
        Self::with_prompts(backend, &PromptTemplates::default())
    }

    /// Create a formatter with custom prompt templates.
    #[must_use]
    pub fn with_prompts(backend: LlmBackend, templates: &PromptTemplates) -> Self {
        Self {
            backend,
            system_prompt: templates.render_final_answer::<AnswerPayload>(),
        }
    }

    /// The rendered system prompt.
    #[must_use]
    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// Turn `raw_result` into the answer for `query`.
    ///
    /// Never fails. Upstream errors, timeouts and malformed output fall back
    /// to the raw result passed through as a successful answer.
    pub async fn format(&self, query: &str, raw_result: &str) -> AgentResponse {
        let user = final_answer_user_message(query, raw_result);
        let text = match self.backend.complete_json(&self.system_prompt, &user).await {
            Ok(text) => text,
            Err(err) => {
                warn!(error = %err, "formatter call failed, passing raw result through");
                return AgentResponse::fallback(query, raw_result);
            }
        };

        match parse_answer(&text) {
            ParsedAnswer::Ok(payload) => {
                debug!(status = payload.status.as_str(), "answer formatted");
                Self::finish(query, payload)
            }
            ParsedAnswer::ParseFailure(reason) => {
                warn!(%reason, "unparseable formatter output, passing raw result through");
                AgentResponse::fallback(query, raw_result)
            }
        }
    }

    fn finish(query: &str, payload: AnswerPayload) -> AgentResponse {
        let mut response = AgentResponse::success(
            query,
            strip_persona(&payload.response),
            truncate_chars(payload.reasoning.trim(), MAX_REASONING_CHARS),
        );
        response.status = payload.status;
        response.errors = payload.errors;
        response.into_well_formed()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use crate::error::LlmError;
    use crate::llms::MockProvider;
    use crate::response::DIRECT_REASONING;

    fn formatter(provider: MockProvider) -> ResponseFormatter {
        ResponseFormatter::new(LlmBackend::new(Arc::new(provider)))
    }

    mod parse {
        use super::*;

        #[test]
        fn accepts_singleton_array() {
            let text = r#"[{"reasoning":"r","response":"SUI is $3.50","status":"success","query":"q","errors":[]}]"#;
            let ParsedAnswer::Ok(payload) = parse_answer(text) else {
                panic!("expected a parsed answer");
            };
            assert_eq!(payload.response, "SUI is $3.50");
            assert_eq!(payload.status, Status::Success);
        }

        #[test]
        fn rejects_unknown_status() {
            let text = r#"{"response":"x","status":"maybe"}"#;
            assert!(matches!(parse_answer(text), ParsedAnswer::ParseFailure(_)));
        }

        #[test]
        fn rejects_empty_response() {
            let text = r#"{"response":"  ","status":"success"}"#;
            assert_eq!(
                parse_answer(text),
                ParsedAnswer::ParseFailure("empty response".to_owned())
            );
        }

        #[test]
        fn rejects_multi_element_array() {
            let text = r#"[{"response":"a"},{"response":"b"}]"#;
            assert!(matches!(parse_answer(text), ParsedAnswer::ParseFailure(_)));
        }
    }

    mod cleanup {
        use super::*;

        #[test]
        fn strips_persona_prefixes() {
            assert_eq!(strip_persona("Midas Rex: hi"), "hi");
            assert_eq!(strip_persona("aegir:  hi"), "hi");
            assert_eq!(strip_persona("Midas said hi"), "Midas said hi");
        }

        #[test]
        fn truncates_on_char_boundary() {
            let long = "é".repeat(80);
            assert_eq!(truncate_chars(&long, MAX_REASONING_CHARS).chars().count(), 50);
            assert_eq!(truncate_chars("short", MAX_REASONING_CHARS), "short");
        }
    }

    mod format {
        use super::*;

        #[tokio::test]
        async fn cleans_model_output() {
            let provider = MockProvider::new([r#"```json
[{"reasoning":"The user asked for the SUI price and the tool returned it","response":"Aegir: SUI trades at $3.50.","status":"success","query":"something else","errors":[]}]
```"#]);
            let answer = formatter(provider).format("price of sui", "{\"usd\":3.5}").await;

            assert_eq!(answer.response, "SUI trades at $3.50.");
            assert_eq!(answer.query, "price of sui");
            assert!(answer.reasoning.chars().count() <= MAX_REASONING_CHARS);
            assert!(answer.is_well_formed());
        }

        #[tokio::test]
        async fn failure_without_errors_is_repaired() {
            let provider = MockProvider::new([r#"{"response":"Could not do it","status":"failure"}"#]);
            let answer = formatter(provider).format("q", "raw").await;

            assert_eq!(answer.status, Status::Failure);
            assert!(!answer.errors.is_empty());
        }

        #[tokio::test]
        async fn garbage_falls_back_to_raw() {
            let answer = formatter(MockProvider::new(["Sure! Here you go."]))
                .format("q", "raw tool text")
                .await;

            assert_eq!(answer.response, "raw tool text");
            assert_eq!(answer.reasoning, DIRECT_REASONING);
            assert_eq!(answer.status, Status::Success);
            assert!(answer.errors.is_empty());
        }

        #[tokio::test]
        async fn upstream_error_falls_back_to_raw() {
            let provider = MockProvider::from_results([Err(LlmError::network("reset"))]);
            let answer = formatter(provider).format("q", "raw").await;
            assert_eq!(answer.response, "raw");
            assert!(answer.is_success());
        }

        #[tokio::test]
        async fn timeout_falls_back_to_raw() {
            let provider = MockProvider::new(["{}"]).with_delay(Duration::from_millis(200));
            let backend = LlmBackend::new(Arc::new(provider))
                .with_timeout(Duration::from_millis(10));
            let answer = ResponseFormatter::new(backend).format("q", "raw").await;
            assert_eq!(answer.response, "raw");
        }
    }
}
