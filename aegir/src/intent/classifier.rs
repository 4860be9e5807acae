//! Query classifier: fixed short-circuits, deterministic patterns, then LLM.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use super::parse::{ParsedIntent, parse_intent};
use super::{GREETING_RESPONSE, IntentResult, OFF_TOPIC_RESPONSE, patterns};
use crate::chat::LlmBackend;
use crate::error::LlmError;
use crate::prompts::PromptTemplates;
use crate::tool::ToolRegistry;

/// Turns free text into an [`IntentResult`].
///
/// The system prompt is rendered once at construction; the registry is
/// immutable afterwards.
pub struct IntentClassifier {
    backend: LlmBackend,
    registry: Arc<ToolRegistry>,
    system_prompt: String,
}

impl IntentClassifier {
    /// Create a classifier with the default prompt templates.
    #[must_use]
    pub fn new(backend: LlmBackend, registry: Arc<ToolRegistry>) -> Self {
        Self::with_prompts(backend, registry, &PromptTemplates::default())
    }

    /// Create a classifier with custom prompt templates.
    #[must_use]
    pub fn with_prompts(
        backend: LlmBackend,
        registry: Arc<ToolRegistry>,
        templates: &PromptTemplates,
    ) -> Self {
        let system_prompt = templates.render_intent::<IntentResult>(&registry.list());
        Self {
            backend,
            registry,
            system_prompt,
        }
    }

    /// The rendered system prompt.
    #[must_use]
    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// The registry whose catalogue the prompt advertises.
    #[must_use]
    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Classify a query.
    ///
    /// Greetings, off-topic questions and pattern matches never reach the
    /// LLM. Unparseable LLM output is recovered as a clarification request.
    ///
    /// # Errors
    ///
    /// Returns the backend's [`LlmError`] on transport failure or timeout.
    pub async fn classify(&self, query: &str) -> Result<IntentResult, LlmError> {
        if patterns::is_greeting(query) {
            debug!(source = "greeting", "intent short-circuited");
            return Ok(IntentResult::direct(GREETING_RESPONSE));
        }

        if patterns::is_off_topic(query) {
            debug!(source = "off_topic", "intent short-circuited");
            return Ok(IntentResult::direct(OFF_TOPIC_RESPONSE));
        }

        if let Some(intent) = patterns::extract(query) {
            debug!(
                source = "pattern",
                tool = intent.selected_tool.as_deref().unwrap_or("none"),
                "intent extracted"
            );
            return Ok(intent);
        }

        let text = self.backend.complete_json(&self.system_prompt, query).await?;

        match parse_intent(&text) {
            ParsedIntent::Ok(intent) => {
                debug!(
                    source = "llm",
                    tool = intent.selected_tool.as_deref().unwrap_or("none"),
                    needs_info = intent.needs_additional_info,
                    "intent classified"
                );
                Ok(intent)
            }
            ParsedIntent::ParseFailure(reason) => {
                warn!(%reason, "unparseable classifier output, asking for clarification");
                Ok(IntentResult::clarification())
            }
        }
    }
}

impl fmt::Debug for IntentClassifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntentClassifier")
            .field("backend", &self.backend)
            .field("tools", &self.registry.len())
            .finish_non_exhaustive()
    }
}
