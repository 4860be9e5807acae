//! System prompts for the classifier and formatter passes.
//!
//! Templates use `{{tools}}`, `{{schema}}` and `{{custom_instructions}}`
//! placeholders. Payload schemas are generated from the Rust types with
//! `schemars`, so the prompt and the parser cannot drift apart.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::tool::{CONNECTED_WALLET, ToolDefinition};

/// Default classifier system prompt.
pub const INTENT_SYSTEM_PROMPT: &str = r#"You are the intent classifier of a Sui blockchain assistant.
Decide what the user wants and reply with ONLY a JSON array holding one object:
[{
    "success": boolean,
    "selected_tool": string | null,
    "response": string | null,
    "needs_additional_info": boolean,
    "additional_info_required": string[] | null,
    "tool_arguments": string[] | null
}]

JSON schema of the object:
{{schema}}

Available tools (arguments are positional, in the listed order):
{{tools}}

Rules:
- Amounts for transfer and estimate_gas are in MIST: 1 SUI = 1000000000 MIST.
  "transfer 2 sui to 0xabc..." -> selected_tool "transfer", tool_arguments ["2000000000", "0xabc..."]
- Only SUI can be transferred. Never invent or correct an address.
- If a transfer lacks the recipient, set needs_additional_info to true,
  additional_info_required to ["recipient_address"] and ask for it in "response".
  If it lacks the amount, use ["amount"].
- For the user's own wallet ("check my wallet", "show my balance") select "balance"
  with tool_arguments ["{{connected_wallet}}"].
- Questions you can answer without live data get a short "response" and no tool.
- Off-topic questions get a short reminder that you only help with Sui.
{{custom_instructions}}"#;

/// Default formatter system prompt.
pub const FINAL_ANSWER_SYSTEM_PROMPT: &str = r#"You turn raw tool output into the final answer of a Sui blockchain assistant.
Reply with ONLY a JSON array holding one object:
[{
    "reasoning": string,
    "response": string,
    "status": "success" | "failure",
    "query": string,
    "errors": string[]
}]

JSON schema of the object:
{{schema}}

Rules:
- "reasoning" stays under 50 characters.
- Do not prefix "response" with any name or persona.
- Keep responses concise, professional and friendly; one piece of information per message.
- Amounts ending in _mist are base units: divide by 1000000000 for SUI.
- If the tool output starts with "Error:", set status to "failure" and list the error in "errors".
- Do not repeat transaction status messages the wallet will show anyway.
{{custom_instructions}}"#;

/// Prompt templates for both LLM passes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptTemplates {
    /// Classifier system prompt.
    pub intent: String,
    /// Formatter system prompt.
    pub final_answer: String,
    /// Extra instructions appended to both prompts.
    #[serde(default)]
    pub custom_instructions: Option<String>,
}

impl Default for PromptTemplates {
    fn default() -> Self {
        Self {
            intent: INTENT_SYSTEM_PROMPT.to_owned(),
            final_answer: FINAL_ANSWER_SYSTEM_PROMPT.to_owned(),
            custom_instructions: None,
        }
    }
}

impl PromptTemplates {
    /// Append extra instructions to both prompts.
    #[must_use]
    pub fn with_custom_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.custom_instructions = Some(instructions.into());
        self
    }

    fn custom(&self) -> &str {
        self.custom_instructions.as_deref().unwrap_or_default()
    }

    /// Render the classifier prompt for `tools`.
    #[must_use]
    pub fn render_intent<T: JsonSchema>(&self, tools: &[&ToolDefinition]) -> String {
        let catalogue = tools
            .iter()
            .map(|t| format!("- {}", t.signature()))
            .collect::<Vec<_>>()
            .join("\n");

        self.intent
            .replace("{{tools}}", &catalogue)
            .replace("{{schema}}", &payload_schema::<T>())
            .replace("{{connected_wallet}}", CONNECTED_WALLET)
            .replace("{{custom_instructions}}", self.custom())
    }

    /// Render the formatter prompt.
    #[must_use]
    pub fn render_final_answer<T: JsonSchema>(&self) -> String {
        self.final_answer
            .replace("{{schema}}", &payload_schema::<T>())
            .replace("{{custom_instructions}}", self.custom())
    }
}

/// Pretty-printed JSON schema of `T`, without the `$schema` meta field.
#[must_use]
pub fn payload_schema<T: JsonSchema>() -> String {
    let root = schemars::schema_for!(T);
    let mut value = serde_json::to_value(&root).unwrap_or_default();
    if let Value::Object(ref mut map) = value {
        map.remove("$schema");
    }
    serde_json::to_string_pretty(&value).unwrap_or_default()
}

/// User message for the formatter pass.
#[must_use]
pub fn final_answer_user_message(query: &str, raw_result: &str) -> String {
    format!("User query:\n{query}\n\nTool output:\n{raw_result}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intent::IntentResult;
    use crate::tool::ToolRegistry;

    #[test]
    fn intent_prompt_lists_tools_and_schema() {
        let registry = ToolRegistry::builtin();
        let prompt = PromptTemplates::default().render_intent::<IntentResult>(&registry.list());

        assert!(prompt.contains("- transfer(amount: string, recipient: string)"));
        assert!(prompt.contains("- estimate_gas("));
        assert!(prompt.contains("\"needs_additional_info\""));
        assert!(prompt.contains(CONNECTED_WALLET));
        assert!(!prompt.contains("{{"));
    }

    #[test]
    fn custom_instructions_are_appended() {
        let templates = PromptTemplates::default().with_custom_instructions("Answer in French.");
        let prompt = templates.render_final_answer::<IntentResult>();
        assert!(prompt.trim_end().ends_with("Answer in French."));
    }

    #[test]
    fn schema_has_no_meta_field() {
        let schema = payload_schema::<IntentResult>();
        assert!(!schema.contains("$schema"));
        assert!(schema.contains("selected_tool"));
    }
}
