//! Intent classification.
//!
//! A query becomes an [`IntentResult`] (the wire shape the LLM is asked to
//! produce), which [`IntentResult::resolve`] collapses into exactly one
//! [`Intent`] branch:
//!
//! ```text
//! needs_additional_info  >  selected_tool  >  response
//! ```

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

mod classifier;
mod parse;
pub mod patterns;

pub use classifier::IntentClassifier;
pub use parse::{ParsedIntent, parse_intent};
pub(crate) use parse::{extract_json, single_object};

/// Fixed reply to greetings.
pub const GREETING_RESPONSE: &str = "Hello! I'm your Sui blockchain assistant. I can check wallet \
balances, look up token prices, estimate gas and prepare SUI transfers. What would you like to do?";

/// Fixed reply to off-topic questions.
pub const OFF_TOPIC_RESPONSE: &str = "I'm a Sui blockchain assistant. I can help you with \
Sui-related tasks like checking prices, making transfers, or getting blockchain information. \
What would you like to know about Sui?";

/// Reply when the classifier output could not be understood.
pub const CLARIFICATION_RESPONSE: &str = "I'm not sure what you'd like me to do. Could you \
rephrase your request? For example: \"price of SUI\", \"check my wallet\" or \
\"send 1 sui to 0x...\".";

/// Structured classification of a query.
///
/// Field names on the wire match what the classifier prompt asks for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct IntentResult {
    /// Whether classification itself succeeded.
    #[serde(default = "default_success")]
    pub success: bool,
    /// Name of the tool to run, or null when no tool applies.
    #[serde(default)]
    pub selected_tool: Option<String>,
    /// Text answer returned without running a tool.
    #[serde(default, rename = "response")]
    pub direct_response: Option<String>,
    /// Whether the user must supply more information first.
    #[serde(default)]
    pub needs_additional_info: bool,
    /// Names of the missing fields.
    #[serde(default)]
    pub additional_info_required: Option<Vec<String>>,
    /// Positional arguments for the selected tool, as strings.
    #[serde(default)]
    pub tool_arguments: Option<Vec<String>>,
}

const fn default_success() -> bool {
    true
}

impl Default for IntentResult {
    fn default() -> Self {
        Self {
            success: true,
            selected_tool: None,
            direct_response: None,
            needs_additional_info: false,
            additional_info_required: None,
            tool_arguments: None,
        }
    }
}

impl IntentResult {
    /// A direct text answer.
    #[must_use]
    pub fn direct(response: impl Into<String>) -> Self {
        Self {
            direct_response: Some(response.into()),
            ..Self::default()
        }
    }

    /// A tool invocation.
    #[must_use]
    pub fn tool(name: impl Into<String>, arguments: Vec<String>) -> Self {
        Self {
            selected_tool: Some(name.into()),
            tool_arguments: Some(arguments),
            ..Self::default()
        }
    }

    /// A request for the listed missing fields.
    #[must_use]
    pub fn needs_info(missing: Vec<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            direct_response: Some(message.into()),
            needs_additional_info: true,
            additional_info_required: Some(missing),
            ..Self::default()
        }
    }

    /// The recovered result used when the classifier output is unusable.
    #[must_use]
    pub fn clarification() -> Self {
        Self::direct(CLARIFICATION_RESPONSE)
    }

    /// Collapse into a single intent branch.
    ///
    /// Missing-information requests win over tool selection, and tool
    /// selection wins over a direct answer. A result with none of the three
    /// becomes a clarification request.
    #[must_use]
    pub fn resolve(self) -> Intent {
        if self.needs_additional_info {
            return Intent::NeedsInfo {
                missing: self.additional_info_required.unwrap_or_default(),
                message: self.direct_response.filter(|m| !m.trim().is_empty()),
            };
        }

        if let Some(name) = self.selected_tool.filter(|n| !n.trim().is_empty()) {
            return Intent::Tool {
                name,
                arguments: self.tool_arguments.unwrap_or_default(),
            };
        }

        match self.direct_response.filter(|r| !r.trim().is_empty()) {
            Some(text) => Intent::Direct(text),
            None => Intent::Direct(CLARIFICATION_RESPONSE.to_owned()),
        }
    }
}

/// What the agent should do with a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// Answer with this text; no tool, no formatting pass.
    Direct(String),
    /// Ask the user for the missing fields.
    NeedsInfo {
        /// Missing field names.
        missing: Vec<String>,
        /// Classifier's own wording, if it gave one.
        message: Option<String>,
    },
    /// Run a tool.
    Tool {
        /// Tool name as selected.
        name: String,
        /// Positional arguments.
        arguments: Vec<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    mod resolve {
        use super::*;

        #[test]
        fn tool_wins_over_direct_response() {
            let result = IntentResult {
                selected_tool: Some("price".into()),
                direct_response: Some("Let me check".into()),
                tool_arguments: Some(vec!["SUI".into()]),
                ..IntentResult::default()
            };
            assert_eq!(
                result.resolve(),
                Intent::Tool {
                    name: "price".into(),
                    arguments: vec!["SUI".into()],
                }
            );
        }

        #[test]
        fn needs_info_wins_over_tool() {
            let result = IntentResult {
                selected_tool: Some("transfer".into()),
                needs_additional_info: true,
                additional_info_required: Some(vec!["recipient_address".into()]),
                ..IntentResult::default()
            };
            assert!(matches!(result.resolve(), Intent::NeedsInfo { ref missing, .. } if missing == &["recipient_address"]));
        }

        #[test]
        fn blank_tool_name_is_ignored() {
            let result = IntentResult {
                selected_tool: Some("  ".into()),
                direct_response: Some("hi".into()),
                ..IntentResult::default()
            };
            assert_eq!(result.resolve(), Intent::Direct("hi".into()));
        }

        #[test]
        fn empty_result_asks_for_clarification() {
            assert_eq!(
                IntentResult::default().resolve(),
                Intent::Direct(CLARIFICATION_RESPONSE.into())
            );
        }

        #[test]
        fn tool_without_arguments_resolves_to_empty_list() {
            let result = IntentResult {
                selected_tool: Some("balance".into()),
                ..IntentResult::default()
            };
            assert_eq!(
                result.resolve(),
                Intent::Tool {
                    name: "balance".into(),
                    arguments: vec![],
                }
            );
        }
    }

    #[test]
    fn wire_names() {
        let json = serde_json::to_value(IntentResult::direct("hello")).unwrap_or_default();
        assert_eq!(json["response"], "hello");
        assert_eq!(json["success"], true);
        assert!(json.get("direct_response").is_none());
    }
}
