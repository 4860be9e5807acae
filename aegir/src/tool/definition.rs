//! Tool definition types.
//!
//! Definitions describe a tool's interface to the intent classifier: the
//! name it must select and the positional arguments it must supply.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A tool parameter definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolParam {
    /// Parameter name.
    pub name: String,
    /// Parameter type (e.g., "string", "number").
    pub r#type: String,
    /// Parameter description.
    pub description: String,
    /// Whether this parameter is required.
    pub required: bool,
}

/// A tool definition that describes a tool's interface for the LLM.
///
/// Parameters are positional: the classifier returns `tool_arguments` in the
/// order they are declared here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Tool name (snake_case, e.g., "estimate_gas").
    pub name: String,
    /// Tool description for the LLM.
    pub description: String,
    /// Tool parameters, in positional order.
    pub parameters: Vec<ToolParam>,
}

impl ToolDefinition {
    /// Create a new tool definition.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: Vec::new(),
        }
    }

    /// Add a required parameter.
    #[must_use]
    pub fn param(
        mut self,
        name: impl Into<String>,
        r#type: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        self.parameters.push(ToolParam {
            name: name.into(),
            r#type: r#type.into(),
            description: description.into(),
            required: true,
        });
        self
    }

    /// Number of required parameters.
    #[must_use]
    pub fn required_count(&self) -> usize {
        self.parameters.iter().filter(|p| p.required).count()
    }

    /// Names of the required parameters, in order.
    #[must_use]
    pub fn required_names(&self) -> Vec<&str> {
        self.parameters
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name.as_str())
            .collect()
    }

    /// One catalogue line for the classifier prompt, e.g.
    /// `transfer(amount: string, recipient: string) - Prepare a SUI transfer`.
    #[must_use]
    pub fn signature(&self) -> String {
        let params = self
            .parameters
            .iter()
            .map(|p| {
                let opt = if p.required { "" } else { "?" };
                format!("{}{opt}: {}", p.name, p.r#type)
            })
            .collect::<Vec<_>>()
            .join(", ");
        format!("{}({params}) - {}", self.name, self.description)
    }

    /// Convert to JSON schema format (OpenAI compatible).
    #[must_use]
    pub fn to_json_schema(&self) -> Value {
        let properties: serde_json::Map<String, Value> = self
            .parameters
            .iter()
            .map(|p| {
                (
                    p.name.clone(),
                    serde_json::json!({
                        "type": p.r#type,
                        "description": p.description
                    }),
                )
            })
            .collect();

        serde_json::json!({
            "type": "object",
            "properties": properties,
            "required": self.required_names()
        })
    }
}
