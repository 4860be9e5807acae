//! Tools the agent can run on the user's behalf.
//!
//! - [`ToolDefinition`]: name, description and positional parameters
//! - [`ToolKind`]: the closed set of built-in handlers
//! - [`ToolRegistry`]: name lookup, populated once at agent construction
//! - [`ToolExecutor`]: argument checks and dispatch

use serde::Serialize;

use crate::chain::UnsignedTransaction;

pub mod builtin;
mod definition;
mod executor;
mod kind;
mod registry;

pub use definition::{ToolDefinition, ToolParam};
pub use executor::{ToolExecutor, ToolOutcome};
pub use kind::ToolKind;
pub use registry::ToolRegistry;

/// Argument placeholder for the wallet connected by the host.
pub const CONNECTED_WALLET: &str = "CONNECTED_WALLET";

/// Output of a successful tool run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolOutput {
    /// JSON text handed to the response formatter.
    pub text: String,
    /// Unsigned transaction for the wallet to sign, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction: Option<UnsignedTransaction>,
    /// Action tag, e.g. `"transfer"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
}

impl ToolOutput {
    /// Output carrying only text.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            transaction: None,
            action: None,
        }
    }

    /// Attach an unsigned transaction and its action tag.
    #[must_use]
    pub fn with_transaction(mut self, transaction: UnsignedTransaction, action: &str) -> Self {
        self.transaction = Some(transaction);
        self.action = Some(action.to_owned());
        self
    }
}
