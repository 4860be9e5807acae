//! Tool execution.
//!
//! [`ToolExecutor`] resolves a tool name, checks that enough positional
//! arguments were supplied, substitutes the connected wallet, and dispatches
//! to the built-in handler. Every failure comes back as
//! [`ToolOutcome::Failure`]; nothing escapes as a panic or `Err`.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::agent::QueryContext;
use crate::chain::ChainClient;
use crate::error::ToolError;
use crate::price::PriceService;

use super::builtin;
use super::kind::ToolKind;
use super::registry::ToolRegistry;
use super::{CONNECTED_WALLET, ToolOutput};

/// Result of one tool execution.
#[derive(Debug, Clone)]
pub enum ToolOutcome {
    /// The handler produced output.
    Success(ToolOutput),
    /// The tool could not run or its handler failed.
    Failure(ToolError),
}

impl ToolOutcome {
    /// Whether the tool succeeded.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Text handed to the response formatter.
    #[must_use]
    pub fn raw_result(&self) -> String {
        match self {
            Self::Success(output) => output.text.clone(),
            Self::Failure(err) => format!("Error: {err}"),
        }
    }
}

impl From<Result<ToolOutput, ToolError>> for ToolOutcome {
    fn from(result: Result<ToolOutput, ToolError>) -> Self {
        match result {
            Ok(output) => Self::Success(output),
            Err(err) => Self::Failure(err),
        }
    }
}

/// Runs registered tools against the chain and price backends.
#[derive(Debug, Clone)]
pub struct ToolExecutor {
    registry: Arc<ToolRegistry>,
    chain: Arc<dyn ChainClient>,
    prices: Arc<PriceService>,
}

impl ToolExecutor {
    /// Create an executor.
    #[must_use]
    pub fn new(
        registry: Arc<ToolRegistry>,
        chain: Arc<dyn ChainClient>,
        prices: Arc<PriceService>,
    ) -> Self {
        Self {
            registry,
            chain,
            prices,
        }
    }

    /// The registry this executor dispatches through.
    #[must_use]
    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Execute `tool_name` with positional `arguments`.
    pub async fn execute(
        &self,
        tool_name: &str,
        arguments: &[String],
        context: &QueryContext,
    ) -> ToolOutcome {
        let outcome: ToolOutcome = self.try_execute(tool_name, arguments, context).await.into();
        match &outcome {
            ToolOutcome::Success(_) => info!(tool = tool_name, "tool succeeded"),
            ToolOutcome::Failure(err) => warn!(tool = tool_name, error = %err, "tool failed"),
        }
        outcome
    }

    async fn try_execute(
        &self,
        tool_name: &str,
        arguments: &[String],
        context: &QueryContext,
    ) -> Result<ToolOutput, ToolError> {
        let (kind, definition) = self.registry.lookup(tool_name)?;

        let required = definition.required_count();
        if arguments.len() < required {
            return Err(ToolError::invalid_argument(format!(
                "{} expects {required} argument(s) ({}), got {}",
                definition.name,
                definition.required_names().join(", "),
                arguments.len()
            )));
        }

        let args = substitute_wallet(arguments, context)?;
        debug!(tool = %definition.name, handler = %kind, ?args, "dispatching");

        let arg = |i: usize| {
            args.get(i).map(String::as_str).ok_or_else(|| {
                ToolError::invalid_argument(format!(
                    "{} is missing argument {} for {kind}",
                    definition.name,
                    i + 1
                ))
            })
        };

        match kind {
            ToolKind::Balance => builtin::balance(self.chain.as_ref(), arg(0)?).await,
            ToolKind::Transfer => builtin::transfer(self.chain.as_ref(), arg(0)?, arg(1)?),
            ToolKind::Price => builtin::price(&self.prices, arg(0)?).await,
            ToolKind::EstimateGas => {
                builtin::estimate_gas(self.chain.as_ref(), arg(0)?, arg(1)?).await
            }
        }
    }
}

/// Replace the connected-wallet placeholder with the caller's address.
fn substitute_wallet(arguments: &[String], context: &QueryContext) -> Result<Vec<String>, ToolError> {
    arguments
        .iter()
        .map(|arg| {
            if arg.trim().eq_ignore_ascii_case(CONNECTED_WALLET) {
                context
                    .wallet_address
                    .clone()
                    .ok_or_else(|| ToolError::validation("no wallet connected; provide an address"))
            } else {
                Ok(arg.clone())
            }
        })
        .collect()
}
