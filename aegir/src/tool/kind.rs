//! The closed set of built-in tools.

use std::fmt;
use std::str::FromStr;

use crate::error::ToolError;

use super::definition::ToolDefinition;

/// Built-in tool handlers.
///
/// Dispatch is an exhaustive `match` on this enum; the only string to
/// variant conversion is [`FromStr`] and the registry's `resolve`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolKind {
    /// SUI balance of an address.
    Balance,
    /// Unsigned SUI transfer.
    Transfer,
    /// USD price of a token.
    Price,
    /// Gas estimate for a SUI transfer.
    EstimateGas,
}

impl ToolKind {
    /// Every built-in, in registration order.
    pub const ALL: [Self; 4] = [Self::Balance, Self::Transfer, Self::Price, Self::EstimateGas];

    /// Tool name as selected by the classifier.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Balance => "balance",
            Self::Transfer => "transfer",
            Self::Price => "price",
            Self::EstimateGas => "estimate_gas",
        }
    }

    /// Definition registered for this tool.
    #[must_use]
    pub fn definition(&self) -> ToolDefinition {
        match self {
            Self::Balance => ToolDefinition::new(
                self.as_str(),
                "Get the SUI balance of a wallet address",
            )
            .param(
                "address",
                "string",
                "Sui address (0x + 64 hex) or CONNECTED_WALLET for the user's wallet",
            ),
            Self::Transfer => ToolDefinition::new(
                self.as_str(),
                "Prepare an unsigned SUI transfer for the user to sign",
            )
            .param("amount", "string", "Amount in MIST (1 SUI = 1000000000 MIST)")
            .param("recipient", "string", "Recipient Sui address (0x + 64 hex)"),
            Self::Price => ToolDefinition::new(self.as_str(), "Get the USD price of a token")
                .param("symbol", "string", "Token ticker symbol, e.g. SUI or BTC"),
            Self::EstimateGas => ToolDefinition::new(
                self.as_str(),
                "Estimate the gas fee of a SUI transfer",
            )
            .param("amount", "string", "Amount in MIST (1 SUI = 1000000000 MIST)")
            .param("recipient", "string", "Recipient Sui address (0x + 64 hex)"),
        }
    }
}

impl FromStr for ToolKind {
    type Err = ToolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(name))
            .ok_or_else(|| ToolError::unknown_tool(name))
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
