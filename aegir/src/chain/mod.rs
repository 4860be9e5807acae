//! Sui chain access.
//!
//! The core only reads from the chain and describes transactions; it never
//! holds keys or submits anything. [`ChainClient`] is the seam the tools use,
//! with [`SuiRpcClient`] as the JSON-RPC implementation.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

mod address;
mod network;
mod rpc;
mod transaction;
pub mod units;

pub use address::{ADDRESS_HEX_LEN, SuiAddress};
pub use network::Network;
pub use rpc::{SUI_COIN_TYPE, SuiRpcClient, TRANSFER_COMPUTATION_UNITS};
pub use transaction::{
    Argument, CallArg, Command, DEFAULT_GAS_BUDGET, PureValue, UnsignedTransaction,
};
pub use units::{MIST_PER_SUI, format_mist, parse_mist, parse_sui_amount};

/// Error type for chain operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum ChainError {
    /// Address is not `0x` followed by 64 hex characters.
    #[error("invalid Sui address: {0}")]
    InvalidAddress(String),

    /// Amount is malformed, zero, or out of range.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// The fullnode returned a JSON-RPC error object.
    #[error("RPC error {code}: {message}")]
    Rpc {
        /// JSON-RPC error code.
        code: i64,
        /// Error message.
        message: String,
    },

    /// Transport or HTTP status failure.
    #[error("HTTP error: {0}")]
    Http(String),

    /// The response did not have the expected shape.
    #[error("decode error: {0}")]
    Decode(String),

    /// Network name is not a known preset or URL.
    #[error("unknown network: {0}")]
    UnknownNetwork(String),
}

/// Gas estimate for a transaction, in MIST.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GasEstimate {
    /// Reference gas price in MIST per computation unit.
    pub reference_gas_price: u64,
    /// Computation units assumed for the transaction.
    pub computation_units: u64,
    /// `reference_gas_price * computation_units`.
    pub computation_cost_mist: u64,
    /// Gas budget attached to the transaction.
    pub gas_budget: u64,
    /// Whether the estimate fits in the budget.
    pub within_budget: bool,
}

impl GasEstimate {
    /// Compute an estimate from a reference price.
    #[must_use]
    pub const fn new(reference_gas_price: u64, computation_units: u64, gas_budget: u64) -> Self {
        let computation_cost_mist = reference_gas_price.saturating_mul(computation_units);
        Self {
            reference_gas_price,
            computation_units,
            computation_cost_mist,
            gas_budget,
            within_budget: computation_cost_mist <= gas_budget,
        }
    }
}

/// Read access to a Sui network plus unsigned transaction construction.
#[async_trait]
pub trait ChainClient: Send + Sync + fmt::Debug {
    /// Total SUI balance of `owner`, in MIST.
    async fn get_balance(&self, owner: &SuiAddress) -> Result<u128, ChainError>;

    /// Gas budget attached to built transactions.
    fn gas_budget(&self) -> u64 {
        DEFAULT_GAS_BUDGET
    }

    /// Build an unsigned SUI transfer.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError::InvalidAmount`] for a zero amount.
    fn build_transfer(
        &self,
        recipient: SuiAddress,
        amount_mist: u64,
    ) -> Result<UnsignedTransaction, ChainError> {
        UnsignedTransaction::transfer_sui(recipient, amount_mist, self.gas_budget())
    }

    /// Estimate the gas cost of `tx`.
    async fn estimate_gas(&self, tx: &UnsignedTransaction) -> Result<GasEstimate, ChainError>;
}
