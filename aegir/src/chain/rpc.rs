//! Sui fullnode JSON-RPC client.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::debug;

use super::address::SuiAddress;
use super::network::Network;
use super::transaction::{DEFAULT_GAS_BUDGET, UnsignedTransaction};
use super::{ChainClient, ChainError, GasEstimate};

/// Coin type of native SUI.
pub const SUI_COIN_TYPE: &str = "0x2::sui::SUI";

/// Computation units charged for a simple SplitCoins + TransferObjects.
///
/// Sui buckets computation cost; the smallest bucket covers a plain transfer.
pub const TRANSFER_COMPUTATION_UNITS: u64 = 1_000;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BalanceResult {
    total_balance: StringOrNumber,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    String(String),
    Number(u64),
}

impl StringOrNumber {
    fn into_u128(self) -> Result<u128, ChainError> {
        match self {
            Self::Number(n) => Ok(u128::from(n)),
            Self::String(s) => s
                .parse()
                .map_err(|_| ChainError::Decode(format!("expected integer, got {s:?}"))),
        }
    }
}

/// JSON-RPC client for a Sui fullnode.
#[derive(Debug)]
pub struct SuiRpcClient {
    rpc_url: String,
    client: Client,
    gas_budget: u64,
    next_id: AtomicU64,
}

impl SuiRpcClient {
    /// Create a client for `rpc_url` with a request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError::Http`] if the HTTP client cannot be built.
    pub fn new(rpc_url: impl Into<String>, timeout: Duration) -> Result<Self, ChainError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ChainError::Http(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            rpc_url: rpc_url.into(),
            client,
            gas_budget: DEFAULT_GAS_BUDGET,
            next_id: AtomicU64::new(1),
        })
    }

    /// Create a client for a network preset with the default timeout.
    ///
    /// # Errors
    ///
    /// See [`SuiRpcClient::new`].
    pub fn for_network(network: &Network) -> Result<Self, ChainError> {
        Self::new(network.rpc_url(), DEFAULT_TIMEOUT)
    }

    /// Set the gas budget attached to built transactions.
    #[must_use]
    pub const fn with_gas_budget(mut self, gas_budget: u64) -> Self {
        self.gas_budget = gas_budget;
        self
    }

    /// The RPC endpoint.
    #[must_use]
    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T, ChainError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = RpcRequest {
            jsonrpc: "2.0",
            id,
            method,
            params,
        };
        debug!(method, id, url = %self.rpc_url, "sui rpc call");

        let response = self
            .client
            .post(&self.rpc_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ChainError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ChainError::Http(format!("HTTP {}: {text}", status.as_u16())));
        }

        let envelope: RpcResponse = response
            .json()
            .await
            .map_err(|e| ChainError::Decode(format!("invalid JSON-RPC response: {e}")))?;

        if let Some(err) = envelope.error {
            return Err(ChainError::Rpc {
                code: err.code,
                message: err.message,
            });
        }

        let result = envelope
            .result
            .ok_or_else(|| ChainError::Decode(format!("{method}: response has no result")))?;
        serde_json::from_value(result).map_err(|e| ChainError::Decode(format!("{method}: {e}")))
    }

    /// Current reference gas price in MIST per computation unit.
    ///
    /// # Errors
    ///
    /// Returns a transport, RPC or decode error.
    pub async fn reference_gas_price(&self) -> Result<u64, ChainError> {
        let price: StringOrNumber = self.call("suix_getReferenceGasPrice", json!([])).await?;
        let price = price.into_u128()?;
        u64::try_from(price).map_err(|_| ChainError::Decode(format!("gas price {price} overflows")))
    }
}

#[async_trait]
impl ChainClient for SuiRpcClient {
    async fn get_balance(&self, owner: &SuiAddress) -> Result<u128, ChainError> {
        let result: BalanceResult = self
            .call("suix_getBalance", json!([owner.as_str(), SUI_COIN_TYPE]))
            .await?;
        result.total_balance.into_u128()
    }

    fn gas_budget(&self) -> u64 {
        self.gas_budget
    }

    async fn estimate_gas(&self, tx: &UnsignedTransaction) -> Result<GasEstimate, ChainError> {
        let reference_gas_price = self.reference_gas_price().await?;
        Ok(GasEstimate::new(
            reference_gas_price,
            TRANSFER_COMPUTATION_UNITS,
            tx.gas_budget,
        ))
    }
}
