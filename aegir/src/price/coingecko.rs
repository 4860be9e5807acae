//! CoinGecko simple-price source.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::{PriceError, PriceSource, SourcePrice};

#[derive(Debug, Deserialize)]
struct SimplePrice {
    usd: Option<f64>,
    #[serde(default)]
    last_updated_at: Option<u64>,
}

/// Price source backed by `GET /simple/price`.
#[derive(Debug, Clone)]
pub struct CoinGecko {
    base_url: String,
    api_key: Option<String>,
    client: Client,
}

impl CoinGecko {
    /// Public API base URL.
    pub const DEFAULT_BASE_URL: &'static str = "https://api.coingecko.com/api/v3";

    /// Create a client for the public API.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Http`] if the HTTP client cannot be built.
    pub fn new(timeout: Duration) -> Result<Self, PriceError> {
        Self::with_base_url(Self::DEFAULT_BASE_URL, timeout)
    }

    /// Create a client for a custom base URL.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Http`] if the HTTP client cannot be built.
    pub fn with_base_url(base_url: impl Into<String>, timeout: Duration) -> Result<Self, PriceError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PriceError::Http(format!("failed to create HTTP client: {e}")))?;
        Ok(Self {
            base_url: base_url.into(),
            api_key: None,
            client,
        })
    }

    /// Send a demo API key with every request.
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }
}

#[async_trait]
impl PriceSource for CoinGecko {
    async fn fetch_usd(&self, coin_id: &str) -> Result<SourcePrice, PriceError> {
        let url = format!("{}/simple/price", self.base_url.trim_end_matches('/'));
        debug!(coin_id, "fetching price");

        let mut request = self.client.get(&url).query(&[
            ("ids", coin_id),
            ("vs_currencies", "usd"),
            ("include_last_updated_at", "true"),
        ]);
        if let Some(key) = &self.api_key {
            request = request.header("x-cg-demo-api-key", key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| PriceError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PriceError::Http(format!("HTTP {}: {body}", status.as_u16())));
        }

        let mut prices: HashMap<String, SimplePrice> = response
            .json()
            .await
            .map_err(|e| PriceError::Http(format!("invalid price response: {e}")))?;

        let entry = prices
            .remove(coin_id)
            .ok_or_else(|| PriceError::NoData(coin_id.to_owned()))?;
        let usd = entry
            .usd
            .ok_or_else(|| PriceError::NoData(coin_id.to_owned()))?;

        Ok(SourcePrice {
            usd,
            last_updated_at: entry.last_updated_at,
        })
    }
}
