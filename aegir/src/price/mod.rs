//! USD price quotes for Sui ecosystem tokens.
//!
//! [`PriceService`] maps ticker symbols to CoinGecko coin ids, asks a
//! [`PriceSource`] for the quote, and caches it per symbol.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cache::{Clock, SystemClock, TtlCache};

mod coingecko;

pub use coingecko::CoinGecko;

/// Default lifetime of a cached quote.
pub const DEFAULT_PRICE_TTL: Duration = Duration::from_secs(60);

/// Built-in symbol to CoinGecko id table.
pub const COIN_IDS: &[(&str, &str)] = &[
    ("BTC", "bitcoin"),
    ("ETH", "ethereum"),
    ("SUI", "sui"),
    ("CETUS", "cetus"),
    ("SUIA", "suia"),
    ("MOVE", "move-network"),
    ("BUCK", "bucketus"),
    ("NAV", "nav-coin"),
    ("USDC", "usd-coin"),
    ("USDT", "tether"),
    ("WETH", "weth"),
    ("TURBOS", "turbos-finance"),
    ("NAVI", "navi-protocol"),
    ("TOCE", "tocen"),
    ("SCAL", "scallop"),
    ("HADES", "hades"),
    ("SUIP", "sui-protocol"),
    ("COMETA", "cometa-finance"),
];

/// Error type for price lookups.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum PriceError {
    /// Empty or blank symbol.
    #[error("token symbol must not be empty")]
    InvalidSymbol,

    /// Symbol has no coin id mapping.
    #[error("Unsupported token: {0}")]
    Unsupported(String),

    /// The source returned no price for the coin id.
    #[error("no price data for {0}")]
    NoData(String),

    /// Transport, status or decode failure.
    #[error("price source error: {0}")]
    Http(String),
}

/// A USD price quote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceQuote {
    /// Uppercase ticker symbol.
    pub symbol: String,
    /// Source coin id.
    pub coin_id: String,
    /// Price in USD.
    pub usd: f64,
    /// Unix timestamp of the source's last update, when reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated_at: Option<u64>,
}

/// A raw USD price from the source, keyed by coin id.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SourcePrice {
    /// Price in USD.
    pub usd: f64,
    /// Unix timestamp of the last update.
    pub last_updated_at: Option<u64>,
}

/// A backend that quotes coin ids in USD.
#[async_trait]
pub trait PriceSource: Send + Sync + fmt::Debug {
    /// Fetch the USD price of `coin_id`.
    async fn fetch_usd(&self, coin_id: &str) -> Result<SourcePrice, PriceError>;
}

/// Cached, symbol-aware price lookups.
#[derive(Debug)]
pub struct PriceService {
    source: Arc<dyn PriceSource>,
    coin_ids: HashMap<String, String>,
    cache: TtlCache<String, PriceQuote>,
}

impl PriceService {
    /// Create a service with the built-in symbol table and a 60 s cache.
    #[must_use]
    pub fn new(source: Arc<dyn PriceSource>) -> Self {
        Self::with_cache(source, DEFAULT_PRICE_TTL, Arc::new(SystemClock))
    }

    /// Create a service with a custom cache lifetime and clock.
    #[must_use]
    pub fn with_cache(source: Arc<dyn PriceSource>, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        let coin_ids = COIN_IDS
            .iter()
            .map(|(sym, id)| ((*sym).to_owned(), (*id).to_owned()))
            .collect();
        Self {
            source,
            coin_ids,
            cache: TtlCache::with_clock(ttl, clock),
        }
    }

    /// Add or replace a symbol mapping.
    #[must_use]
    pub fn with_symbol(mut self, symbol: &str, coin_id: impl Into<String>) -> Self {
        self.coin_ids
            .insert(symbol.trim().to_ascii_uppercase(), coin_id.into());
        self
    }

    /// Coin id for `symbol`, case-insensitive.
    #[must_use]
    pub fn coin_id(&self, symbol: &str) -> Option<&str> {
        self.coin_ids
            .get(&symbol.trim().to_ascii_uppercase())
            .map(String::as_str)
    }

    /// Supported symbols, sorted.
    #[must_use]
    pub fn supported_symbols(&self) -> Vec<&str> {
        let mut symbols: Vec<&str> = self.coin_ids.keys().map(String::as_str).collect();
        symbols.sort_unstable();
        symbols
    }

    /// USD price of `symbol`.
    ///
    /// The symbol is trimmed, stripped of a leading `$` and uppercased.
    /// Quotes younger than the cache lifetime are served without calling the
    /// source.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::InvalidSymbol`] for a blank symbol,
    /// [`PriceError::Unsupported`] for an unmapped one, and the source's error
    /// otherwise.
    pub async fn get_price(&self, symbol: &str) -> Result<PriceQuote, PriceError> {
        let symbol = symbol.trim().trim_start_matches('$').to_ascii_uppercase();
        if symbol.is_empty() {
            return Err(PriceError::InvalidSymbol);
        }

        if let Some(quote) = self.cache.get(&symbol) {
            debug!(%symbol, "price cache hit");
            return Ok(quote);
        }

        let coin_id = self
            .coin_ids
            .get(&symbol)
            .ok_or_else(|| PriceError::Unsupported(symbol.clone()))?
            .clone();

        let price = self.source.fetch_usd(&coin_id).await?;
        let quote = PriceQuote {
            symbol: symbol.clone(),
            coin_id,
            usd: price.usd,
            last_updated_at: price.last_updated_at,
        };
        self.cache.insert(symbol, quote.clone());
        Ok(quote)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::cache::ManualClock;

    /// Fixed-price source that counts calls.
    #[derive(Debug, Default)]
    pub(crate) struct FixedSource {
        pub(crate) calls: AtomicUsize,
    }

    #[async_trait]
    impl PriceSource for FixedSource {
        async fn fetch_usd(&self, coin_id: &str) -> Result<SourcePrice, PriceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match coin_id {
                "sui" => Ok(SourcePrice {
                    usd: 3.5,
                    last_updated_at: Some(1_700_000_000),
                }),
                "bitcoin" => Ok(SourcePrice {
                    usd: 65_000.0,
                    last_updated_at: None,
                }),
                other => Err(PriceError::NoData(other.to_owned())),
            }
        }
    }

    fn service() -> (Arc<FixedSource>, Arc<ManualClock>, PriceService) {
        let source = Arc::new(FixedSource::default());
        let clock = Arc::new(ManualClock::new());
        let svc = PriceService::with_cache(source.clone(), DEFAULT_PRICE_TTL, clock.clone());
        (source, clock, svc)
    }

    mod lookup {
        use super::*;

        #[tokio::test]
        async fn normalizes_symbol() {
            let (_, _, svc) = service();
            let quote = svc.get_price("  $sui ").await.unwrap();
            assert_eq!(quote.symbol, "SUI");
            assert_eq!(quote.coin_id, "sui");
            assert!((quote.usd - 3.5).abs() < f64::EPSILON);
        }

        #[tokio::test]
        async fn unsupported_symbol() {
            let (source, _, svc) = service();
            let err = svc.get_price("DOGE").await.unwrap_err();
            assert_eq!(err, PriceError::Unsupported("DOGE".into()));
            assert_eq!(source.calls.load(Ordering::SeqCst), 0);
        }

        #[tokio::test]
        async fn blank_symbol() {
            let (_, _, svc) = service();
            assert_eq!(svc.get_price("  ").await.unwrap_err(), PriceError::InvalidSymbol);
        }

        #[tokio::test]
        async fn source_error_propagates() {
            let (_, _, svc) = service();
            let err = svc.get_price("ETH").await.unwrap_err();
            assert_eq!(err, PriceError::NoData("ethereum".into()));
        }

        #[test]
        fn custom_symbol_mapping() {
            let (_, _, svc) = service();
            let svc = svc.with_symbol("deep", "deep");
            assert_eq!(svc.coin_id("DEEP"), Some("deep"));
            assert!(svc.supported_symbols().contains(&"DEEP"));
        }
    }

    mod cache {
        use super::*;

        #[tokio::test]
        async fn second_lookup_within_ttl_is_cached() {
            let (source, clock, svc) = service();
            svc.get_price("SUI").await.unwrap();
            clock.advance(Duration::from_secs(30));
            svc.get_price("sui").await.unwrap();
            assert_eq!(source.calls.load(Ordering::SeqCst), 1);
        }

        #[tokio::test]
        async fn lookup_after_ttl_refetches() {
            let (source, clock, svc) = service();
            svc.get_price("SUI").await.unwrap();
            clock.advance(Duration::from_secs(61));
            svc.get_price("SUI").await.unwrap();
            assert_eq!(source.calls.load(Ordering::SeqCst), 2);
        }

        #[tokio::test]
        async fn symbols_are_cached_independently() {
            let (source, _, svc) = service();
            svc.get_price("SUI").await.unwrap();
            svc.get_price("BTC").await.unwrap();
            svc.get_price("BTC").await.unwrap();
            assert_eq!(source.calls.load(Ordering::SeqCst), 2);
        }
    }
}
