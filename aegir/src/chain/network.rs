//! Sui network presets.

use std::fmt;
use std::str::FromStr;

use super::ChainError;

/// A Sui network and its fullnode RPC endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Network {
    /// Sui mainnet.
    #[default]
    Mainnet,
    /// Sui testnet.
    Testnet,
    /// Sui devnet.
    Devnet,
    /// Local network started with `sui start`.
    Localnet,
    /// Any other fullnode URL.
    Custom(String),
}

impl Network {
    /// Fullnode JSON-RPC URL.
    #[must_use]
    pub fn rpc_url(&self) -> &str {
        match self {
            Self::Mainnet => "https://fullnode.mainnet.sui.io:443",
            Self::Testnet => "https://fullnode.testnet.sui.io:443",
            Self::Devnet => "https://fullnode.devnet.sui.io:443",
            Self::Localnet => "http://127.0.0.1:9000",
            Self::Custom(url) => url,
        }
    }

    /// Short network name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Mainnet => "mainnet",
            Self::Testnet => "testnet",
            Self::Devnet => "devnet",
            Self::Localnet => "localnet",
            Self::Custom(_) => "custom",
        }
    }
}

impl FromStr for Network {
    type Err = ChainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mainnet" => Ok(Self::Mainnet),
            "testnet" => Ok(Self::Testnet),
            "devnet" => Ok(Self::Devnet),
            "localnet" | "local" => Ok(Self::Localnet),
            _ if s.starts_with("http://") || s.starts_with("https://") => {
                Ok(Self::Custom(s.trim().to_owned()))
            }
            other => Err(ChainError::UnknownNetwork(other.to_owned())),
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Custom(url) => f.write_str(url),
            other => f.write_str(other.name()),
        }
    }
}
