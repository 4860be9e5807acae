//! Sui account addresses.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::ChainError;

/// Number of hex characters in a full Sui address (32 bytes).
pub const ADDRESS_HEX_LEN: usize = 64;

/// A validated Sui address: `0x` followed by exactly 64 hex characters.
///
/// Short forms such as `0x2` are rejected; recipients must be spelled out in
/// full. The stored form is lowercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SuiAddress(String);

impl SuiAddress {
    /// The address as a `0x`-prefixed lowercase string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for SuiAddress {
    type Err = ChainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let hex = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .ok_or_else(|| ChainError::InvalidAddress(format!("{trimmed} (missing 0x prefix)")))?;

        if hex.len() != ADDRESS_HEX_LEN {
            return Err(ChainError::InvalidAddress(format!(
                "{trimmed} (expected {ADDRESS_HEX_LEN} hex characters, got {})",
                hex.len()
            )));
        }
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ChainError::InvalidAddress(format!(
                "{trimmed} (non-hex characters)"
            )));
        }

        Ok(Self(format!("0x{}", hex.to_ascii_lowercase())))
    }
}

impl fmt::Display for SuiAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for SuiAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for SuiAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const VALID: &str = "0x7d20dcdb2bca4f508ea9613994683eb4e76e9c4ed371169677c1be02aaf0b58e";

    #[test]
    fn parses_full_address() {
        let addr: SuiAddress = VALID.parse().unwrap();
        assert_eq!(addr.as_str(), VALID);
    }

    #[test]
    fn normalizes_case() {
        let upper = format!("0x{}", VALID[2..].to_ascii_uppercase());
        let addr: SuiAddress = upper.parse().unwrap();
        assert_eq!(addr.to_string(), VALID);
    }

    #[test]
    fn rejects_short_address() {
        let err = "0x2".parse::<SuiAddress>().unwrap_err();
        assert!(matches!(err, ChainError::InvalidAddress(_)));
    }

    #[test]
    fn rejects_missing_prefix() {
        assert!(VALID[2..].parse::<SuiAddress>().is_err());
    }

    #[test]
    fn rejects_non_hex() {
        let bad = format!("0x{}", "g".repeat(64));
        assert!(bad.parse::<SuiAddress>().is_err());
    }

    #[test]
    fn serde_validates() {
        let json = format!("\"{VALID}\"");
        let addr: SuiAddress = serde_json::from_str(&json).unwrap();
        assert_eq!(serde_json::to_string(&addr).unwrap(), json);
        assert!(serde_json::from_str::<SuiAddress>("\"0x1\"").is_err());
    }
}
