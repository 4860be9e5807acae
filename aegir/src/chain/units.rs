//! SUI ↔ MIST conversion.

use super::ChainError;

/// Base units per SUI.
pub const MIST_PER_SUI: u64 = 1_000_000_000;

/// Decimal places of the SUI coin.
pub const SUI_DECIMALS: usize = 9;

/// Parse a decimal SUI amount (e.g. `"1.5"`) into MIST.
///
/// Up to nine fractional digits are accepted. Zero parses successfully; the
/// transfer tool rejects it.
///
/// # Errors
///
/// Returns [`ChainError::InvalidAmount`] for malformed input, more than nine
/// fractional digits, or overflow.
pub fn parse_sui_amount(input: &str) -> Result<u64, ChainError> {
    let s = input.trim();
    let invalid = || ChainError::InvalidAmount(format!("{s} is not a valid SUI amount"));

    let (whole, frac) = match s.split_once('.') {
        Some((w, f)) => (w, f),
        None => (s, ""),
    };
    if whole.is_empty() && frac.is_empty() {
        return Err(invalid());
    }
    if !whole.bytes().all(|b| b.is_ascii_digit()) || !frac.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    if frac.len() > SUI_DECIMALS {
        return Err(ChainError::InvalidAmount(format!(
            "{s} has more than {SUI_DECIMALS} decimal places"
        )));
    }

    let whole: u64 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| invalid())?
    };
    let frac: u64 = if frac.is_empty() {
        0
    } else {
        let padded = format!("{frac:0<width$}", width = SUI_DECIMALS);
        padded.parse().map_err(|_| invalid())?
    };

    whole
        .checked_mul(MIST_PER_SUI)
        .and_then(|m| m.checked_add(frac))
        .ok_or_else(|| ChainError::InvalidAmount(format!("{s} SUI overflows u64 MIST")))
}

/// Parse an integer MIST amount.
///
/// # Errors
///
/// Returns [`ChainError::InvalidAmount`] if `input` is not a non-negative
/// integer that fits in `u64`.
pub fn parse_mist(input: &str) -> Result<u64, ChainError> {
    let s = input.trim();
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ChainError::InvalidAmount(format!(
            "{s} is not an integer MIST amount"
        )));
    }
    s.parse()
        .map_err(|_| ChainError::InvalidAmount(format!("{s} overflows u64 MIST")))
}

/// Render a MIST amount as a decimal SUI string without trailing zeros.
#[must_use]
pub fn format_mist(mist: u128) -> String {
    let per = u128::from(MIST_PER_SUI);
    let whole = mist / per;
    let frac = mist % per;
    if frac == 0 {
        return whole.to_string();
    }
    let frac = format!("{frac:0>width$}", width = SUI_DECIMALS);
    format!("{whole}.{}", frac.trim_end_matches('0'))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    mod parse_sui {
        use super::*;

        #[test]
        fn whole_numbers() {
            assert_eq!(parse_sui_amount("1").unwrap(), 1_000_000_000);
            assert_eq!(parse_sui_amount("10").unwrap(), 10_000_000_000);
            assert_eq!(parse_sui_amount("0").unwrap(), 0);
        }

        #[test]
        fn decimals() {
            assert_eq!(parse_sui_amount("1.5").unwrap(), 1_500_000_000);
            assert_eq!(parse_sui_amount("0.000000001").unwrap(), 1);
            assert_eq!(parse_sui_amount(".25").unwrap(), 250_000_000);
        }

        #[test]
        fn too_many_decimals() {
            assert!(parse_sui_amount("0.0000000001").is_err());
        }

        #[test]
        fn rejects_garbage() {
            for bad in ["", ".", "-1", "1e9", "abc", "1.2.3"] {
                assert!(parse_sui_amount(bad).is_err(), "{bad} should fail");
            }
        }

        #[test]
        fn overflow() {
            assert!(parse_sui_amount("18446744074").is_err());
        }
    }

    mod mist {
        use super::*;

        #[test]
        fn parse_integer() {
            assert_eq!(parse_mist("1000000000").unwrap(), MIST_PER_SUI);
            assert!(parse_mist("1.5").is_err());
            assert!(parse_mist("-5").is_err());
        }

        #[test]
        fn format() {
            assert_eq!(format_mist(0), "0");
            assert_eq!(format_mist(1_000_000_000), "1");
            assert_eq!(format_mist(1_500_000_000), "1.5");
            assert_eq!(format_mist(1), "0.000000001");
        }
    }
}
