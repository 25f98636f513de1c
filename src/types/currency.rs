//! Currency-related types for the wallet ledger
//!
//! Currencies are identified by short uppercase codes ("USD", "INR") and
//! carry a conversion rate expressed in units of the currency per one unit
//! of a fixed base currency. Rates are stored with 4 fractional digits.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::LedgerError;

/// Number of fractional digits a stored rate carries
pub const RATE_SCALE: u32 = 4;

/// A currency known to the rate table
///
/// `rate_to_base` expresses units of this currency per one unit of the base
/// currency, so the base currency itself carries a rate of 1.0. Only active
/// currencies are convertible; inactive entries stay in the table so that
/// historical codes keep resolving for display purposes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrencyRate {
    /// Uppercase currency code ("USD", "INR")
    pub code: String,

    /// Human-readable currency name
    ///
    /// Rate ingestion that has no better information falls back to the code.
    pub name: String,

    /// Units of this currency per one unit of the base currency
    ///
    /// Quantized to [`RATE_SCALE`] fractional digits on write.
    pub rate_to_base: Decimal,

    /// Whether this currency participates in conversion
    pub is_active: bool,
}

/// Normalize a currency code for lookups and storage
///
/// Trims surrounding whitespace and uppercases the code, mirroring how the
/// rest of the system compares codes. Rejects empty and non-alphanumeric
/// codes and codes longer than 10 characters.
///
/// # Errors
///
/// Returns `LedgerError::Validation` when the code is structurally invalid.
pub fn normalize_code(code: &str) -> Result<String, LedgerError> {
    let normalized = code.trim().to_ascii_uppercase();

    if normalized.is_empty() {
        return Err(LedgerError::validation("currency code is required"));
    }
    if normalized.len() > 10 {
        return Err(LedgerError::validation(format!(
            "currency code '{}' exceeds 10 characters",
            normalized
        )));
    }
    if !normalized.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(LedgerError::validation(format!(
            "currency code '{}' contains invalid characters",
            normalized
        )));
    }

    Ok(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("usd", "USD")]
    #[case("USD", "USD")]
    #[case("  inr  ", "INR")]
    #[case("UsDt", "USDT")]
    fn test_normalize_code_accepts_valid_codes(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(normalize_code(input).unwrap(), expected);
    }

    #[rstest]
    #[case::empty("")]
    #[case::whitespace("   ")]
    #[case::too_long("ABCDEFGHIJK")]
    #[case::punctuation("US$")]
    #[case::embedded_space("U S")]
    fn test_normalize_code_rejects_invalid_codes(#[case] input: &str) {
        let result = normalize_code(input);
        assert!(matches!(result, Err(LedgerError::Validation { .. })));
    }
}
