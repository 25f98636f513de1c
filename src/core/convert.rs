//! Currency conversion engine
//!
//! Pure conversion between two currencies through their base-currency rates:
//!
//! ```text
//! amount_in_base     = amount / from.rate_to_base
//! converted_amount   = amount_in_base * to.rate_to_base
//! ```
//!
//! Rates are passed in explicitly so the engine stays deterministic and
//! independently testable; there is no hidden rate lookup and no side
//! effect. The intermediate base amount is carried at full decimal
//! precision (up to 28 significant digits) and rounding happens exactly
//! once, at persistence/display time via [`round_to_cents`]. Rounding
//! during the intermediate steps would compound error across conversions.

use rust_decimal::Decimal;

use crate::types::{CurrencyRate, LedgerError};

/// Convert an amount between two currencies via base-rate arithmetic
///
/// The result is unrounded; callers round with [`round_to_cents`] when
/// persisting or displaying.
///
/// # Errors
///
/// - `LedgerError::InvalidRate` if either currency is inactive or carries a
///   zero or negative rate
/// - `LedgerError::ArithmeticOverflow` if the checked decimal math cannot
///   represent the result
pub fn convert(
    amount: Decimal,
    from: &CurrencyRate,
    to: &CurrencyRate,
) -> Result<Decimal, LedgerError> {
    check_rate(from)?;
    check_rate(to)?;

    let amount_in_base = amount
        .checked_div(from.rate_to_base)
        .ok_or_else(|| LedgerError::arithmetic_overflow("conversion to base"))?;

    amount_in_base
        .checked_mul(to.rate_to_base)
        .ok_or_else(|| LedgerError::arithmetic_overflow("conversion from base"))
}

/// Round an amount to 2 decimal places for persistence or display
///
/// Uses banker's rounding (midpoint to even), matching the runtime the
/// original rates were calibrated against.
pub fn round_to_cents(amount: Decimal) -> Decimal {
    amount.round_dp(2)
}

fn check_rate(rate: &CurrencyRate) -> Result<(), LedgerError> {
    if !rate.is_active {
        return Err(LedgerError::invalid_rate(&rate.code, "currency is inactive"));
    }
    if rate.rate_to_base <= Decimal::ZERO {
        return Err(LedgerError::invalid_rate(
            &rate.code,
            &format!("rate {} is not positive", rate.rate_to_base),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::str::FromStr;

    fn rate(code: &str, rate_to_base: &str, is_active: bool) -> CurrencyRate {
        CurrencyRate {
            code: code.to_string(),
            name: code.to_string(),
            rate_to_base: Decimal::from_str(rate_to_base).unwrap(),
            is_active,
        }
    }

    #[rstest]
    #[case::usd_to_inr("10.00", "1.0", "83.0", "830.00")]
    #[case::identity("25.00", "1.0", "1.0", "25.00")]
    #[case::usd_to_eur("10.00", "1.0", "0.9234", "9.234")]
    #[case::inr_to_usd("830.00", "83.0", "1.0", "10.00")]
    #[case::cross_rate("50.00", "0.5", "2.0", "200.00")]
    fn test_convert_via_base_rates(
        #[case] amount: &str,
        #[case] from_rate: &str,
        #[case] to_rate: &str,
        #[case] expected: &str,
    ) {
        let from = rate("FROM", from_rate, true);
        let to = rate("TO", to_rate, true);

        let converted = convert(Decimal::from_str(amount).unwrap(), &from, &to).unwrap();
        assert_eq!(converted, Decimal::from_str(expected).unwrap());
    }

    #[test]
    fn test_convert_keeps_intermediate_precision() {
        // 10 / 3 does not terminate; the intermediate must not be rounded
        // to 2 places or the round trip drifts visibly.
        let from = rate("AAA", "3.0", true);
        let to = rate("BBB", "3.0", true);

        let converted = convert(Decimal::new(1000, 2), &from, &to).unwrap();
        assert_eq!(round_to_cents(converted), Decimal::new(1000, 2));
    }

    #[rstest]
    #[case("10.00", "1.0", "83.0")]
    #[case("0.01", "0.9234", "110.25")]
    #[case("123.45", "7.77", "0.643")]
    fn test_convert_round_trip_recovers_amount(
        #[case] amount: &str,
        #[case] r1: &str,
        #[case] r2: &str,
    ) {
        let from = rate("AAA", r1, true);
        let to = rate("BBB", r2, true);
        let amount = Decimal::from_str(amount).unwrap();

        let there = convert(amount, &from, &to).unwrap();
        let back = convert(there, &to, &from).unwrap();

        // Within rounding tolerance at display precision
        let diff = (round_to_cents(back) - amount).abs();
        assert!(diff <= Decimal::new(1, 2), "drift {} exceeds 0.01", diff);
    }

    #[test]
    fn test_convert_rejects_inactive_source() {
        let from = rate("USD", "1.0", false);
        let to = rate("INR", "83.0", true);

        let result = convert(Decimal::ONE, &from, &to);
        assert_eq!(
            result.unwrap_err(),
            LedgerError::invalid_rate("USD", "currency is inactive")
        );
    }

    #[test]
    fn test_convert_rejects_inactive_target() {
        let from = rate("USD", "1.0", true);
        let to = rate("INR", "83.0", false);

        let result = convert(Decimal::ONE, &from, &to);
        assert_eq!(
            result.unwrap_err(),
            LedgerError::invalid_rate("INR", "currency is inactive")
        );
    }

    #[rstest]
    #[case::zero_rate("0")]
    #[case::negative_rate("-1.5")]
    fn test_convert_rejects_nonpositive_rate(#[case] bad: &str) {
        let from = rate("BAD", bad, true);
        let to = rate("INR", "83.0", true);

        let result = convert(Decimal::ONE, &from, &to);
        assert!(matches!(result, Err(LedgerError::InvalidRate { .. })));

        // Same failure when the bad rate sits on the target side
        let result = convert(Decimal::ONE, &to, &from);
        assert!(matches!(result, Err(LedgerError::InvalidRate { .. })));
    }

    #[rstest]
    #[case::exact("9.23", "9.23")]
    #[case::rounds_down("9.234", "9.23")]
    #[case::rounds_up("9.236", "9.24")]
    #[case::midpoint_to_even_down("0.785", "0.78")]
    #[case::midpoint_to_even_up("0.775", "0.78")]
    fn test_round_to_cents(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(
            round_to_cents(Decimal::from_str(input).unwrap()),
            Decimal::from_str(expected).unwrap()
        );
    }
}
