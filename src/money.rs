//! Money
//!
//! Amounts are carried as full-precision [`Decimal`] major units and only rounded
//! to the currency's minor unit when they are displayed or charged.

use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use rusty_money::{
    Money,
    iso::{Currency, EUR, GBP, INR, USD},
};

/// Look up a supported ISO currency by its alpha code.
pub fn parse_currency(code: &str) -> Option<&'static Currency> {
    match code.trim().to_uppercase().as_str() {
        "USD" => Some(USD),
        "GBP" => Some(GBP),
        "EUR" => Some(EUR),
        "INR" => Some(INR),
        _ => None,
    }
}

/// Round half-up (away from zero) to the currency's minor unit.
pub fn round_to_minor(amount: Decimal, currency: &Currency) -> Decimal {
    amount.round_dp_with_strategy(currency.exponent, RoundingStrategy::MidpointAwayFromZero)
}

/// Rounded amount in minor units, or `None` if it does not fit an `i64`.
pub fn to_minor_units(amount: Decimal, currency: &Currency) -> Option<i64> {
    let scale = Decimal::from(10_i64.checked_pow(currency.exponent)?);

    round_to_minor(amount, currency)
        .checked_mul(scale)?
        .to_i64()
}

/// Rounded display value, or `None` if it does not fit an `i64` of minor units.
pub fn to_money(amount: Decimal, currency: &'static Currency) -> Option<Money<'static, Currency>> {
    to_minor_units(amount, currency).map(|minor| Money::from_minor(minor, currency))
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use testresult::TestResult;

    use super::*;

    #[test]
    fn parse_currency_is_case_insensitive() {
        assert_eq!(parse_currency("usd"), Some(USD));
        assert_eq!(parse_currency(" GBP "), Some(GBP));
        assert_eq!(parse_currency("ABC"), None);
    }

    #[test]
    fn round_to_minor_rounds_half_up() -> TestResult {
        assert_eq!(
            round_to_minor(Decimal::from_str("12.345")?, USD),
            Decimal::from_str("12.35")?
        );
        assert_eq!(
            round_to_minor(Decimal::from_str("12.344")?, USD),
            Decimal::from_str("12.34")?
        );

        Ok(())
    }

    #[test]
    fn to_minor_units_scales_by_exponent() -> TestResult {
        assert_eq!(to_minor_units(Decimal::from_str("184.95")?, USD), Some(18_495));
        assert_eq!(to_minor_units(Decimal::from_str("0.005")?, USD), Some(1));

        Ok(())
    }

    #[test]
    fn to_minor_units_overflow_returns_none() {
        assert_eq!(to_minor_units(Decimal::MAX, USD), None);
    }

    #[test]
    fn to_money_builds_rounded_money() -> TestResult {
        let money = to_money(Decimal::from_str("9.994")?, GBP).ok_or("expected money")?;

        assert_eq!(money, Money::from_minor(999, GBP));

        Ok(())
    }
}
