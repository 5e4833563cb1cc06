//! Discounts

use std::fmt;

use decimal_percentage::Percentage;
use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::validation::ValidationError;

/// A discount expressed in percentage points, always within `0..=100`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct DiscountPercent(Decimal);

impl DiscountPercent {
    /// No discount.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a discount from percentage points (`10` is 10%).
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::DiscountOutOfRange`] outside `0..=100`.
    pub fn new(points: Decimal) -> Result<Self, ValidationError> {
        if points < Decimal::ZERO || points > Decimal::ONE_HUNDRED {
            return Err(ValidationError::DiscountOutOfRange(points));
        }

        Ok(Self(points.normalize()))
    }

    /// Create a discount from whole percentage points, capped at 100.
    pub fn from_points(points: u8) -> Self {
        Self(Decimal::from(points.min(100)))
    }

    /// Percentage points.
    pub fn points(self) -> Decimal {
        self.0
    }

    /// Whether this discount takes nothing off.
    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    /// The discount as a fraction.
    pub fn as_percentage(self) -> Percentage {
        Percentage::from(self.0 / Decimal::ONE_HUNDRED)
    }

    /// Amount taken off `amount` by this discount.
    pub fn amount_off(self, amount: Decimal) -> Decimal {
        self.as_percentage() * amount
    }

    /// What is left of `amount` after this discount.
    pub fn apply_to(self, amount: Decimal) -> Decimal {
        amount - self.amount_off(amount)
    }
}

impl TryFrom<Decimal> for DiscountPercent {
    type Error = ValidationError;

    fn try_from(points: Decimal) -> Result<Self, Self::Error> {
        Self::new(points)
    }
}

impl From<DiscountPercent> for Decimal {
    fn from(percent: DiscountPercent) -> Self {
        percent.0
    }
}

impl fmt::Display for DiscountPercent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

/// Parse `"15%"` (points) or `"0.15"` (fraction) into a [`DiscountPercent`].
///
/// Returns `None` if the text is not a number or falls outside `0..=100`.
pub fn parse_percent(text: &str) -> Option<DiscountPercent> {
    let trimmed = text.trim();

    let points = if let Some(points) = trimmed.strip_suffix('%') {
        points.trim().parse::<Decimal>().ok()?
    } else {
        trimmed.parse::<Decimal>().ok()?.checked_mul(Decimal::ONE_HUNDRED)?
    };

    DiscountPercent::new(points).ok()
}

/// A checkout-wide percentage discount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coupon {
    code: String,
    discount: DiscountPercent,
}

impl Coupon {
    /// Create a coupon. Codes are case-insensitive and stored upper-cased.
    pub fn new(code: impl AsRef<str>, discount: DiscountPercent) -> Self {
        Self {
            code: normalize_code(code.as_ref()),
            discount,
        }
    }

    /// Coupon code
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Discount granted on the subtotal
    pub fn discount(&self) -> DiscountPercent {
        self.discount
    }
}

/// The known set of redeemable coupons.
#[derive(Debug, Clone, Default)]
pub struct CouponBook {
    coupons: FxHashMap<String, Coupon>,
}

impl CouponBook {
    /// Create an empty coupon book.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a coupon, returning any coupon it replaced.
    pub fn insert(&mut self, coupon: Coupon) -> Option<Coupon> {
        self.coupons.insert(coupon.code.clone(), coupon)
    }

    /// Look up a submitted code.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::UnknownCoupon`] if the code is not in the book.
    pub fn redeem(&self, code: &str) -> Result<&Coupon, ValidationError> {
        self.coupons
            .get(&normalize_code(code))
            .ok_or_else(|| ValidationError::UnknownCoupon(code.to_string()))
    }

    /// Number of coupons in the book
    pub fn len(&self) -> usize {
        self.coupons.len()
    }

    /// Whether the book has no coupons
    pub fn is_empty(&self) -> bool {
        self.coupons.is_empty()
    }
}

impl FromIterator<Coupon> for CouponBook {
    fn from_iter<I: IntoIterator<Item = Coupon>>(iter: I) -> Self {
        let mut book = Self::new();

        for coupon in iter {
            book.insert(coupon);
        }

        book
    }
}

fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn new_rejects_out_of_range_points() {
        assert_eq!(
            DiscountPercent::new(Decimal::from(101)),
            Err(ValidationError::DiscountOutOfRange(Decimal::from(101)))
        );
        assert_eq!(
            DiscountPercent::new(Decimal::from(-1)),
            Err(ValidationError::DiscountOutOfRange(Decimal::from(-1)))
        );
    }

    #[test]
    fn amount_off_is_exact() -> TestResult {
        let ten = DiscountPercent::new(Decimal::from(10))?;

        assert_eq!(ten.amount_off(Decimal::from(180)), Decimal::from(18));
        assert_eq!(ten.apply_to(Decimal::from(100)), Decimal::from(90));

        Ok(())
    }

    #[test]
    fn parse_percent_accepts_both_notations() -> TestResult {
        let points = parse_percent("15%").ok_or("expected 15%")?;
        let fraction = parse_percent("0.15").ok_or("expected 0.15")?;

        assert_eq!(points, fraction);
        assert_eq!(points.points(), Decimal::from(15));

        Ok(())
    }

    #[test]
    fn parse_percent_rejects_garbage_and_overflow() {
        assert_eq!(parse_percent("ten"), None);
        assert_eq!(parse_percent("150%"), None);
    }

    #[test]
    fn redeem_is_case_insensitive() -> TestResult {
        let book: CouponBook = [Coupon::new("welcome10", DiscountPercent::new(Decimal::TEN)?)]
            .into_iter()
            .collect();

        let coupon = book.redeem(" Welcome10 ")?;

        assert_eq!(coupon.code(), "WELCOME10");

        Ok(())
    }

    #[test]
    fn redeem_unknown_code_errors() {
        let book = CouponBook::new();

        assert_eq!(
            book.redeem("NOPE"),
            Err(ValidationError::UnknownCoupon("NOPE".to_string()))
        );
    }

    #[test]
    fn deserialize_rejects_out_of_range() {
        let result: Result<DiscountPercent, _> = serde_json::from_str("\"120\"");

        assert!(result.is_err(), "120% should not deserialize");
    }
}
