//! Pricing
//!
//! Side-effect-free cart and checkout totals. Everything here works on
//! full-precision [`Decimal`] major units; rounding happens when a summary is
//! displayed or charged, never while accumulating.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    config::PricingConfig, discounts::Coupon, items::LineItem, summary::OrderSummary,
    validation::ValidationError,
};

/// Sales tax rate as a fraction (`0.08` is 8%). Configuration only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct TaxRate(Decimal);

impl TaxRate {
    /// Create a tax rate.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::NegativeTaxRate`] for negative rates.
    pub fn new(rate: Decimal) -> Result<Self, ValidationError> {
        if rate.is_sign_negative() && !rate.is_zero() {
            return Err(ValidationError::NegativeTaxRate(rate));
        }

        Ok(Self(rate))
    }

    /// The rate as a fraction.
    pub fn rate(self) -> Decimal {
        self.0
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        Self(Decimal::new(8, 2))
    }
}

impl TryFrom<Decimal> for TaxRate {
    type Error = ValidationError;

    fn try_from(rate: Decimal) -> Result<Self, Self::Error> {
        Self::new(rate)
    }
}

impl From<TaxRate> for Decimal {
    fn from(rate: TaxRate) -> Self {
        rate.0
    }
}

/// Shipping methods offered at checkout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShippingMethod {
    /// Flat-rate standard delivery
    #[default]
    Standard,

    /// Faster delivery at a higher flat rate
    Express,

    /// No charge, only above the free-shipping threshold
    Free,
}

impl ShippingMethod {
    /// All methods, in the order they are offered.
    pub const ALL: [Self; 3] = [Self::Standard, Self::Express, Self::Free];

    /// Customer-facing name.
    pub fn label(self) -> &'static str {
        match self {
            Self::Standard => "Standard Shipping",
            Self::Express => "Express Shipping",
            Self::Free => "Free Shipping",
        }
    }

    /// Customer-facing delivery estimate.
    pub fn delivery_estimate(self) -> &'static str {
        match self {
            Self::Standard => "3-5 business days",
            Self::Express => "1-2 business days",
            Self::Free => "5-7 business days",
        }
    }
}

impl fmt::Display for ShippingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Flat shipping costs and the free-shipping threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShippingRates {
    standard: Decimal,
    express: Decimal,
    free_threshold: Decimal,
}

impl ShippingRates {
    /// Create shipping rates.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::NegativePrice`] if any amount is negative.
    pub fn new(
        standard: Decimal,
        express: Decimal,
        free_threshold: Decimal,
    ) -> Result<Self, ValidationError> {
        for amount in [standard, express, free_threshold] {
            if amount.is_sign_negative() && !amount.is_zero() {
                return Err(ValidationError::NegativePrice(amount));
            }
        }

        Ok(Self {
            standard,
            express,
            free_threshold,
        })
    }

    /// Standard shipping cost
    pub fn standard(&self) -> Decimal {
        self.standard
    }

    /// Express shipping cost
    pub fn express(&self) -> Decimal {
        self.express
    }

    /// Minimum subtotal for free shipping
    pub fn free_threshold(&self) -> Decimal {
        self.free_threshold
    }
}

impl Default for ShippingRates {
    fn default() -> Self {
        Self {
            standard: Decimal::new(999, 2),
            express: Decimal::new(1999, 2),
            free_threshold: Decimal::new(100, 0),
        }
    }
}

/// Quantity times effective price.
///
/// # Errors
///
/// Returns [`ValidationError::AmountOverflow`] if the line total does not fit a [`Decimal`].
pub fn line_total(item: &LineItem) -> Result<Decimal, ValidationError> {
    item.line_total()
}

/// Sum of line totals; zero for no items.
///
/// # Errors
///
/// Returns [`ValidationError::AmountOverflow`] if a line or the sum does not fit a
/// [`Decimal`].
pub fn subtotal(items: &[LineItem]) -> Result<Decimal, ValidationError> {
    items.iter().try_fold(Decimal::ZERO, |sum, item| {
        sum.checked_add(line_total(item)?)
            .ok_or(ValidationError::AmountOverflow)
    })
}

/// Sum of quantities.
pub fn item_count(items: &[LineItem]) -> u32 {
    items
        .iter()
        .fold(0_u32, |count, item| count.saturating_add(item.quantity()))
}

/// Coupon discount on the subtotal; never more than the subtotal.
pub fn discount(subtotal: Decimal, coupon: Option<&Coupon>) -> Decimal {
    coupon.map_or(Decimal::ZERO, |coupon| {
        coupon
            .discount()
            .amount_off(subtotal)
            .clamp(Decimal::ZERO, subtotal.max(Decimal::ZERO))
    })
}

/// Tax on the discounted subtotal.
///
/// # Errors
///
/// Returns [`ValidationError::AmountOverflow`] if the tax does not fit a [`Decimal`].
pub fn tax(
    subtotal: Decimal,
    discount: Decimal,
    rate: TaxRate,
) -> Result<Decimal, ValidationError> {
    subtotal
        .checked_sub(discount)
        .map(|taxable| taxable.max(Decimal::ZERO))
        .and_then(|taxable| taxable.checked_mul(rate.rate()))
        .ok_or(ValidationError::AmountOverflow)
}

/// Whether `subtotal` qualifies for free shipping.
pub fn free_shipping_eligible(subtotal: Decimal, rates: &ShippingRates) -> bool {
    subtotal >= rates.free_threshold
}

/// Shipping cost for `method`.
///
/// # Errors
///
/// Returns [`ValidationError::FreeShippingIneligible`] if `Free` is selected below
/// the threshold.
pub fn shipping(
    subtotal: Decimal,
    method: ShippingMethod,
    rates: &ShippingRates,
) -> Result<Decimal, ValidationError> {
    match method {
        ShippingMethod::Standard => Ok(rates.standard),
        ShippingMethod::Express => Ok(rates.express),
        ShippingMethod::Free if free_shipping_eligible(subtotal, rates) => Ok(Decimal::ZERO),
        ShippingMethod::Free => Err(ValidationError::FreeShippingIneligible {
            subtotal,
            threshold: rates.free_threshold,
        }),
    }
}

/// `subtotal - discount + tax + shipping`, clamped at zero.
///
/// # Errors
///
/// Returns [`ValidationError::AmountOverflow`] if the total does not fit a [`Decimal`].
pub fn total(
    subtotal: Decimal,
    discount: Decimal,
    tax: Decimal,
    shipping: Decimal,
) -> Result<Decimal, ValidationError> {
    let total = subtotal
        .checked_sub(discount)
        .and_then(|total| total.checked_add(tax))
        .and_then(|total| total.checked_add(shipping))
        .ok_or(ValidationError::AmountOverflow)?;

    Ok(total.max(Decimal::ZERO))
}

/// Price a set of line items for checkout.
///
/// # Errors
///
/// Returns a [`ValidationError`] if the shipping method is not available or an
/// amount overflows.
pub fn summarize(
    items: &[LineItem],
    coupon: Option<&Coupon>,
    method: ShippingMethod,
    config: &PricingConfig,
) -> Result<OrderSummary, ValidationError> {
    let subtotal = subtotal(items)?;
    let discount = discount(subtotal, coupon);
    let tax = tax(subtotal, discount, config.tax_rate())?;
    let shipping = shipping(subtotal, method, config.shipping())?;
    let total = total(subtotal, discount, tax, shipping)?;

    Ok(OrderSummary {
        currency: config.currency().iso_alpha_code.to_string(),
        subtotal,
        discount,
        tax,
        shipping,
        total,
        shipping_method: method,
        coupon_code: coupon.map(|coupon| coupon.code().to_string()),
    })
}
