//! Pricing engine
//!
//! One line {price 100, 10% off, qty 2} has a line total and subtotal of 180.
//!
//! With a 10% coupon on that subtotal:
//!    - Discount: 18
//!    - Tax: 8% of 162 = 12.96
//!    - Standard shipping: 9.99
//!    - Total: 162 + 12.96 + 9.99 = 184.95

use std::str::FromStr;

use rust_decimal::Decimal;
use testresult::TestResult;

use atelier::{
    config::{PricingConfig, StoreConfig},
    discounts::{Coupon, DiscountPercent},
    items::{LineItem, LineKey},
    pricing::{self, ShippingMethod, ShippingRates, TaxRate},
    products::ProductId,
    validation::ValidationError,
};

fn line(id: &str, price: &str, discount: u8, quantity: u32) -> TestResult<LineItem> {
    Ok(LineItem::new(
        LineKey::new(ProductId::from(id), None, None),
        id,
        Decimal::from_str(price)?,
        DiscountPercent::from_points(discount),
        quantity,
    )?)
}

#[test]
fn line_discount_applies_before_quantity() -> TestResult {
    let item = line("product-1", "100", 10, 2)?;
    let items = [item.clone()];

    assert_eq!(pricing::line_total(&item)?, Decimal::from(180));
    assert_eq!(pricing::subtotal(&items)?, Decimal::from(180));

    Ok(())
}

#[test]
fn coupon_reduces_taxable_amount_before_standard_shipping() -> TestResult {
    let config = StoreConfig::default();
    let items = [line("product-1", "100", 10, 2)?];
    let coupon = config.coupons.redeem("WELCOME10")?;

    let summary = pricing::summarize(
        &items,
        Some(coupon),
        ShippingMethod::Standard,
        &config.pricing,
    )?;

    assert_eq!(summary.subtotal, Decimal::from(180));
    assert_eq!(summary.discount, Decimal::from(18));
    assert_eq!(summary.tax, Decimal::from_str("12.96")?);
    assert_eq!(summary.shipping, Decimal::from_str("9.99")?);
    assert_eq!(summary.total, Decimal::from_str("184.95")?);
    assert_eq!(summary.display()?.total.to_string(), "$184.95");

    Ok(())
}

#[test]
fn free_shipping_below_threshold_is_rejected() -> TestResult {
    let items = [line("product-9", "39.99", 0, 2)?];

    let result = pricing::summarize(
        &items,
        None,
        ShippingMethod::Free,
        &PricingConfig::default(),
    );

    assert_eq!(
        result,
        Err(ValidationError::FreeShippingIneligible {
            subtotal: Decimal::from_str("79.98")?,
            threshold: Decimal::from(100),
        })
    );

    Ok(())
}

#[test]
fn free_shipping_uses_pre_coupon_subtotal() -> TestResult {
    let items = [line("product-1", "100", 0, 1)?];
    let coupon = Coupon::new("SUMMER20", DiscountPercent::from_points(20));

    let summary = pricing::summarize(
        &items,
        Some(&coupon),
        ShippingMethod::Free,
        &PricingConfig::default(),
    )?;

    assert_eq!(summary.shipping, Decimal::ZERO);
    assert_eq!(summary.total, Decimal::from_str("86.4")?);

    Ok(())
}

#[test]
fn subtotal_is_sum_of_line_totals() -> TestResult {
    let items = [
        line("product-1", "49.99", 0, 3)?,
        line("product-2", "129.99", 15, 1)?,
        line("product-6", "219.99", 20, 2)?,
        line("product-9", "0.01", 33, 7)?,
    ];

    let expected = items
        .iter()
        .map(pricing::line_total)
        .sum::<Result<Decimal, _>>()?;

    assert_eq!(pricing::subtotal(&items)?, expected);
    assert_eq!(pricing::item_count(&items), 13);

    Ok(())
}

#[test]
fn discount_never_exceeds_subtotal() -> TestResult {
    let subtotal = Decimal::from_str("259.97")?;

    for points in [0_u8, 1, 10, 33, 50, 99, 100] {
        let coupon = Coupon::new("TEST", DiscountPercent::from_points(points));
        let discount = pricing::discount(subtotal, Some(&coupon));

        assert!(discount <= subtotal, "{points}% took {discount} off {subtotal}");
        assert!(discount >= Decimal::ZERO, "{points}% gave a negative discount");
    }

    Ok(())
}

#[test]
fn total_is_monotonic_in_each_component() -> TestResult {
    let subtotal = Decimal::from(200);
    let discount = Decimal::from(20);
    let tax = Decimal::from_str("14.40")?;
    let shipping = Decimal::from_str("9.99")?;
    let step = Decimal::from_str("0.01")?;

    let base = pricing::total(subtotal, discount, tax, shipping)?;

    assert!(pricing::total(subtotal, discount, tax, shipping + step)? >= base, "shipping");
    assert!(pricing::total(subtotal, discount, tax + step, shipping)? >= base, "tax");
    assert!(pricing::total(subtotal, discount + step, tax, shipping)? <= base, "discount");

    Ok(())
}

#[test]
fn full_coupon_leaves_only_shipping() -> TestResult {
    let items = [line("product-1", "49.99", 0, 1)?];
    let coupon = Coupon::new("STAFF", DiscountPercent::from_points(100));

    let summary = pricing::summarize(
        &items,
        Some(&coupon),
        ShippingMethod::Express,
        &PricingConfig::default(),
    )?;

    assert_eq!(summary.tax, Decimal::ZERO);
    assert_eq!(summary.total, Decimal::from_str("19.99")?);

    Ok(())
}

#[test]
fn custom_rates_flow_through_summary() -> TestResult {
    let config = PricingConfig::new(
        rusty_money::iso::GBP,
        TaxRate::new(Decimal::from_str("0.2")?)?,
        ShippingRates::new(
            Decimal::from_str("3.50")?,
            Decimal::from(7),
            Decimal::from(50),
        )?,
    );
    let items = [line("product-3", "25", 0, 2)?];

    let summary = pricing::summarize(&items, None, ShippingMethod::Free, &config)?;

    assert_eq!(summary.currency, "GBP");
    assert_eq!(summary.tax, Decimal::from(10));
    assert_eq!(summary.total, Decimal::from(60));

    Ok(())
}
