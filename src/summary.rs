//! Order Summary

use std::io;

use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tabled::{
    builder::Builder,
    grid::config::HorizontalLine,
    settings::{
        Alignment, Color, Style, Theme,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{
    items::LineItem,
    money::{parse_currency, to_money},
    pricing::{ShippingMethod, ShippingRates},
    validation::ValidationError,
};

/// Errors that can occur when displaying a summary.
#[derive(Debug, Error)]
pub enum SummaryError {
    /// The stored currency code is not supported.
    #[error("unknown currency code: {0}")]
    UnknownCurrency(String),

    /// An amount does not fit in minor units.
    #[error("amount {0} is too large to display")]
    AmountOverflow(Decimal),

    /// A line could not be priced.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Writing the rendered table failed.
    #[error("failed to write summary: {0}")]
    Io(#[from] io::Error),
}

/// Finalized pricing snapshot for one checkout.
///
/// Amounts are kept at full precision; use [`OrderSummary::display`] for rounded
/// values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSummary {
    /// ISO currency code
    pub currency: String,

    /// Sum of line totals
    pub subtotal: Decimal,

    /// Coupon discount
    pub discount: Decimal,

    /// Tax on the discounted subtotal
    pub tax: Decimal,

    /// Shipping cost
    pub shipping: Decimal,

    /// Amount due
    pub total: Decimal,

    /// Shipping method the cost was computed for
    pub shipping_method: ShippingMethod,

    /// Coupon applied, if any
    pub coupon_code: Option<String>,
}

/// An [`OrderSummary`] rounded to the currency's minor unit.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayedSummary {
    /// Sum of line totals
    pub subtotal: Money<'static, Currency>,

    /// Coupon discount
    pub discount: Money<'static, Currency>,

    /// Tax
    pub tax: Money<'static, Currency>,

    /// Shipping cost
    pub shipping: Money<'static, Currency>,

    /// Amount due
    pub total: Money<'static, Currency>,
}

impl OrderSummary {
    /// The summary's currency.
    ///
    /// # Errors
    ///
    /// Returns [`SummaryError::UnknownCurrency`] if the stored code is unsupported.
    pub fn currency(&self) -> Result<&'static Currency, SummaryError> {
        parse_currency(&self.currency)
            .ok_or_else(|| SummaryError::UnknownCurrency(self.currency.clone()))
    }

    /// Round every amount half-up to the currency's minor unit.
    ///
    /// # Errors
    ///
    /// Returns a [`SummaryError`] if the currency is unsupported or an amount overflows.
    pub fn display(&self) -> Result<DisplayedSummary, SummaryError> {
        let currency = self.currency()?;
        let money = |amount: Decimal| {
            to_money(amount, currency).ok_or(SummaryError::AmountOverflow(amount))
        };

        Ok(DisplayedSummary {
            subtotal: money(self.subtotal)?,
            discount: money(self.discount)?,
            tax: money(self.tax)?,
            shipping: money(self.shipping)?,
            total: money(self.total)?,
        })
    }

    /// How much more must be spent to qualify for free shipping, if anything.
    pub fn free_shipping_shortfall(&self, rates: &ShippingRates) -> Option<Decimal> {
        (self.subtotal < rates.free_threshold())
            .then(|| rates.free_threshold() - self.subtotal)
    }

    /// Render the line items and totals as a table.
    ///
    /// # Errors
    ///
    /// Returns a [`SummaryError`] if an amount cannot be displayed or writing fails.
    pub fn write_to(
        &self,
        mut out: impl io::Write,
        items: &[LineItem],
    ) -> Result<(), SummaryError> {
        let currency = self.currency()?;
        let displayed = self.display()?;

        let mut builder = Builder::default();

        builder.push_record([
            "",
            "Item",
            "Size",
            "Color",
            "Qty",
            "Unit Price",
            "Line Total",
        ]);

        for (idx, item) in items.iter().enumerate() {
            let unit = to_money(item.effective_price(), currency)
                .ok_or(SummaryError::AmountOverflow(item.effective_price()))?;
            let line_total = item.line_total()?;
            let line = to_money(line_total, currency)
                .ok_or(SummaryError::AmountOverflow(line_total))?;

            builder.push_record([
                format!("#{:<3}", idx + 1),
                item.name().to_string(),
                item.size().unwrap_or_default().to_string(),
                item.color().unwrap_or_default().to_string(),
                item.quantity().to_string(),
                format!("{unit}"),
                format!("{line}"),
            ]);
        }

        let mut table = builder.build();
        let mut theme = Theme::from(Style::modern_rounded());

        theme.remove_horizontal_lines();
        theme.insert_horizontal_line(
            1,
            HorizontalLine::new(Some('─'), Some('┼'), Some('├'), Some('┤')),
        );

        table.with(theme);
        table.modify(Rows::first(), Color::BOLD);
        table.modify(Columns::new(4..7), Alignment::right());

        writeln!(out, "\n{table}")?;

        let mut lines: SmallVec<[(String, String); 6]> = SmallVec::new();

        lines.push(("Subtotal:".to_string(), format!("{}", displayed.subtotal)));

        if let Some(code) = &self.coupon_code {
            lines.push((
                format!("Discount ({code}):"),
                format!("-{}", displayed.discount),
            ));
        }

        lines.push(("Tax:".to_string(), format!("{}", displayed.tax)));
        lines.push((
            format!("{}:", self.shipping_method.label()),
            if self.shipping.is_zero() {
                "Free".to_string()
            } else {
                format!("{}", displayed.shipping)
            },
        ));
        lines.push(("Total:".to_string(), format!("{}", displayed.total)));

        let label_width = lines
            .iter()
            .map(|(label, _)| label.chars().count())
            .max()
            .unwrap_or(0);

        let value_width = lines
            .iter()
            .map(|(_, value)| value.chars().count())
            .max()
            .unwrap_or(0);

        for (label, value) in &lines {
            writeln!(out, " {label:<label_width$}  {value:>value_width$}")?;
        }

        writeln!(out)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use rusty_money::iso::USD;
    use testresult::TestResult;

    use crate::{discounts::DiscountPercent, items::LineKey, products::ProductId};

    use super::*;

    fn summary() -> Result<OrderSummary, rust_decimal::Error> {
        Ok(OrderSummary {
            currency: "USD".to_string(),
            subtotal: Decimal::from(180),
            discount: Decimal::from(18),
            tax: Decimal::from_str("12.96")?,
            shipping: Decimal::from_str("9.99")?,
            total: Decimal::from_str("184.95")?,
            shipping_method: ShippingMethod::Standard,
            coupon_code: Some("WELCOME10".to_string()),
        })
    }

    #[test]
    fn display_rounds_to_cents() -> TestResult {
        let mut summary = summary()?;
        summary.tax = Decimal::from_str("12.965")?;

        let displayed = summary.display()?;

        assert_eq!(displayed.tax, Money::from_minor(1297, USD));
        assert_eq!(displayed.total, Money::from_minor(18_495, USD));

        Ok(())
    }

    #[test]
    fn display_unknown_currency_errors() -> TestResult {
        let mut summary = summary()?;
        summary.currency = "XYZ".to_string();

        assert!(matches!(
            summary.display(),
            Err(SummaryError::UnknownCurrency(code)) if code == "XYZ"
        ));

        Ok(())
    }

    #[test]
    fn free_shipping_shortfall_reports_gap() -> TestResult {
        let mut summary = summary()?;
        let rates = ShippingRates::default();

        assert_eq!(summary.free_shipping_shortfall(&rates), None);

        summary.subtotal = Decimal::from(60);

        assert_eq!(summary.free_shipping_shortfall(&rates), Some(Decimal::from(40)));

        Ok(())
    }

    #[test]
    fn write_to_renders_items_and_totals() -> TestResult {
        let items = [LineItem::new(
            LineKey::new(ProductId::from("product-1"), Some("M"), Some("#000000")),
            "Minimal Slim Fit T-shirt",
            Decimal::from(100),
            DiscountPercent::new(Decimal::TEN)?,
            2,
        )?];

        let mut out = Vec::new();
        summary()?.write_to(&mut out, &items)?;

        let rendered = String::from_utf8(out)?;

        assert!(rendered.contains("Minimal Slim Fit T-shirt"), "{rendered}");
        assert!(rendered.contains("Discount (WELCOME10):"), "{rendered}");
        assert!(rendered.contains("Standard Shipping:"), "{rendered}");
        assert!(rendered.contains("184.95"), "{rendered}");

        Ok(())
    }
}
