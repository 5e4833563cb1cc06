//! Utils

use clap::Parser;

use crate::{orders::OrderStatus, pricing::ShippingMethod};

/// Arguments for the checkout demo
#[derive(Debug, Parser)]
pub struct CheckoutDemoArgs {
    /// Store configuration file
    #[clap(short, long, default_value = "fixtures/store.yml")]
    pub config: String,

    /// Product catalog file
    #[clap(short = 'p', long, default_value = "fixtures/products/apparel.yml")]
    pub catalog: String,

    /// Coupon code to apply
    #[clap(short = 'k', long)]
    pub coupon: Option<String>,

    /// Shipping method: standard, express or free
    #[clap(short, long, default_value = "standard", value_parser = parse_shipping_method)]
    pub shipping: ShippingMethod,

    /// Directory to persist the cart and orders in; in memory when omitted
    #[clap(short, long)]
    pub data_dir: Option<String>,

    /// Advance the placed order to this status
    #[clap(short, long, value_parser = parse_order_status)]
    pub advance_to: Option<OrderStatus>,
}

fn parse_shipping_method(text: &str) -> Result<ShippingMethod, String> {
    ShippingMethod::ALL
        .into_iter()
        .find(|method| format!("{method:?}").eq_ignore_ascii_case(text.trim()))
        .ok_or_else(|| format!("unknown shipping method: {text}"))
}

fn parse_order_status(text: &str) -> Result<OrderStatus, String> {
    text.parse().map_err(|err| format!("{err}"))
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn parses_defaults() -> TestResult {
        let args = CheckoutDemoArgs::try_parse_from(["checkout"])?;

        assert_eq!(args.shipping, ShippingMethod::Standard);
        assert_eq!(args.config, "fixtures/store.yml");
        assert!(args.coupon.is_none());

        Ok(())
    }

    #[test]
    fn parses_method_and_status() -> TestResult {
        let args = CheckoutDemoArgs::try_parse_from([
            "checkout",
            "--shipping",
            "Express",
            "--advance-to",
            "shipped",
            "-k",
            "welcome10",
        ])?;

        assert_eq!(args.shipping, ShippingMethod::Express);
        assert_eq!(args.advance_to, Some(OrderStatus::Shipped));
        assert_eq!(args.coupon.as_deref(), Some("welcome10"));

        Ok(())
    }

    #[test]
    fn rejects_unknown_method() {
        assert!(CheckoutDemoArgs::try_parse_from(["checkout", "-s", "drone"]).is_err());
    }
}
