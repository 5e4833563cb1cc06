//! Store Configuration

use std::{fs, path::Path, str::FromStr};

use rust_decimal::Decimal;
use rusty_money::iso::{Currency, USD};
use serde::Deserialize;
use thiserror::Error;

use crate::{
    discounts::{Coupon, CouponBook, DiscountPercent, parse_percent},
    money::parse_currency,
    pricing::{ShippingRates, TaxRate},
    validation::ValidationError,
};

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error reading the configuration file
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("failed to parse config YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Unknown currency code
    #[error("unknown currency code: {0}")]
    UnknownCurrency(String),

    /// An amount could not be parsed as a decimal
    #[error("invalid amount for {field}: {value}")]
    InvalidAmount {
        /// Configuration key
        field: &'static str,
        /// Raw value
        value: String,
    },

    /// A percentage could not be parsed
    #[error("invalid percentage: {0}")]
    InvalidPercentage(String),

    /// Two coupons share a code
    #[error("duplicate coupon code: {0}")]
    DuplicateCoupon(String),

    /// A parsed value failed validation
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Currency, tax and shipping settings used by the pricing engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricingConfig {
    currency: &'static Currency,
    tax_rate: TaxRate,
    shipping: ShippingRates,
}

impl PricingConfig {
    /// Create a pricing configuration.
    pub fn new(currency: &'static Currency, tax_rate: TaxRate, shipping: ShippingRates) -> Self {
        Self {
            currency,
            tax_rate,
            shipping,
        }
    }

    /// Store currency
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Sales tax rate
    pub fn tax_rate(&self) -> TaxRate {
        self.tax_rate
    }

    /// Shipping rates
    pub fn shipping(&self) -> &ShippingRates {
        &self.shipping
    }
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self::new(USD, TaxRate::default(), ShippingRates::default())
    }
}

/// Full store configuration.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Pricing settings
    pub pricing: PricingConfig,

    /// Redeemable coupons
    pub coupons: CouponBook,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            pricing: PricingConfig::default(),
            coupons: default_coupons(),
        }
    }
}

impl StoreConfig {
    /// Load configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or any value is invalid.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;

        Self::from_yaml_str(&contents)
    }

    /// Load configuration from a YAML document. Missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be parsed or any value is invalid.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let file: StoreConfigFile = serde_norway::from_str(yaml)?;
        let defaults = PricingConfig::default();

        let currency = match file.currency.as_deref() {
            Some(code) => parse_currency(code)
                .ok_or_else(|| ConfigError::UnknownCurrency(code.to_string()))?,
            None => defaults.currency,
        };

        let tax_rate = match file.tax_rate.as_deref() {
            Some(value) => TaxRate::new(parse_amount("tax_rate", value)?)?,
            None => defaults.tax_rate,
        };

        let shipping = match file.shipping {
            Some(shipping) => shipping.into_rates(defaults.shipping)?,
            None => defaults.shipping,
        };

        let coupons = match file.coupons {
            Some(coupons) => coupon_book(coupons)?,
            None => default_coupons(),
        };

        Ok(Self {
            pricing: PricingConfig::new(currency, tax_rate, shipping),
            coupons,
        })
    }
}

/// Store configuration file
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct StoreConfigFile {
    currency: Option<String>,
    tax_rate: Option<String>,
    shipping: Option<ShippingFile>,
    coupons: Option<Vec<CouponFile>>,
}

/// Shipping section
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ShippingFile {
    standard: Option<String>,
    express: Option<String>,
    free_threshold: Option<String>,
}

impl ShippingFile {
    fn into_rates(self, defaults: ShippingRates) -> Result<ShippingRates, ConfigError> {
        let standard = optional_amount("shipping.standard", self.standard.as_deref())?
            .unwrap_or(defaults.standard());
        let express = optional_amount("shipping.express", self.express.as_deref())?
            .unwrap_or(defaults.express());
        let free_threshold =
            optional_amount("shipping.free_threshold", self.free_threshold.as_deref())?
                .unwrap_or(defaults.free_threshold());

        Ok(ShippingRates::new(standard, express, free_threshold)?)
    }
}

/// Coupon entry
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CouponFile {
    code: String,

    /// e.g. `"10%"`
    discount: String,
}

fn parse_amount(field: &'static str, value: &str) -> Result<Decimal, ConfigError> {
    Decimal::from_str(value.trim()).map_err(|_err| ConfigError::InvalidAmount {
        field,
        value: value.to_string(),
    })
}

fn optional_amount(
    field: &'static str,
    value: Option<&str>,
) -> Result<Option<Decimal>, ConfigError> {
    value.map(|value| parse_amount(field, value)).transpose()
}

fn coupon_book(entries: Vec<CouponFile>) -> Result<CouponBook, ConfigError> {
    let mut book = CouponBook::new();

    for entry in entries {
        let discount = parse_percent(&entry.discount)
            .ok_or_else(|| ConfigError::InvalidPercentage(entry.discount.clone()))?;

        let coupon = Coupon::new(&entry.code, discount);
        let code = coupon.code().to_string();

        if book.insert(coupon).is_some() {
            return Err(ConfigError::DuplicateCoupon(code));
        }
    }

    Ok(book)
}

fn default_coupons() -> CouponBook {
    [
        Coupon::new("WELCOME10", DiscountPercent::from_points(10)),
        Coupon::new("SUMMER20", DiscountPercent::from_points(20)),
    ]
    .into_iter()
    .collect()
}
