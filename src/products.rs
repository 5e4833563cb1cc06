//! Products

use std::{
    fmt,
    fs,
    path::Path,
    str::FromStr,
};

use indexmap::IndexMap;
use rust_decimal::Decimal;
use rustc_hash::FxBuildHasher;
use rusty_money::iso::Currency;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use thiserror::Error;

use crate::{
    discounts::{DiscountPercent, parse_percent},
    money::parse_currency,
};

/// Product identifier, e.g. `product-1`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    /// Borrow the identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ProductId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ProductId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A catalog product record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    /// Product identifier
    pub id: ProductId,

    /// Product name
    pub name: String,

    /// Category slug
    pub category: String,

    /// List price in major units
    pub price: Decimal,

    /// Product's own markdown
    pub discount: DiscountPercent,

    /// Sizes on offer; empty when the product is one-size
    pub sizes: SmallVec<[String; 6]>,

    /// Color codes on offer
    pub colors: SmallVec<[String; 6]>,

    /// Units in stock
    pub stock: u32,
}

impl Product {
    /// Whether the product offers `size`.
    pub fn offers_size(&self, size: &str) -> bool {
        self.sizes.iter().any(|offered| offered == size)
    }

    /// The catalog spelling of `color`, matched case-insensitively, if offered.
    pub fn offered_color(&self, color: &str) -> Option<&str> {
        self.colors
            .iter()
            .find(|offered| offered.eq_ignore_ascii_case(color))
            .map(String::as_str)
    }
}

/// Source of product records.
pub trait Catalog {
    /// Look up a product by identifier.
    fn product(&self, id: &ProductId) -> Option<&Product>;
}

/// Catalog loading errors.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// IO error reading a catalog file
    #[error("failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("failed to parse catalog YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("invalid price format: {0}")]
    InvalidPrice(String),

    /// Invalid percentage format
    #[error("invalid percentage format: {0}")]
    InvalidPercentage(String),

    /// Unknown currency code
    #[error("unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Products priced in different currencies
    #[error("currency mismatch: expected {0}, found {1}")]
    CurrencyMismatch(&'static str, &'static str),
}

/// In-memory product catalog.
#[derive(Debug, Clone, Default)]
pub struct ProductCatalog {
    products: IndexMap<ProductId, Product, FxBuildHasher>,
    currency: Option<&'static Currency>,
}

impl ProductCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a product. Listing order follows first insertion.
    pub fn insert(&mut self, product: Product) {
        self.products.insert(product.id.clone(), product);
    }

    /// Load a catalog from a YAML fixture file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if prices mix currencies.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let contents = fs::read_to_string(path)?;

        Self::from_yaml_str(&contents)
    }

    /// Load a catalog from a YAML document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be parsed, or if prices mix currencies.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, CatalogError> {
        let fixture: CatalogFixture = serde_norway::from_str(yaml)?;
        let mut catalog = Self::new();

        for (id, product_fixture) in fixture.products {
            let (price, currency) = parse_price(&product_fixture.price)?;

            match catalog.currency {
                Some(existing) if existing != currency => {
                    return Err(CatalogError::CurrencyMismatch(
                        existing.iso_alpha_code,
                        currency.iso_alpha_code,
                    ));
                }
                Some(_) => {}
                None => catalog.currency = Some(currency),
            }

            let discount = match product_fixture.discount.as_deref() {
                Some(text) => parse_percent(text)
                    .ok_or_else(|| CatalogError::InvalidPercentage(text.to_string()))?,
                None => DiscountPercent::ZERO,
            };

            catalog.insert(Product {
                id: ProductId::from(id),
                name: product_fixture.name,
                category: product_fixture.category,
                price,
                discount,
                sizes: product_fixture.sizes,
                colors: product_fixture.colors,
                stock: product_fixture.stock,
            });
        }

        Ok(catalog)
    }

    /// Currency the catalog is priced in, once any product has been loaded from a fixture.
    pub fn currency(&self) -> Option<&'static Currency> {
        self.currency
    }

    /// Iterate products in listing order.
    pub fn iter(&self) -> impl Iterator<Item = &Product> {
        self.products.values()
    }

    /// Products in a category.
    pub fn by_category<'a>(&'a self, category: &'a str) -> impl Iterator<Item = &'a Product> {
        self.iter()
            .filter(move |product| product.category.eq_ignore_ascii_case(category))
    }

    /// Products carrying their own markdown.
    pub fn discounted(&self) -> impl Iterator<Item = &Product> {
        self.iter().filter(|product| !product.discount.is_zero())
    }

    /// Case-insensitive search on name and category.
    pub fn search(&self, query: &str) -> Vec<&Product> {
        let needle = query.trim().to_lowercase();

        if needle.is_empty() {
            return Vec::new();
        }

        self.iter()
            .filter(|product| {
                product.name.to_lowercase().contains(&needle)
                    || product.category.to_lowercase().contains(&needle)
            })
            .collect()
    }

    /// Number of products
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Whether the catalog has no products
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

impl Catalog for ProductCatalog {
    fn product(&self, id: &ProductId) -> Option<&Product> {
        self.products.get(id)
    }
}

/// Wrapper for products in YAML
#[derive(Debug, Deserialize)]
struct CatalogFixture {
    products: IndexMap<String, ProductFixture>,
}

/// Product Fixture
#[derive(Debug, Deserialize)]
struct ProductFixture {
    name: String,

    #[serde(default)]
    category: String,

    /// e.g. `"49.99 USD"`
    price: String,

    /// e.g. `"10%"`
    #[serde(default)]
    discount: Option<String>,

    #[serde(default)]
    sizes: SmallVec<[String; 6]>,

    #[serde(default)]
    colors: SmallVec<[String; 6]>,

    #[serde(default)]
    stock: u32,
}

/// Parse a price string (e.g. `"2.99 GBP"`) into an amount and currency.
///
/// # Errors
///
/// Returns an error if the string is not `AMOUNT CURRENCY`, the amount is not a
/// non-negative decimal, or the currency is not supported.
pub fn parse_price(text: &str) -> Result<(Decimal, &'static Currency), CatalogError> {
    let mut parts = text.split_whitespace();

    let (Some(amount), Some(code), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(CatalogError::InvalidPrice(format!(
            "expected format 'AMOUNT CURRENCY', got: {text}"
        )));
    };

    let amount = Decimal::from_str(amount)
        .map_err(|_err| CatalogError::InvalidPrice(text.to_string()))?;

    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(CatalogError::InvalidPrice(text.to_string()));
    }

    let currency =
        parse_currency(code).ok_or_else(|| CatalogError::UnknownCurrency(code.to_string()))?;

    Ok((amount, currency))
}
