//! Validation

use rust_decimal::Decimal;
use thiserror::Error;

/// Invalid input to a pricing, cart, order or checkout operation.
///
/// These never leave state half-changed: the operation that produced one has not
/// mutated anything.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// Quantities must be at least one.
    #[error("quantity must be at least 1")]
    ZeroQuantity,

    /// Discount percentages must lie within 0..=100.
    #[error("discount percentage {0} is outside 0..=100")]
    DiscountOutOfRange(Decimal),

    /// Prices cannot be negative.
    #[error("price {0} is negative")]
    NegativePrice(Decimal),

    /// Tax rates cannot be negative.
    #[error("tax rate {0} is negative")]
    NegativeTaxRate(Decimal),

    /// Coupon code is not known to the coupon book.
    #[error("coupon {0:?} is invalid")]
    UnknownCoupon(String),

    /// Free shipping was selected below the qualifying threshold.
    #[error("free shipping requires a subtotal of at least {threshold}, got {subtotal}")]
    FreeShippingIneligible {
        /// Subtotal at the time of selection
        subtotal: Decimal,
        /// Minimum subtotal for free shipping
        threshold: Decimal,
    },

    /// An order needs at least one line item.
    #[error("order has no items")]
    EmptyOrder,

    /// An order needs an owning user.
    #[error("order has no user")]
    MissingUser,

    /// The product offers sizes but none was selected.
    #[error("product {0} requires a size")]
    SizeRequired(String),

    /// The selected size is not offered for the product.
    #[error("size {size:?} is not available for product {product}")]
    UnavailableSize {
        /// Product identifier
        product: String,
        /// Requested size
        size: String,
    },

    /// The selected color is not offered for the product.
    #[error("color {color:?} is not available for product {product}")]
    UnavailableColor {
        /// Product identifier
        product: String,
        /// Requested color code
        color: String,
    },

    /// Not enough stock to satisfy the requested quantity.
    #[error("only {available} of product {product} in stock, {requested} requested")]
    InsufficientStock {
        /// Product identifier
        product: String,
        /// Total quantity that would be in the cart
        requested: u32,
        /// Units in stock
        available: u32,
    },

    /// Card suffix must be exactly four digits.
    #[error("card suffix {0:?} is not four digits")]
    InvalidLastFour(String),

    /// An amount grew past what a decimal can hold.
    #[error("amount is too large to price")]
    AmountOverflow,

    /// Tracking numbers cannot be blank.
    #[error("tracking number is blank")]
    BlankTrackingNumber,
}
