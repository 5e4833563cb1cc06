//! Items

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{discounts::DiscountPercent, products::ProductId, validation::ValidationError};

/// Identifies one line within a cart: the same product in a different size or
/// color is a different line.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LineKey {
    /// Product identifier
    pub product_id: ProductId,

    /// Selected size, if any
    pub size: Option<String>,

    /// Selected color code, if any
    pub color: Option<String>,
}

impl LineKey {
    /// Create a line key.
    pub fn new(product_id: ProductId, size: Option<&str>, color: Option<&str>) -> Self {
        Self {
            product_id,
            size: size.map(str::to_string),
            color: color.map(str::to_string),
        }
    }
}

/// One product selection in a cart or order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    key: LineKey,
    name: String,
    unit_price: Decimal,
    discount: DiscountPercent,
    quantity: u32,
}

impl LineItem {
    /// Create a line item.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] for a zero quantity or a negative price.
    pub fn new(
        key: LineKey,
        name: impl Into<String>,
        unit_price: Decimal,
        discount: DiscountPercent,
        quantity: u32,
    ) -> Result<Self, ValidationError> {
        if quantity == 0 {
            return Err(ValidationError::ZeroQuantity);
        }

        if unit_price.is_sign_negative() && !unit_price.is_zero() {
            return Err(ValidationError::NegativePrice(unit_price));
        }

        Ok(Self {
            key,
            name: name.into(),
            unit_price,
            discount,
            quantity,
        })
    }

    /// Line key (product, size, color)
    pub fn key(&self) -> &LineKey {
        &self.key
    }

    /// Product identifier
    pub fn product_id(&self) -> &ProductId {
        &self.key.product_id
    }

    /// Selected size
    pub fn size(&self) -> Option<&str> {
        self.key.size.as_deref()
    }

    /// Selected color code
    pub fn color(&self) -> Option<&str> {
        self.key.color.as_deref()
    }

    /// Product name at the time the line was created
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Catalog price per unit, before the line's own discount
    pub fn unit_price(&self) -> Decimal {
        self.unit_price
    }

    /// The line's own discount
    pub fn discount(&self) -> DiscountPercent {
        self.discount
    }

    /// Number of units
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Whether this line is identified by `key`.
    pub fn matches(&self, key: &LineKey) -> bool {
        self.key == *key
    }

    /// Unit price after the line's own discount, at full precision.
    pub fn effective_price(&self) -> Decimal {
        if self.discount.is_zero() {
            self.unit_price
        } else {
            self.discount.apply_to(self.unit_price)
        }
    }

    /// Effective price times quantity, at full precision.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::AmountOverflow`] if the product does not fit a [`Decimal`].
    pub fn line_total(&self) -> Result<Decimal, ValidationError> {
        self.effective_price()
            .checked_mul(Decimal::from(self.quantity))
            .ok_or(ValidationError::AmountOverflow)
    }

    /// Replace the quantity.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::ZeroQuantity`] for zero; use removal instead.
    pub fn set_quantity(&mut self, quantity: u32) -> Result<(), ValidationError> {
        if quantity == 0 {
            return Err(ValidationError::ZeroQuantity);
        }

        self.quantity = quantity;

        Ok(())
    }

    /// Add units to the line, saturating at `u32::MAX`.
    pub(crate) fn add_quantity(&mut self, quantity: u32) {
        self.quantity = self.quantity.saturating_add(quantity);
    }
}
