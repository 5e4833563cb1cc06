//! Cart
//!
//! The mutable line collection for one session. Totals are never cached: every
//! read goes back through [`crate::pricing`].

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::debug;

use crate::{
    config::PricingConfig,
    discounts::{Coupon, CouponBook},
    items::{LineItem, LineKey},
    pricing::{self, ShippingMethod},
    products::{Catalog, Product, ProductId},
    storage::{KeyValueStore, StorageError, load_json, save_json},
    summary::OrderSummary,
    validation::ValidationError,
};

/// Storage key holding the persisted cart lines.
pub const CART_KEY: &str = "cart";

/// Errors that can occur when changing a cart.
#[derive(Debug, Error)]
pub enum CartError {
    /// Invalid input; the cart is unchanged.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The product is not in the catalog.
    #[error("product {0} not found")]
    UnknownProduct(ProductId),

    /// The cart could not be loaded or saved; the cart is unchanged.
    #[error("failed to persist cart: {0}")]
    Storage(#[from] StorageError),
}

/// Partial changes to an existing line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LineItemUpdate {
    /// New quantity; must be at least one
    pub quantity: Option<u32>,
}

impl LineItemUpdate {
    /// An update that only sets the quantity.
    pub fn quantity(quantity: u32) -> Self {
        Self {
            quantity: Some(quantity),
        }
    }
}

/// A shopping cart backed by a [`KeyValueStore`].
#[derive(Debug)]
pub struct Cart<S> {
    store: S,
    items: Vec<LineItem>,
    coupon: Option<Coupon>,
}

impl<S: KeyValueStore> Cart<S> {
    /// Load the cart persisted in `store`, or start empty.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Storage`] if the stored cart cannot be read or decoded.
    pub fn load(store: S) -> Result<Self, CartError> {
        let items: Vec<LineItem> = load_json(&store, CART_KEY)?.unwrap_or_default();

        debug!(lines = items.len(), "loaded cart");

        Ok(Self {
            store,
            items,
            coupon: None,
        })
    }

    /// Add `quantity` units of `product`, merging with an existing line for the
    /// same size and color.
    ///
    /// # Errors
    ///
    /// Returns a [`CartError`] if the quantity is zero, the selection is not
    /// offered, there is not enough stock, or the cart cannot be saved.
    pub fn add_item(
        &mut self,
        product: &Product,
        quantity: u32,
        size: Option<&str>,
        color: Option<&str>,
    ) -> Result<LineKey, CartError> {
        if quantity == 0 {
            return Err(ValidationError::ZeroQuantity.into());
        }

        let key = selection_key(product, size, color)?;

        let in_cart = self
            .items
            .iter()
            .filter(|item| item.product_id() == &product.id)
            .fold(0_u32, |count, item| count.saturating_add(item.quantity()));

        let requested = in_cart.saturating_add(quantity);

        if requested > product.stock {
            return Err(ValidationError::InsufficientStock {
                product: product.id.to_string(),
                requested,
                available: product.stock,
            }
            .into());
        }

        let mut items = self.items.clone();

        if let Some(existing) = items.iter_mut().find(|item| item.matches(&key)) {
            existing.add_quantity(quantity);
        } else {
            items.push(LineItem::new(
                key.clone(),
                product.name.clone(),
                product.price,
                product.discount,
                quantity,
            )?);
        }

        self.commit(items)?;

        debug!(product = %product.id, quantity, "added item to cart");

        Ok(key)
    }

    /// Look `id` up in `catalog` and add it.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::UnknownProduct`] if the catalog has no such product, or
    /// any error from [`Cart::add_item`].
    pub fn add_from_catalog(
        &mut self,
        catalog: &impl Catalog,
        id: &ProductId,
        quantity: u32,
        size: Option<&str>,
        color: Option<&str>,
    ) -> Result<LineKey, CartError> {
        let product = catalog
            .product(id)
            .ok_or_else(|| CartError::UnknownProduct(id.clone()))?;

        self.add_item(product, quantity, size, color)
    }

    /// Apply `update` to the line identified by `key`.
    ///
    /// Returns `false` without saving if there is no such line.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::ZeroQuantity`] for a zero quantity (remove the
    /// line instead), or [`CartError::Storage`] if the cart cannot be saved.
    pub fn update_item(
        &mut self,
        key: &LineKey,
        update: LineItemUpdate,
    ) -> Result<bool, CartError> {
        let mut items = self.items.clone();

        let Some(item) = items.iter_mut().find(|item| item.matches(key)) else {
            return Ok(false);
        };

        if let Some(quantity) = update.quantity {
            item.set_quantity(quantity)?;
        }

        self.commit(items)?;

        debug!(product = %key.product_id, "updated cart line");

        Ok(true)
    }

    /// Remove the line identified by `key`.
    ///
    /// Returns `false` without saving if there is no such line.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Storage`] if the cart cannot be saved.
    pub fn remove_item(&mut self, key: &LineKey) -> Result<bool, CartError> {
        if !self.items.iter().any(|item| item.matches(key)) {
            return Ok(false);
        }

        let items = self
            .items
            .iter()
            .filter(|item| !item.matches(key))
            .cloned()
            .collect();

        self.commit(items)?;

        debug!(product = %key.product_id, "removed cart line");

        Ok(true)
    }

    /// Empty the cart and drop any coupon.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Storage`] if the cart cannot be saved.
    pub fn clear(&mut self) -> Result<(), CartError> {
        self.commit(Vec::new())?;
        self.coupon = None;

        debug!("cleared cart");

        Ok(())
    }

    /// Redeem `code` against `coupons`, replacing any active coupon.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::UnknownCoupon`] for unknown codes; the active
    /// coupon is left as it was.
    pub fn apply_coupon(
        &mut self,
        code: &str,
        coupons: &CouponBook,
    ) -> Result<&Coupon, CartError> {
        let coupon = coupons.redeem(code)?.clone();

        debug!(code = coupon.code(), "applied coupon");

        Ok(self.coupon.insert(coupon))
    }

    /// Drop the active coupon, returning it.
    pub fn remove_coupon(&mut self) -> Option<Coupon> {
        self.coupon.take()
    }

    /// Active coupon
    pub fn coupon(&self) -> Option<&Coupon> {
        self.coupon.as_ref()
    }

    /// Lines in the order they were added
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Line identified by `key`
    pub fn item(&self, key: &LineKey) -> Option<&LineItem> {
        self.items.iter().find(|item| item.matches(key))
    }

    /// Whether the cart has no lines
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of line totals at full precision.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::AmountOverflow`] if the sum does not fit a [`Decimal`].
    pub fn subtotal(&self) -> Result<Decimal, ValidationError> {
        pricing::subtotal(&self.items)
    }

    /// Sum of quantities
    pub fn item_count(&self) -> u32 {
        pricing::item_count(&self.items)
    }

    /// Price the cart for `method` with the active coupon.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if the shipping method is not available or an
    /// amount overflows.
    pub fn summary(
        &self,
        method: ShippingMethod,
        config: &PricingConfig,
    ) -> Result<OrderSummary, ValidationError> {
        pricing::summarize(&self.items, self.coupon.as_ref(), method, config)
    }

    /// Backing store
    pub fn store(&self) -> &S {
        &self.store
    }

    fn commit(&mut self, items: Vec<LineItem>) -> Result<(), CartError> {
        save_json(&self.store, CART_KEY, &items)?;

        self.items = items;

        Ok(())
    }
}

fn selection_key(
    product: &Product,
    size: Option<&str>,
    color: Option<&str>,
) -> Result<LineKey, ValidationError> {
    let size = match size {
        Some(size) if product.offers_size(size) => Some(size),
        Some(size) => {
            return Err(ValidationError::UnavailableSize {
                product: product.id.to_string(),
                size: size.to_string(),
            });
        }
        None if product.sizes.is_empty() => None,
        None => return Err(ValidationError::SizeRequired(product.id.to_string())),
    };

    let color = match color {
        Some(color) => Some(product.offered_color(color).ok_or_else(|| {
            ValidationError::UnavailableColor {
                product: product.id.to_string(),
                color: color.to_string(),
            }
        })?),
        None => None,
    };

    Ok(LineKey::new(product.id.clone(), size, color))
}
