//! Checkout
//!
//! Turns a cart into an order: price it, take payment, record the order and
//! empty the cart. Nothing is recorded unless the charge succeeds.

use thiserror::Error;
use tracing::debug;

use crate::{
    cart::{Cart, CartError},
    clock::Clock,
    config::PricingConfig,
    money::round_to_minor,
    orders::{Address, NewOrder, Order, OrderBook, OrderError},
    payments::{ChargeRequest, PaymentDescriptor, PaymentError, PaymentProvider, PaymentToken},
    pricing::ShippingMethod,
    session::Session,
    storage::KeyValueStore,
    validation::ValidationError,
};

/// Errors that can occur during checkout.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Invalid input; nothing was charged.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The charge did not go through; no order was created.
    #[error("payment failed: {0}")]
    Payment(#[from] PaymentError),

    /// The charge went through but the order could not be recorded.
    #[error("payment {transaction_id} captured but order not recorded: {source}")]
    Order {
        /// Provider reference for the captured charge
        transaction_id: String,

        /// Why the order was not recorded
        #[source]
        source: OrderError,
    },

    /// The order was placed but the cart still holds its lines.
    #[error("order {} placed but cart not cleared: {source}", order.id())]
    CartNotCleared {
        /// The placed order
        order: Box<Order>,

        /// Why the cart could not be cleared
        #[source]
        source: CartError,
    },
}

/// What the customer entered at checkout.
#[derive(Debug, Clone)]
pub struct CheckoutDetails {
    /// Delivery address
    pub shipping_address: Address,

    /// Billing address; the shipping address when `None`
    pub billing_address: Option<Address>,

    /// Selected shipping method
    pub shipping_method: ShippingMethod,

    /// Payment method token from the provider
    pub payment_token: PaymentToken,

    /// Free-text order notes
    pub notes: Option<String>,
}

/// Place an order for everything in `cart`.
///
/// The charge is for the total rounded to the currency's minor unit. On success
/// the order is recorded as pending and the cart is emptied.
///
/// # Errors
///
/// Returns [`ValidationError::EmptyOrder`] for an empty cart, a
/// [`ValidationError`] if the shipping method is not available,
/// [`CheckoutError::Payment`] if the charge fails, or [`CheckoutError::Order`] if
/// the order cannot be saved. In each case the cart is left untouched.
///
/// Returns [`CheckoutError::CartNotCleared`] if the order was placed but the cart
/// could not be emptied. The error carries the placed order; the cart must not be
/// submitted again.
#[tracing::instrument(
    skip_all,
    fields(user_id = %session.user_id(), method = %details.shipping_method)
)]
pub fn place_order<CS, OS, C, P>(
    session: &Session,
    cart: &mut Cart<CS>,
    orders: &mut OrderBook<OS, C>,
    payments: &P,
    config: &PricingConfig,
    details: CheckoutDetails,
) -> Result<Order, CheckoutError>
where
    CS: KeyValueStore,
    OS: KeyValueStore,
    C: Clock,
    P: PaymentProvider + ?Sized,
{
    if cart.is_empty() {
        return Err(ValidationError::EmptyOrder.into());
    }

    let summary = cart.summary(details.shipping_method, config)?;

    let request = ChargeRequest {
        amount: round_to_minor(summary.total, config.currency()),
        currency: summary.currency.clone(),
    };

    let receipt = payments.charge(&request, &details.payment_token)?;

    debug!(
        transaction_id = %receipt.transaction_id,
        amount = %request.amount,
        "payment captured"
    );

    let order = orders
        .create_order(NewOrder {
            user_id: session.user_id().clone(),
            items: cart.items().to_vec(),
            shipping_address: details.shipping_address,
            billing_address: details.billing_address,
            payment: PaymentDescriptor::from(&receipt),
            summary,
            notes: details.notes,
        })
        .map_err(|source| CheckoutError::Order {
            transaction_id: receipt.transaction_id.clone(),
            source,
        })?;

    if let Err(source) = cart.clear() {
        debug!(order_id = %order.id(), error = %source, "cart not cleared");

        return Err(CheckoutError::CartNotCleared {
            order: Box::new(order),
            source,
        });
    }

    debug!(order_id = %order.id(), "order placed");

    Ok(order)
}
