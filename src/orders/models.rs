//! Order Models

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::{
    items::LineItem,
    orders::status::OrderStatus,
    payments::PaymentDescriptor,
    session::UserId,
    summary::OrderSummary,
    uuids::TypedUuid,
};

/// Order identifier
pub type OrderId = TypedUuid<Order>;

/// Postal address
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    /// Recipient first name
    pub first_name: String,

    /// Recipient last name
    pub last_name: String,

    /// Street and number
    pub street: String,

    /// City
    pub city: String,

    /// State or region
    pub state: String,

    /// Postal code
    pub zip_code: String,

    /// Country
    pub country: String,

    /// Contact phone number
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// New Order Model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    /// Owning user
    pub user_id: UserId,

    /// Line snapshots; must not be empty
    pub items: Vec<LineItem>,

    /// Delivery address
    pub shipping_address: Address,

    /// Defaults to the shipping address
    pub billing_address: Option<Address>,

    /// Stored payment details
    pub payment: PaymentDescriptor,

    /// Pricing at checkout
    pub summary: OrderSummary,

    /// Free-text notes; blank notes are dropped
    pub notes: Option<String>,
}

/// Order Model
///
/// Items, addresses, payment and summary are fixed at creation. Only the status,
/// tracking number and their timestamps change afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    id: OrderId,
    user_id: UserId,
    items: Vec<LineItem>,
    shipping_address: Address,
    billing_address: Address,
    payment: PaymentDescriptor,
    summary: OrderSummary,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    notes: Option<String>,

    status: OrderStatus,
    created_at: Timestamp,
    updated_at: Timestamp,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    tracking_number: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    delivered_at: Option<Timestamp>,
}

impl Order {
    pub(crate) fn place(id: OrderId, order: NewOrder, now: Timestamp) -> Self {
        let billing_address = order
            .billing_address
            .unwrap_or_else(|| order.shipping_address.clone());

        Self {
            id,
            user_id: order.user_id,
            items: order.items,
            shipping_address: order.shipping_address,
            billing_address,
            payment: order.payment,
            summary: order.summary,
            notes: order.notes.filter(|notes| !notes.trim().is_empty()),
            status: OrderStatus::Pending,
            created_at: now,
            updated_at: now,
            tracking_number: None,
            delivered_at: None,
        }
    }

    pub(crate) fn set_status(&mut self, status: OrderStatus, now: Timestamp) {
        self.status = status;
        self.updated_at = now;

        if status == OrderStatus::Delivered {
            self.delivered_at = Some(now);
        }
    }

    pub(crate) fn set_tracking_number(&mut self, tracking_number: String, now: Timestamp) {
        self.tracking_number = Some(tracking_number);
        self.updated_at = now;
    }

    /// Order identifier
    pub fn id(&self) -> OrderId {
        self.id
    }

    /// Owning user
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Line snapshots taken at checkout
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Delivery address
    pub fn shipping_address(&self) -> &Address {
        &self.shipping_address
    }

    /// Billing address
    pub fn billing_address(&self) -> &Address {
        &self.billing_address
    }

    /// Card brand and last four digits
    pub fn payment(&self) -> &PaymentDescriptor {
        &self.payment
    }

    /// Pricing at checkout
    pub fn summary(&self) -> &OrderSummary {
        &self.summary
    }

    /// Customer notes
    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    /// Current status
    pub fn status(&self) -> OrderStatus {
        self.status
    }

    /// When the order was placed
    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    /// Last status or tracking change
    pub fn updated_at(&self) -> Timestamp {
        self.updated_at
    }

    /// Carrier tracking number
    pub fn tracking_number(&self) -> Option<&str> {
        self.tracking_number.as_deref()
    }

    /// When the order was delivered
    pub fn delivered_at(&self) -> Option<Timestamp> {
        self.delivered_at
    }
}
