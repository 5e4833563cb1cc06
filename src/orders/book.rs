//! Order Book

use rust_decimal::Decimal;
use tracing::debug;

use crate::{
    clock::{Clock, SystemClock},
    orders::{
        errors::OrderError,
        models::{NewOrder, Order, OrderId},
        status::OrderStatus,
    },
    session::{Session, UserId},
    storage::{KeyValueStore, load_json, save_json},
    validation::ValidationError,
};

/// Storage key holding the persisted orders.
pub const ORDERS_KEY: &str = "orders";

/// Order counts by status plus revenue from orders that were not cancelled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderStats {
    /// Pending orders
    pub pending: usize,

    /// Processing orders
    pub processing: usize,

    /// Shipped orders
    pub shipped: usize,

    /// Delivered orders
    pub delivered: usize,

    /// Cancelled orders
    pub cancelled: usize,

    /// Sum of totals of orders that were not cancelled
    pub revenue: Decimal,
}

impl OrderStats {
    /// Orders with `status`
    pub fn count(&self, status: OrderStatus) -> usize {
        match status {
            OrderStatus::Pending => self.pending,
            OrderStatus::Processing => self.processing,
            OrderStatus::Shipped => self.shipped,
            OrderStatus::Delivered => self.delivered,
            OrderStatus::Cancelled => self.cancelled,
        }
    }

    /// All orders
    pub fn total(&self) -> usize {
        OrderStatus::ALL
            .into_iter()
            .map(|status| self.count(status))
            .sum()
    }

    fn record(&mut self, order: &Order) {
        let count = match order.status() {
            OrderStatus::Pending => &mut self.pending,
            OrderStatus::Processing => &mut self.processing,
            OrderStatus::Shipped => &mut self.shipped,
            OrderStatus::Delivered => &mut self.delivered,
            OrderStatus::Cancelled => &mut self.cancelled,
        };

        *count += 1;

        if order.status() != OrderStatus::Cancelled {
            self.revenue = self.revenue.saturating_add(order.summary().total);
        }
    }
}

/// Creates orders, moves them through their lifecycle and answers queries.
///
/// Every change is written to the store before it is applied in memory, so a
/// failed write leaves the book as it was.
#[derive(Debug)]
pub struct OrderBook<S, C = SystemClock> {
    store: S,
    clock: C,
    orders: Vec<Order>,
}

impl<S: KeyValueStore, C: Clock> OrderBook<S, C> {
    /// Load the orders persisted in `store`.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::Storage`] if the stored orders cannot be read or decoded.
    pub fn load(store: S, clock: C) -> Result<Self, OrderError> {
        let orders: Vec<Order> = load_json(&store, ORDERS_KEY)?.unwrap_or_default();

        debug!(orders = orders.len(), "loaded orders");

        Ok(Self {
            store,
            clock,
            orders,
        })
    }

    /// Record a new pending order.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyOrder`] if there are no items, or
    /// [`OrderError::Storage`] if the order cannot be saved.
    #[tracing::instrument(skip_all, fields(user_id = %order.user_id))]
    pub fn create_order(&mut self, order: NewOrder) -> Result<Order, OrderError> {
        if order.items.is_empty() {
            return Err(ValidationError::EmptyOrder.into());
        }

        let mut id = OrderId::now_v7();

        while self.position(id).is_some() {
            id = OrderId::now_v7();
        }

        let order = Order::place(id, order, self.clock.now());

        let mut orders = self.orders.clone();
        orders.push(order.clone());

        self.commit(orders)?;

        debug!(order_id = %id, total = %order.summary().total, "created order");

        Ok(order)
    }

    /// Move an order to `status`.
    ///
    /// Re-applying the current status changes nothing, timestamps included.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::NotFound`] for unknown orders,
    /// [`OrderError::InvalidTransition`] if `status` is not the next step or a
    /// cancellation of a live order, or [`OrderError::Storage`] if the change
    /// cannot be saved.
    pub fn update_status(
        &mut self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Order, OrderError> {
        let index = self.position(id).ok_or(OrderError::NotFound(id))?;

        let mut orders = self.orders.clone();
        let order = orders.get_mut(index).ok_or(OrderError::NotFound(id))?;
        let from = order.status();

        if from == status {
            return Ok(order.clone());
        }

        if !from.can_transition_to(status) {
            return Err(OrderError::InvalidTransition { from, to: status });
        }

        order.set_status(status, self.clock.now());

        let updated = order.clone();

        self.commit(orders)?;

        debug!(order_id = %id, %from, to = %status, "updated order status");

        Ok(updated)
    }

    /// [`OrderBook::update_status`] on behalf of `session`; administrators only.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::Forbidden`] for non-administrators, or any error from
    /// [`OrderBook::update_status`].
    pub fn update_status_as(
        &mut self,
        session: &Session,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Order, OrderError> {
        if !session.is_admin() {
            return Err(OrderError::Forbidden);
        }

        self.update_status(id, status)
    }

    /// Attach a carrier tracking number to a processing or shipped order.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::BlankTrackingNumber`] for a blank number,
    /// [`OrderError::NotFound`] for unknown orders,
    /// [`OrderError::TrackingUnavailable`] in any other status, or
    /// [`OrderError::Storage`] if the change cannot be saved.
    pub fn assign_tracking_number(
        &mut self,
        id: OrderId,
        tracking_number: &str,
    ) -> Result<Order, OrderError> {
        let tracking_number = tracking_number.trim();

        if tracking_number.is_empty() {
            return Err(ValidationError::BlankTrackingNumber.into());
        }

        let index = self.position(id).ok_or(OrderError::NotFound(id))?;

        let mut orders = self.orders.clone();
        let order = orders.get_mut(index).ok_or(OrderError::NotFound(id))?;

        if !matches!(order.status(), OrderStatus::Processing | OrderStatus::Shipped) {
            return Err(OrderError::TrackingUnavailable(order.status()));
        }

        order.set_tracking_number(tracking_number.to_string(), self.clock.now());

        let updated = order.clone();

        self.commit(orders)?;

        debug!(order_id = %id, tracking_number, "assigned tracking number");

        Ok(updated)
    }

    /// Look up an order.
    pub fn order_by_id(&self, id: OrderId) -> Option<&Order> {
        self.orders.iter().find(|order| order.id() == id)
    }

    /// Look up an order visible to `session`: its owner's or, for administrators,
    /// any.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::NotFound`] for unknown orders or
    /// [`OrderError::Forbidden`] for another customer's order.
    pub fn order_for_session(
        &self,
        session: &Session,
        id: OrderId,
    ) -> Result<&Order, OrderError> {
        let order = self.order_by_id(id).ok_or(OrderError::NotFound(id))?;

        if !session.is_admin() && order.user_id() != session.user_id() {
            return Err(OrderError::Forbidden);
        }

        Ok(order)
    }

    /// `user_id`'s orders, newest first.
    pub fn orders_for_user(&self, user_id: &UserId) -> Vec<&Order> {
        let mut orders: Vec<&Order> = self
            .orders
            .iter()
            .filter(|order| order.user_id() == user_id)
            .collect();

        orders.sort_by(|a, b| {
            b.created_at()
                .cmp(&a.created_at())
                .then_with(|| b.id().cmp(&a.id()))
        });

        orders
    }

    /// Every order, in creation order.
    pub fn all_orders(&self) -> &[Order] {
        &self.orders
    }

    /// Orders currently in `status`.
    pub fn orders_with_status(&self, status: OrderStatus) -> impl Iterator<Item = &Order> {
        self.orders
            .iter()
            .filter(move |order| order.status() == status)
    }

    /// Counts per status and revenue.
    pub fn stats(&self) -> OrderStats {
        let mut stats = OrderStats::default();

        for order in &self.orders {
            stats.record(order);
        }

        stats
    }

    /// Number of orders
    pub fn len(&self) -> usize {
        self.orders.len()
    }

    /// Whether there are no orders
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    fn position(&self, id: OrderId) -> Option<usize> {
        self.orders.iter().position(|order| order.id() == id)
    }

    fn commit(&mut self, orders: Vec<Order>) -> Result<(), OrderError> {
        save_json(&self.store, ORDERS_KEY, &orders)?;

        self.orders = orders;

        Ok(())
    }
}
