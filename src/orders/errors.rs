//! Order errors.

use thiserror::Error;

use crate::{
    orders::{models::OrderId, status::OrderStatus},
    storage::StorageError,
    validation::ValidationError,
};

/// Errors that can occur when creating, updating or reading orders.
#[derive(Debug, Error)]
pub enum OrderError {
    /// Invalid order input
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// No order with this identifier
    #[error("order {0} not found")]
    NotFound(OrderId),

    /// The status change is not allowed from the current status
    #[error("cannot move order from {from} to {to}")]
    InvalidTransition {
        /// Current status
        from: OrderStatus,
        /// Requested status
        to: OrderStatus,
    },

    /// Tracking numbers only apply to processing or shipped orders
    #[error("tracking numbers cannot be assigned to {0} orders")]
    TrackingUnavailable(OrderStatus),

    /// The session may not perform this operation
    #[error("not permitted for this session")]
    Forbidden,

    /// Persistence failed; nothing was changed
    #[error("storage error")]
    Storage(#[from] StorageError),
}
