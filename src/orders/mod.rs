//! Orders

mod book;
pub mod errors;
pub mod models;
pub mod status;

pub use book::*;
pub use errors::OrderError;
pub use models::{Address, NewOrder, Order, OrderId};
pub use status::OrderStatus;
