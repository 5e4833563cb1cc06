//! Atelier
//!
//! Atelier is the storefront core of an apparel shop: a side-effect-free pricing
//! engine, a persisted cart and wishlist, and an order lifecycle manager with a
//! checkout flow that ties them to a payment provider.

pub mod cart;
pub mod checkout;
pub mod clock;
pub mod config;
pub mod discounts;
pub mod items;
pub mod money;
pub mod orders;
pub mod payments;
pub mod prelude;
pub mod pricing;
pub mod products;
pub mod session;
pub mod storage;
pub mod summary;
pub mod utils;
pub mod uuids;
pub mod validation;
pub mod wishlist;
