//! Atelier prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    cart::{Cart, CartError, LineItemUpdate},
    checkout::{CheckoutDetails, CheckoutError, place_order},
    clock::{Clock, SystemClock},
    config::{ConfigError, PricingConfig, StoreConfig},
    discounts::{Coupon, CouponBook, DiscountPercent},
    items::{LineItem, LineKey},
    orders::{Address, NewOrder, Order, OrderBook, OrderError, OrderId, OrderStats, OrderStatus},
    payments::{
        ChargeRequest, LastFour, PaymentDescriptor, PaymentError, PaymentMethod,
        PaymentProvider, PaymentReceipt, PaymentToken,
    },
    pricing::{ShippingMethod, ShippingRates, TaxRate},
    products::{Catalog, CatalogError, Product, ProductCatalog, ProductId},
    session::{Role, Session, UserId},
    storage::{FileStore, KeyValueStore, MemoryStore, StorageError},
    summary::{DisplayedSummary, OrderSummary, SummaryError},
    validation::ValidationError,
    wishlist::Wishlist,
};
