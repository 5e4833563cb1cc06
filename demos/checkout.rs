//! Checkout Example
//!
//! This example fills a cart from the apparel catalog, prices it, places the order
//! and optionally walks it along its lifecycle.
//!
//! Use `-k` to apply a coupon code
//! Use `-s` to pick the shipping method (standard, express, free)
//! Use `-d` to persist the cart and orders in a directory instead of memory
//! Use `-a` to advance the placed order to a status

use std::io;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use atelier::{prelude::*, utils::CheckoutDemoArgs};

/// Approves every charge, as a card test environment would.
#[derive(Debug)]
struct ApprovingProvider;

impl PaymentProvider for ApprovingProvider {
    fn charge(
        &self,
        _request: &ChargeRequest,
        _token: &PaymentToken,
    ) -> Result<PaymentReceipt, PaymentError> {
        Ok(PaymentReceipt {
            transaction_id: format!("pi_{}", Uuid::now_v7().simple()),
            brand: "visa".to_string(),
            last_four: LastFour::new("4242")?,
        })
    }
}

/// Checkout Example
#[expect(clippy::print_stdout, reason = "Example code")]
pub fn main() -> Result<()> {
    let args = CheckoutDemoArgs::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_target(true)
                .with_writer(io::stderr),
        )
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .try_init()?;

    let config = StoreConfig::from_path(&args.config)?;
    let catalog = ProductCatalog::from_path(&args.catalog)?;

    let store: Box<dyn KeyValueStore> = match args.data_dir.as_deref() {
        Some(dir) => Box::new(FileStore::open(dir)?),
        None => Box::new(MemoryStore::new()),
    };

    let session = Session::customer(UserId::new("user-2")?);
    let admin = Session::admin(UserId::new("user-1")?);

    let mut cart = Cart::load(&*store)?;
    let mut orders = OrderBook::load(&*store, SystemClock)?;

    cart.add_from_catalog(
        &catalog,
        &ProductId::from("product-1"),
        2,
        Some("M"),
        Some("#000000"),
    )?;
    cart.add_from_catalog(
        &catalog,
        &ProductId::from("product-6"),
        1,
        Some("L"),
        Some("#2E2E2E"),
    )?;

    if let Some(code) = args.coupon.as_deref() {
        cart.apply_coupon(code, &config.coupons)?;
    }

    let summary = cart.summary(args.shipping, &config.pricing)?;

    let stdout = io::stdout();
    let mut handle = stdout.lock();

    summary.write_to(&mut handle, cart.items())?;

    if let Some(shortfall) = summary.free_shipping_shortfall(config.pricing.shipping()) {
        println!("Spend {shortfall:.2} more for free shipping.\n");
    }

    let order = place_order(
        &session,
        &mut cart,
        &mut orders,
        &ApprovingProvider,
        &config.pricing,
        CheckoutDetails {
            shipping_address: Address {
                first_name: "Jane".to_string(),
                last_name: "Smith".to_string(),
                street: "456 User Ave".to_string(),
                city: "Los Angeles".to_string(),
                state: "CA".to_string(),
                zip_code: "90001".to_string(),
                country: "USA".to_string(),
                phone: Some("555-987-6543".to_string()),
            },
            billing_address: None,
            shipping_method: args.shipping,
            payment_token: PaymentToken::new("tok_visa"),
            notes: None,
        },
    )?;

    println!(
        "Order {} placed: {} ({} {})",
        order.id(),
        order.status(),
        order.payment().brand,
        order.payment().last_four
    );

    if let Some(target) = args.advance_to {
        let mut status = order.status();

        while status != target {
            let next = if target == OrderStatus::Cancelled {
                OrderStatus::Cancelled
            } else {
                match status.next() {
                    Some(next) => next,
                    None => break,
                }
            };

            status = orders.update_status_as(&admin, order.id(), next)?.status();

            if status == OrderStatus::Processing {
                orders.assign_tracking_number(order.id(), "TRK123456789")?;
            }

            println!("  -> {status}");
        }
    }

    let stats = orders.stats();

    println!(
        "\nOrders: {} total, revenue {:.2} {}",
        stats.total(),
        stats.revenue,
        summary.currency
    );
    println!("Cart items after checkout: {}", cart.item_count());

    Ok(())
}
