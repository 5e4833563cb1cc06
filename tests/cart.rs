//! Cart holder behaviour against the apparel fixtures.

use std::str::FromStr;

use rust_decimal::Decimal;
use testresult::TestResult;

use atelier::{
    cart::{CART_KEY, Cart, CartError, LineItemUpdate},
    config::StoreConfig,
    items::LineKey,
    pricing::ShippingMethod,
    products::{ProductCatalog, ProductId},
    storage::{FileStore, KeyValueStore, MemoryStore},
    validation::ValidationError,
};

const CATALOG: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/fixtures/products/apparel.yml");
const STORE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/fixtures/store.yml");

#[test]
fn same_selection_merges_into_one_line() -> TestResult {
    let catalog = ProductCatalog::from_path(CATALOG)?;
    let mut cart = Cart::load(MemoryStore::new())?;
    let tshirt = ProductId::from("product-1");

    cart.add_from_catalog(&catalog, &tshirt, 1, Some("M"), Some("#000000"))?;
    cart.add_from_catalog(&catalog, &tshirt, 2, Some("M"), Some("#000000"))?;

    assert_eq!(cart.items().len(), 1);
    assert_eq!(cart.items().first().map(|item| item.quantity()), Some(3));
    assert_eq!(cart.subtotal()?, Decimal::from_str("149.97")?);

    Ok(())
}

#[test]
fn unknown_product_is_reported() -> TestResult {
    let catalog = ProductCatalog::from_path(CATALOG)?;
    let mut cart = Cart::load(MemoryStore::new())?;

    let result = cart.add_from_catalog(&catalog, &ProductId::from("product-404"), 1, None, None);

    assert!(matches!(result, Err(CartError::UnknownProduct(id)) if id.as_str() == "product-404"));

    Ok(())
}

#[test]
fn cart_survives_reload_from_disk() -> TestResult {
    let dir = tempfile::tempdir()?;
    let catalog = ProductCatalog::from_path(CATALOG)?;

    let key = {
        let mut cart = Cart::load(FileStore::open(dir.path())?)?;

        cart.add_from_catalog(&catalog, &ProductId::from("product-9"), 1, None, None)?;
        cart.add_from_catalog(
            &catalog,
            &ProductId::from("product-6"),
            1,
            Some("L"),
            Some("#2e2e2e"),
        )?
    };

    let store = FileStore::open(dir.path())?;

    assert!(store.get(CART_KEY)?.is_some(), "cart written under its key");

    let mut cart = Cart::load(store)?;

    assert_eq!(cart.item_count(), 2);
    assert_eq!(key.color.as_deref(), Some("#2E2E2E"));

    // 39.99 + 219.99 * 0.8
    assert_eq!(cart.subtotal()?, Decimal::from_str("215.982")?);

    cart.update_item(&key, LineItemUpdate::quantity(2))?;
    assert!(cart.remove_item(&LineKey::new(ProductId::from("product-9"), None, None))?);

    let reloaded = Cart::load(FileStore::open(dir.path())?)?;

    assert_eq!(reloaded.items(), cart.items());
    assert_eq!(reloaded.item_count(), 2);

    Ok(())
}

#[test]
fn coupon_is_not_persisted() -> TestResult {
    let config = StoreConfig::from_path(STORE)?;
    let catalog = ProductCatalog::from_path(CATALOG)?;
    let store = MemoryStore::new();

    let mut cart = Cart::load(store.clone())?;
    cart.add_from_catalog(&catalog, &ProductId::from("product-3"), 1, Some("32"), None)?;
    cart.apply_coupon("summer20", &config.coupons)?;

    let reloaded = Cart::load(store)?;

    assert_eq!(reloaded.item_count(), 1);
    assert!(reloaded.coupon().is_none());

    Ok(())
}

#[test]
fn summary_reads_current_lines_every_time() -> TestResult {
    let config = StoreConfig::from_path(STORE)?;
    let catalog = ProductCatalog::from_path(CATALOG)?;
    let mut cart = Cart::load(MemoryStore::new())?;

    let key =
        cart.add_from_catalog(&catalog, &ProductId::from("product-5"), 1, Some("9"), None)?;

    let before = cart.summary(ShippingMethod::Free, &config.pricing)?;

    cart.update_item(&key, LineItemUpdate::quantity(2))?;

    let after = cart.summary(ShippingMethod::Free, &config.pricing)?;

    assert_eq!(before.subtotal, Decimal::from_str("159.99")?);
    assert_eq!(after.subtotal, Decimal::from_str("319.98")?);

    Ok(())
}

#[test]
fn free_shipping_needs_threshold_in_cart() -> TestResult {
    let config = StoreConfig::from_path(STORE)?;
    let catalog = ProductCatalog::from_path(CATALOG)?;
    let mut cart = Cart::load(MemoryStore::new())?;

    cart.add_from_catalog(&catalog, &ProductId::from("product-9"), 1, None, None)?;

    assert!(matches!(
        cart.summary(ShippingMethod::Free, &config.pricing),
        Err(ValidationError::FreeShippingIneligible { .. })
    ));

    Ok(())
}
