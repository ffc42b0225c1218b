//! Persisting and restoring carts across manager instances.

use std::{fs, sync::Arc};

use rust_decimal::Decimal;
use testresult::TestResult;

use storefront_cart::{manager::DEFAULT_STORAGE_KEY, prelude::*};

const CATALOG_YAML: &str = include_str!("../fixtures/products/storefront.yml");

#[test]
fn cart_round_trips_through_directory_store() -> TestResult {
    let dir = tempfile::tempdir()?;
    let catalog = Catalog::from_yaml(CATALOG_YAML)?;
    let headphones = catalog.get("1").ok_or("missing product 1")?;
    let mug = catalog.get("4").ok_or("missing product 4")?;

    let mut first = CartManager::open(DirectoryStore::new(dir.path()), CartSettings::default());

    first.add_item(Arc::clone(headphones), 1)?;
    first.add_item(Arc::clone(mug), 3)?;
    first.apply_coupon("WEB3BRIDGECOHORTx")?;

    let expected = first.cart().clone();
    drop(first);

    let mut second = CartManager::new(DirectoryStore::new(dir.path()), CartSettings::default());

    assert_eq!(second.restore(), RestoreOutcome::Restored);
    assert_eq!(second.cart(), &expected);
    assert_eq!(second.cart().coupon_code(), Some("WEB3BRIDGECOHORTx"));

    Ok(())
}

#[test]
fn cart_round_trips_through_memory_store() -> TestResult {
    let mut first = CartManager::open(MemoryStore::new(), CartSettings::default());

    first.add_item(
        Arc::new(Product::new("p1", "Notebook", Decimal::new(1999, 2))),
        2,
    )?;

    let expected = first.cart().clone();
    let restored = CartManager::open(first.into_store(), CartSettings::default());

    assert_eq!(restored.cart(), &expected);

    Ok(())
}

#[test]
fn high_precision_prices_round_trip_exactly() -> TestResult {
    let dir = tempfile::tempdir()?;
    let price: Decimal = "0.333333333333333333".parse()?;

    let mut first = CartManager::open(DirectoryStore::new(dir.path()), CartSettings::default());

    first.add_item(Arc::new(Product::new("p1", "Third", price)), 3)?;
    first.apply_coupon("WEB3BRIDGECOHORTx")?;

    let expected = first.cart().clone();

    assert_eq!(expected.subtotal(), "0.999999999999999999".parse::<Decimal>()?);

    let restored = CartManager::open(DirectoryStore::new(dir.path()), CartSettings::default());

    assert_eq!(restored.cart(), &expected);
    assert_eq!(restored.cart().subtotal(), expected.subtotal());
    assert_eq!(restored.cart().discount(), expected.discount());

    let mut in_memory = CartManager::open(MemoryStore::new(), CartSettings::default());
    in_memory.add_item(Arc::new(Product::new("p1", "Third", price)), 3)?;

    let expected = in_memory.cart().clone();
    let restored = CartManager::open(in_memory.into_store(), CartSettings::default());

    assert_eq!(restored.cart(), &expected);

    Ok(())
}

#[test]
fn snapshot_uses_documented_format() -> TestResult {
    let mut manager = CartManager::open(MemoryStore::new(), CartSettings::default());

    manager.add_item(Arc::new(Product::new("p1", "Notebook", Decimal::from(10))), 2)?;
    manager.apply_coupon("WEB3BRIDGECOHORTx")?;

    let bytes = manager
        .store()
        .get(DEFAULT_STORAGE_KEY)?
        .ok_or("nothing persisted")?;
    let snapshot: serde_json::Value = serde_json::from_slice(&bytes)?;

    assert!(snapshot["items"].is_array());
    assert_eq!(snapshot["items"][0]["quantity"], 2);
    assert_eq!(snapshot["items"][0]["product"]["name"], "Notebook");
    assert_eq!(snapshot["couponCode"], "WEB3BRIDGECOHORTx");
    assert_eq!(snapshot["subtotal"].as_f64(), Some(20.0));
    assert_eq!(snapshot["discount"].as_f64(), Some(2.0));
    assert_eq!(snapshot["total"].as_f64(), Some(18.0));

    Ok(())
}

#[test]
fn restores_snapshot_written_by_hand() -> TestResult {
    let dir = tempfile::tempdir()?;
    let snapshot = r#"{
        "items": [
            {
                "product": {
                    "id": "p1",
                    "name": "Notebook",
                    "price": 10,
                    "image": "/notebook.jpg",
                    "description": "Ruled",
                    "category": "Stationery"
                },
                "quantity": 3
            }
        ],
        "couponCode": "WEB3BRIDGECOHORTx",
        "total": 27,
        "subtotal": 30,
        "discount": 3
    }"#;

    fs::write(dir.path().join("shopping-cart.json"), snapshot)?;

    let manager = CartManager::open(DirectoryStore::new(dir.path()), CartSettings::default());

    assert_eq!(manager.cart().len(), 1);
    assert_eq!(manager.cart().subtotal(), Decimal::from(30));
    assert_eq!(manager.cart().discount(), Decimal::from(3));
    assert_eq!(manager.cart().total(), Decimal::from(27));

    Ok(())
}

#[test]
fn corrupt_snapshot_starts_empty_and_is_overwritten() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("shopping-cart.json");

    fs::write(&path, "{ definitely not json")?;

    let mut manager = CartManager::new(DirectoryStore::new(dir.path()), CartSettings::default());

    assert_eq!(manager.restore(), RestoreOutcome::Discarded);
    assert!(manager.is_ready());
    assert!(manager.cart().is_empty());

    manager.add_item(Arc::new(Product::new("p1", "Notebook", Decimal::from(10))), 1)?;

    let restored = CartManager::open(DirectoryStore::new(dir.path()), CartSettings::default());

    assert_eq!(restored.cart(), manager.cart());

    Ok(())
}

#[test]
fn pending_restore_never_clobbers_stored_cart() -> TestResult {
    let dir = tempfile::tempdir()?;

    let mut first = CartManager::open(DirectoryStore::new(dir.path()), CartSettings::default());
    first.add_item(Arc::new(Product::new("p1", "Notebook", Decimal::from(10))), 4)?;
    let expected = first.cart().clone();

    let mut early = CartManager::new(DirectoryStore::new(dir.path()), CartSettings::default());
    early.clear();

    let restored = CartManager::open(DirectoryStore::new(dir.path()), CartSettings::default());

    assert_eq!(restored.cart(), &expected);

    Ok(())
}

#[test]
fn unreadable_store_directory_degrades_to_empty_cart() -> TestResult {
    let dir = tempfile::tempdir()?;
    let blocker = dir.path().join("blocker");

    fs::write(&blocker, "a file, not a directory")?;

    let mut manager = CartManager::open(DirectoryStore::new(&blocker), CartSettings::default());

    assert!(manager.is_ready());
    assert!(manager.cart().is_empty());

    manager.add_item(Arc::new(Product::new("p1", "Notebook", Decimal::from(10))), 1)?;

    assert_eq!(manager.cart().len(), 1);
    assert_eq!(manager.last_error(), "");

    Ok(())
}
