//! Store-level tests against the in-memory backend.
//!
//! The Postgres backend shares the same trait contract; its unit of work is
//! exercised against a live database in deployment smoke tests.

use std::sync::Arc;

use chrono::Utc;

use stockpile_auth::{Registration, Role, User};
use stockpile_catalog::{NewProduct, NewSupplier, Product, ProductPatch, Supplier};
use stockpile_core::{DomainError, PageParams, ProductId, SupplierId, UserId};
use stockpile_ledger::{Direction, MovementRequest, replay};

use crate::store::{InventoryStore, MemoryStore, ProductFilter, StoreError};

fn supplier() -> Supplier {
    NewSupplier {
        name: "Acme Parts".to_string(),
        ..NewSupplier::default()
    }
    .into_supplier(SupplierId::new(), Utc::now())
    .expect("valid supplier")
}

fn product(supplier_id: SupplierId, sku: &str, initial_stock: i64, min_stock: i64) -> Product {
    NewProduct {
        sku: sku.to_string(),
        name: format!("Product {sku}"),
        description: String::new(),
        price_cents: 2_500,
        initial_stock,
        min_stock,
        image_url: None,
        supplier_id,
        category_id: None,
    }
    .into_product(ProductId::new(), Utc::now())
    .expect("valid product")
}

fn movement(direction: Direction, quantity: i64) -> MovementRequest {
    MovementRequest {
        direction,
        quantity,
        note: String::new(),
    }
}

async fn seed_product(store: &MemoryStore, initial_stock: i64, min_stock: i64) -> Product {
    let s = store.create_supplier(supplier()).await.expect("supplier");
    store
        .create_product(product(s.id, "SKU-001", initial_stock, min_stock))
        .await
        .expect("product")
}

#[tokio::test]
async fn movement_scenario_out_then_overdraw_then_in() {
    let store = MemoryStore::new();
    let p = seed_product(&store, 10, 5).await;

    let (p1, m1) = store
        .apply_movement(p.id, movement(Direction::Out, 3))
        .await
        .expect("out 3");
    assert_eq!(m1.stock_before, 10);
    assert_eq!(m1.stock_after, 7);
    assert_eq!(p1.stock, 7);

    let err = store
        .apply_movement(p.id, movement(Direction::Out, 10))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::Domain(DomainError::InsufficientStock {
            available: 7,
            requested: 10
        })
    ));

    // The rejected movement left no trace.
    let current = store.product_by_id(p.id).await.expect("get").expect("some");
    assert_eq!(current.stock, 7);
    assert_eq!(store.movement_history(p.id).await.expect("history").len(), 1);

    let (p2, m2) = store
        .apply_movement(p.id, movement(Direction::In, 5))
        .await
        .expect("in 5");
    assert_eq!(m2.stock_before, 7);
    assert_eq!(m2.stock_after, 12);
    assert_eq!(p2.stock, 12);
}

#[tokio::test]
async fn movement_on_missing_product_is_not_found() {
    let store = MemoryStore::new();
    let err = store
        .apply_movement(ProductId::new(), movement(Direction::In, 1))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Domain(DomainError::NotFound)));
}

#[tokio::test]
async fn non_positive_quantity_leaves_no_trace() {
    let store = MemoryStore::new();
    let p = seed_product(&store, 10, 5).await;

    for quantity in [0, -3] {
        let err = store
            .apply_movement(p.id, movement(Direction::In, quantity))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::Domain(DomainError::Validation(_))
        ));
    }

    let current = store.product_by_id(p.id).await.expect("get").expect("some");
    assert_eq!(current.stock, 10);
    assert!(store
        .movement_history(p.id)
        .await
        .expect("history")
        .is_empty());
}

#[tokio::test]
async fn history_is_newest_first_and_stable_between_reads() {
    let store = MemoryStore::new();
    let p = seed_product(&store, 10, 5).await;

    store
        .apply_movement(p.id, movement(Direction::Out, 3))
        .await
        .expect("out");
    store
        .apply_movement(p.id, movement(Direction::In, 5))
        .await
        .expect("in");

    let first = store.movement_history(p.id).await.expect("history");
    assert_eq!(first.len(), 2);
    assert_eq!(first[0].direction, Direction::In);
    assert_eq!(first[1].direction, Direction::Out);

    let second = store.movement_history(p.id).await.expect("history");
    assert_eq!(first, second);
}

#[tokio::test]
async fn history_of_missing_product_is_not_found() {
    let store = MemoryStore::new();
    let err = store.movement_history(ProductId::new()).await.unwrap_err();
    assert!(matches!(err, StoreError::Domain(DomainError::NotFound)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_in_movements_serialize_without_lost_updates() {
    const TASKS: usize = 16;
    const QUANTITY: i64 = 3;

    let store = Arc::new(MemoryStore::new());
    let p = seed_product(&store, 10, 5).await;

    let mut handles = Vec::with_capacity(TASKS);
    for _ in 0..TASKS {
        let store = store.clone();
        let product_id = p.id;
        handles.push(tokio::spawn(async move {
            store
                .apply_movement(product_id, movement(Direction::In, QUANTITY))
                .await
        }));
    }
    for handle in handles {
        handle.await.expect("join").expect("movement");
    }

    let current = store.product_by_id(p.id).await.expect("get").expect("some");
    assert_eq!(current.stock, 10 + TASKS as i64 * QUANTITY);

    // Each snapshot chains onto the previous commit: replaying the history
    // (oldest first) from the creation baseline lands on the live counter.
    let mut history = store.movement_history(p.id).await.expect("history");
    assert_eq!(history.len(), TASKS);
    history.reverse();
    assert_eq!(replay(10, &history), Ok(current.stock));
}

#[tokio::test]
async fn product_update_cannot_touch_stock() {
    let store = MemoryStore::new();
    let p = seed_product(&store, 10, 5).await;

    store
        .apply_movement(p.id, movement(Direction::Out, 4))
        .await
        .expect("out");

    // A stale entity carrying the old stock value must not clobber the
    // ledger-owned counter.
    let mut stale = p.clone();
    ProductPatch {
        name: Some("Renamed".to_string()),
        ..ProductPatch::default()
    }
    .apply(&mut stale, Utc::now())
    .expect("patch");
    let updated = store.update_product(stale).await.expect("update");

    assert_eq!(updated.name, "Renamed");
    assert_eq!(updated.stock, 6);
}

#[tokio::test]
async fn sku_uniqueness_on_create_and_update() {
    let store = MemoryStore::new();
    let s = store.create_supplier(supplier()).await.expect("supplier");

    let a = store
        .create_product(product(s.id, "SKU-A", 0, 0))
        .await
        .expect("a");
    store
        .create_product(product(s.id, "SKU-B", 0, 0))
        .await
        .expect("b");

    let dup = store.create_product(product(s.id, "SKU-A", 0, 0)).await;
    assert!(matches!(
        dup,
        Err(StoreError::Domain(DomainError::Conflict(_)))
    ));

    let mut renamed = store
        .product_by_id(a.id)
        .await
        .expect("get")
        .expect("some");
    renamed.sku = "SKU-B".to_string();
    assert!(matches!(
        store.update_product(renamed).await,
        Err(StoreError::Domain(DomainError::Conflict(_)))
    ));
}

#[tokio::test]
async fn supplier_with_products_cannot_be_deleted() {
    let store = MemoryStore::new();
    let s = store.create_supplier(supplier()).await.expect("supplier");
    let p = store
        .create_product(product(s.id, "SKU-001", 0, 0))
        .await
        .expect("product");

    assert!(matches!(
        store.delete_supplier(s.id).await,
        Err(StoreError::Domain(DomainError::Conflict(_)))
    ));

    store.delete_product(p.id).await.expect("delete product");
    store.delete_supplier(s.id).await.expect("now deletable");
}

#[tokio::test]
async fn low_stock_lists_products_strictly_below_threshold() {
    let store = MemoryStore::new();
    let s = store.create_supplier(supplier()).await.expect("supplier");

    store
        .create_product(product(s.id, "AT-THRESHOLD", 5, 5))
        .await
        .expect("at");
    let low = store
        .create_product(product(s.id, "BELOW", 2, 5))
        .await
        .expect("below");

    let listed = store.list_low_stock().await.expect("low stock");
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, low.id);
}

#[tokio::test]
async fn product_listing_filters_and_paginates() {
    let store = MemoryStore::new();
    let s = store.create_supplier(supplier()).await.expect("supplier");

    for i in 0..5 {
        store
            .create_product(product(s.id, &format!("WID-{i}"), 0, 0))
            .await
            .expect("widget");
    }
    store
        .create_product(product(s.id, "GAD-0", 0, 0))
        .await
        .expect("gadget");

    let page = store
        .list_products(
            ProductFilter {
                search: Some("wid".to_string()),
                category_id: None,
            },
            PageParams::new(1, 2),
        )
        .await
        .expect("page");
    assert_eq!(page.total, 5);
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.total_pages(), 3);
}

#[tokio::test]
async fn email_uniqueness_and_pending_listing() {
    let store = MemoryStore::new();
    let now = Utc::now();

    let user = Registration {
        name: "Sam".to_string(),
        email: "sam@example.com".to_string(),
        password: "hunter22".to_string(),
        role: Role::Staff,
    }
    .into_user(UserId::new(), "hash".to_string(), now)
    .expect("valid registration");
    store.create_user(user.clone()).await.expect("create");

    let dup = Registration {
        name: "Sam Again".to_string(),
        email: "sam@example.com".to_string(),
        password: "hunter22".to_string(),
        role: Role::Staff,
    }
    .into_user(UserId::new(), "hash".to_string(), now)
    .expect("valid registration");
    assert!(matches!(
        store.create_user(dup).await,
        Err(StoreError::Domain(DomainError::Conflict(_)))
    ));

    let pending = store.list_pending_users().await.expect("pending");
    assert_eq!(pending.len(), 1);

    let mut approved: User = pending.into_iter().next().expect("one");
    approved.is_active = true;
    store.update_user(approved).await.expect("approve");
    assert!(store
        .list_pending_users()
        .await
        .expect("pending")
        .is_empty());
}
