#![allow(dead_code)]

//! Seed helpers shared by the flow tests. Each test gets its own in-memory
//! database with the real migrations applied.

use pos_core::checkout::{CheckoutInput, CheckoutMode};
use pos_core::db::repository::{dining_table, menu_item, order as order_repo};
use pos_core::db::DbService;
use pos_core::Config;
use shared::models::{DiningTable, MenuItem, MenuItemCreate, Order, OrderItem};
use shared::money::Money;
use shared::util::snowflake_id;

pub async fn test_db() -> DbService {
    DbService::in_memory().await.expect("in-memory database")
}

/// The business date checkouts land on, per the default config clock.
pub fn today() -> String {
    let cfg = Config::default();
    pos_core::utils::time::current_business_date(cfg.business_day_cutoff, cfg.timezone)
        .format("%Y-%m-%d")
        .to_string()
}

pub async fn seed_table(db: &DbService, number: i32) -> DiningTable {
    dining_table::create(&db.pool, number, 4)
        .await
        .expect("seed table")
}

pub async fn seed_menu_item(
    db: &DbService,
    name: &str,
    category: &str,
    price_cents: i64,
) -> MenuItem {
    menu_item::create(
        &db.pool,
        MenuItemCreate {
            name: name.to_string(),
            category: category.to_string(),
            price_cents,
        },
    )
    .await
    .expect("seed menu item")
}

/// Open an order on a table with the given (menu item, quantity) lines,
/// totals and table occupancy set the way the ordering flow leaves them.
pub async fn seed_order(
    db: &DbService,
    table: &DiningTable,
    lines: &[(&MenuItem, i32)],
) -> (Order, Vec<OrderItem>) {
    let order = order_repo::create(&db.pool, Some(table.id))
        .await
        .expect("seed order");

    let mut items = Vec::new();
    for (menu_item, quantity) in lines {
        let item = OrderItem {
            id: snowflake_id(),
            order_id: order.id,
            menu_item_id: menu_item.id,
            name: menu_item.name.clone(),
            quantity: *quantity,
            paid_quantity: 0,
            price_cents: menu_item.price_cents,
            batch_no: Some(1),
            notes: None,
        };
        order_repo::insert_item(&db.pool, &item).await.expect("seed item");
        items.push(item);
    }

    let subtotal: i64 = items.iter().map(|i| i.price_cents * i.quantity as i64).sum();
    order_repo::update_totals(&db.pool, order.id, subtotal, 0, subtotal, subtotal)
        .await
        .expect("seed totals");
    dining_table::occupy(&db.pool, table.id, subtotal)
        .await
        .expect("seed occupancy");

    let order = order_repo::find_by_id(&db.pool, order.id).await.expect("reload order");
    (order, items)
}

/// A full-mode cash checkout matching the order's current outstanding total.
pub fn full_checkout(table_id: i64, order_id: i64, total_cents: i64) -> CheckoutInput {
    CheckoutInput {
        table_id,
        order_id,
        mode: CheckoutMode::Full,
        payment_method: "Cash".to_string(),
        discount_percent: 0.0,
        client_subtotal: Money::from_cents(total_cents),
        client_total: Money::from_cents(total_cents),
        received: None,
        aa_items: Vec::new(),
    }
}
