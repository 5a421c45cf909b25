//! Split/merge transfer flow tests against in-memory SQLite.

mod common;

use common::{seed_menu_item, seed_order, seed_table, test_db, today};
use pos_core::checkout::{AaSelection, CheckoutInput, CheckoutMode};
use pos_core::db::repository::order as order_repo;
use pos_core::orders::transfer::TransferMode;
use pos_core::orders::{process_checkout, transfer_order_items, TransferItem, TransferRequest};
use shared::models::{OrderStatus, TableStatus};
use shared::money::Money;
use shared::ErrorCode;

fn request(source: i64, target: i64, items: Vec<TransferItem>, move_all: bool) -> TransferRequest {
    TransferRequest {
        mode: TransferMode::Split,
        source_table_id: source,
        target_table_id: target,
        items,
        move_all,
    }
}

#[tokio::test]
async fn partial_transfer_splits_the_order() {
    let db = test_db().await;
    let source = seed_table(&db, 1).await;
    let target = seed_table(&db, 2).await;
    let menu = seed_menu_item(&db, "Fideuá", "Food", 1500).await;
    let vino = seed_menu_item(&db, "Albariño", "Drinks", 2100).await;
    let (_, items) = seed_order(&db, &source, &[(&menu, 3), (&vino, 1)]).await;

    let outcome = transfer_order_items(
        &db.pool,
        request(
            source.id,
            target.id,
            vec![TransferItem { item_id: items[0].id, quantity: 2 }],
            false,
        ),
    )
    .await
    .expect("transfer");

    // source keeps 1 fideuá + wine
    assert_eq!(outcome.source.order.status, OrderStatus::Open);
    assert_eq!(outcome.source.order.subtotal_cents, 1500 + 2100);
    assert_eq!(outcome.source.table.status, TableStatus::Occupied);
    assert_eq!(outcome.source.table.amount_cents, 3600);

    // target holds the moved 2 fideuás on a fresh order
    assert_eq!(outcome.target.order.subtotal_cents, 3000);
    assert_eq!(outcome.target.table.status, TableStatus::Occupied);
    assert_eq!(outcome.target.table.amount_cents, 3000);

    let moved = &outcome.target.batches[0].items[0];
    assert_eq!(moved.menu_item_id, menu.id);
    assert_eq!(moved.quantity, 2);
    assert_eq!(moved.paid_quantity, 0);
    assert_eq!(moved.price_cents, 1500);
    assert_eq!(moved.batch_no, Some(1));
}

#[tokio::test]
async fn move_all_cancels_the_emptied_source() {
    let db = test_db().await;
    let source = seed_table(&db, 3).await;
    let target = seed_table(&db, 4).await;
    let menu = seed_menu_item(&db, "Cocido", "Food", 1300).await;
    let (source_order, _) = seed_order(&db, &source, &[(&menu, 2)]).await;

    let outcome = transfer_order_items(
        &db.pool,
        request(source.id, target.id, Vec::new(), true),
    )
    .await
    .expect("move all");

    assert_eq!(outcome.source.order.status, OrderStatus::Cancelled);
    assert!(outcome.source.batches.is_empty());
    assert_eq!(outcome.source.table.status, TableStatus::Idle);
    assert_eq!(outcome.source.table.amount_cents, 0);

    assert_eq!(outcome.target.order.subtotal_cents, 2600);
    assert_eq!(outcome.target.table.status, TableStatus::Occupied);

    // the cancelled order no longer blocks the source table
    assert!(order_repo::find_active_by_table(&db.pool, source.id).await.unwrap().is_none());
    assert_eq!(
        order_repo::find_by_id(&db.pool, source_order.id).await.unwrap().status,
        OrderStatus::Cancelled
    );
}

#[tokio::test]
async fn merge_into_existing_target_order_uses_next_batch() {
    let db = test_db().await;
    let source = seed_table(&db, 5).await;
    let target = seed_table(&db, 6).await;
    let menu = seed_menu_item(&db, "Bacalao", "Food", 1700).await;
    let cafe = seed_menu_item(&db, "Café", "Drinks", 150).await;
    let (_, source_items) = seed_order(&db, &source, &[(&menu, 1)]).await;
    let (target_order, _) = seed_order(&db, &target, &[(&cafe, 2)]).await;

    let outcome = transfer_order_items(
        &db.pool,
        TransferRequest {
            mode: TransferMode::Merge,
            source_table_id: source.id,
            target_table_id: target.id,
            items: vec![TransferItem { item_id: source_items[0].id, quantity: 1 }],
            move_all: false,
        },
    )
    .await
    .expect("merge");

    assert_eq!(outcome.target.order.id, target_order.id);
    assert_eq!(outcome.target.order.subtotal_cents, 300 + 1700);
    // existing lines were batch 1, the moved line lands in batch 2
    let batch_nos: Vec<i32> = outcome.target.batches.iter().map(|b| b.batch_no).collect();
    assert_eq!(batch_nos, [1, 2]);
    assert_eq!(outcome.target.batches[1].items[0].menu_item_id, menu.id);
}

#[tokio::test]
async fn transfer_quantity_beyond_outstanding_is_rejected() {
    let db = test_db().await;
    let source = seed_table(&db, 7).await;
    let target = seed_table(&db, 8).await;
    let menu = seed_menu_item(&db, "Merluza", "Food", 1600).await;
    let (_, items) = seed_order(&db, &source, &[(&menu, 2)]).await;

    let err = transfer_order_items(
        &db.pool,
        request(
            source.id,
            target.id,
            vec![TransferItem { item_id: items[0].id, quantity: 5 }],
            false,
        ),
    )
    .await
    .expect_err("over-transfer");
    assert_eq!(err.code(), ErrorCode::TransferQuantityExceedsAvailable);

    // nothing moved
    assert!(order_repo::find_active_by_table(&db.pool, target.id).await.unwrap().is_none());
}

#[tokio::test]
async fn partially_settled_source_cannot_transfer() {
    let db = test_db().await;
    let source = seed_table(&db, 9).await;
    let target = seed_table(&db, 10).await;
    let menu = seed_menu_item(&db, "Lubina", "Food", 2400).await;
    let (order, items) = seed_order(&db, &source, &[(&menu, 2)]).await;

    let input = CheckoutInput {
        table_id: source.id,
        order_id: order.id,
        mode: CheckoutMode::Aa,
        payment_method: "Cash".to_string(),
        discount_percent: 0.0,
        client_subtotal: Money::from_cents(2400),
        client_total: Money::from_cents(2400),
        received: None,
        aa_items: vec![AaSelection { item_id: items[0].id, quantity: 1 }],
    };
    process_checkout(&db.pool, &today(), input).await.expect("partial pay");

    let err = transfer_order_items(
        &db.pool,
        request(source.id, target.id, Vec::new(), true),
    )
    .await
    .expect_err("partially settled source");
    assert_eq!(err.code(), ErrorCode::SourceOrderPartiallyPaid);
}

#[tokio::test]
async fn transfer_without_source_order_is_not_found() {
    let db = test_db().await;
    let source = seed_table(&db, 11).await;
    let target = seed_table(&db, 12).await;

    let err = transfer_order_items(
        &db.pool,
        request(source.id, target.id, Vec::new(), true),
    )
    .await
    .expect_err("no source order");
    assert_eq!(err.code(), ErrorCode::OrderNotFound);

    let err = transfer_order_items(
        &db.pool,
        request(source.id, 31337, Vec::new(), true),
    )
    .await
    .expect_err("missing target table");
    assert_eq!(err.code(), ErrorCode::TableNotFound);
}

#[tokio::test]
async fn repeated_lines_for_one_item_move_the_combined_quantity() {
    let db = test_db().await;
    let source = seed_table(&db, 15).await;
    let target = seed_table(&db, 16).await;
    let menu = seed_menu_item(&db, "Croquetas", "Food", 900).await;
    let (_, items) = seed_order(&db, &source, &[(&menu, 3)]).await;

    let outcome = transfer_order_items(
        &db.pool,
        request(
            source.id,
            target.id,
            vec![
                TransferItem { item_id: items[0].id, quantity: 1 },
                TransferItem { item_id: items[0].id, quantity: 1 },
            ],
            false,
        ),
    )
    .await
    .expect("transfer");

    // the two requests collapse into one moved line of 2
    let moved = &outcome.target.batches[0].items[0];
    assert_eq!(moved.quantity, 2);
    assert_eq!(outcome.target.order.subtotal_cents, 1800);
    assert_eq!(outcome.source.order.subtotal_cents, 900);

    // total quantity across both orders still matches what was seeded
    let source_qty: i32 = order_repo::items_for_order(&db.pool, outcome.source.order.id)
        .await
        .unwrap()
        .iter()
        .map(|i| i.quantity)
        .sum();
    let target_qty: i32 = order_repo::items_for_order(&db.pool, outcome.target.order.id)
        .await
        .unwrap()
        .iter()
        .map(|i| i.quantity)
        .sum();
    assert_eq!(source_qty + target_qty, 3);
}

#[tokio::test]
async fn repeated_lines_beyond_outstanding_are_rejected() {
    let db = test_db().await;
    let source = seed_table(&db, 17).await;
    let target = seed_table(&db, 18).await;
    let menu = seed_menu_item(&db, "Pimientos", "Food", 700).await;
    let (source_order, items) = seed_order(&db, &source, &[(&menu, 3)]).await;

    // 2 + 2 exceeds the 3 outstanding even though each line alone fits
    let err = transfer_order_items(
        &db.pool,
        request(
            source.id,
            target.id,
            vec![
                TransferItem { item_id: items[0].id, quantity: 2 },
                TransferItem { item_id: items[0].id, quantity: 2 },
            ],
            false,
        ),
    )
    .await
    .expect_err("over-transfer via duplicates");
    assert_eq!(err.code(), ErrorCode::TransferQuantityExceedsAvailable);

    // nothing moved, source quantities untouched
    assert!(order_repo::find_active_by_table(&db.pool, target.id).await.unwrap().is_none());
    let source_items = order_repo::items_for_order(&db.pool, source_order.id).await.unwrap();
    assert_eq!(source_items.len(), 1);
    assert_eq!(source_items[0].quantity, 3);
}

#[tokio::test]
async fn transfer_onto_the_same_table_is_rejected() {
    let db = test_db().await;
    let source = seed_table(&db, 19).await;
    let menu = seed_menu_item(&db, "Gambas", "Food", 1800).await;
    seed_order(&db, &source, &[(&menu, 1)]).await;

    let err = transfer_order_items(
        &db.pool,
        request(source.id, source.id, Vec::new(), true),
    )
    .await
    .expect_err("same table");
    assert_eq!(err.code(), ErrorCode::InvalidAmount);
}

#[tokio::test]
async fn explicit_empty_item_list_is_rejected() {
    let db = test_db().await;
    let source = seed_table(&db, 13).await;
    let target = seed_table(&db, 14).await;
    let menu = seed_menu_item(&db, "Arroz negro", "Food", 1550).await;
    seed_order(&db, &source, &[(&menu, 1)]).await;

    let err = transfer_order_items(
        &db.pool,
        request(source.id, target.id, Vec::new(), false),
    )
    .await
    .expect_err("empty request");
    assert_eq!(err.code(), ErrorCode::NoTransferableItems);
}
