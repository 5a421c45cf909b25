//! Order Transfer Orchestrator
//!
//! Moves outstanding line items between two tables' active orders (table
//! split / table merge). Price snapshots and notes travel with the line;
//! paid quantities never move — a partially settled order cannot transfer
//! at all.

use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::info;

use shared::error::{ErrorCode, PosError, PosResult};
use shared::models::{DiningTable, Order, OrderItem};
use shared::util::snowflake_id;

use crate::db::repository::{dining_table, order as order_repo};

use super::rules::{self, OrderBatch};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferMode {
    Split,
    Merge,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferItem {
    pub item_id: i64,
    pub quantity: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferRequest {
    pub mode: TransferMode,
    pub source_table_id: i64,
    pub target_table_id: i64,
    #[serde(default)]
    pub items: Vec<TransferItem>,
    /// Shortcut: every outstanding line at its full outstanding quantity
    #[serde(default)]
    pub move_all: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct TransferSide {
    pub table: DiningTable,
    pub order: Order,
    pub batches: Vec<OrderBatch>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TransferOutcome {
    pub source: TransferSide,
    pub target: TransferSide,
}

async fn load_table(
    tx: &mut sqlx::SqliteConnection,
    table_id: i64,
) -> PosResult<DiningTable> {
    dining_table::find_by_id(&mut *tx, table_id)
        .await?
        .ok_or_else(|| {
            PosError::not_found(
                ErrorCode::TableNotFound,
                format!("table {table_id} not found"),
            )
        })
}

/// Resolve the concrete (item, quantity) lines to move. Repeated entries
/// for the same item are merged, so the outstanding check always sees the
/// cumulative requested quantity.
fn resolve_transfer_lines(
    request: &TransferRequest,
    items: &[OrderItem],
) -> PosResult<Vec<(i64, i32)>> {
    if request.move_all {
        return Ok(items
            .iter()
            .filter(|i| i.outstanding_quantity() > 0)
            .map(|i| (i.id, i.outstanding_quantity()))
            .collect());
    }

    if request.items.is_empty() {
        return Err(PosError::validation(
            ErrorCode::NoTransferableItems,
            "no items requested for transfer",
        ));
    }

    let mut lines: Vec<(i64, i32)> = Vec::with_capacity(request.items.len());
    for requested in &request.items {
        let item = items
            .iter()
            .find(|i| i.id == requested.item_id)
            .ok_or_else(|| {
                PosError::not_found(
                    ErrorCode::ItemNotFound,
                    format!("order item {} not found on source order", requested.item_id),
                )
            })?;
        if item.outstanding_quantity() == 0 {
            return Err(PosError::conflict(
                ErrorCode::TransferPaidItemForbidden,
                format!("item '{}' is already paid", item.name),
            ));
        }
        if requested.quantity <= 0 {
            return Err(PosError::validation(
                ErrorCode::InvalidAmount,
                "transfer quantity must be positive",
            ));
        }
        let requested_total = match lines.iter_mut().find(|(id, _)| *id == item.id) {
            Some((_, quantity)) => {
                *quantity += requested.quantity;
                *quantity
            }
            None => {
                lines.push((item.id, requested.quantity));
                requested.quantity
            }
        };
        if requested_total > item.outstanding_quantity() {
            return Err(PosError::validation(
                ErrorCode::TransferQuantityExceedsAvailable,
                format!(
                    "requested {} of '{}' but only {} outstanding",
                    requested_total,
                    item.name,
                    item.outstanding_quantity()
                ),
            ));
        }
    }
    Ok(lines)
}

pub async fn transfer_order_items(
    pool: &SqlitePool,
    request: TransferRequest,
) -> PosResult<TransferOutcome> {
    if request.source_table_id == request.target_table_id {
        return Err(PosError::validation(
            ErrorCode::InvalidAmount,
            "source and target tables must differ",
        ));
    }

    let mut tx = pool.begin().await?;

    let source_table = load_table(&mut *tx, request.source_table_id).await?;
    let target_table = load_table(&mut *tx, request.target_table_id).await?;

    let source_order = order_repo::find_active_by_table(&mut *tx, source_table.id)
        .await?
        .ok_or_else(|| {
            PosError::not_found(
                ErrorCode::OrderNotFound,
                format!("table {} has no active order", source_table.number),
            )
        })?;
    if source_order.paid_amount_cents > 0 {
        return Err(PosError::conflict(
            ErrorCode::SourceOrderPartiallyPaid,
            "source order is partially settled, transfer forbidden",
        ));
    }

    let source_items = order_repo::items_for_order(&mut *tx, source_order.id).await?;
    if rules::unpaid_items(&source_items).is_empty() {
        return Err(PosError::validation(
            ErrorCode::NoTransferableItems,
            "source order has nothing outstanding to transfer",
        ));
    }

    let lines = resolve_transfer_lines(&request, &source_items)?;

    let target_order = match order_repo::find_active_by_table(&mut *tx, target_table.id).await? {
        Some(existing) => {
            if existing.paid_amount_cents > 0 {
                return Err(PosError::conflict(
                    ErrorCode::TargetOrderPartiallyPaid,
                    "target order is partially settled, transfer forbidden",
                ));
            }
            existing
        }
        None => order_repo::create(&mut *tx, Some(target_table.id)).await?,
    };

    let next_batch = order_repo::max_batch_no(&mut *tx, target_order.id).await? + 1;

    for (item_id, quantity) in &lines {
        // resolve_transfer_lines only returns ids present in source_items
        let Some(item) = source_items.iter().find(|i| i.id == *item_id) else {
            continue;
        };
        if *quantity >= item.quantity {
            order_repo::delete_item(&mut *tx, item.id).await?;
        } else {
            order_repo::update_item_quantity(&mut *tx, item.id, item.quantity - quantity).await?;
        }
        let moved = OrderItem {
            id: snowflake_id(),
            order_id: target_order.id,
            menu_item_id: item.menu_item_id,
            name: item.name.clone(),
            quantity: *quantity,
            paid_quantity: 0,
            price_cents: item.price_cents,
            batch_no: Some(next_batch),
            notes: item.notes.clone(),
        };
        order_repo::insert_item(&mut *tx, &moved).await?;
    }

    // Recompute both sides from their persisted rows.
    let source_items = order_repo::items_for_order(&mut *tx, source_order.id).await?;
    let target_items = order_repo::items_for_order(&mut *tx, target_order.id).await?;

    let target_total = rules::calculate_order_total(&target_items);
    order_repo::update_totals(
        &mut *tx,
        target_order.id,
        target_total.cents(),
        0,
        target_total.cents(),
        target_total.cents(),
    )
    .await?;
    dining_table::occupy(&mut *tx, target_table.id, target_total.cents()).await?;

    if source_items.is_empty() {
        order_repo::mark_cancelled(&mut *tx, source_order.id).await?;
        dining_table::reset_idle(&mut *tx, source_table.id).await?;
    } else {
        let source_total = rules::calculate_order_total(&source_items);
        order_repo::update_totals(
            &mut *tx,
            source_order.id,
            source_total.cents(),
            0,
            source_total.cents(),
            source_total.cents(),
        )
        .await?;
        let outstanding = rules::calculate_unpaid_total(&source_items);
        dining_table::occupy(&mut *tx, source_table.id, outstanding.cents()).await?;
    }

    let source_order = order_repo::find_by_id(&mut *tx, source_order.id).await?;
    let target_order = order_repo::find_by_id(&mut *tx, target_order.id).await?;
    let source_table = load_table(&mut *tx, source_table.id).await?;
    let target_table = load_table(&mut *tx, target_table.id).await?;

    tx.commit().await?;

    info!(
        mode = ?request.mode,
        source_table = source_table.number,
        target_table = target_table.number,
        lines = lines.len(),
        "order items transferred"
    );

    Ok(TransferOutcome {
        source: TransferSide {
            batches: rules::build_order_batches(&source_items, false),
            table: source_table,
            order: source_order,
        },
        target: TransferSide {
            batches: rules::build_order_batches(&target_items, false),
            table: target_table,
            order: target_order,
        },
    })
}
