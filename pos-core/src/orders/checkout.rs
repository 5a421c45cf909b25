//! Checkout Transaction Orchestrator
//!
//! Settles an order against its table inside one transaction. Client
//! totals are revalidated against server-computed totals within one cent;
//! divergence means another terminal touched the order concurrently and the
//! whole checkout is rejected.

use serde::Serialize;
use sqlx::SqlitePool;
use tracing::info;

use shared::error::{ErrorCode, PosError, PosResult};
use shared::models::{DiningTable, Order, OrderItem, PosTransaction, TxType};
use shared::money::{Money, MONEY_EPSILON_CENTS};

use crate::checkout::{calculator, CheckoutInput, CheckoutMode};
use crate::db::repository::{dining_table, order as order_repo, transaction as tx_repo};

use super::rules::{self, OrderBatch};

#[derive(Debug, Clone, Serialize)]
pub struct CheckoutMeta {
    pub mode: CheckoutMode,
    pub received: Money,
    pub change: Money,
}

/// Everything the terminal needs to print the ticket and refresh its view.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutOutcome {
    pub order: Order,
    /// Remaining unpaid batches (empty after a full settle)
    pub batches: Vec<OrderBatch>,
    pub transaction: PosTransaction,
    pub table: DiningTable,
    pub meta: CheckoutMeta,
}

/// One charged line resolved against the persisted items.
struct ChargedLine {
    item_id: i64,
    price: Money,
    quantity: i32,
}

fn resolve_charged_lines(
    input: &CheckoutInput,
    items: &[OrderItem],
) -> PosResult<Vec<ChargedLine>> {
    match input.mode {
        CheckoutMode::Full => Ok(items
            .iter()
            .filter(|i| i.outstanding_quantity() > 0)
            .map(|i| ChargedLine {
                item_id: i.id,
                price: i.price(),
                quantity: i.outstanding_quantity(),
            })
            .collect()),
        CheckoutMode::Aa => {
            // Repeated selections of the same item are merged so the
            // outstanding check sees the cumulative requested quantity.
            let mut lines: Vec<ChargedLine> = Vec::with_capacity(input.aa_items.len());
            for selection in &input.aa_items {
                let item = items
                    .iter()
                    .find(|i| i.id == selection.item_id)
                    .ok_or_else(|| {
                        PosError::not_found(
                            ErrorCode::ItemNotFound,
                            format!("order item {} not found on order", selection.item_id),
                        )
                    })?;
                let requested_total = match lines.iter_mut().find(|l| l.item_id == item.id) {
                    Some(line) => {
                        line.quantity += selection.quantity;
                        line.quantity
                    }
                    None => {
                        lines.push(ChargedLine {
                            item_id: item.id,
                            price: item.price(),
                            quantity: selection.quantity,
                        });
                        selection.quantity
                    }
                };
                if requested_total > item.outstanding_quantity() {
                    return Err(PosError::validation(
                        ErrorCode::AaQuantityExceedsAvailable,
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
    }
}

/// Settle an order. `business_date` stamps the resulting income transaction
/// and is derived by the caller from the venue's cutoff-aware clock.
pub async fn process_checkout(
    pool: &SqlitePool,
    business_date: &str,
    input: CheckoutInput,
) -> PosResult<CheckoutOutcome> {
    calculator::validate_checkout_input(&input)?;

    let mut tx = pool.begin().await?;

    let table = dining_table::find_by_id(&mut *tx, input.table_id)
        .await?
        .ok_or_else(|| {
            PosError::not_found(
                ErrorCode::TableNotFound,
                format!("table {} not found", input.table_id),
            )
        })?;

    let order = order_repo::find_by_id(&mut *tx, input.order_id).await?;
    if order.table_id != Some(table.id) {
        return Err(PosError::not_found(
            ErrorCode::OrderNotFound,
            format!("order {} does not belong to table {}", order.id, table.id),
        ));
    }
    if !order.status.can_checkout() {
        return Err(PosError::conflict(
            ErrorCode::OrderAlreadySettled,
            format!("order {} is {:?}, not active", order.id, order.status),
        ));
    }

    let mut items = order_repo::items_for_order(&mut *tx, order.id).await?;
    if items.is_empty() {
        return Err(PosError::validation(
            ErrorCode::EmptyOrder,
            "order has no items to charge",
        ));
    }

    let charged = resolve_charged_lines(&input, &items)?;

    let charged_lines: Vec<calculator::LineItem> = charged
        .iter()
        .map(|c| calculator::LineItem::new(c.price, c.quantity))
        .collect();
    let totals = calculator::calculate_checkout_total(&charged_lines, input.discount_percent);

    if !totals.subtotal.approx_eq(input.client_subtotal) {
        return Err(PosError::conflict(
            ErrorCode::SubtotalMismatch,
            format!(
                "client subtotal {} diverges from server subtotal {}",
                input.client_subtotal, totals.subtotal
            ),
        ));
    }
    if !totals.total.approx_eq(input.client_total) {
        return Err(PosError::conflict(
            ErrorCode::TotalMismatch,
            format!(
                "client total {} diverges from server total {}",
                input.client_total, totals.total
            ),
        ));
    }

    // Omitted or non-positive received means exact tender.
    let received = input
        .received
        .filter(|r| *r > Money::ZERO)
        .unwrap_or(totals.total);
    if received.cents() + MONEY_EPSILON_CENTS < totals.total.cents() {
        return Err(PosError::validation(
            ErrorCode::InsufficientReceived,
            format!("received {} is less than total {}", received, totals.total),
        ));
    }
    let change = calculator::calculate_change(totals.total, received);

    // Writes: bump each charged line's paid quantity.
    for line in &charged {
        if let Some(item) = items.iter_mut().find(|i| i.id == line.item_id) {
            item.paid_quantity += line.quantity;
            order_repo::update_item_paid_quantity(&mut *tx, item.id, item.paid_quantity).await?;
        }
    }

    let fully_settled = rules::is_fully_paid(&items);
    let outstanding = rules::calculate_unpaid_total(&items);

    order_repo::add_paid_amount(&mut *tx, order.id, totals.total.cents(), &input.payment_method)
        .await?;

    if fully_settled {
        let order_subtotal = rules::calculate_order_total(&items);
        let order_total = (order_subtotal - totals.discount).max(Money::ZERO);
        order_repo::update_totals(
            &mut *tx,
            order.id,
            order_subtotal.cents(),
            totals.discount.cents(),
            order_total.cents(),
            order.paid_amount_cents + totals.total.cents(),
        )
        .await?;
        order_repo::mark_paid(&mut *tx, order.id).await?;
        dining_table::reset_idle(&mut *tx, table.id).await?;
    } else {
        dining_table::occupy(&mut *tx, table.id, outstanding.cents()).await?;
    }

    let transaction = tx_repo::insert(
        &mut *tx,
        TxType::Income,
        "POS checkout",
        totals.total.cents(),
        &input.payment_method,
        Some(order.id),
        business_date,
    )
    .await?;

    let order = order_repo::find_by_id(&mut *tx, order.id).await?;
    let table = dining_table::find_by_id(&mut *tx, table.id)
        .await?
        .ok_or_else(|| {
            PosError::not_found(ErrorCode::TableNotFound, format!("table {} gone", table.id))
        })?;

    tx.commit().await?;

    info!(
        order_id = order.id,
        table = table.number,
        mode = ?input.mode,
        total = %totals.total,
        "checkout committed"
    );

    Ok(CheckoutOutcome {
        batches: rules::build_order_batches(&items, true),
        order,
        transaction,
        table,
        meta: CheckoutMeta {
            mode: input.mode,
            received,
            change,
        },
    })
}

/// Outcome of a checkout reversal.
#[derive(Debug, Clone, Serialize)]
pub struct ReversalOutcome {
    pub order: Order,
    pub table: Option<DiningTable>,
}

/// Reverse a settled checkout: delete the income transaction, roll every
/// line's paid quantity back to zero, reopen the order and re-occupy its
/// table with the recomputed outstanding total.
pub async fn reverse_checkout(pool: &SqlitePool, order_id: i64) -> PosResult<ReversalOutcome> {
    let mut tx = pool.begin().await?;

    let order = order_repo::find_by_id(&mut *tx, order_id).await?;
    if order.status != shared::models::OrderStatus::Paid {
        return Err(PosError::conflict(
            ErrorCode::OrderNotSettled,
            format!("order {} is {:?}, only paid orders can be reversed", order.id, order.status),
        ));
    }

    let deleted = tx_repo::delete_by_order(&mut *tx, order.id).await?;

    let items = order_repo::items_for_order(&mut *tx, order.id).await?;
    for item in &items {
        if item.paid_quantity > 0 {
            order_repo::update_item_paid_quantity(&mut *tx, item.id, 0).await?;
        }
    }

    order_repo::reopen(&mut *tx, order.id).await?;

    let table = match order.table_id {
        Some(table_id) => {
            let outstanding = rules::calculate_order_total(&items);
            dining_table::occupy(&mut *tx, table_id, outstanding.cents()).await?;
            dining_table::find_by_id(&mut *tx, table_id).await?
        }
        None => None,
    };

    let order = order_repo::find_by_id(&mut *tx, order.id).await?;
    tx.commit().await?;

    info!(order_id = order.id, deleted_transactions = deleted, "checkout reversed");

    Ok(ReversalOutcome { order, table })
}
