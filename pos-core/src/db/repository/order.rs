//! Order Repository
//!
//! Orders and their line items. Every write that must be atomic with other
//! writes runs inside a caller-owned transaction (`&mut *tx`).

use super::{PosError, PosResult};
use shared::error::ErrorCode;
use shared::models::{Order, OrderItem, OrderStatus};
use shared::util::{now_millis, snowflake_id};
use sqlx::SqliteExecutor;

pub async fn find_by_id(ex: impl SqliteExecutor<'_>, id: i64) -> PosResult<Order> {
    let order = sqlx::query_as::<_, Order>(
        "SELECT id, table_id, status, subtotal_cents, discount_cents, total_cents, total_amount_cents, paid_amount_cents, payment_method, created_at, closed_at \
         FROM orders WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(ex)
    .await?
    .ok_or_else(|| PosError::not_found(ErrorCode::OrderNotFound, format!("order {id} not found")))?;
    Ok(order)
}

/// The single active (not paid, not cancelled) order on a table, if any.
pub async fn find_active_by_table(
    ex: impl SqliteExecutor<'_>,
    table_id: i64,
) -> PosResult<Option<Order>> {
    let order = sqlx::query_as::<_, Order>(
        "SELECT id, table_id, status, subtotal_cents, discount_cents, total_cents, total_amount_cents, paid_amount_cents, payment_method, created_at, closed_at \
         FROM orders WHERE table_id = ? AND status IN ('OPEN', 'PENDING', 'SERVED')",
    )
    .bind(table_id)
    .fetch_optional(ex)
    .await?;
    Ok(order)
}

pub async fn create(ex: impl SqliteExecutor<'_>, table_id: Option<i64>) -> PosResult<Order> {
    let id = snowflake_id();
    let now = now_millis();
    sqlx::query(
        "INSERT INTO orders (id, table_id, status, subtotal_cents, discount_cents, total_cents, total_amount_cents, paid_amount_cents, created_at) \
         VALUES (?, ?, 'OPEN', 0, 0, 0, 0, 0, ?)",
    )
    .bind(id)
    .bind(table_id)
    .bind(now)
    .execute(ex)
    .await
    .map_err(|e| {
        if shared::error::is_unique_violation(&e) {
            PosError::conflict(
                ErrorCode::TableAlreadyOccupied,
                "table already has an active order",
            )
        } else {
            e.into()
        }
    })?;
    Ok(Order {
        id,
        table_id,
        status: OrderStatus::Open,
        subtotal_cents: 0,
        discount_cents: 0,
        total_cents: 0,
        total_amount_cents: 0,
        paid_amount_cents: 0,
        payment_method: None,
        created_at: now,
        closed_at: None,
    })
}

pub async fn update_status(
    ex: impl SqliteExecutor<'_>,
    id: i64,
    status: OrderStatus,
) -> PosResult<()> {
    let result = sqlx::query("UPDATE orders SET status = ? WHERE id = ?")
        .bind(status)
        .bind(id)
        .execute(ex)
        .await?;
    if result.rows_affected() == 0 {
        return Err(PosError::not_found(
            ErrorCode::OrderNotFound,
            format!("order {id} not found"),
        ));
    }
    Ok(())
}

/// Persist recomputed money fields after a mutation.
pub async fn update_totals(
    ex: impl SqliteExecutor<'_>,
    id: i64,
    subtotal_cents: i64,
    discount_cents: i64,
    total_cents: i64,
    total_amount_cents: i64,
) -> PosResult<()> {
    sqlx::query(
        "UPDATE orders SET subtotal_cents = ?, discount_cents = ?, total_cents = ?, total_amount_cents = ? WHERE id = ?",
    )
    .bind(subtotal_cents)
    .bind(discount_cents)
    .bind(total_cents)
    .bind(total_amount_cents)
    .bind(id)
    .execute(ex)
    .await?;
    Ok(())
}

pub async fn add_paid_amount(
    ex: impl SqliteExecutor<'_>,
    id: i64,
    paid_cents: i64,
    payment_method: &str,
) -> PosResult<()> {
    sqlx::query(
        "UPDATE orders SET paid_amount_cents = paid_amount_cents + ?, payment_method = ? WHERE id = ?",
    )
    .bind(paid_cents)
    .bind(payment_method)
    .bind(id)
    .execute(ex)
    .await?;
    Ok(())
}

pub async fn mark_paid(ex: impl SqliteExecutor<'_>, id: i64) -> PosResult<()> {
    let now = now_millis();
    sqlx::query("UPDATE orders SET status = 'PAID', closed_at = ? WHERE id = ?")
        .bind(now)
        .bind(id)
        .execute(ex)
        .await?;
    Ok(())
}

pub async fn mark_cancelled(ex: impl SqliteExecutor<'_>, id: i64) -> PosResult<()> {
    let now = now_millis();
    sqlx::query("UPDATE orders SET status = 'CANCELLED', closed_at = ? WHERE id = ?")
        .bind(now)
        .bind(id)
        .execute(ex)
        .await?;
    Ok(())
}

/// Reopen a fully-paid order after a checkout reversal. Fails with a
/// conflict when the table has already seated a new active order.
pub async fn reopen(ex: impl SqliteExecutor<'_>, id: i64) -> PosResult<()> {
    sqlx::query(
        "UPDATE orders SET status = 'OPEN', closed_at = NULL, paid_amount_cents = 0, payment_method = NULL WHERE id = ?",
    )
    .bind(id)
    .execute(ex)
    .await
    .map_err(|e| {
        if shared::error::is_unique_violation(&e) {
            PosError::conflict(
                ErrorCode::TableAlreadyOccupied,
                "table already has an active order",
            )
        } else {
            e.into()
        }
    })?;
    Ok(())
}

/// Paid orders whose `closed_at` falls inside a business day window.
pub async fn find_paid_in_window(
    ex: impl SqliteExecutor<'_>,
    start_millis: i64,
    end_millis: i64,
) -> PosResult<Vec<Order>> {
    let orders = sqlx::query_as::<_, Order>(
        "SELECT id, table_id, status, subtotal_cents, discount_cents, total_cents, total_amount_cents, paid_amount_cents, payment_method, created_at, closed_at \
         FROM orders WHERE status = 'PAID' AND closed_at >= ? AND closed_at < ? ORDER BY closed_at",
    )
    .bind(start_millis)
    .bind(end_millis)
    .fetch_all(ex)
    .await?;
    Ok(orders)
}

// ---------------------------------------------------------------------------
// order items
// ---------------------------------------------------------------------------

pub async fn items_for_order(
    ex: impl SqliteExecutor<'_>,
    order_id: i64,
) -> PosResult<Vec<OrderItem>> {
    let items = sqlx::query_as::<_, OrderItem>(
        "SELECT id, order_id, menu_item_id, name, quantity, paid_quantity, price_cents, batch_no, notes \
         FROM order_item WHERE order_id = ? ORDER BY id",
    )
    .bind(order_id)
    .fetch_all(ex)
    .await?;
    Ok(items)
}

pub async fn find_item(ex: impl SqliteExecutor<'_>, item_id: i64) -> PosResult<OrderItem> {
    let item = sqlx::query_as::<_, OrderItem>(
        "SELECT id, order_id, menu_item_id, name, quantity, paid_quantity, price_cents, batch_no, notes \
         FROM order_item WHERE id = ?",
    )
    .bind(item_id)
    .fetch_optional(ex)
    .await?
    .ok_or_else(|| {
        PosError::not_found(
            ErrorCode::ItemNotFound,
            format!("order item {item_id} not found"),
        )
    })?;
    Ok(item)
}

pub async fn insert_item(ex: impl SqliteExecutor<'_>, item: &OrderItem) -> PosResult<()> {
    sqlx::query(
        "INSERT INTO order_item (id, order_id, menu_item_id, name, quantity, paid_quantity, price_cents, batch_no, notes) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(item.id)
    .bind(item.order_id)
    .bind(item.menu_item_id)
    .bind(&item.name)
    .bind(item.quantity)
    .bind(item.paid_quantity)
    .bind(item.price_cents)
    .bind(item.batch_no)
    .bind(&item.notes)
    .execute(ex)
    .await?;
    Ok(())
}

pub async fn update_item_quantity(
    ex: impl SqliteExecutor<'_>,
    item_id: i64,
    quantity: i32,
) -> PosResult<()> {
    sqlx::query("UPDATE order_item SET quantity = ? WHERE id = ?")
        .bind(quantity)
        .bind(item_id)
        .execute(ex)
        .await?;
    Ok(())
}

pub async fn update_item_paid_quantity(
    ex: impl SqliteExecutor<'_>,
    item_id: i64,
    paid_quantity: i32,
) -> PosResult<()> {
    sqlx::query("UPDATE order_item SET paid_quantity = ? WHERE id = ?")
        .bind(paid_quantity)
        .bind(item_id)
        .execute(ex)
        .await?;
    Ok(())
}

pub async fn delete_item(ex: impl SqliteExecutor<'_>, item_id: i64) -> PosResult<()> {
    sqlx::query("DELETE FROM order_item WHERE id = ?")
        .bind(item_id)
        .execute(ex)
        .await?;
    Ok(())
}

/// Highest batch number on an order so far (0 when the order has no items).
pub async fn max_batch_no(ex: impl SqliteExecutor<'_>, order_id: i64) -> PosResult<i32> {
    let max: Option<i32> =
        sqlx::query_scalar("SELECT MAX(batch_no) FROM order_item WHERE order_id = ?")
            .bind(order_id)
            .fetch_one(ex)
            .await?;
    Ok(max.unwrap_or(0))
}
