//! Daily Closure Repository
//!
//! Persistence for locked closure snapshots, their child lines, and the
//! single-row closure sequence counter.

use super::{PosError, PosResult};
use shared::error::ErrorCode;
use shared::models::{ClosureAdjustment, ClosureItemLine, ClosurePaymentLine, DailyClosure};
use shared::util::snowflake_id;
use sqlx::SqliteExecutor;

pub async fn find_by_id(ex: impl SqliteExecutor<'_>, id: i64) -> PosResult<DailyClosure> {
    let closure = sqlx::query_as::<_, DailyClosure>(
        "SELECT id, business_date, sequence_no, tax_rate, gross_revenue_cents, net_revenue_cents, orders_count, refund_cents, void_cents, locked_at \
         FROM daily_closure WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(ex)
    .await?
    .ok_or_else(|| {
        PosError::not_found(ErrorCode::ClosureNotFound, format!("closure {id} not found"))
    })?;
    Ok(closure)
}

pub async fn find_by_date(
    ex: impl SqliteExecutor<'_>,
    business_date: &str,
) -> PosResult<Option<DailyClosure>> {
    let closure = sqlx::query_as::<_, DailyClosure>(
        "SELECT id, business_date, sequence_no, tax_rate, gross_revenue_cents, net_revenue_cents, orders_count, refund_cents, void_cents, locked_at \
         FROM daily_closure WHERE business_date = ?",
    )
    .bind(business_date)
    .fetch_optional(ex)
    .await?;
    Ok(closure)
}

/// Claim the next closure sequence number. Runs inside the caller's
/// transaction so the increment commits or rolls back with the closure row.
pub async fn next_sequence(ex: impl SqliteExecutor<'_>) -> PosResult<i64> {
    let seq: i64 = sqlx::query_scalar(
        "UPDATE closure_sequence SET next_seq = next_seq + 1 WHERE id = 1 RETURNING next_seq - 1",
    )
    .fetch_one(ex)
    .await?;
    Ok(seq)
}

pub async fn insert(ex: impl SqliteExecutor<'_>, closure: &DailyClosure) -> PosResult<()> {
    sqlx::query(
        "INSERT INTO daily_closure (id, business_date, sequence_no, tax_rate, gross_revenue_cents, net_revenue_cents, orders_count, refund_cents, void_cents, locked_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(closure.id)
    .bind(&closure.business_date)
    .bind(closure.sequence_no)
    .bind(closure.tax_rate)
    .bind(closure.gross_revenue_cents)
    .bind(closure.net_revenue_cents)
    .bind(closure.orders_count)
    .bind(closure.refund_cents)
    .bind(closure.void_cents)
    .bind(closure.locked_at)
    .execute(ex)
    .await
    .map_err(|e| {
        if shared::error::is_unique_violation(&e) {
            PosError::conflict(
                ErrorCode::ClosureLocked,
                format!("closure already locked for {}", closure.business_date),
            )
        } else {
            e.into()
        }
    })?;
    Ok(())
}

pub async fn insert_payment_line(
    ex: impl SqliteExecutor<'_>,
    line: &ClosurePaymentLine,
) -> PosResult<()> {
    sqlx::query(
        "INSERT INTO closure_payment_line (id, closure_id, payment_method, payment_group, expected_cents, tx_count) \
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(line.id)
    .bind(line.closure_id)
    .bind(&line.payment_method)
    .bind(line.payment_group)
    .bind(line.expected_cents)
    .bind(line.tx_count)
    .execute(ex)
    .await?;
    Ok(())
}

pub async fn insert_item_line(
    ex: impl SqliteExecutor<'_>,
    line: &ClosureItemLine,
) -> PosResult<()> {
    sqlx::query(
        "INSERT INTO closure_item_line (id, closure_id, menu_item_id, name, category, quantity_sold, revenue_cents, discount_cents) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(line.id)
    .bind(line.closure_id)
    .bind(line.menu_item_id)
    .bind(&line.name)
    .bind(&line.category)
    .bind(line.quantity_sold)
    .bind(line.revenue_cents)
    .bind(line.discount_cents)
    .execute(ex)
    .await?;
    Ok(())
}

pub async fn insert_adjustment(
    ex: impl SqliteExecutor<'_>,
    closure_id: i64,
    adj_type: &str,
    amount_cents: i64,
    payment_method: Option<&str>,
    note: Option<&str>,
) -> PosResult<ClosureAdjustment> {
    let id = snowflake_id();
    let now = shared::util::now_millis();
    sqlx::query(
        "INSERT INTO closure_adjustment (id, closure_id, adj_type, amount_cents, payment_method, note, created_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(id)
    .bind(closure_id)
    .bind(adj_type)
    .bind(amount_cents)
    .bind(payment_method)
    .bind(note)
    .bind(now)
    .execute(ex)
    .await?;
    Ok(ClosureAdjustment {
        id,
        closure_id,
        adj_type: adj_type.to_string(),
        amount_cents,
        payment_method: payment_method.map(str::to_string),
        note: note.map(str::to_string),
        created_at: now,
    })
}

pub async fn payment_lines(
    ex: impl SqliteExecutor<'_>,
    closure_id: i64,
) -> PosResult<Vec<ClosurePaymentLine>> {
    let lines = sqlx::query_as::<_, ClosurePaymentLine>(
        "SELECT id, closure_id, payment_method, payment_group, expected_cents, tx_count \
         FROM closure_payment_line WHERE closure_id = ? ORDER BY payment_method",
    )
    .bind(closure_id)
    .fetch_all(ex)
    .await?;
    Ok(lines)
}

pub async fn item_lines(
    ex: impl SqliteExecutor<'_>,
    closure_id: i64,
) -> PosResult<Vec<ClosureItemLine>> {
    let lines = sqlx::query_as::<_, ClosureItemLine>(
        "SELECT id, closure_id, menu_item_id, name, category, quantity_sold, revenue_cents, discount_cents \
         FROM closure_item_line WHERE closure_id = ? ORDER BY revenue_cents DESC, menu_item_id",
    )
    .bind(closure_id)
    .fetch_all(ex)
    .await?;
    Ok(lines)
}

pub async fn adjustments(
    ex: impl SqliteExecutor<'_>,
    closure_id: i64,
) -> PosResult<Vec<ClosureAdjustment>> {
    let rows = sqlx::query_as::<_, ClosureAdjustment>(
        "SELECT id, closure_id, adj_type, amount_cents, payment_method, note, created_at \
         FROM closure_adjustment WHERE closure_id = ? ORDER BY created_at",
    )
    .bind(closure_id)
    .fetch_all(ex)
    .await?;
    Ok(rows)
}
