//! Transaction Repository
//!
//! The append-only money ledger. Checkout writes here; daily closure reads
//! here. Reversal deletes the order's rows rather than appending a negative,
//! so a reversed checkout leaves no trace in the day's revenue.

use super::PosResult;
use shared::models::{PosTransaction, TxType};
use shared::util::{now_millis, snowflake_id};
use sqlx::SqliteExecutor;

#[allow(clippy::too_many_arguments)]
pub async fn insert(
    ex: impl SqliteExecutor<'_>,
    tx_type: TxType,
    category: &str,
    amount_cents: i64,
    payment_method: &str,
    order_id: Option<i64>,
    business_date: &str,
) -> PosResult<PosTransaction> {
    let id = snowflake_id();
    let now = now_millis();
    sqlx::query(
        "INSERT INTO pos_transaction (id, tx_type, category, amount_cents, payment_method, order_id, business_date, created_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(id)
    .bind(tx_type)
    .bind(category)
    .bind(amount_cents)
    .bind(payment_method)
    .bind(order_id)
    .bind(business_date)
    .bind(now)
    .execute(ex)
    .await?;
    Ok(PosTransaction {
        id,
        tx_type,
        category: category.to_string(),
        amount_cents,
        payment_method: payment_method.to_string(),
        order_id,
        business_date: business_date.to_string(),
        created_at: now,
    })
}

pub async fn find_by_order(
    ex: impl SqliteExecutor<'_>,
    order_id: i64,
) -> PosResult<Vec<PosTransaction>> {
    let rows = sqlx::query_as::<_, PosTransaction>(
        "SELECT id, tx_type, category, amount_cents, payment_method, order_id, business_date, created_at \
         FROM pos_transaction WHERE order_id = ? ORDER BY created_at",
    )
    .bind(order_id)
    .fetch_all(ex)
    .await?;
    Ok(rows)
}

pub async fn delete_by_order(ex: impl SqliteExecutor<'_>, order_id: i64) -> PosResult<u64> {
    let result = sqlx::query("DELETE FROM pos_transaction WHERE order_id = ?")
        .bind(order_id)
        .execute(ex)
        .await?;
    Ok(result.rows_affected())
}

/// Income totals for a business date, grouped by payment method.
pub async fn income_by_method(
    ex: impl SqliteExecutor<'_>,
    business_date: &str,
) -> PosResult<Vec<(String, i64, i64)>> {
    let rows: Vec<(String, i64, i64)> = sqlx::query_as(
        "SELECT payment_method, COALESCE(SUM(amount_cents), 0), COUNT(*) \
         FROM pos_transaction WHERE business_date = ? AND tx_type = 'INCOME' \
         GROUP BY payment_method ORDER BY payment_method",
    )
    .bind(business_date)
    .fetch_all(ex)
    .await?;
    Ok(rows)
}
