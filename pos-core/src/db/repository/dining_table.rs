//! Dining Table Repository

use super::PosResult;
use shared::models::DiningTable;
use shared::util::{now_millis, snowflake_id};
use sqlx::SqliteExecutor;

pub async fn find_by_id(ex: impl SqliteExecutor<'_>, id: i64) -> PosResult<Option<DiningTable>> {
    let table = sqlx::query_as::<_, DiningTable>(
        "SELECT id, number, status, capacity, amount_cents, current_guests, started_at FROM dining_table WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(ex)
    .await?;
    Ok(table)
}

pub async fn create(
    ex: impl SqliteExecutor<'_>,
    number: i32,
    capacity: i32,
) -> PosResult<DiningTable> {
    let id = snowflake_id();
    sqlx::query(
        "INSERT INTO dining_table (id, number, status, capacity, amount_cents, current_guests) VALUES (?, ?, 'IDLE', ?, 0, 0)",
    )
    .bind(id)
    .bind(number)
    .bind(capacity)
    .execute(ex)
    .await?;
    Ok(DiningTable {
        id,
        number,
        status: shared::models::TableStatus::Idle,
        capacity,
        amount_cents: 0,
        current_guests: 0,
        started_at: None,
    })
}

/// Occupy a table (or refresh its outstanding amount while occupied).
/// `started_at` is only stamped on the idle → occupied transition.
pub async fn occupy(ex: impl SqliteExecutor<'_>, id: i64, amount_cents: i64) -> PosResult<()> {
    let now = now_millis();
    sqlx::query(
        "UPDATE dining_table SET status = 'OCCUPIED', amount_cents = ?, started_at = COALESCE(started_at, ?) WHERE id = ?",
    )
    .bind(amount_cents)
    .bind(now)
    .bind(id)
    .execute(ex)
    .await?;
    Ok(())
}

/// Reset to idle: no outstanding amount, no guests, no session start.
pub async fn reset_idle(ex: impl SqliteExecutor<'_>, id: i64) -> PosResult<()> {
    sqlx::query(
        "UPDATE dining_table SET status = 'IDLE', amount_cents = 0, current_guests = 0, started_at = NULL WHERE id = ?",
    )
    .bind(id)
    .execute(ex)
    .await?;
    Ok(())
}

/// Refresh the denormalized outstanding amount without touching occupancy.
pub async fn update_amount(
    ex: impl SqliteExecutor<'_>,
    id: i64,
    amount_cents: i64,
) -> PosResult<()> {
    sqlx::query("UPDATE dining_table SET amount_cents = ? WHERE id = ?")
        .bind(amount_cents)
        .bind(id)
        .execute(ex)
        .await?;
    Ok(())
}
