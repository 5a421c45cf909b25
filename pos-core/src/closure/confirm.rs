//! Closure locking
//!
//! Confirm is idempotent: a second call for the same business date returns
//! the already-locked closure, and a unique-constraint race between two
//! concurrent first-time confirms resolves to the winner's row for both
//! callers.

use serde::{Deserialize, Serialize};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{info, warn};

use shared::error::{ErrorCode, PosError, PosResult};
use shared::models::{ClosureAdjustment, ClosureItemLine, ClosurePaymentLine, DailyClosure};
use shared::money::Money;
use shared::util::{now_millis, snowflake_id};

use crate::config::Config;
use crate::db::repository::closure as closure_repo;
use crate::utils::time;

use super::snapshot_on;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdjustmentInput {
    pub adj_type: String,
    pub amount: Money,
    #[serde(default)]
    pub payment_method: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfirmClosureInput {
    /// Business date to lock; defaults to the current business date
    #[serde(default)]
    pub date: Option<String>,
    /// Overrides the configured tax rate for this closure only
    #[serde(default)]
    pub tax_rate: Option<f64>,
    #[serde(default)]
    pub adjustments: Vec<AdjustmentInput>,
}

async fn load_children(conn: &mut SqliteConnection, closure: &mut DailyClosure) -> PosResult<()> {
    closure.payment_lines = closure_repo::payment_lines(&mut *conn, closure.id).await?;
    closure.item_lines = closure_repo::item_lines(&mut *conn, closure.id).await?;
    closure.adjustments = closure_repo::adjustments(&mut *conn, closure.id).await?;
    Ok(())
}

async fn read_locked(pool: &SqlitePool, business_date: &str) -> PosResult<DailyClosure> {
    let mut conn = pool.acquire().await?;
    let mut closure = closure_repo::find_by_date(&mut *conn, business_date)
        .await?
        .ok_or_else(|| {
            PosError::not_found(
                ErrorCode::ClosureNotFound,
                format!("no closure for {business_date}"),
            )
        })?;
    load_children(&mut conn, &mut closure).await?;
    Ok(closure)
}

/// Lock one business day exactly once.
pub async fn confirm_daily_closure(
    pool: &SqlitePool,
    cfg: &Config,
    input: ConfirmClosureInput,
) -> PosResult<DailyClosure> {
    let business_date = match input.date {
        Some(date) => date,
        None => time::current_business_date(cfg.business_day_cutoff, cfg.timezone)
            .format("%Y-%m-%d")
            .to_string(),
    };
    let tax_rate = input.tax_rate.unwrap_or(cfg.tax_rate);

    let mut tx = pool.begin().await?;

    if let Some(mut existing) = closure_repo::find_by_date(&mut *tx, &business_date).await? {
        load_children(&mut *tx, &mut existing).await?;
        tx.commit().await?;
        info!(business_date, closure_id = existing.id, "closure already locked, returning as-is");
        return Ok(existing);
    }

    let snapshot = snapshot_on(&mut *tx, cfg, &business_date, tax_rate).await?;
    let sequence_no = closure_repo::next_sequence(&mut *tx).await?;

    let mut closure = DailyClosure {
        id: snowflake_id(),
        business_date: business_date.clone(),
        sequence_no,
        tax_rate,
        gross_revenue_cents: snapshot.overview.gross_revenue.cents(),
        net_revenue_cents: snapshot.overview.net_revenue.cents(),
        orders_count: snapshot.overview.orders_count,
        refund_cents: 0,
        void_cents: 0,
        locked_at: Some(now_millis()),
        payment_lines: Vec::new(),
        item_lines: Vec::new(),
        adjustments: Vec::new(),
    };

    if let Err(err) = closure_repo::insert(&mut *tx, &closure).await {
        // Lost a concurrent first-time confirm: the other transaction's row
        // is the closure of record. Surface it as success, never a failure.
        if matches!(&err, PosError::Conflict { code, .. } if *code == ErrorCode::ClosureLocked) {
            drop(tx);
            warn!(business_date, "lost closure-lock race, returning existing closure");
            return read_locked(pool, &business_date).await;
        }
        return Err(err);
    }

    for line in &snapshot.payment_lines {
        let row = ClosurePaymentLine {
            id: snowflake_id(),
            closure_id: closure.id,
            payment_method: line.payment_method.clone(),
            payment_group: line.payment_group,
            expected_cents: line.expected.cents(),
            tx_count: line.tx_count,
        };
        closure_repo::insert_payment_line(&mut *tx, &row).await?;
        closure.payment_lines.push(row);
    }
    for item in &snapshot.items {
        let row = ClosureItemLine {
            id: snowflake_id(),
            closure_id: closure.id,
            menu_item_id: item.menu_item_id,
            name: item.name.clone(),
            category: item.category.clone(),
            quantity_sold: item.quantity_sold,
            revenue_cents: item.revenue.cents(),
            discount_cents: item.discount.cents(),
        };
        closure_repo::insert_item_line(&mut *tx, &row).await?;
        closure.item_lines.push(row);
    }
    for adjustment in &input.adjustments {
        let row = closure_repo::insert_adjustment(
            &mut *tx,
            closure.id,
            &adjustment.adj_type,
            adjustment.amount.cents(),
            adjustment.payment_method.as_deref(),
            adjustment.note.as_deref(),
        )
        .await?;
        closure.adjustments.push(row);
    }

    tx.commit().await?;

    info!(
        business_date,
        closure_id = closure.id,
        sequence_no,
        gross = %closure.gross_revenue(),
        "daily closure locked"
    );

    Ok(closure)
}

/// Append a correction to a locked closure. The locked aggregate is never
/// recomputed; callers fold adjustments in via `build_daily_closure_payments`.
pub async fn append_closure_adjustment(
    pool: &SqlitePool,
    closure_id: i64,
    input: AdjustmentInput,
) -> PosResult<Vec<ClosureAdjustment>> {
    let mut tx = pool.begin().await?;

    let closure = closure_repo::find_by_id(&mut *tx, closure_id).await?;
    closure_repo::insert_adjustment(
        &mut *tx,
        closure.id,
        &input.adj_type,
        input.amount.cents(),
        input.payment_method.as_deref(),
        input.note.as_deref(),
    )
    .await?;
    let adjustments = closure_repo::adjustments(&mut *tx, closure.id).await?;

    tx.commit().await?;

    info!(closure_id, count = adjustments.len(), "closure adjustment appended");

    Ok(adjustments)
}
