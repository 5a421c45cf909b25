//! Daily Closure Aggregator
//!
//! Two-phase: a non-destructive snapshot preview over the day's settled
//! money, and a one-time idempotent lock. Adjustments appended after the
//! lock form a delta layer; the locked aggregate is never recomputed.

pub mod confirm;
pub mod payments;

pub use confirm::{
    append_closure_adjustment, confirm_daily_closure, AdjustmentInput, ConfirmClosureInput,
};
pub use payments::{
    build_daily_closure_items, build_daily_closure_payments, classify_payment_method,
    ClosureItemsView, ClosurePaymentsView, PaymentLineView,
};

use std::collections::HashMap;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use sqlx::{SqliteConnection, SqlitePool};

use shared::error::PosResult;
use shared::models::PaymentGroup;
use shared::money::Money;

use crate::config::Config;
use crate::db::repository::{menu_item, order as order_repo, transaction as tx_repo};
use crate::utils::time;

/// Headline numbers for one business day.
#[derive(Debug, Clone, Serialize)]
pub struct ClosureOverview {
    pub business_date: String,
    pub tax_rate: f64,
    pub gross_revenue: Money,
    pub net_revenue: Money,
    pub orders_count: i64,
    pub average_order_value_gross: Money,
    pub average_order_value_net: Money,
}

#[derive(Debug, Clone, Serialize)]
pub struct SnapshotPaymentLine {
    pub payment_method: String,
    pub payment_group: PaymentGroup,
    pub expected: Money,
    pub tx_count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SnapshotItemLine {
    pub menu_item_id: i64,
    pub name: String,
    pub category: String,
    pub quantity_sold: i64,
    pub revenue: Money,
    pub discount: Money,
}

/// Non-destructive preview of a day's closure.
#[derive(Debug, Clone, Serialize)]
pub struct ClosureSnapshot {
    pub overview: ClosureOverview,
    pub payment_lines: Vec<SnapshotPaymentLine>,
    pub items: Vec<SnapshotItemLine>,
}

/// Allocate an order's discount to one item, proportional to the item's
/// share of the order subtotal. A non-positive subtotal forces the impact
/// to zero rather than dividing by it.
fn allocate_discount(order_discount: i64, item_subtotal: i64, order_subtotal: i64) -> i64 {
    if order_discount == 0 || order_subtotal <= 0 {
        return 0;
    }
    let impact = Decimal::from(order_discount) * Decimal::from(item_subtotal)
        / Decimal::from(order_subtotal);
    impact
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .unwrap_or(0)
}

/// Snapshot computation against an explicit connection, so the lock can run
/// it inside its own transaction and preview can use a pooled connection.
pub(crate) async fn snapshot_on(
    conn: &mut SqliteConnection,
    cfg: &Config,
    business_date: &str,
    tax_rate: f64,
) -> PosResult<ClosureSnapshot> {
    let date = time::parse_date(business_date)?;
    time::validate_not_future(date, cfg.timezone)?;

    let payment_lines: Vec<SnapshotPaymentLine> =
        tx_repo::income_by_method(&mut *conn, business_date)
            .await?
            .into_iter()
            .map(|(method, expected_cents, tx_count)| SnapshotPaymentLine {
                payment_group: classify_payment_method(&method),
                payment_method: method,
                expected: Money::from_cents(expected_cents),
                tx_count,
            })
            .collect();

    let gross: Money = payment_lines.iter().map(|l| l.expected).sum();

    let start = time::day_start_millis(date, cfg.business_day_cutoff, cfg.timezone);
    let end = time::day_end_millis(date, cfg.business_day_cutoff, cfg.timezone);
    let paid_orders = order_repo::find_paid_in_window(&mut *conn, start, end).await?;
    let orders_count = paid_orders.len() as i64;

    // Per-item revenue with proportional discount allocation.
    let mut by_item: HashMap<i64, SnapshotItemLine> = HashMap::new();
    let mut category_cache: HashMap<i64, String> = HashMap::new();
    for order in &paid_orders {
        let items = order_repo::items_for_order(&mut *conn, order.id).await?;
        let order_subtotal: i64 = items.iter().map(|i| i.price_cents * i.quantity as i64).sum();
        for item in &items {
            let item_subtotal = item.price_cents * item.quantity as i64;
            let discount_impact =
                allocate_discount(order.discount_cents, item_subtotal, order_subtotal);

            let category = match category_cache.get(&item.menu_item_id) {
                Some(cached) => cached.clone(),
                None => {
                    let category = menu_item::find_by_id(&mut *conn, item.menu_item_id)
                        .await?
                        .map(|m| m.category)
                        .unwrap_or_else(|| "uncategorized".to_string());
                    category_cache.insert(item.menu_item_id, category.clone());
                    category
                }
            };

            let entry = by_item
                .entry(item.menu_item_id)
                .or_insert_with(|| SnapshotItemLine {
                    menu_item_id: item.menu_item_id,
                    name: item.name.clone(),
                    category,
                    quantity_sold: 0,
                    revenue: Money::ZERO,
                    discount: Money::ZERO,
                });
            entry.quantity_sold += item.quantity as i64;
            entry.revenue += Money::from_cents(item_subtotal - discount_impact);
            entry.discount += Money::from_cents(discount_impact);
        }
    }
    let mut items: Vec<SnapshotItemLine> = by_item.into_values().collect();
    items.sort_by(|a, b| b.revenue.cmp(&a.revenue).then(a.menu_item_id.cmp(&b.menu_item_id)));

    let net = if tax_rate > 0.0 {
        gross.divide(1.0 + tax_rate)
    } else {
        gross
    };

    // `divide` yields zero for a zero divisor, so an empty day averages to 0.
    let overview = ClosureOverview {
        business_date: business_date.to_string(),
        tax_rate,
        gross_revenue: gross,
        net_revenue: net,
        orders_count,
        average_order_value_gross: gross.divide(orders_count as f64),
        average_order_value_net: net.divide(orders_count as f64),
    };

    Ok(ClosureSnapshot {
        overview,
        payment_lines,
        items,
    })
}

/// Preview a day's closure without writing anything.
pub async fn compute_daily_closure_snapshot(
    pool: &SqlitePool,
    cfg: &Config,
    business_date: &str,
    tax_rate: f64,
) -> PosResult<ClosureSnapshot> {
    let mut conn = pool.acquire().await?;
    snapshot_on(&mut conn, cfg, business_date, tax_rate).await
}
