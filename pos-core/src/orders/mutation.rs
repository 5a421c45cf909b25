//! Order Item Mutation Orchestrator
//!
//! Decrement or remove a single line while respecting paid quantities.
//! Rows never survive at quantity zero.

use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::info;

use shared::error::{ErrorCode, PosError, PosResult};
use shared::models::Order;
use shared::money::Money;

use crate::db::repository::{dining_table, order as order_repo};

use super::rules::{self, OrderBatch};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "type")]
pub enum ItemMutation {
    Decrement,
    Remove,
}

#[derive(Debug, Clone, Serialize)]
pub struct MutationOutcome {
    pub order: Order,
    pub batches: Vec<OrderBatch>,
}

pub async fn update_order_item(
    pool: &SqlitePool,
    item_id: i64,
    mutation: ItemMutation,
) -> PosResult<MutationOutcome> {
    let mut tx = pool.begin().await?;

    let item = order_repo::find_item(&mut *tx, item_id).await?;
    let order = order_repo::find_by_id(&mut *tx, item.order_id).await?;
    if order.status.is_completed() {
        return Err(PosError::conflict(
            ErrorCode::OrderAlreadySettled,
            format!("order {} is {:?}, items can no longer change", order.id, order.status),
        ));
    }
    if item.paid_quantity >= item.quantity {
        return Err(PosError::conflict(
            ErrorCode::ItemFullyPaid,
            format!("item '{}' is fully paid", item.name),
        ));
    }

    let delta: Money = match mutation {
        ItemMutation::Decrement => {
            let new_quantity = item.quantity - 1;
            if new_quantity < item.paid_quantity {
                return Err(PosError::conflict(
                    ErrorCode::DecrementBelowPaidQuantity,
                    format!(
                        "item '{}' has {} paid, cannot decrement to {}",
                        item.name, item.paid_quantity, new_quantity
                    ),
                ));
            }
            if new_quantity == 0 {
                order_repo::delete_item(&mut *tx, item.id).await?;
            } else {
                order_repo::update_item_quantity(&mut *tx, item.id, new_quantity).await?;
            }
            item.price()
        }
        ItemMutation::Remove => {
            if item.paid_quantity > 0 {
                return Err(PosError::conflict(
                    ErrorCode::RemovePaidItemForbidden,
                    format!("item '{}' has paid quantity, cannot remove", item.name),
                ));
            }
            order_repo::delete_item(&mut *tx, item.id).await?;
            item.price().times(item.quantity as i64)
        }
    };

    // Reduce the order's money fields by the delta, clamped at zero.
    let subtotal = (order.subtotal() - delta).max(Money::ZERO);
    let total = (order.total() - delta).max(Money::ZERO);
    let total_amount = (Money::from_cents(order.total_amount_cents) - delta).max(Money::ZERO);
    order_repo::update_totals(
        &mut *tx,
        order.id,
        subtotal.cents(),
        order.discount_cents,
        total.cents(),
        total_amount.cents(),
    )
    .await?;

    let items = order_repo::items_for_order(&mut *tx, order.id).await?;
    if let Some(table_id) = order.table_id {
        let outstanding = rules::calculate_unpaid_total(&items);
        dining_table::update_amount(&mut *tx, table_id, outstanding.cents()).await?;
    }

    let order = order_repo::find_by_id(&mut *tx, order.id).await?;
    tx.commit().await?;

    info!(order_id = order.id, item_id, ?mutation, "order item updated");

    Ok(MutationOutcome {
        batches: rules::build_order_batches(&items, false),
        order,
    })
}
