//! Order Aggregate Rules
//!
//! Pure derivations over an order's line items. Status predicates live on
//! `OrderStatus` itself; everything here is quantity and money math.

use serde::Serialize;
use shared::models::OrderItem;
use shared::money::Money;

/// Σ price × quantity, ignoring payment state.
pub fn calculate_order_total(items: &[OrderItem]) -> Money {
    items
        .iter()
        .map(|i| i.price().times(i.quantity as i64))
        .sum()
}

/// Σ price × max(0, quantity − paid_quantity).
pub fn calculate_unpaid_total(items: &[OrderItem]) -> Money {
    items
        .iter()
        .map(|i| i.price().times(i.outstanding_quantity() as i64))
        .sum()
}

/// Σ price × paid_quantity. Conservation:
/// `calculate_unpaid_total + paid_value == calculate_order_total`.
pub fn paid_value(items: &[OrderItem]) -> Money {
    items
        .iter()
        .map(|i| i.price().times(i.paid_quantity as i64))
        .sum()
}

pub fn is_fully_paid(items: &[OrderItem]) -> bool {
    items.iter().all(|i| i.paid_quantity >= i.quantity)
}

pub fn is_partially_paid(items: &[OrderItem]) -> bool {
    items.iter().any(|i| i.paid_quantity > 0) && !is_fully_paid(items)
}

pub fn unpaid_items(items: &[OrderItem]) -> Vec<&OrderItem> {
    items
        .iter()
        .filter(|i| i.outstanding_quantity() > 0)
        .collect()
}

/// Merge lines sharing a menu item, summing quantity and paid_quantity.
/// Display-only; the merged rows are never written back.
pub fn aggregate_items(items: &[OrderItem]) -> Vec<OrderItem> {
    let mut merged: Vec<OrderItem> = Vec::new();
    for item in items {
        match merged.iter_mut().find(|m| m.menu_item_id == item.menu_item_id) {
            Some(existing) => {
                existing.quantity += item.quantity;
                existing.paid_quantity += item.paid_quantity;
            }
            None => merged.push(item.clone()),
        }
    }
    merged
}

/// One submission batch of an order, for display and receipts.
#[derive(Debug, Clone, Serialize)]
pub struct OrderBatch {
    pub batch_no: i32,
    pub items: Vec<OrderItem>,
}

/// Group persisted rows by batch number (NULL counts as batch 1), ascending.
///
/// With `omit_fully_paid`, each item's displayed quantity is reduced by its
/// paid quantity; items dropping to zero and batches that become empty are
/// dropped entirely.
pub fn build_order_batches(rows: &[OrderItem], omit_fully_paid: bool) -> Vec<OrderBatch> {
    let mut batches: Vec<OrderBatch> = Vec::new();
    for row in rows {
        let batch_no = row.batch_no.unwrap_or(1);
        let mut item = row.clone();
        if omit_fully_paid {
            item.quantity = item.outstanding_quantity();
            item.paid_quantity = 0;
            if item.quantity <= 0 {
                continue;
            }
        }
        match batches.iter_mut().find(|b| b.batch_no == batch_no) {
            Some(batch) => batch.items.push(item),
            None => batches.push(OrderBatch {
                batch_no,
                items: vec![item],
            }),
        }
    }
    batches.sort_by_key(|b| b.batch_no);
    batches
}
