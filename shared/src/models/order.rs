//! Order and Order Item Models

use crate::money::Money;
use serde::{Deserialize, Serialize};

/// Order lifecycle state
///
/// `Open`/`Pending`/`Served` are active sub-states (the table still holds
/// the order); `Paid` and `Cancelled` are terminal except for explicit
/// reversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum OrderStatus {
    Open,
    Pending,
    Served,
    Paid,
    Cancelled,
}

impl OrderStatus {
    /// An active order may be settled at the till.
    pub const fn can_checkout(&self) -> bool {
        matches!(self, Self::Open | Self::Pending | Self::Served)
    }

    /// Anything not already settled or voided may be cancelled.
    pub const fn can_cancel(&self) -> bool {
        !matches!(self, Self::Paid | Self::Cancelled)
    }

    /// Line items may only change before service.
    pub const fn can_edit(&self) -> bool {
        matches!(self, Self::Open | Self::Pending)
    }

    pub const fn is_completed(&self) -> bool {
        matches!(self, Self::Paid | Self::Cancelled)
    }
}

/// Order entity. At most one active order per table (enforced by a partial
/// unique index on `table_id`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Order {
    pub id: i64,
    /// NULL after the order is detached from its table
    pub table_id: Option<i64>,
    pub status: OrderStatus,
    pub subtotal_cents: i64,
    pub discount_cents: i64,
    pub total_cents: i64,
    pub total_amount_cents: i64,
    pub paid_amount_cents: i64,
    pub payment_method: Option<String>,
    /// Unix millis
    pub created_at: i64,
    pub closed_at: Option<i64>,
}

impl Order {
    pub fn subtotal(&self) -> Money {
        Money::from_cents(self.subtotal_cents)
    }

    pub fn discount(&self) -> Money {
        Money::from_cents(self.discount_cents)
    }

    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    pub fn paid_amount(&self) -> Money {
        Money::from_cents(self.paid_amount_cents)
    }
}

/// Order line item. `price_cents` and `name` are snapshots frozen at order
/// time — later menu edits never change a submitted line.
///
/// Invariant: `0 <= paid_quantity <= quantity`; a row reaching quantity 0
/// is deleted, never retained.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub menu_item_id: i64,
    pub name: String,
    pub quantity: i32,
    pub paid_quantity: i32,
    /// Unit price snapshot in cents
    pub price_cents: i64,
    /// Submission batch; NULL is treated as batch 1
    pub batch_no: Option<i32>,
    pub notes: Option<String>,
}

impl OrderItem {
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Quantity not yet covered by a payment.
    pub fn outstanding_quantity(&self) -> i32 {
        (self.quantity - self.paid_quantity).max(0)
    }
}
