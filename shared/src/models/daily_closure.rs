//! Daily Closure Models
//!
//! A closure is a locked snapshot of one business day's settled money.
//! Once `locked_at` is set the aggregate is immutable; operator corrections
//! arrive as appended adjustments, a delta layer that is never folded back
//! into the locked numbers.

use crate::money::Money;
use serde::{Deserialize, Serialize};

/// Reconciliation grouping for a payment method.
///
/// Classification priority is CASH > PLATFORM > CARD > OTHER; see the
/// keyword rule table in the engine's closure module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum PaymentGroup {
    Cash,
    Platform,
    Card,
    Other,
}

impl PaymentGroup {
    pub const fn is_cash(&self) -> bool {
        matches!(self, Self::Cash)
    }
}

/// Daily closure header row
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct DailyClosure {
    pub id: i64,
    /// Business date (YYYY-MM-DD), unique
    pub business_date: String,
    /// Monotonic closure number, from the transactional sequence row
    pub sequence_no: i64,
    /// Tax rate used for net revenue (e.g. 0.10 for 10%)
    pub tax_rate: f64,
    pub gross_revenue_cents: i64,
    pub net_revenue_cents: i64,
    pub orders_count: i64,
    pub refund_cents: i64,
    pub void_cents: i64,
    /// Unix millis; set exactly once, immutable afterwards
    pub locked_at: Option<i64>,

    // -- Relations (populated by application code, skipped by FromRow) --
    #[cfg_attr(feature = "db", sqlx(skip))]
    #[serde(default)]
    pub payment_lines: Vec<ClosurePaymentLine>,
    #[cfg_attr(feature = "db", sqlx(skip))]
    #[serde(default)]
    pub item_lines: Vec<ClosureItemLine>,
    #[cfg_attr(feature = "db", sqlx(skip))]
    #[serde(default)]
    pub adjustments: Vec<ClosureAdjustment>,
}

impl DailyClosure {
    pub fn gross_revenue(&self) -> Money {
        Money::from_cents(self.gross_revenue_cents)
    }

    pub fn net_revenue(&self) -> Money {
        Money::from_cents(self.net_revenue_cents)
    }

    pub fn is_locked(&self) -> bool {
        self.locked_at.is_some()
    }
}

/// Expected takings per payment method
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct ClosurePaymentLine {
    pub id: i64,
    pub closure_id: i64,
    pub payment_method: String,
    pub payment_group: PaymentGroup,
    pub expected_cents: i64,
    pub tx_count: i64,
}

impl ClosurePaymentLine {
    pub fn expected(&self) -> Money {
        Money::from_cents(self.expected_cents)
    }
}

/// Per-menu-item revenue with its share of order discounts
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct ClosureItemLine {
    pub id: i64,
    pub closure_id: i64,
    pub menu_item_id: i64,
    pub name: String,
    pub category: String,
    pub quantity_sold: i64,
    pub revenue_cents: i64,
    pub discount_cents: i64,
}

/// Manual correction appended to a locked closure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct ClosureAdjustment {
    pub id: i64,
    pub closure_id: i64,
    pub adj_type: String,
    pub amount_cents: i64,
    /// NULL means unassigned: affects only the grand totals
    pub payment_method: Option<String>,
    pub note: Option<String>,
    pub created_at: i64,
}

impl ClosureAdjustment {
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }
}
