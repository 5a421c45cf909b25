//! Dining Table Model

use crate::money::Money;
use serde::{Deserialize, Serialize};

/// Table occupancy state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum TableStatus {
    Idle,
    Occupied,
}

/// Dining table entity
///
/// `amount_cents` is a denormalized cache of the active order's unpaid
/// total; every orchestrator that changes an order refreshes it in the same
/// transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct DiningTable {
    pub id: i64,
    pub number: i32,
    pub status: TableStatus,
    pub capacity: i32,
    /// Outstanding unpaid amount in cents
    pub amount_cents: i64,
    pub current_guests: i32,
    /// Unix millis when the table was seated, NULL while idle
    pub started_at: Option<i64>,
}

impl DiningTable {
    pub fn outstanding(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }
}
