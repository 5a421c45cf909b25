//! Payment Transaction Model

use crate::money::Money;
use serde::{Deserialize, Serialize};

/// Transaction direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum TxType {
    Income,
    Expense,
}

/// Money movement record. Exactly one INCOME row is produced per successful
/// checkout; an explicit reversal deletes it again.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct PosTransaction {
    pub id: i64,
    pub tx_type: TxType,
    pub category: String,
    pub amount_cents: i64,
    pub payment_method: String,
    pub order_id: Option<i64>,
    /// Business date this transaction belongs to (YYYY-MM-DD)
    pub business_date: String,
    /// Unix millis
    pub created_at: i64,
}

impl PosTransaction {
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }
}
