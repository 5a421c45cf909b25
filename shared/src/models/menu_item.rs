//! Menu Item Model

use crate::money::Money;
use serde::{Deserialize, Serialize};

/// Menu item entity. Soft-deleted via `available = false` so historical
/// order items keep a valid reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct MenuItem {
    pub id: i64,
    pub name: String,
    pub category: String,
    /// Unit price in cents
    pub price_cents: i64,
    pub available: bool,
}

impl MenuItem {
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }
}

/// Create menu item payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuItemCreate {
    pub name: String,
    pub category: String,
    pub price_cents: i64,
}
