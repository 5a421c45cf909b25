//! Checkout types and pure calculation

pub mod calculator;

pub use calculator::{
    calculate_aa_personal_total, calculate_aa_split, calculate_change, calculate_checkout_total,
    calculate_discount, calculate_items_count, calculate_subtotal, validate_checkout_input,
    AaSplit, CheckoutTotals, LineItem,
};

use serde::{Deserialize, Serialize};
use shared::money::Money;

/// Settlement mode: the whole outstanding order at once, or an AA split
/// covering a caller-selected subset of outstanding quantities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckoutMode {
    Full,
    Aa,
}

/// One caller-selected line for an AA checkout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AaSelection {
    pub item_id: i64,
    pub quantity: i32,
}

/// Checkout request as submitted by a terminal.
///
/// `client_subtotal` / `client_total` carry what the terminal displayed;
/// the orchestrator recomputes both server-side and rejects on divergence
/// beyond one cent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutInput {
    pub table_id: i64,
    pub order_id: i64,
    pub mode: CheckoutMode,
    pub payment_method: String,
    #[serde(default)]
    pub discount_percent: f64,
    pub client_subtotal: Money,
    pub client_total: Money,
    /// Tendered amount; `None` or non-positive means "exact"
    #[serde(default)]
    pub received: Option<Money>,
    #[serde(default)]
    pub aa_items: Vec<AaSelection>,
}
