//! Checkout and daily-closure reconciliation engine.
//!
//! The money-handling core of a restaurant POS: cent-exact checkout
//! totals, transactional settlement against live order/table state, item
//! mutation and cross-table transfer, and the locked daily closure with
//! per-payment-method reconciliation. HTTP framing, auth and rendering are
//! external collaborators that call in through these entry points:
//!
//! - [`orders::process_checkout`] / [`orders::reverse_checkout`]
//! - [`orders::update_order_item`]
//! - [`orders::transfer_order_items`]
//! - [`closure::compute_daily_closure_snapshot`] /
//!   [`closure::confirm_daily_closure`] /
//!   [`closure::append_closure_adjustment`]

pub mod checkout;
pub mod closure;
pub mod config;
pub mod db;
pub mod orders;
pub mod utils;

pub use config::Config;
pub use db::DbService;
pub use shared::{ErrorCode, PosError, PosResult};
