//! Repository Module
//!
//! Thin SQL access for each entity. Functions take any SQLite executor so
//! orchestrators can run them against `&mut *tx` inside one transaction and
//! tests/read paths can pass the pool directly.

pub mod closure;
pub mod dining_table;
pub mod menu_item;
pub mod order;
pub mod transaction;

pub use shared::{PosError, PosResult};
