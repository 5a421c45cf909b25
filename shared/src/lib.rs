//! Shared domain types for the POS checkout & closure engine
//!
//! Kept free of I/O: the engine crate (`pos-core`) owns all persistence.
//! Models derive `sqlx::FromRow` only behind the `db` feature so UI-side
//! consumers can depend on this crate without pulling in a database driver.

pub mod error;
pub mod models;
pub mod money;
pub mod util;

pub use error::{ErrorCode, PosError, PosResult};
pub use money::{MONEY_EPSILON_CENTS, Money};
