//! Persisted entity models
//!
//! Money columns are INTEGER minor units throughout; models expose `Money`
//! accessors so arithmetic never happens on raw cents at call sites.

pub mod daily_closure;
pub mod dining_table;
pub mod menu_item;
pub mod order;
pub mod transaction;

pub use daily_closure::{
    ClosureAdjustment, ClosureItemLine, ClosurePaymentLine, DailyClosure, PaymentGroup,
};
pub use dining_table::{DiningTable, TableStatus};
pub use menu_item::{MenuItem, MenuItemCreate};
pub use order::{Order, OrderItem, OrderStatus};
pub use transaction::{PosTransaction, TxType};
