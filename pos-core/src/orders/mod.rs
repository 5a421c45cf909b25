//! Order orchestration
//!
//! Aggregate rules plus the transactional entry points: checkout, item
//! mutation, and cross-table transfer. Each entry point opens exactly one
//! SQLite transaction; any propagated error rolls the whole unit back.

pub mod checkout;
pub mod mutation;
pub mod rules;
pub mod transfer;

pub use checkout::{process_checkout, reverse_checkout, CheckoutMeta, CheckoutOutcome};
pub use mutation::{update_order_item, ItemMutation, MutationOutcome};
pub use rules::OrderBatch;
pub use transfer::{transfer_order_items, TransferItem, TransferOutcome, TransferRequest};
