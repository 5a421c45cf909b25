//! Engine error taxonomy
//!
//! Every failure surfaced by an orchestrator carries a stable code the UI
//! layer can branch on. Four kinds only: missing resource, invalid input,
//! concurrent-state conflict, and opaque persistence failure. The engine
//! never retries on its own — a blind retry of a financial operation could
//! double-charge — so the kind tells the caller what to do next.

use thiserror::Error;

/// Stable machine-readable error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Not found
    TableNotFound,
    OrderNotFound,
    ItemNotFound,
    ClosureNotFound,

    // Validation
    EmptyOrder,
    EmptyAaSelection,
    AaQuantityExceedsAvailable,
    InvalidDiscount,
    InvalidAmount,
    InvalidDate,
    InsufficientReceived,
    NoTransferableItems,
    TransferQuantityExceedsAvailable,

    // Conflict
    TableAlreadyOccupied,
    SubtotalMismatch,
    TotalMismatch,
    OrderAlreadySettled,
    OrderNotSettled,
    ItemFullyPaid,
    DecrementBelowPaidQuantity,
    RemovePaidItemForbidden,
    TransferPaidItemForbidden,
    SourceOrderPartiallyPaid,
    TargetOrderPartiallyPaid,
    ClosureLocked,

    // System
    DatabaseError,
}

impl ErrorCode {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::TableNotFound => "TABLE_NOT_FOUND",
            Self::OrderNotFound => "ORDER_NOT_FOUND",
            Self::ItemNotFound => "ITEM_NOT_FOUND",
            Self::ClosureNotFound => "CLOSURE_NOT_FOUND",
            Self::EmptyOrder => "EMPTY_ORDER",
            Self::EmptyAaSelection => "EMPTY_AA_SELECTION",
            Self::AaQuantityExceedsAvailable => "AA_QUANTITY_EXCEEDS_AVAILABLE",
            Self::InvalidDiscount => "INVALID_DISCOUNT",
            Self::InvalidAmount => "INVALID_AMOUNT",
            Self::InvalidDate => "INVALID_DATE",
            Self::InsufficientReceived => "INSUFFICIENT_RECEIVED",
            Self::NoTransferableItems => "NO_TRANSFERABLE_ITEMS",
            Self::TransferQuantityExceedsAvailable => "TRANSFER_QUANTITY_EXCEEDS_AVAILABLE",
            Self::TableAlreadyOccupied => "TABLE_ALREADY_OCCUPIED",
            Self::SubtotalMismatch => "SUBTOTAL_MISMATCH",
            Self::TotalMismatch => "TOTAL_MISMATCH",
            Self::OrderAlreadySettled => "ORDER_ALREADY_SETTLED",
            Self::OrderNotSettled => "ORDER_NOT_SETTLED",
            Self::ItemFullyPaid => "ITEM_FULLY_PAID",
            Self::DecrementBelowPaidQuantity => "DECREMENT_BELOW_PAID_QUANTITY",
            Self::RemovePaidItemForbidden => "REMOVE_PAID_ITEM_FORBIDDEN",
            Self::TransferPaidItemForbidden => "TRANSFER_PAID_ITEM_FORBIDDEN",
            Self::SourceOrderPartiallyPaid => "SOURCE_ORDER_PARTIALLY_PAID",
            Self::TargetOrderPartiallyPaid => "TARGET_ORDER_PARTIALLY_PAID",
            Self::ClosureLocked => "CLOSURE_LOCKED",
            Self::DatabaseError => "DATABASE_ERROR",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unified engine error.
#[derive(Debug, Error)]
pub enum PosError {
    #[error("[{code}] {message}")]
    NotFound { code: ErrorCode, message: String },

    #[error("[{code}] {message}")]
    Validation { code: ErrorCode, message: String },

    #[error("[{code}] {message}")]
    Conflict { code: ErrorCode, message: String },

    #[error("Database error: {0}")]
    Database(String),
}

impl PosError {
    pub fn not_found(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::NotFound {
            code,
            message: message.into(),
        }
    }

    pub fn validation(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Validation {
            code,
            message: message.into(),
        }
    }

    pub fn conflict(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Conflict {
            code,
            message: message.into(),
        }
    }

    /// The stable code, `DATABASE_ERROR` for persistence failures.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::NotFound { code, .. }
            | Self::Validation { code, .. }
            | Self::Conflict { code, .. } => *code,
            Self::Database(_) => ErrorCode::DatabaseError,
        }
    }
}

#[cfg(feature = "db")]
impl From<sqlx::Error> for PosError {
    fn from(err: sqlx::Error) -> Self {
        PosError::Database(err.to_string())
    }
}

/// True when the underlying driver reports a UNIQUE constraint violation.
/// Used by the closure-lock race: a concurrent first-time insert loses the
/// race, re-reads the now-existing row and returns it as success.
#[cfg(feature = "db")]
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => db.is_unique_violation(),
        _ => false,
    }
}

pub type PosResult<T> = Result<T, PosError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable_strings() {
        assert_eq!(ErrorCode::SubtotalMismatch.as_str(), "SUBTOTAL_MISMATCH");
        assert_eq!(
            ErrorCode::TransferQuantityExceedsAvailable.as_str(),
            "TRANSFER_QUANTITY_EXCEEDS_AVAILABLE"
        );
        assert_eq!(
            ErrorCode::DecrementBelowPaidQuantity.as_str(),
            "DECREMENT_BELOW_PAID_QUANTITY"
        );
    }

    #[test]
    fn error_carries_code_and_message() {
        let err = PosError::conflict(ErrorCode::OrderAlreadySettled, "order 42 is PAID");
        assert_eq!(err.code(), ErrorCode::OrderAlreadySettled);
        assert_eq!(err.to_string(), "[ORDER_ALREADY_SETTLED] order 42 is PAID");
    }
}
