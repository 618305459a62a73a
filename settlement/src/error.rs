//! Error types for settlement and debt recovery

use crate::types::DebtStatus;
use thiserror::Error;
use uuid::Uuid;

/// Result type for settlement operations
pub type Result<T> = std::result::Result<T, Error>;

/// Settlement errors
#[derive(Error, Debug)]
pub enum Error {
    /// Amount outside the accepted range
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Debt status change not allowed by the lifecycle
    #[error("Invalid debt transition: {from:?} -> {to:?}")]
    InvalidTransition {
        /// Current status
        from: DebtStatus,
        /// Requested status
        to: DebtStatus,
    },

    /// Settlement already paid off another debt
    #[error("Settlement {settlement_id} already used for debt {debt_id}")]
    SettlementAlreadyUsed {
        /// Settlement ID
        settlement_id: Uuid,
        /// Debt the settlement was applied to
        debt_id: Uuid,
    },

    /// Debt not registered in the book
    #[error("Debt not found: {0}")]
    DebtNotFound(Uuid),

    /// Debt already registered in the book
    #[error("Debt already exists: {0}")]
    DuplicateDebt(Uuid),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Metrics registry error
    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<String> for Error {
    fn from(msg: String) -> Self {
        Error::Other(msg)
    }
}

impl From<&str> for Error {
    fn from(msg: &str) -> Self {
        Error::Other(msg.to_string())
    }
}
