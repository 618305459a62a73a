//! Error types for pricing engine

use thiserror::Error;

/// Pricing engine error
#[derive(Debug, Error)]
pub enum Error {
    /// Installment count or index out of range
    #[error("Invalid installments: {0}")]
    InvalidInstallments(String),

    /// Amount outside the accepted range
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Malformed fee or anticipation rule
    #[error("Invalid rule: {0}")]
    InvalidRule(String),

    /// Split rules that do not cover the whole amount
    #[error("Invalid split: {0}")]
    InvalidSplit(String),

    /// Arithmetic overflow
    #[error("Calculation error: {0}")]
    Calculation(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type
pub type Result<T> = std::result::Result<T, Error>;
