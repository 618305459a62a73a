//! Payables Ledger Core
//!
//! Ledger entries ("payables") for card receivables, and the adjustments that
//! reverse them when a transaction is refunded or charged back.
//!
//! # Architecture
//!
//! - **Immutable entries**: A payable is never mutated after creation except
//!   for its status; reversals are new payables
//! - **One reversal per credit**: Each credit is superseded by at most one
//!   refund or chargeback debit
//! - **Explicit clock**: Every date-sensitive operation takes `now` as input
//!
//! # Invariants
//!
//! - Adjustments negate the reversed credit field by field
//! - Anticipation is only reversed by a refund on the capture day

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    missing_debug_implementations,
    clippy::all
)]

pub mod types;
pub mod adjustment;
pub mod chargeback;
pub mod error;
pub mod config;

// Re-exports
pub use error::{Error, Result};
pub use types::{CardBrand, Cents, Payable, PayableStatus, PayableType, PaymentMethod};
pub use adjustment::{same_day, AdjustmentGenerator};
pub use chargeback::{ChargebackPolicy, PolicyRegistry, ProportionalToSplit};
pub use config::Config;
