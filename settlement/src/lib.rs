//! Settlement and Debt Recovery
//!
//! Collects merchants' operating debts from their positive settlements.
//!
//! # Architecture
//!
//! 1. **Waterfall**: drain per-brand receivable buckets in the order
//!    debit, credit, installment credit, anticipated credit
//! 2. **Debt lifecycle**: record the collection against the debt, capped at
//!    what is still owed, exactly once per settlement
//! 3. **Debt book**: per-debt locking so concurrent payoffs serialize
//! 4. **Recovery batch**: route each settlement to its merchant's oldest
//!    outstanding debt
//!
//! Money never appears or disappears: for every collection, the amount taken
//! from the buckets equals the amount added to the debt's `paid_amount`.
//!
//! # Example
//!
//! ```no_run
//! use chrono::{NaiveDate, Utc};
//! use settlement::{
//!     BrandBucket, DebtBook, DebtRecoveryEngine, MerchantId, ReceivableKind, RecoveryConfig,
//!     Settlement,
//! };
//! use std::sync::Arc;
//!
//! fn main() -> settlement::Result<()> {
//!     let book = Arc::new(DebtBook::new()?);
//!     book.open_debt(MerchantId::new("m-1"), 1_000, Utc::now())?;
//!
//!     let today = NaiveDate::from_ymd_opt(2026, 4, 1).unwrap_or_default();
//!     let mut settlements = vec![Settlement::new(MerchantId::new("m-1"), 400, today)
//!         .with_brand(BrandBucket::new("visa").with(ReceivableKind::Debit, 400))];
//!
//!     let engine = DebtRecoveryEngine::new(book, RecoveryConfig::default());
//!     let report = engine.run(&mut settlements, today);
//!     println!("Recovered {} cents", report.recovered);
//!
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    missing_debug_implementations,
    clippy::all
)]

pub mod types;
pub mod waterfall;
pub mod debt;
pub mod book;
pub mod engine;
pub mod metrics;
pub mod error;
pub mod config;

// Re-exports
pub use error::{Error, Result};
pub use types::*;
pub use waterfall::{apply_payment_across_brands, charge_receivable, Charge, WaterfallOutcome};
pub use debt::{cancel, pay_operating_debt_with_settlement, PayoffOutcome, PayoffReceipt};
pub use book::DebtBook;
pub use engine::{DebtRecoveryEngine, RecoveryReport, SettlementOutcome, SettlementReport, SkipReason};
pub use metrics::Metrics;
pub use config::{Config, RecoveryConfig};
