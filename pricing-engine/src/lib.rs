//! Pricing Engine
//!
//! MDR and anticipation pricing for card transactions, and the installment
//! schedule their credit payables settle on.
//!
//! All fees charged to a merchant round up: the platform never under-charges.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod types;
pub mod mdr;
pub mod anticipation;
pub mod installments;
pub mod scheduler;
pub mod config;

pub use error::{Error, Result};
pub use types::*;
pub use mdr::{resolve_mdr, DEFAULT_MDR_RATE};
pub use anticipation::{fee_per_additional_installment, fee_per_installment};
pub use installments::{
    installment_amount, installment_payment_date, BusinessCalendar, ScheduleOffsets,
    WeekendCalendar,
};
pub use scheduler::PayableScheduler;
pub use config::Config;
