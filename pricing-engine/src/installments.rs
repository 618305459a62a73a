//! Installment amounts and payment dates
//!
//! # Rounding
//!
//! Installments 2..N receive `floor(gross / N)`; installment 1 absorbs the
//! remainder, so the installments always add back up to the gross amount.
//!
//! # Payment dates
//!
//! ```text
//! debit:  capture + 1 day
//! credit: capture + installment * 30 days
//! ```
//!
//! The target date is then moved to the next business day by a
//! [`BusinessCalendar`] supplied by the caller.

use crate::{Error, Result};
use chrono::{Datelike, Days, NaiveDate, Weekday};
use ledger_core::{Cents, PaymentMethod};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Calendar oracle mapping a date to the first business day on or after it
pub trait BusinessCalendar {
    /// First business day on or after `date`
    fn next_business_day(&self, date: NaiveDate) -> NaiveDate;
}

impl<F> BusinessCalendar for F
where
    F: Fn(NaiveDate) -> NaiveDate,
{
    fn next_business_day(&self, date: NaiveDate) -> NaiveDate {
        self(date)
    }
}

/// Calendar treating weekends and a set of holidays as non-business days
#[derive(Debug, Clone, Default)]
pub struct WeekendCalendar {
    holidays: BTreeSet<NaiveDate>,
}

impl WeekendCalendar {
    /// Calendar with no holidays
    pub fn new() -> Self {
        Self::default()
    }

    /// Calendar with the given holidays
    pub fn with_holidays(holidays: impl IntoIterator<Item = NaiveDate>) -> Self {
        Self {
            holidays: holidays.into_iter().collect(),
        }
    }

    /// Check if `date` is a business day
    pub fn is_business_day(&self, date: NaiveDate) -> bool {
        !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) && !self.holidays.contains(&date)
    }
}

impl BusinessCalendar for WeekendCalendar {
    fn next_business_day(&self, date: NaiveDate) -> NaiveDate {
        let mut day = date;
        while !self.is_business_day(day) {
            match day.checked_add_days(Days::new(1)) {
                Some(next) => day = next,
                None => break,
            }
        }
        day
    }
}

/// Settlement offsets per payment method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleOffsets {
    /// Days after capture a debit settles
    pub debit_days: u32,

    /// Days between credit installments
    pub credit_interval_days: u32,
}

impl Default for ScheduleOffsets {
    fn default() -> Self {
        Self {
            debit_days: 1,
            credit_interval_days: 30,
        }
    }
}

impl ScheduleOffsets {
    /// Unadjusted settlement date of an installment
    pub fn target_date(
        &self,
        capture_date: NaiveDate,
        installment: u32,
        payment_method: PaymentMethod,
    ) -> Result<NaiveDate> {
        let days = match payment_method {
            PaymentMethod::Debit => u64::from(self.debit_days),
            PaymentMethod::Credit => u64::from(installment) * u64::from(self.credit_interval_days),
        };

        capture_date.checked_add_days(Days::new(days)).ok_or_else(|| {
            Error::InvalidInstallments(format!(
                "installment {} of {} falls outside the calendar",
                installment, capture_date
            ))
        })
    }

    /// Settlement date of an installment, moved to a business day
    pub fn payment_date(
        &self,
        capture_date: NaiveDate,
        installment: u32,
        payment_method: PaymentMethod,
        calendar: &impl BusinessCalendar,
    ) -> Result<NaiveDate> {
        let target = self.target_date(capture_date, installment, payment_method)?;
        Ok(calendar.next_business_day(target))
    }
}

/// Amount of installment `installment_index` (1-based) of `gross_amount`
pub fn installment_amount(
    gross_amount: Cents,
    installment_count: u32,
    installment_index: u32,
) -> Result<Cents> {
    if installment_count < 1 {
        return Err(Error::InvalidInstallments(
            "installment count must be at least 1".to_string(),
        ));
    }
    if installment_index < 1 || installment_index > installment_count {
        return Err(Error::InvalidInstallments(format!(
            "installment {} outside 1..={}",
            installment_index, installment_count
        )));
    }

    let count = Cents::from(installment_count);
    let base = gross_amount.div_euclid(count);

    if installment_index == 1 {
        Ok(gross_amount - (count - 1) * base)
    } else {
        Ok(base)
    }
}

/// Settlement date of an installment with the standard offsets
pub fn installment_payment_date(
    capture_date: NaiveDate,
    installment_index: u32,
    payment_method: PaymentMethod,
    calendar: &impl BusinessCalendar,
) -> Result<NaiveDate> {
    ScheduleOffsets::default().payment_date(capture_date, installment_index, payment_method, calendar)
}
