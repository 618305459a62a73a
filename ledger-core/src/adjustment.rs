//! Refund and chargeback adjustment entries
//!
//! An adjustment is a new payable that reverses one `credit` payable. Every
//! money field is negated, with one exception: the anticipation component.
//!
//! - Refunds issued on the capture day reverse everything, anticipation
//!   included.
//! - Refunds issued on a later day exclude the anticipation cost and fee,
//!   which the platform has already incurred.
//! - Chargebacks never reverse anticipation.
//!
//! "Today" and "same day" are evaluated in the business timezone.

use crate::{
    types::{Payable, PayableStatus, PayableType},
    Config, Error, Result,
};
use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Utc};
use std::collections::HashSet;
use uuid::Uuid;

/// Whether `reference` still falls on the calendar day `captured_at` occurred on
pub fn same_day(reference: DateTime<Utc>, captured_at: DateTime<Utc>, offset: FixedOffset) -> bool {
    reference.with_timezone(&offset).date_naive() == captured_at.with_timezone(&offset).date_naive()
}

/// Builds adjustment payables from settled credits
#[derive(Debug, Clone, Copy)]
pub struct AdjustmentGenerator {
    offset: FixedOffset,
}

impl Default for AdjustmentGenerator {
    fn default() -> Self {
        Self {
            offset: Utc.fix(),
        }
    }
}

impl AdjustmentGenerator {
    /// Create generator evaluating calendar days at `offset`
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    /// Create generator from ledger configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(config.business_offset()?))
    }

    /// Business date of `now`
    pub fn today(&self, now: DateTime<Utc>) -> NaiveDate {
        now.with_timezone(&self.offset).date_naive()
    }

    /// Whether `now` is still the capture day of `payable`
    pub fn is_same_day(&self, payable: &Payable, now: DateTime<Utc>) -> bool {
        same_day(now, payable.captured_at, self.offset)
    }

    /// Generate the refund entry reversing `original`
    pub fn refund(&self, original: &Payable, now: DateTime<Utc>) -> Result<Payable> {
        let keep_anticipation = self.is_same_day(original, now);
        self.reverse(original, now, PayableType::Refund, keep_anticipation)
    }

    /// Generate the chargeback debit entry reversing `original`
    pub fn chargeback_debit(&self, original: &Payable, now: DateTime<Utc>) -> Result<Payable> {
        self.reverse(original, now, PayableType::ChargebackDebit, false)
    }

    /// Refund every credit of a transaction that has not been reversed yet
    pub fn refund_all(&self, originals: &[Payable], now: DateTime<Utc>) -> Result<Vec<Payable>> {
        let reversed = reversed_credit_ids(originals);

        originals
            .iter()
            .filter(|p| p.is_credit() && !reversed.contains(&p.id))
            .map(|p| self.refund(p, now))
            .collect()
    }

    fn reverse(
        &self,
        original: &Payable,
        now: DateTime<Utc>,
        payable_type: PayableType,
        keep_anticipation: bool,
    ) -> Result<Payable> {
        if !original.is_credit() {
            return Err(Error::InvalidPayable(format!(
                "payable {} is a {:?}, only credits can be reversed",
                original.id, original.payable_type
            )));
        }

        let same_day = self.is_same_day(original, now);
        let (cost, fee) = if same_day {
            (original.cost, original.fee)
        } else {
            (
                original.cost - original.anticipation_cost,
                original.fee - original.anticipation_fee,
            )
        };

        if cost < 0 || fee < 0 {
            tracing::warn!(
                payable_id = %original.id,
                adjustment = ?payable_type,
                same_day,
                cost,
                fee,
                "Reversed cost or fee is negative; keeping value as computed"
            );
        }

        let (anticipation_cost, anticipation_fee, anticipation_amount) = if keep_anticipation {
            (
                -original.anticipation_cost,
                -original.anticipation_fee,
                -original.anticipation_amount,
            )
        } else {
            (0, 0, 0)
        };

        let adjustment = Payable {
            id: Uuid::now_v7(),
            origin_payable_id: Some(original.id),
            amount: -original.amount,
            cost: -cost,
            fee: -fee,
            mdr_cost: -original.mdr_cost,
            mdr_fee: -original.mdr_fee,
            mdr_amount: -original.mdr_amount,
            anticipation_cost,
            anticipation_fee,
            anticipation_amount,
            payment_date: self.today(now),
            status: PayableStatus::WaitingFunds,
            payable_type,
            anticipatable: false,
            processed: true,
            created_at: now,
            ..original.clone()
        };

        tracing::debug!(
            payable_id = %original.id,
            adjustment_id = %adjustment.id,
            adjustment = ?payable_type,
            amount = adjustment.amount,
            "Generated adjustment payable"
        );

        Ok(adjustment)
    }
}

/// Ids of credits already reversed by an adjustment present in `payables`
pub fn reversed_credit_ids(payables: &[Payable]) -> HashSet<Uuid> {
    payables
        .iter()
        .filter(|p| p.payable_type.is_adjustment())
        .filter_map(|p| p.origin_payable_id)
        .collect()
}
