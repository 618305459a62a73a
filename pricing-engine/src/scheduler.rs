//! Credit payable scheduling
//!
//! Turns a captured card transaction into the `credit` payables it settles
//! through: one per installment, per split recipient.
//!
//! # Pricing of one payable
//!
//! ```text
//! mdr_fee             = ceil(gross * merchant_rate / 100)
//! mdr_cost            = ceil(gross * acquirer_rate / 100)
//! mdr_amount          = gross - mdr_fee
//! anticipation_fee    = merchant anticipation rule (credit only)
//! anticipation_cost   = acquirer anticipation rule (credit only)
//! anticipation_amount = mdr_amount - anticipation_fee
//! fee                 = mdr_fee + anticipation_fee
//! cost                = mdr_cost + anticipation_cost
//! amount              = gross - fee
//! ```

use crate::{
    config::Config,
    installments::{installment_amount, BusinessCalendar},
    mdr::{percentage_fee, resolve_rate},
    types::{CardTransaction, PricingProfile, SplitRule},
    Error, Result,
};
use chrono::{FixedOffset, Offset, Utc};
use ledger_core::{Cents, Payable, PaymentMethod};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// Builds the credit payables of captured transactions
#[derive(Debug, Clone)]
pub struct PayableScheduler {
    config: Config,
    offset: FixedOffset,
}

impl PayableScheduler {
    /// Create scheduler evaluating capture dates in UTC
    pub fn new(config: Config) -> Self {
        Self {
            config,
            offset: Utc.fix(),
        }
    }

    /// Evaluate capture dates in the given business timezone
    pub fn with_business_offset(mut self, offset: FixedOffset) -> Self {
        self.offset = offset;
        self
    }

    /// Schedule the credit payables of `transaction`
    pub fn schedule(
        &self,
        transaction: &CardTransaction,
        merchant: &PricingProfile,
        acquirer: &PricingProfile,
        calendar: &impl BusinessCalendar,
    ) -> Result<Vec<Payable>> {
        self.validate(transaction)?;

        let installments = transaction.installments;
        let merchant_rate = resolve_rate(
            &transaction.card_brand,
            transaction.payment_method,
            installments,
            &merchant.fee_table,
            self.config.default_mdr_rate,
        );
        let acquirer_rate = resolve_rate(
            &transaction.card_brand,
            transaction.payment_method,
            installments,
            &acquirer.fee_table,
            self.config.default_mdr_rate,
        );
        let anticipated = transaction.payment_method == PaymentMethod::Credit
            && merchant.anticipation.is_some();

        let capture_date = transaction.captured_at.with_timezone(&self.offset).date_naive();
        let mut payables = Vec::new();

        for installment in 1..=installments {
            let gross = installment_amount(transaction.amount, installments, installment)?;
            let payment_date = self.config.offsets.payment_date(
                capture_date,
                installment,
                transaction.payment_method,
                calendar,
            )?;

            for (recipient_id, share) in split_shares(gross, &transaction.split_rules)? {
                let mdr_fee = percentage_fee(share, merchant_rate)?;
                let mdr_cost = percentage_fee(share, acquirer_rate)?;
                let mdr_amount = share - mdr_fee;

                let (anticipation_fee, anticipation_cost) = if anticipated {
                    let fee = match &merchant.anticipation {
                        Some(rule) => rule.fee(share, mdr_amount, installments)?,
                        None => 0,
                    };
                    let cost = match &acquirer.anticipation {
                        Some(rule) => rule.fee(share, mdr_amount, installments)?,
                        None => 0,
                    };
                    (fee, cost)
                } else {
                    (0, 0)
                };
                let anticipation_amount = if anticipated { mdr_amount - anticipation_fee } else { 0 };

                let fee = mdr_fee + anticipation_fee;
                let cost = mdr_cost + anticipation_cost;

                payables.push(Payable {
                    recipient_id,
                    amount: share - fee,
                    cost,
                    fee,
                    mdr_cost,
                    mdr_fee,
                    mdr_amount,
                    anticipation_cost,
                    anticipation_fee,
                    anticipation_amount,
                    installment,
                    total_installments: installments,
                    anticipatable: transaction.payment_method == PaymentMethod::Credit && !anticipated,
                    ..Payable::credit(
                        transaction.id.clone(),
                        transaction.card_brand.clone(),
                        transaction.payment_method,
                        transaction.captured_at,
                        payment_date,
                    )
                });
            }
        }

        tracing::info!(
            transaction_id = %transaction.id,
            amount = transaction.amount,
            installments,
            %merchant_rate,
            anticipated,
            payables = payables.len(),
            "Scheduled credit payables"
        );

        Ok(payables)
    }

    fn validate(&self, transaction: &CardTransaction) -> Result<()> {
        if transaction.amount <= 0 {
            return Err(Error::InvalidAmount(format!(
                "transaction {} amount must be positive, got {}",
                transaction.id, transaction.amount
            )));
        }

        let max = match transaction.payment_method {
            PaymentMethod::Debit => 1,
            PaymentMethod::Credit => self.config.max_installments,
        };
        if transaction.installments < 1 || transaction.installments > max {
            return Err(Error::InvalidInstallments(format!(
                "transaction {} has {} installments, expected 1..={} for {}",
                transaction.id, transaction.installments, max, transaction.payment_method
            )));
        }

        Ok(())
    }
}

/// Split `gross` between recipients; the remainder goes to the flagged
/// recipient, or the first one when none is flagged.
fn split_shares(gross: Cents, rules: &[SplitRule]) -> Result<Vec<(Option<String>, Cents)>> {
    if rules.is_empty() {
        return Ok(vec![(None, gross)]);
    }

    let total: Decimal = rules.iter().map(|r| r.percentage).sum();
    if total != Decimal::ONE_HUNDRED {
        return Err(Error::InvalidSplit(format!(
            "split percentages add up to {}, expected 100",
            total
        )));
    }
    if rules.iter().any(|r| r.percentage < Decimal::ZERO) {
        return Err(Error::InvalidSplit("split percentages must be non-negative".to_string()));
    }

    let mut shares = rules
        .iter()
        .map(|rule| {
            let share = (Decimal::from(gross) * rule.percentage / Decimal::ONE_HUNDRED)
                .floor()
                .to_i64()
                .ok_or_else(|| Error::Calculation(format!("split share of {} overflows", gross)))?;
            Ok((Some(rule.recipient_id.clone()), share))
        })
        .collect::<Result<Vec<_>>>()?;

    let remainder = gross - shares.iter().map(|(_, share)| share).sum::<Cents>();
    let remainder_index = rules.iter().position(|r| r.charge_remainder).unwrap_or(0);
    shares[remainder_index].1 += remainder;

    Ok(shares)
}
