//! Anticipation fee formulas
//!
//! The two formulas are alternatives selected by the merchant's configured
//! [`AnticipationFeeType`]; they are never combined. Both round up.

use crate::{
    mdr::percentage_of,
    types::{AnticipationFeeType, AnticipationRule},
    Error, Result,
};
use ledger_core::Cents;
use rust_decimal::Decimal;

/// `ceil(rule_fee / 100 * (total_installments - 1) * gross_installment_amount)`
pub fn fee_per_additional_installment(
    rule_fee: Decimal,
    gross_installment_amount: Cents,
    total_installments: u32,
) -> Result<Cents> {
    validate(rule_fee, gross_installment_amount, total_installments)?;

    let additional = Decimal::from(total_installments - 1);
    percentage_of(scaled(additional, gross_installment_amount)?, rule_fee)
}

/// `ceil(rule_fee / 100 * total_installments * liquid_installment_amount)`
pub fn fee_per_installment(
    rule_fee: Decimal,
    liquid_installment_amount: Cents,
    total_installments: u32,
) -> Result<Cents> {
    validate(rule_fee, liquid_installment_amount, total_installments)?;

    let installments = Decimal::from(total_installments);
    percentage_of(scaled(installments, liquid_installment_amount)?, rule_fee)
}

fn scaled(factor: Decimal, amount: Cents) -> Result<Decimal> {
    factor
        .checked_mul(Decimal::from(amount))
        .ok_or_else(|| Error::Calculation(format!("{} x {} overflows", factor, amount)))
}

fn validate(rule_fee: Decimal, amount: Cents, total_installments: u32) -> Result<()> {
    if total_installments < 1 {
        return Err(Error::InvalidInstallments(
            "anticipation fee requires at least one installment".to_string(),
        ));
    }
    if rule_fee < Decimal::ZERO {
        return Err(Error::InvalidRule(format!(
            "anticipation fee rate must be non-negative, got {}",
            rule_fee
        )));
    }
    if amount < 0 {
        return Err(Error::InvalidAmount(format!(
            "anticipation fee base must be non-negative, got {}",
            amount
        )));
    }
    Ok(())
}

impl AnticipationRule {
    /// Anticipation fee for one installment under this rule
    ///
    /// `gross` and `liquid` are the installment amount before and after MDR;
    /// each formula reads the one it is defined on.
    pub fn fee(&self, gross: Cents, liquid: Cents, total_installments: u32) -> Result<Cents> {
        match self.fee_type {
            AnticipationFeeType::PerAdditionalInstallment => {
                fee_per_additional_installment(self.fee_rate, gross, total_installments)
            }
            AnticipationFeeType::PerInstallment => {
                fee_per_installment(self.fee_rate, liquid, total_installments)
            }
        }
    }
}
