//! Operating debt lifecycle
//!
//! `pending -> processing -> paid`, or `pending/processing -> canceled`.
//! Nothing leaves `paid` or `canceled`.

use crate::{
    types::{DebtPayment, DebtPaymentRef, DebtStatus, OperatingDebt, Settlement},
    waterfall::apply_payment_across_brands,
    Error, Result,
};
use chrono::NaiveDate;
use ledger_core::Cents;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Summary of a collection that changed the debt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayoffReceipt {
    /// Debt ID
    pub debt_id: Uuid,
    /// Settlement ID
    pub settlement_id: Uuid,
    /// Amount collected from the settlement
    pub used_amount: Cents,
    /// Settlement amount not consumed, left for the caller to route
    pub leftover: Cents,
    /// Debt reached `paid`
    pub paid_off: bool,
}

/// Outcome of applying a settlement to a debt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PayoffOutcome {
    /// Funds collected, debt and settlement updated
    Applied(PayoffReceipt),
    /// Settlement already in the debt's history; nothing changed
    AlreadyApplied,
    /// Settlement had no receivables to collect; nothing changed
    NothingCollected,
}

/// Collect a debt from a positive settlement's receivables.
///
/// Only the amount the debt still owes is drawn from the buckets; whatever is
/// left of `settlement.amount` stays with the caller. Re-applying a settlement
/// already in `payment_history` is a no-op. On error neither record changes.
pub fn pay_operating_debt_with_settlement(
    debt: &mut OperatingDebt,
    settlement: &mut Settlement,
    today: NaiveDate,
) -> Result<PayoffOutcome> {
    if debt.has_settlement(settlement.id) {
        warn!(
            debt_id = %debt.id,
            settlement_id = %settlement.id,
            "Settlement already applied to debt, skipping"
        );
        return Ok(PayoffOutcome::AlreadyApplied);
    }

    if !debt.status.is_outstanding() {
        return Err(Error::InvalidTransition {
            from: debt.status,
            to: DebtStatus::Processing,
        });
    }

    if settlement.amount <= 0 {
        return Err(Error::InvalidAmount(format!(
            "settlement {} amount must be positive, got {}",
            settlement.id, settlement.amount
        )));
    }

    if let Some(existing) = &settlement.operating_debt_payment {
        return Err(Error::SettlementAlreadyUsed {
            settlement_id: settlement.id,
            debt_id: existing.debt_id,
        });
    }

    let amount_to_pay = settlement.amount.min(debt.outstanding());
    let outcome = apply_payment_across_brands(&settlement.brands, amount_to_pay);
    let used_amount = amount_to_pay - outcome.remaining_amount;

    debug!(
        debt_id = %debt.id,
        settlement_id = %settlement.id,
        amount_to_pay,
        used_amount,
        brands = outcome.payments_by_brand.len(),
        "Waterfall complete"
    );

    if used_amount == 0 {
        return Ok(PayoffOutcome::NothingCollected);
    }

    let paid_off = debt.paid_amount + used_amount == debt.debt_amount;

    debt.paid_amount += used_amount;
    debt.status = if paid_off {
        DebtStatus::Paid
    } else {
        DebtStatus::Processing
    };
    debt.payment_history.push(DebtPayment {
        settlement_id: settlement.id,
        used_amount,
        payments_by_brand: outcome.payments_by_brand,
        payment_date: today,
    });
    debt.version += 1;

    settlement.brands = outcome.updated_brands;
    settlement.operating_debt_payment = Some(DebtPaymentRef {
        debt_id: debt.id,
        used_amount,
        payment_date: today,
    });

    info!(
        debt_id = %debt.id,
        settlement_id = %settlement.id,
        used_amount,
        paid_amount = debt.paid_amount,
        status = ?debt.status,
        "Debt collected from settlement"
    );

    Ok(PayoffOutcome::Applied(PayoffReceipt {
        debt_id: debt.id,
        settlement_id: settlement.id,
        used_amount,
        leftover: settlement.amount - used_amount,
        paid_off,
    }))
}

/// Write off an outstanding debt
pub fn cancel(debt: &mut OperatingDebt) -> Result<()> {
    if !debt.status.is_outstanding() {
        return Err(Error::InvalidTransition {
            from: debt.status,
            to: DebtStatus::Canceled,
        });
    }

    debt.status = DebtStatus::Canceled;
    debt.version += 1;

    info!(debt_id = %debt.id, paid_amount = debt.paid_amount, "Debt canceled");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BrandBucket, MerchantId, ReceivableKind};
    use chrono::{TimeZone, Utc};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 10).unwrap()
    }

    fn debt(amount: Cents) -> OperatingDebt {
        OperatingDebt::new(
            MerchantId::new("m-1"),
            amount,
            Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap(),
        )
    }

    fn settlement(amount: Cents, debit: Cents) -> Settlement {
        Settlement::new(MerchantId::new("m-1"), amount, today())
            .with_brand(BrandBucket::new("visa").with(ReceivableKind::Debit, debit))
    }

    #[test]
    fn test_partial_payment_moves_to_processing() {
        let mut debt = debt(1000);
        let mut settlement = settlement(300, 300);

        let outcome = pay_operating_debt_with_settlement(&mut debt, &mut settlement, today()).unwrap();

        let PayoffOutcome::Applied(receipt) = outcome else {
            panic!("expected applied outcome");
        };
        assert_eq!(receipt.used_amount, 300);
        assert!(!receipt.paid_off);
        assert_eq!(debt.paid_amount, 300);
        assert_eq!(debt.status, DebtStatus::Processing);
        assert_eq!(debt.payment_history.len(), 1);
        assert_eq!(debt.version, 1);
        assert_eq!(settlement.brands[0].debit, 0);
        assert_eq!(settlement.operating_debt_payment.as_ref().unwrap().debt_id, debt.id);
    }

    #[test]
    fn test_final_payment_pays_off() {
        let mut debt = debt(1000);
        debt.paid_amount = 950;
        debt.status = DebtStatus::Processing;
        let mut settlement = settlement(50, 80);

        let outcome = pay_operating_debt_with_settlement(&mut debt, &mut settlement, today()).unwrap();

        assert!(matches!(outcome, PayoffOutcome::Applied(PayoffReceipt { used_amount: 50, paid_off: true, .. })));
        assert_eq!(debt.status, DebtStatus::Paid);
        assert_eq!(debt.paid_amount, 1000);
        assert_eq!(settlement.brands[0].debit, 30);
    }

    #[test]
    fn test_overpaying_settlement_is_capped() {
        let mut debt = debt(100);
        let mut settlement = settlement(500, 500);

        let outcome = pay_operating_debt_with_settlement(&mut debt, &mut settlement, today()).unwrap();

        let PayoffOutcome::Applied(receipt) = outcome else {
            panic!("expected applied outcome");
        };
        assert_eq!(receipt.used_amount, 100);
        assert_eq!(receipt.leftover, 400);
        assert!(receipt.paid_off);
        assert_eq!(debt.paid_amount, 100);
        assert_eq!(settlement.brands[0].debit, 400);
    }

    #[test]
    fn test_same_settlement_applied_once() {
        let mut debt = debt(1000);
        let mut settlement = settlement(300, 300);
        let original = settlement.clone();

        pay_operating_debt_with_settlement(&mut debt, &mut settlement, today()).unwrap();

        // Retry with the pre-write copy of the settlement
        let mut retry = original;
        let outcome = pay_operating_debt_with_settlement(&mut debt, &mut retry, today()).unwrap();

        assert_eq!(outcome, PayoffOutcome::AlreadyApplied);
        assert_eq!(debt.paid_amount, 300);
        assert_eq!(debt.payment_history.len(), 1);
        assert_eq!(retry.brands[0].debit, 300);
    }

    #[test]
    fn test_empty_receivables_collect_nothing() {
        let mut debt = debt(1000);
        let mut settlement = Settlement::new(MerchantId::new("m-1"), 200, today());

        let outcome = pay_operating_debt_with_settlement(&mut debt, &mut settlement, today()).unwrap();

        assert_eq!(outcome, PayoffOutcome::NothingCollected);
        assert_eq!(debt.status, DebtStatus::Pending);
        assert!(debt.payment_history.is_empty());
        assert!(settlement.operating_debt_payment.is_none());
    }

    #[test]
    fn test_non_positive_settlement_rejected() {
        let mut debt = debt(1000);
        let mut settlement = settlement(0, 300);

        let result = pay_operating_debt_with_settlement(&mut debt, &mut settlement, today());
        assert!(matches!(result, Err(Error::InvalidAmount(_))));
        assert_eq!(debt.version, 0);
    }

    #[test]
    fn test_terminal_debt_rejected() {
        let mut debt = debt(1000);
        cancel(&mut debt).unwrap();
        let mut settlement = settlement(300, 300);

        let result = pay_operating_debt_with_settlement(&mut debt, &mut settlement, today());
        assert!(matches!(
            result,
            Err(Error::InvalidTransition { from: DebtStatus::Canceled, .. })
        ));
        assert_eq!(settlement.brands[0].debit, 300);
    }

    #[test]
    fn test_settlement_used_by_another_debt_rejected() {
        let mut first = debt(100);
        let mut second = debt(100);
        let mut settlement = settlement(300, 300);

        pay_operating_debt_with_settlement(&mut first, &mut settlement, today()).unwrap();
        let result = pay_operating_debt_with_settlement(&mut second, &mut settlement, today());

        assert!(matches!(result, Err(Error::SettlementAlreadyUsed { .. })));
        assert_eq!(second.paid_amount, 0);
    }

    #[test]
    fn test_cancel_transitions() {
        let mut debt = debt(1000);
        debt.status = DebtStatus::Processing;
        cancel(&mut debt).unwrap();
        assert_eq!(debt.status, DebtStatus::Canceled);

        assert!(cancel(&mut debt).is_err());

        let mut paid = self::debt(10);
        paid.status = DebtStatus::Paid;
        assert!(matches!(
            cancel(&mut paid),
            Err(Error::InvalidTransition { from: DebtStatus::Paid, to: DebtStatus::Canceled })
        ));
    }
}
