//! Brand-bucket waterfall
//!
//! Collects an amount from a settlement's receivables. Brands are visited in
//! order; inside each brand, categories drain in [`ReceivableKind::WATERFALL`]
//! order. Every step returns new values, the input buckets are never touched.
//!
//! For any input, `paid + remaining_amount == amount_to_pay` and the sum of
//! the updated buckets equals the original sum minus `paid`.

use crate::types::{BrandBucket, BrandPayment, ReceivableKind};
use ledger_core::Cents;
use serde::{Deserialize, Serialize};

/// Result of charging a single receivable balance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Charge {
    /// Amount still to collect
    pub remaining_to_pay: Cents,
    /// Balance left in the receivable
    pub remaining_balance: Cents,
    /// Amount taken
    pub paid: Cents,
}

/// Charge one receivable balance.
///
/// A non-positive balance or nothing to pay leaves both sides unchanged.
pub fn charge_receivable(amount_to_pay: Cents, bucket_balance: Cents) -> Charge {
    if bucket_balance <= 0 || amount_to_pay <= 0 {
        return Charge {
            remaining_to_pay: amount_to_pay,
            remaining_balance: bucket_balance,
            paid: 0,
        };
    }

    let paid = amount_to_pay.min(bucket_balance);
    Charge {
        remaining_to_pay: amount_to_pay - paid,
        remaining_balance: bucket_balance - paid,
        paid,
    }
}

/// Result of running the waterfall across all brands
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaterfallOutcome {
    /// Amount that could not be collected
    pub remaining_amount: Cents,
    /// Buckets after collection, same order as the input
    pub updated_brands: Vec<BrandBucket>,
    /// One entry per brand that contributed, in visit order
    pub payments_by_brand: Vec<BrandPayment>,
}

impl WaterfallOutcome {
    /// Amount collected across all brands
    pub fn paid(&self) -> Cents {
        self.payments_by_brand.iter().map(BrandPayment::total).sum()
    }
}

/// Drain one brand bucket in category order
fn charge_brand(amount_to_pay: Cents, bucket: &BrandBucket) -> (Cents, BrandBucket, BrandPayment) {
    let mut updated = bucket.clone();
    let mut payment = BrandPayment::new(bucket.brand.clone());

    let remaining = ReceivableKind::WATERFALL
        .iter()
        .fold(amount_to_pay, |remaining, kind| {
            let charge = charge_receivable(remaining, bucket.balance(*kind));
            *updated.balance_mut(*kind) = charge.remaining_balance;
            payment.set(*kind, charge.paid);
            charge.remaining_to_pay
        });

    (remaining, updated, payment)
}

/// Collect `amount_to_pay` from `brands`.
pub fn apply_payment_across_brands(brands: &[BrandBucket], amount_to_pay: Cents) -> WaterfallOutcome {
    let initial = WaterfallOutcome {
        remaining_amount: amount_to_pay,
        updated_brands: Vec::with_capacity(brands.len()),
        payments_by_brand: Vec::new(),
    };

    let outcome = brands.iter().fold(initial, |mut outcome, bucket| {
        let (remaining, updated, payment) = charge_brand(outcome.remaining_amount, bucket);
        if remaining != outcome.remaining_amount {
            outcome.payments_by_brand.push(payment);
        }
        outcome.updated_brands.push(updated);
        outcome.remaining_amount = remaining;
        outcome
    });

    debug_assert_eq!(outcome.paid() + outcome.remaining_amount, amount_to_pay);
    outcome
}
