//! MDR (merchant discount rate) resolution
//!
//! A brand missing from the fee table, or a tier missing from a brand, falls
//! back to the default rate. This is not an error.

use crate::{
    types::{CardTransaction, FeeTable, FeeTier},
    Error, Result,
};
use ledger_core::{CardBrand, Cents, PaymentMethod};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Rate applied when the fee table has no matching entry (3.99%)
pub const DEFAULT_MDR_RATE: Decimal = dec!(3.99);

/// Resolve the MDR rate for a transaction, falling back to [`DEFAULT_MDR_RATE`]
pub fn resolve_mdr(transaction: &CardTransaction, fee_table: &FeeTable) -> Decimal {
    resolve_rate(
        &transaction.card_brand,
        transaction.payment_method,
        transaction.installments,
        fee_table,
        DEFAULT_MDR_RATE,
    )
}

/// Resolve the MDR rate for a brand, method and installment count
pub fn resolve_rate(
    brand: &CardBrand,
    payment_method: PaymentMethod,
    installments: u32,
    fee_table: &FeeTable,
    default_rate: Decimal,
) -> Decimal {
    let tier = FeeTier::for_payment(payment_method, installments);

    match fee_table.brand(brand).and_then(|entry| entry.fee.rate(tier)) {
        Some(rate) => rate,
        None => {
            tracing::debug!(%brand, ?tier, %default_rate, "No MDR rate configured, using default");
            default_rate
        }
    }
}

/// `ceil(amount * rate / 100)`, the share of `amount` charged at `rate` percent
pub fn percentage_fee(amount: Cents, rate: Decimal) -> Result<Cents> {
    if amount < 0 {
        return Err(Error::InvalidAmount(format!(
            "fee base must be non-negative, got {}",
            amount
        )));
    }
    if rate < Decimal::ZERO {
        return Err(Error::InvalidRule(format!("rate must be non-negative, got {}", rate)));
    }

    percentage_of(Decimal::from(amount), rate)
}

/// `ceil(base * rate / 100)`; overflow is an [`Error::Calculation`]
pub(crate) fn percentage_of(base: Decimal, rate: Decimal) -> Result<Cents> {
    let value = base
        .checked_mul(rate)
        .and_then(|v| v.checked_div(Decimal::ONE_HUNDRED))
        .ok_or_else(|| Error::Calculation(format!("{} at {}% overflows", base, rate)))?;
    ceil_cents(value)
}

fn ceil_cents(value: Decimal) -> Result<Cents> {
    value
        .ceil()
        .to_i64()
        .ok_or_else(|| Error::Calculation(format!("{} does not fit in cents", value)))
}
