//! Core types for pricing engine

use chrono::{DateTime, Utc};
use ledger_core::{CardBrand, Cents, PaymentMethod};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// MDR tier a transaction falls into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeeTier {
    /// Debit card
    Debit,
    /// Credit card, single installment
    #[serde(rename = "credit_1")]
    Credit1,
    /// Credit card, 2 to 6 installments
    #[serde(rename = "credit_2")]
    Credit2,
    /// Credit card, 7 or more installments
    #[serde(rename = "credit_7")]
    Credit7,
}

impl FeeTier {
    /// Tier for a payment method and installment count
    pub fn for_payment(payment_method: PaymentMethod, installments: u32) -> Self {
        match payment_method {
            PaymentMethod::Debit => FeeTier::Debit,
            PaymentMethod::Credit => match installments {
                0 | 1 => FeeTier::Credit1,
                2..=6 => FeeTier::Credit2,
                _ => FeeTier::Credit7,
            },
        }
    }
}

/// MDR rates (percentages) for one brand
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BrandRates {
    /// Debit rate
    #[serde(default)]
    pub debit: Option<Decimal>,

    /// Credit rate, single installment
    #[serde(default)]
    pub credit_1: Option<Decimal>,

    /// Credit rate, 2 to 6 installments
    #[serde(default)]
    pub credit_2: Option<Decimal>,

    /// Credit rate, 7 or more installments
    #[serde(default)]
    pub credit_7: Option<Decimal>,
}

impl BrandRates {
    /// Rate configured for `tier`, if any
    pub fn rate(&self, tier: FeeTier) -> Option<Decimal> {
        match tier {
            FeeTier::Debit => self.debit,
            FeeTier::Credit1 => self.credit_1,
            FeeTier::Credit2 => self.credit_2,
            FeeTier::Credit7 => self.credit_7,
        }
    }
}

/// Fee table entry for one card brand
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrandFee {
    /// Card brand
    pub brand: CardBrand,

    /// Rates by tier
    pub fee: BrandRates,
}

/// Brand/installment fee table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeeTable(pub Vec<BrandFee>);

impl FeeTable {
    /// Entry for `brand`, if present
    pub fn brand(&self, brand: &CardBrand) -> Option<&BrandFee> {
        self.0.iter().find(|entry| &entry.brand == brand)
    }
}

/// How an anticipation fee is computed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnticipationFeeType {
    /// Scales with the number of installments after the first, on gross amounts
    PerAdditionalInstallment,
    /// Scales with the installment count, on liquid (post-MDR) amounts
    PerInstallment,
}

/// Anticipation pricing rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnticipationRule {
    /// Fee rate (percentage)
    pub fee_rate: Decimal,

    /// Formula selector
    pub fee_type: AnticipationFeeType,
}

/// Fee table and anticipation rule for one party (merchant or acquirer)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PricingProfile {
    /// MDR fee table
    #[serde(default)]
    pub fee_table: FeeTable,

    /// Automatic anticipation rule, if enabled
    #[serde(default)]
    pub anticipation: Option<AnticipationRule>,
}

/// Share of a transaction owed to one recipient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitRule {
    /// Recipient ID
    pub recipient_id: String,

    /// Share of the amount (percentage)
    pub percentage: Decimal,

    /// Receives the rounding remainder
    #[serde(default)]
    pub charge_remainder: bool,
}

/// Captured card transaction to schedule
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardTransaction {
    /// Transaction ID
    pub id: String,

    /// Gross amount
    pub amount: Cents,

    /// Installment count
    pub installments: u32,

    /// Card brand
    pub card_brand: CardBrand,

    /// Payment method
    pub payment_method: PaymentMethod,

    /// Capture timestamp
    pub captured_at: DateTime<Utc>,

    /// Split rules (empty = single recipient)
    #[serde(default)]
    pub split_rules: Vec<SplitRule>,
}
