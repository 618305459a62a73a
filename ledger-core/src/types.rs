//! Core types for the payables ledger
//!
//! All money is held as signed integer cents. Adjustments (refunds and
//! chargebacks) carry negative amounts; scheduled credits carry positive ones.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Signed amount in integer cents
pub type Cents = i64;

/// Card brand (visa, mastercard, elo, ...), normalized to lowercase
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct CardBrand(String);

impl CardBrand {
    /// Create new card brand
    pub fn new(brand: impl Into<String>) -> Self {
        Self(brand.into().trim().to_ascii_lowercase())
    }

    /// Get as string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for CardBrand {
    fn from(brand: String) -> Self {
        Self::new(brand)
    }
}

impl From<&str> for CardBrand {
    fn from(brand: &str) -> Self {
        Self::new(brand)
    }
}

impl From<CardBrand> for String {
    fn from(brand: CardBrand) -> Self {
        brand.0
    }
}

impl fmt::Display for CardBrand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Card payment method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Debit card, settled the next day in a single installment
    #[serde(alias = "debit_card")]
    Debit,
    /// Credit card, settled every 30 days per installment
    #[serde(alias = "credit_card")]
    Credit,
}

impl PaymentMethod {
    /// Wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Debit => "debit",
            PaymentMethod::Credit => "credit",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Payable status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayableStatus {
    /// Scheduled, not yet paid out
    WaitingFunds,
    /// Paid out ahead of schedule (anticipated)
    Prepaid,
    /// Paid out
    Paid,
    /// Canceled before payout
    Canceled,
}

/// Kind of cash movement a payable represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayableType {
    /// Scheduled receivable created at capture
    Credit,
    /// Reversal created by a refund
    Refund,
    /// Reversal created by a chargeback
    ChargebackDebit,
}

impl PayableType {
    /// Whether this payable reverses an earlier credit
    pub fn is_adjustment(&self) -> bool {
        matches!(self, PayableType::Refund | PayableType::ChargebackDebit)
    }
}

/// One scheduled or adjustment cash movement ("payable")
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payable {
    /// Payable ID
    pub id: Uuid,

    /// Credit payable this adjustment reverses (adjustments only)
    #[serde(default)]
    pub origin_payable_id: Option<Uuid>,

    /// Originating transaction or settlement (opaque)
    pub owner_reference: String,

    /// Split recipient receiving this payable, if the transaction was split
    #[serde(default)]
    pub recipient_id: Option<String>,

    /// Net amount paid to the recipient
    pub amount: Cents,

    /// Total cost incurred by the platform (MDR + anticipation)
    pub cost: Cents,

    /// Total fee charged to the recipient (MDR + anticipation)
    pub fee: Cents,

    /// Acquirer MDR cost
    pub mdr_cost: Cents,

    /// MDR fee charged to the recipient
    pub mdr_fee: Cents,

    /// Installment amount after MDR
    pub mdr_amount: Cents,

    /// Acquirer anticipation cost
    pub anticipation_cost: Cents,

    /// Anticipation fee charged to the recipient
    pub anticipation_fee: Cents,

    /// Installment amount after MDR and anticipation
    pub anticipation_amount: Cents,

    /// Installment index (1-based)
    #[serde(rename = "installment_index")]
    pub installment: u32,

    /// Total number of installments of the transaction
    #[serde(rename = "installment_count")]
    pub total_installments: u32,

    /// Card brand
    pub card_brand: CardBrand,

    /// Payment method
    pub payment_method: PaymentMethod,

    /// Capture timestamp of the originating transaction
    pub captured_at: DateTime<Utc>,

    /// Scheduled settlement date
    pub payment_date: NaiveDate,

    /// Status
    pub status: PayableStatus,

    /// Payable type
    #[serde(rename = "type")]
    pub payable_type: PayableType,

    /// Whether the payable may still be anticipated
    pub anticipatable: bool,

    /// Whether the payable was produced by adjustment processing
    #[serde(default)]
    pub processed: bool,

    /// Created timestamp
    pub created_at: DateTime<Utc>,
}

impl Payable {
    /// Create a zero-valued credit payable for a single installment
    pub fn credit(
        owner_reference: impl Into<String>,
        card_brand: CardBrand,
        payment_method: PaymentMethod,
        captured_at: DateTime<Utc>,
        payment_date: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            origin_payable_id: None,
            owner_reference: owner_reference.into(),
            recipient_id: None,
            amount: 0,
            cost: 0,
            fee: 0,
            mdr_cost: 0,
            mdr_fee: 0,
            mdr_amount: 0,
            anticipation_cost: 0,
            anticipation_fee: 0,
            anticipation_amount: 0,
            installment: 1,
            total_installments: 1,
            card_brand,
            payment_method,
            captured_at,
            payment_date,
            status: PayableStatus::WaitingFunds,
            payable_type: PayableType::Credit,
            anticipatable: false,
            processed: false,
            created_at: captured_at,
        }
    }

    /// Check if already paid out
    pub fn is_paid(&self) -> bool {
        self.status == PayableStatus::Paid
    }

    /// Check if this is a scheduled credit
    pub fn is_credit(&self) -> bool {
        self.payable_type == PayableType::Credit
    }
}
