//! Core types for settlement and debt recovery

use chrono::{DateTime, NaiveDate, Utc};
use ledger_core::{CardBrand, Cents};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Merchant identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MerchantId(String);

impl MerchantId {
    /// Create new merchant ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get as string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for MerchantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Receivable category inside a brand bucket.
///
/// Debt collection drains categories in the order of [`ReceivableKind::WATERFALL`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReceivableKind {
    /// Debit card receivables
    Debit,
    /// Single-installment credit receivables
    Credit,
    /// Multi-installment credit receivables
    InstallmentCredit,
    /// Credit receivables already anticipated
    AnticipatedCredit,
}

impl ReceivableKind {
    /// Collection order within a brand
    pub const WATERFALL: [ReceivableKind; 4] = [
        ReceivableKind::Debit,
        ReceivableKind::Credit,
        ReceivableKind::InstallmentCredit,
        ReceivableKind::AnticipatedCredit,
    ];
}

/// Per-brand receivable balances carried by a settlement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrandBucket {
    /// Card brand
    pub brand: CardBrand,

    /// Debit receivables
    #[serde(default)]
    pub debit: Cents,

    /// Credit receivables
    #[serde(default)]
    pub credit: Cents,

    /// Installment credit receivables
    #[serde(default)]
    pub installment_credit: Cents,

    /// Anticipated credit receivables
    #[serde(default)]
    pub anticipated_credit: Cents,
}

impl BrandBucket {
    /// Create an empty bucket
    pub fn new(brand: impl Into<CardBrand>) -> Self {
        Self {
            brand: brand.into(),
            debit: 0,
            credit: 0,
            installment_credit: 0,
            anticipated_credit: 0,
        }
    }

    /// Builder-style setter for one receivable kind
    pub fn with(mut self, kind: ReceivableKind, amount: Cents) -> Self {
        *self.balance_mut(kind) = amount;
        self
    }

    /// Balance of one receivable kind
    pub fn balance(&self, kind: ReceivableKind) -> Cents {
        match kind {
            ReceivableKind::Debit => self.debit,
            ReceivableKind::Credit => self.credit,
            ReceivableKind::InstallmentCredit => self.installment_credit,
            ReceivableKind::AnticipatedCredit => self.anticipated_credit,
        }
    }

    /// Mutable balance of one receivable kind
    pub fn balance_mut(&mut self, kind: ReceivableKind) -> &mut Cents {
        match kind {
            ReceivableKind::Debit => &mut self.debit,
            ReceivableKind::Credit => &mut self.credit,
            ReceivableKind::InstallmentCredit => &mut self.installment_credit,
            ReceivableKind::AnticipatedCredit => &mut self.anticipated_credit,
        }
    }

    /// Sum of all categories
    pub fn total(&self) -> Cents {
        ReceivableKind::WATERFALL.iter().map(|k| self.balance(*k)).sum()
    }
}

/// Amounts taken from one brand to pay a debt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrandPayment {
    /// Card brand
    pub brand: CardBrand,

    /// Taken from debit receivables
    pub debit: Cents,

    /// Taken from credit receivables
    pub credit: Cents,

    /// Taken from installment credit receivables
    pub installment_credit: Cents,

    /// Taken from anticipated credit receivables
    pub anticipated_credit: Cents,
}

impl BrandPayment {
    /// Empty payment for a brand
    pub fn new(brand: CardBrand) -> Self {
        Self {
            brand,
            debit: 0,
            credit: 0,
            installment_credit: 0,
            anticipated_credit: 0,
        }
    }

    /// Record the amount taken from one category
    pub fn set(&mut self, kind: ReceivableKind, amount: Cents) {
        match kind {
            ReceivableKind::Debit => self.debit = amount,
            ReceivableKind::Credit => self.credit = amount,
            ReceivableKind::InstallmentCredit => self.installment_credit = amount,
            ReceivableKind::AnticipatedCredit => self.anticipated_credit = amount,
        }
    }

    /// Total taken from the brand
    pub fn total(&self) -> Cents {
        self.debit + self.credit + self.installment_credit + self.anticipated_credit
    }
}

/// Reference from a settlement to the debt payment it funded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebtPaymentRef {
    /// Debt that was paid
    pub debt_id: Uuid,

    /// Amount taken from the settlement
    pub used_amount: Cents,

    /// Payment date
    pub payment_date: NaiveDate,
}

/// A merchant's settlement for a date
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    /// Settlement ID
    pub id: Uuid,

    /// Merchant the funds belong to
    pub merchant_id: MerchantId,

    /// Amount available for collection
    pub amount: Cents,

    /// Settlement date
    pub settlement_date: NaiveDate,

    /// Receivables per brand
    #[serde(default)]
    pub brands: Vec<BrandBucket>,

    /// Debt payment funded by this settlement, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operating_debt_payment: Option<DebtPaymentRef>,
}

impl Settlement {
    /// Create a settlement with no brand buckets
    pub fn new(merchant_id: MerchantId, amount: Cents, settlement_date: NaiveDate) -> Self {
        Self {
            id: Uuid::now_v7(),
            merchant_id,
            amount,
            settlement_date,
            brands: Vec::new(),
            operating_debt_payment: None,
        }
    }

    /// Attach a brand bucket
    pub fn with_brand(mut self, bucket: BrandBucket) -> Self {
        self.brands.push(bucket);
        self
    }

    /// Sum of all brand buckets
    pub fn receivables_total(&self) -> Cents {
        self.brands.iter().map(BrandBucket::total).sum()
    }
}

/// Operating debt status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DebtStatus {
    /// Opened, nothing collected yet
    Pending,
    /// Partially collected
    Processing,
    /// Fully collected
    Paid,
    /// Written off
    Canceled,
}

impl DebtStatus {
    /// Still open for collection
    pub fn is_outstanding(&self) -> bool {
        matches!(self, DebtStatus::Pending | DebtStatus::Processing)
    }
}

/// One collection recorded against a debt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebtPayment {
    /// Settlement the funds came from
    pub settlement_id: Uuid,

    /// Amount collected
    pub used_amount: Cents,

    /// Breakdown per brand and category
    pub payments_by_brand: Vec<BrandPayment>,

    /// Collection date
    pub payment_date: NaiveDate,
}

/// Debt a merchant owes the platform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatingDebt {
    /// Debt ID
    pub id: Uuid,

    /// Debtor merchant
    pub merchant_id: MerchantId,

    /// Total owed
    pub debt_amount: Cents,

    /// Collected so far
    #[serde(default)]
    pub paid_amount: Cents,

    /// Lifecycle status
    #[serde(default = "default_status")]
    pub status: DebtStatus,

    /// Collections, oldest first
    #[serde(default)]
    pub payment_history: Vec<DebtPayment>,

    /// Bumped on every write
    #[serde(default)]
    pub version: u64,

    /// Opening timestamp
    pub created_at: DateTime<Utc>,
}

fn default_status() -> DebtStatus {
    DebtStatus::Pending
}

impl OperatingDebt {
    /// Open a new pending debt
    pub fn new(merchant_id: MerchantId, debt_amount: Cents, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::now_v7(),
            merchant_id,
            debt_amount,
            paid_amount: 0,
            status: DebtStatus::Pending,
            payment_history: Vec::new(),
            version: 0,
            created_at,
        }
    }

    /// Amount still owed
    pub fn outstanding(&self) -> Cents {
        self.debt_amount - self.paid_amount
    }

    /// Whether a settlement was already collected against this debt
    pub fn has_settlement(&self, settlement_id: Uuid) -> bool {
        self.payment_history
            .iter()
            .any(|p| p.settlement_id == settlement_id)
    }
}
