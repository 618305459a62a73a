//! In-memory operating debt book
//!
//! Debts are sharded in a [`DashMap`]; each one sits behind its own mutex so
//! payoffs against the same debt serialize while different debts run in
//! parallel. A payoff is computed on staged copies and committed only on
//! success.
//!
//! A settlement is claimed by exactly one debt. The claim is taken under the
//! debt's lock in the same step that commits the payoff, so a stale copy of a
//! settlement routed to a second debt is rejected.

use crate::{
    debt::{self, PayoffOutcome},
    metrics::Metrics,
    types::{MerchantId, OperatingDebt, Settlement},
    Error, Result,
};
use chrono::{DateTime, NaiveDate, Utc};
use dashmap::{mapref::entry::Entry, DashMap};
use ledger_core::Cents;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

type DebtCell = Arc<Mutex<OperatingDebt>>;

/// Registry of operating debts
#[derive(Debug)]
pub struct DebtBook {
    debts: DashMap<Uuid, DebtCell>,
    /// Settlement id -> debt that collected it
    claims: DashMap<Uuid, Uuid>,
    by_merchant: DashMap<MerchantId, Vec<Uuid>>,
    metrics: Metrics,
}

impl DebtBook {
    /// Create an empty book
    pub fn new() -> Result<Self> {
        Ok(Self {
            debts: DashMap::new(),
            claims: DashMap::new(),
            by_merchant: DashMap::new(),
            metrics: Metrics::new()?,
        })
    }

    /// Metrics collector
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Number of debts in the book
    pub fn len(&self) -> usize {
        self.debts.len()
    }

    /// Whether the book holds no debts
    pub fn is_empty(&self) -> bool {
        self.debts.is_empty()
    }

    /// Open a new pending debt
    pub fn open_debt(
        &self,
        merchant_id: MerchantId,
        debt_amount: Cents,
        created_at: DateTime<Utc>,
    ) -> Result<OperatingDebt> {
        if debt_amount <= 0 {
            return Err(Error::InvalidAmount(format!(
                "debt amount must be positive, got {}",
                debt_amount
            )));
        }

        let debt = OperatingDebt::new(merchant_id, debt_amount, created_at);
        info!(debt_id = %debt.id, merchant_id = %debt.merchant_id, debt_amount, "Debt opened");
        self.insert(debt.clone())?;
        Ok(debt)
    }

    /// Load an existing debt record
    pub fn insert(&self, debt: OperatingDebt) -> Result<()> {
        if debt.debt_amount < 0 || debt.paid_amount < 0 || debt.paid_amount > debt.debt_amount {
            return Err(Error::InvalidAmount(format!(
                "debt {} has paid {} of {}",
                debt.id, debt.paid_amount, debt.debt_amount
            )));
        }

        let conflict = debt.payment_history.iter().find_map(|payment| {
            self.claims
                .get(&payment.settlement_id)
                .map(|owner| (payment.settlement_id, *owner.value()))
        });
        if let Some((settlement_id, debt_id)) = conflict {
            return Err(Error::SettlementAlreadyUsed { settlement_id, debt_id });
        }

        match self.debts.entry(debt.id) {
            Entry::Occupied(_) => Err(Error::DuplicateDebt(debt.id)),
            Entry::Vacant(slot) => {
                for payment in &debt.payment_history {
                    self.claims.insert(payment.settlement_id, debt.id);
                }
                self.by_merchant
                    .entry(debt.merchant_id.clone())
                    .or_default()
                    .push(debt.id);
                slot.insert(Arc::new(Mutex::new(debt)));
                Ok(())
            }
        }
    }

    fn cell(&self, debt_id: Uuid) -> Result<DebtCell> {
        // Clone the Arc so the shard guard is released before locking the debt
        self.debts
            .get(&debt_id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or(Error::DebtNotFound(debt_id))
    }

    /// Snapshot of a debt
    pub fn get(&self, debt_id: Uuid) -> Option<OperatingDebt> {
        self.cell(debt_id).ok().map(|cell| cell.lock().clone())
    }

    /// Snapshot of every debt, oldest first
    pub fn snapshot(&self) -> Vec<OperatingDebt> {
        let mut debts: Vec<OperatingDebt> = self.cells().iter().map(|c| c.lock().clone()).collect();
        debts.sort_by_key(|d| (d.created_at, d.id));
        debts
    }

    fn cells(&self) -> Vec<DebtCell> {
        self.debts.iter().map(|entry| Arc::clone(entry.value())).collect()
    }

    /// Pending and processing debts of a merchant, oldest first
    pub fn outstanding_for_merchant(&self, merchant_id: &MerchantId) -> Vec<OperatingDebt> {
        let ids = self
            .by_merchant
            .get(merchant_id)
            .map(|ids| ids.value().clone())
            .unwrap_or_default();

        let mut debts: Vec<OperatingDebt> = ids
            .into_iter()
            .filter_map(|id| self.cell(id).ok())
            .filter_map(|cell| {
                let debt = cell.lock();
                if debt.status.is_outstanding() {
                    Some(debt.clone())
                } else {
                    None
                }
            })
            .collect();
        debts.sort_by_key(|d| (d.created_at, d.id));
        debts
    }

    /// Debt that already collected a settlement, if any
    pub fn debt_for_settlement(&self, settlement_id: Uuid) -> Option<Uuid> {
        self.claims.get(&settlement_id).map(|owner| *owner.value())
    }

    /// Collect a debt from a settlement under the debt's lock.
    ///
    /// `settlement` is updated only when funds were collected. A settlement
    /// already claimed by another debt returns [`Error::SettlementAlreadyUsed`].
    pub fn apply_settlement(
        &self,
        debt_id: Uuid,
        settlement: &mut Settlement,
        today: NaiveDate,
    ) -> Result<PayoffOutcome> {
        let cell = self.cell(debt_id)?;
        let mut current = cell.lock();

        // Shard guard held until commit so no other debt can claim the settlement
        let claim = self.claims.entry(settlement.id);
        if let Entry::Occupied(owner) = &claim {
            let owner = *owner.get();
            if owner != debt_id {
                self.metrics.record_duplicate();
                return Err(Error::SettlementAlreadyUsed {
                    settlement_id: settlement.id,
                    debt_id: owner,
                });
            }
        }

        let mut staged_debt = current.clone();
        let mut staged_settlement = settlement.clone();
        let outcome =
            debt::pay_operating_debt_with_settlement(&mut staged_debt, &mut staged_settlement, today)?;

        match &outcome {
            PayoffOutcome::Applied(receipt) => {
                if let Entry::Vacant(slot) = claim {
                    slot.insert(debt_id);
                }
                *current = staged_debt;
                *settlement = staged_settlement;
                self.metrics.record_collection(receipt.used_amount, receipt.paid_off);
            }
            PayoffOutcome::AlreadyApplied => self.metrics.record_duplicate(),
            PayoffOutcome::NothingCollected => {}
        }

        Ok(outcome)
    }

    /// Write off a debt
    pub fn cancel(&self, debt_id: Uuid) -> Result<OperatingDebt> {
        let cell = self.cell(debt_id)?;
        let mut current = cell.lock();
        debt::cancel(&mut current)?;
        self.metrics.record_cancel();
        Ok(current.clone())
    }
}
