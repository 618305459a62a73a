//! Daily debt recovery batch
//!
//! Routes each positive settlement to the oldest outstanding debt of its
//! merchant. Settlements are processed in input order; a failure on one
//! settlement is reported and the batch moves on.

use crate::{
    book::DebtBook,
    config::RecoveryConfig,
    debt::PayoffOutcome,
    types::{MerchantId, Settlement},
    Error, Result,
};
use chrono::NaiveDate;
use ledger_core::Cents;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

/// Why a settlement was not used
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Recovery turned off in configuration
    RecoveryDisabled,
    /// Amount below the configured minimum (includes zero and negative)
    BelowMinimum,
    /// Merchant has no pending or processing debt
    NoOutstandingDebt,
    /// Settlement buckets held nothing to collect
    NothingCollected,
}

/// What happened to one settlement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SettlementOutcome {
    /// Funds collected for a debt
    Applied {
        /// Debt collected
        debt_id: Uuid,
        /// Amount collected
        used_amount: Cents,
        /// Debt reached `paid`
        paid_off: bool,
    },
    /// Settlement already collected by a debt
    Duplicate {
        /// Debt that holds the settlement
        debt_id: Uuid,
    },
    /// Settlement not used
    Skipped {
        /// Reason
        reason: SkipReason,
    },
    /// Collection failed; the caller may retry the settlement
    Failed {
        /// Error message
        error: String,
    },
}

/// Per-settlement line of a batch report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementReport {
    /// Settlement ID
    pub settlement_id: Uuid,
    /// Merchant
    pub merchant_id: MerchantId,
    /// Settlement amount not consumed by debt collection
    pub leftover: Cents,
    /// Outcome
    pub outcome: SettlementOutcome,
}

/// Result of a recovery batch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecoveryReport {
    /// Batch date
    pub date: Option<NaiveDate>,
    /// One line per input settlement, same order
    pub settlements: Vec<SettlementReport>,
    /// Cents collected in this batch
    pub recovered: Cents,
}

impl RecoveryReport {
    /// Lines that collected funds
    pub fn applied(&self) -> impl Iterator<Item = &SettlementReport> {
        self.settlements
            .iter()
            .filter(|r| matches!(r.outcome, SettlementOutcome::Applied { .. }))
    }

    /// Lines that failed
    pub fn failures(&self) -> impl Iterator<Item = &SettlementReport> {
        self.settlements
            .iter()
            .filter(|r| matches!(r.outcome, SettlementOutcome::Failed { .. }))
    }
}

/// Debt recovery engine
#[derive(Debug, Clone)]
pub struct DebtRecoveryEngine {
    book: Arc<DebtBook>,
    config: RecoveryConfig,
}

impl DebtRecoveryEngine {
    /// Create new engine over a debt book
    pub fn new(book: Arc<DebtBook>, config: RecoveryConfig) -> Self {
        Self { book, config }
    }

    /// Debt book
    pub fn book(&self) -> &Arc<DebtBook> {
        &self.book
    }

    /// Run one batch. Settlements that fund a debt are updated in place.
    pub fn run(&self, settlements: &mut [Settlement], today: NaiveDate) -> RecoveryReport {
        self.book.metrics().record_batch(settlements.len());

        let mut report = RecoveryReport {
            date: Some(today),
            ..Default::default()
        };

        for settlement in settlements.iter_mut() {
            let outcome = match self.process(settlement, today) {
                Ok(outcome) => outcome,
                Err(e) => {
                    error!(settlement_id = %settlement.id, error = %e, "Debt collection failed");
                    SettlementOutcome::Failed { error: e.to_string() }
                }
            };

            let leftover = match &outcome {
                SettlementOutcome::Applied { used_amount, .. } => {
                    report.recovered += *used_amount;
                    settlement.amount - *used_amount
                }
                SettlementOutcome::Duplicate { debt_id } => {
                    settlement.amount - self.used_by(*debt_id, settlement.id)
                }
                SettlementOutcome::Skipped { .. } | SettlementOutcome::Failed { .. } => {
                    settlement.amount
                }
            };

            report.settlements.push(SettlementReport {
                settlement_id: settlement.id,
                merchant_id: settlement.merchant_id.clone(),
                leftover,
                outcome,
            });
        }

        info!(
            date = %today,
            settlements = report.settlements.len(),
            applied = report.applied().count(),
            failed = report.failures().count(),
            recovered = report.recovered,
            "Recovery batch complete"
        );

        report
    }

    fn process(&self, settlement: &mut Settlement, today: NaiveDate) -> Result<SettlementOutcome> {
        if !self.config.enabled {
            return Ok(SettlementOutcome::Skipped { reason: SkipReason::RecoveryDisabled });
        }
        if settlement.amount < self.config.min_settlement_amount {
            return Ok(SettlementOutcome::Skipped { reason: SkipReason::BelowMinimum });
        }

        // A retried settlement goes back to the debt that already holds it
        let debt_id = match self.book.debt_for_settlement(settlement.id) {
            Some(debt_id) => debt_id,
            None => match self.book.outstanding_for_merchant(&settlement.merchant_id).first() {
                Some(debt) => debt.id,
                None => {
                    return Ok(SettlementOutcome::Skipped { reason: SkipReason::NoOutstandingDebt })
                }
            },
        };

        let outcome = match self.book.apply_settlement(debt_id, settlement, today) {
            Ok(PayoffOutcome::Applied(receipt)) => SettlementOutcome::Applied {
                debt_id,
                used_amount: receipt.used_amount,
                paid_off: receipt.paid_off,
            },
            Ok(PayoffOutcome::AlreadyApplied) => SettlementOutcome::Duplicate { debt_id },
            Ok(PayoffOutcome::NothingCollected) => {
                SettlementOutcome::Skipped { reason: SkipReason::NothingCollected }
            }
            // Claimed by another debt between routing and payoff
            Err(Error::SettlementAlreadyUsed { debt_id: owner, .. }) => {
                SettlementOutcome::Duplicate { debt_id: owner }
            }
            Err(e) => return Err(e),
        };
        Ok(outcome)
    }

    fn used_by(&self, debt_id: Uuid, settlement_id: Uuid) -> Cents {
        self.book
            .get(debt_id)
            .and_then(|debt| {
                debt.payment_history
                    .iter()
                    .find(|p| p.settlement_id == settlement_id)
                    .map(|p| p.used_amount)
            })
            .unwrap_or(0)
    }
}
