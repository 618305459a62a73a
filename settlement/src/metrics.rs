//! Prometheus metrics for debt recovery
//!
//! # Metrics
//!
//! - `debt_recovery_settlements_applied_total` - Settlements that collected funds
//! - `debt_recovery_duplicates_skipped_total` - Settlements already in a debt's history
//! - `debt_recovery_debts_paid_off_total` - Debts that reached `paid`
//! - `debt_recovery_debts_canceled_total` - Debts written off
//! - `debt_recovery_recovered_cents_total` - Cents collected from settlements
//! - `debt_recovery_batch_size` - Settlements per recovery batch

use prometheus::{Histogram, HistogramOpts, IntCounter, Registry};
use std::sync::Arc;

/// Metrics collector
///
/// Each collector owns its registry, so several books can live in one process.
#[derive(Clone)]
pub struct Metrics {
    /// Settlements that collected funds
    pub settlements_applied: IntCounter,

    /// Duplicate settlements skipped
    pub duplicates_skipped: IntCounter,

    /// Debts paid off
    pub debts_paid_off: IntCounter,

    /// Debts canceled
    pub debts_canceled: IntCounter,

    /// Cents recovered
    pub recovered_cents: IntCounter,

    /// Batch size histogram
    pub batch_size: Histogram,

    /// Prometheus registry
    pub registry: Arc<Registry>,
}

impl Metrics {
    /// Create new metrics collector
    pub fn new() -> prometheus::Result<Self> {
        let registry = Arc::new(Registry::new());

        let settlements_applied = IntCounter::new(
            "debt_recovery_settlements_applied_total",
            "Settlements that collected funds for a debt",
        )?;
        registry.register(Box::new(settlements_applied.clone()))?;

        let duplicates_skipped = IntCounter::new(
            "debt_recovery_duplicates_skipped_total",
            "Settlements skipped because a debt already collected them",
        )?;
        registry.register(Box::new(duplicates_skipped.clone()))?;

        let debts_paid_off = IntCounter::new(
            "debt_recovery_debts_paid_off_total",
            "Debts that reached paid",
        )?;
        registry.register(Box::new(debts_paid_off.clone()))?;

        let debts_canceled = IntCounter::new(
            "debt_recovery_debts_canceled_total",
            "Debts written off",
        )?;
        registry.register(Box::new(debts_canceled.clone()))?;

        let recovered_cents = IntCounter::new(
            "debt_recovery_recovered_cents_total",
            "Cents collected from settlements",
        )?;
        registry.register(Box::new(recovered_cents.clone()))?;

        let batch_size = Histogram::with_opts(
            HistogramOpts::new("debt_recovery_batch_size", "Settlements per recovery batch")
                .buckets(vec![1.0, 10.0, 100.0, 1_000.0, 10_000.0, 100_000.0]),
        )?;
        registry.register(Box::new(batch_size.clone()))?;

        Ok(Self {
            settlements_applied,
            duplicates_skipped,
            debts_paid_off,
            debts_canceled,
            recovered_cents,
            batch_size,
            registry,
        })
    }

    /// Record a collection
    pub fn record_collection(&self, used_amount: i64, paid_off: bool) {
        self.settlements_applied.inc();
        if let Ok(cents) = u64::try_from(used_amount) {
            self.recovered_cents.inc_by(cents);
        }
        if paid_off {
            self.debts_paid_off.inc();
        }
    }

    /// Record a skipped duplicate
    pub fn record_duplicate(&self) {
        self.duplicates_skipped.inc();
    }

    /// Record a cancellation
    pub fn record_cancel(&self) {
        self.debts_canceled.inc();
    }

    /// Record batch size
    pub fn record_batch(&self, settlements: usize) {
        self.batch_size.observe(settlements as f64);
    }

    /// Get metrics registry
    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

impl std::fmt::Debug for Metrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Metrics")
            .field("settlements_applied", &self.settlements_applied.get())
            .field("recovered_cents", &self.recovered_cents.get())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_creation() {
        let metrics = Metrics::new().unwrap();
        assert_eq!(metrics.settlements_applied.get(), 0);
        assert_eq!(metrics.recovered_cents.get(), 0);
    }

    #[test]
    fn test_independent_registries() {
        let first = Metrics::new().unwrap();
        let second = Metrics::new().unwrap();
        first.record_duplicate();
        assert_eq!(first.duplicates_skipped.get(), 1);
        assert_eq!(second.duplicates_skipped.get(), 0);
    }

    #[test]
    fn test_record_collection() {
        let metrics = Metrics::new().unwrap();
        metrics.record_collection(300, false);
        metrics.record_collection(700, true);

        assert_eq!(metrics.settlements_applied.get(), 2);
        assert_eq!(metrics.recovered_cents.get(), 1000);
        assert_eq!(metrics.debts_paid_off.get(), 1);
    }

    #[test]
    fn test_registry_gathers_all_families() {
        let metrics = Metrics::new().unwrap();
        metrics.record_batch(12);
        assert_eq!(metrics.registry().gather().len(), 6);
    }
}
