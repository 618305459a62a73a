//! Integration tests for debt recovery
//!
//! - Batch routing to the oldest outstanding debt
//! - Retried batches are exactly-once
//! - Concurrent payoffs against one debt serialize
//! - Concurrent retries of a batch collect each settlement once

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use settlement::{
    BrandBucket, DebtBook, DebtRecoveryEngine, DebtStatus, MerchantId, PayoffOutcome,
    ReceivableKind, RecoveryConfig, Settlement, SettlementOutcome, SkipReason,
};
use std::sync::{Arc, Barrier};
use std::thread;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 6, 15).unwrap()
}

fn opened(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 5, day, 8, 30, 0).unwrap()
}

fn settlement(merchant: &str, amount: i64, buckets: Vec<BrandBucket>) -> Settlement {
    let mut settlement = Settlement::new(MerchantId::new(merchant), amount, today());
    settlement.brands = buckets;
    settlement
}

fn visa(debit: i64, credit: i64, installment: i64, anticipated: i64) -> BrandBucket {
    BrandBucket::new("visa")
        .with(ReceivableKind::Debit, debit)
        .with(ReceivableKind::Credit, credit)
        .with(ReceivableKind::InstallmentCredit, installment)
        .with(ReceivableKind::AnticipatedCredit, anticipated)
}

#[test]
fn test_batch_collects_oldest_debt_first() {
    let book = Arc::new(DebtBook::new().unwrap());
    let newer = book.open_debt(MerchantId::new("m-1"), 500, opened(10)).unwrap();
    let older = book.open_debt(MerchantId::new("m-1"), 120, opened(2)).unwrap();
    let engine = DebtRecoveryEngine::new(Arc::clone(&book), RecoveryConfig::default());

    let mut batch = vec![
        settlement("m-1", 200, vec![visa(50, 30, 0, 100)]),
        settlement("m-1", 300, vec![visa(300, 0, 0, 0)]),
    ];
    let report = engine.run(&mut batch, today());

    // First settlement pays off the older debt and leaves 80 for the caller
    assert_eq!(
        report.settlements[0].outcome,
        SettlementOutcome::Applied { debt_id: older.id, used_amount: 120, paid_off: true }
    );
    assert_eq!(report.settlements[0].leftover, 80);
    assert_eq!(batch[0].brands[0], visa(0, 0, 0, 60));

    // Second settlement moves on to the newer debt
    assert_eq!(
        report.settlements[1].outcome,
        SettlementOutcome::Applied { debt_id: newer.id, used_amount: 300, paid_off: false }
    );
    assert_eq!(report.recovered, 420);

    assert_eq!(book.get(older.id).unwrap().status, DebtStatus::Paid);
    let newer = book.get(newer.id).unwrap();
    assert_eq!(newer.status, DebtStatus::Processing);
    assert_eq!(newer.paid_amount, 300);
    assert_eq!(book.metrics().debts_paid_off.get(), 1);
}

#[test]
fn test_retried_batch_is_exactly_once() {
    let book = Arc::new(DebtBook::new().unwrap());
    let debt = book.open_debt(MerchantId::new("m-1"), 100, opened(1)).unwrap();
    book.open_debt(MerchantId::new("m-1"), 100, opened(3)).unwrap();
    let engine = DebtRecoveryEngine::new(Arc::clone(&book), RecoveryConfig::default());

    let original = vec![settlement("m-1", 150, vec![visa(150, 0, 0, 0)])];

    let mut first = original.clone();
    engine.run(&mut first, today());

    // Caller retries with the records it held before the first run
    let mut retry = original;
    let report = engine.run(&mut retry, today());

    assert_eq!(
        report.settlements[0].outcome,
        SettlementOutcome::Duplicate { debt_id: debt.id }
    );
    assert_eq!(report.settlements[0].leftover, 50);
    assert_eq!(report.recovered, 0);
    assert_eq!(book.get(debt.id).unwrap().payment_history.len(), 1);
    assert_eq!(retry[0].brands[0].debit, 150);
}

#[test]
fn test_empty_receivables_reported_as_skip() {
    let book = Arc::new(DebtBook::new().unwrap());
    let debt = book.open_debt(MerchantId::new("m-1"), 100, opened(1)).unwrap();
    let engine = DebtRecoveryEngine::new(Arc::clone(&book), RecoveryConfig::default());

    let mut batch = vec![settlement("m-1", 90, vec![visa(0, 0, 0, 0)])];
    let report = engine.run(&mut batch, today());

    assert_eq!(
        report.settlements[0].outcome,
        SettlementOutcome::Skipped { reason: SkipReason::NothingCollected }
    );
    assert_eq!(book.get(debt.id).unwrap().status, DebtStatus::Pending);
}

#[test]
fn test_canceled_debt_not_collected() {
    let book = Arc::new(DebtBook::new().unwrap());
    let debt = book.open_debt(MerchantId::new("m-1"), 100, opened(1)).unwrap();
    book.cancel(debt.id).unwrap();
    let engine = DebtRecoveryEngine::new(Arc::clone(&book), RecoveryConfig::default());

    let mut batch = vec![settlement("m-1", 90, vec![visa(90, 0, 0, 0)])];
    let report = engine.run(&mut batch, today());

    assert_eq!(
        report.settlements[0].outcome,
        SettlementOutcome::Skipped { reason: SkipReason::NoOutstandingDebt }
    );
    assert_eq!(book.metrics().debts_canceled.get(), 1);
}

#[test]
fn test_concurrent_payoffs_serialize() {
    const THREADS: i64 = 16;
    const PER_SETTLEMENT: i64 = 100;

    let book = Arc::new(DebtBook::new().unwrap());
    let debt = book
        .open_debt(MerchantId::new("m-1"), THREADS * PER_SETTLEMENT - 50, opened(1))
        .unwrap();

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let book = Arc::clone(&book);
            thread::spawn(move || {
                let mut s = settlement("m-1", PER_SETTLEMENT, vec![visa(PER_SETTLEMENT, 0, 0, 0)]);
                book.apply_settlement(debt.id, &mut s, today()).unwrap()
            })
        })
        .collect();

    let used: i64 = handles
        .into_iter()
        .map(|h| match h.join().unwrap() {
            PayoffOutcome::Applied(receipt) => receipt.used_amount,
            _ => 0,
        })
        .sum();

    let stored = book.get(debt.id).unwrap();
    assert_eq!(used, stored.debt_amount);
    assert_eq!(stored.paid_amount, stored.debt_amount);
    assert_eq!(stored.status, DebtStatus::Paid);
    assert_eq!(stored.payment_history.len() as i64, THREADS);
    assert_eq!(
        stored.payment_history.iter().map(|p| p.used_amount).sum::<i64>(),
        stored.debt_amount
    );
}

#[test]
fn test_concurrent_duplicate_applied_once() {
    let book = Arc::new(DebtBook::new().unwrap());
    let debt = book.open_debt(MerchantId::new("m-1"), 10_000, opened(1)).unwrap();
    let shared = settlement("m-1", 700, vec![visa(200, 500, 0, 0)]);

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let book = Arc::clone(&book);
            let mut copy = shared.clone();
            thread::spawn(move || book.apply_settlement(debt.id, &mut copy, today()).unwrap())
        })
        .collect();

    let applied = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|o| matches!(o, PayoffOutcome::Applied(_)))
        .count();

    assert_eq!(applied, 1);
    let stored = book.get(debt.id).unwrap();
    assert_eq!(stored.paid_amount, 700);
    assert_eq!(book.metrics().duplicates_skipped.get(), 7);
}

#[test]
fn test_concurrent_batch_retries_collect_once() {
    for _ in 0..50 {
        let book = Arc::new(DebtBook::new().unwrap());
        let first = book.open_debt(MerchantId::new("m-1"), 100, opened(1)).unwrap();
        let second = book.open_debt(MerchantId::new("m-1"), 100, opened(2)).unwrap();
        for day in 3..20 {
            book.open_debt(MerchantId::new(format!("other-{}", day)), 100, opened(day))
                .unwrap();
        }
        let engine = DebtRecoveryEngine::new(Arc::clone(&book), RecoveryConfig::default());
        let shared = settlement("m-1", 100, vec![visa(100, 0, 0, 0)]);
        let barrier = Arc::new(Barrier::new(2));

        let handles: Vec<_> = (0..2)
            .map(|_| {
                let engine = engine.clone();
                let barrier = Arc::clone(&barrier);
                let mut batch = vec![shared.clone()];
                thread::spawn(move || {
                    barrier.wait();
                    engine.run(&mut batch, today())
                })
            })
            .collect();

        let reports: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        let applied = reports.iter().map(|r| r.applied().count()).sum::<usize>();
        let duplicates = reports
            .iter()
            .flat_map(|r| &r.settlements)
            .filter(|line| matches!(line.outcome, SettlementOutcome::Duplicate { .. }))
            .count();
        assert_eq!(applied, 1);
        assert_eq!(duplicates, 1);
        assert_eq!(reports.iter().map(|r| r.recovered).sum::<i64>(), 100);

        let collected = book.get(first.id).unwrap().paid_amount + book.get(second.id).unwrap().paid_amount;
        assert_eq!(collected, 100);
        assert_eq!(book.get(first.id).unwrap().status, DebtStatus::Paid);
    }
}
