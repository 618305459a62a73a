//! Chargeback responsibility policies
//!
//! A policy decides which credits of a disputed transaction are reversed and
//! which still-unpaid payables the caller should advance or cancel. Policies
//! are looked up by id in a [`PolicyRegistry`], once per chargeback.

use crate::{
    adjustment::{reversed_credit_ids, AdjustmentGenerator},
    types::Payable,
    Config, Error, Result,
};
use chrono::{DateTime, Utc};
use std::fmt;
use uuid::Uuid;

/// Id of the proportional-to-split policy
pub const PROPORTIONAL_TO_SPLIT: &str = "proportional_to_split";

/// Contract every chargeback policy fulfills
pub trait ChargebackPolicy: Send + Sync + fmt::Debug {
    /// Stable policy id
    fn id(&self) -> &'static str;

    /// Whether this policy handles `policy_id`
    fn is_applicable(&self, policy_id: &str) -> bool {
        policy_id == self.id()
    }

    /// Build the chargeback payables for a transaction's payables
    fn apply(
        &self,
        originals: &[Payable],
        generator: &AdjustmentGenerator,
        now: DateTime<Utc>,
    ) -> Result<Vec<Payable>>;

    /// Ids of payables the caller should advance or cancel
    fn future_payables_to_advance(&self, originals: &[Payable]) -> Vec<Uuid>;
}

/// Reverses every credit of the transaction.
///
/// Each split recipient owns its own credit payables, so reversing all of
/// them charges every recipient back in proportion to its original share.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProportionalToSplit;

impl ChargebackPolicy for ProportionalToSplit {
    fn id(&self) -> &'static str {
        PROPORTIONAL_TO_SPLIT
    }

    fn apply(
        &self,
        originals: &[Payable],
        generator: &AdjustmentGenerator,
        now: DateTime<Utc>,
    ) -> Result<Vec<Payable>> {
        let reversed = reversed_credit_ids(originals);

        let chargebacks = originals
            .iter()
            .filter(|p| p.is_credit() && !reversed.contains(&p.id))
            .map(|p| generator.chargeback_debit(p, now))
            .collect::<Result<Vec<_>>>()?;

        tracing::info!(
            policy = PROPORTIONAL_TO_SPLIT,
            originals = originals.len(),
            already_reversed = reversed.len(),
            chargebacks = chargebacks.len(),
            "Applied chargeback policy"
        );

        Ok(chargebacks)
    }

    fn future_payables_to_advance(&self, originals: &[Payable]) -> Vec<Uuid> {
        originals.iter().filter(|p| !p.is_paid()).map(|p| p.id).collect()
    }
}

/// Maps policy ids to policy implementations
#[derive(Debug)]
pub struct PolicyRegistry {
    policies: Vec<Box<dyn ChargebackPolicy>>,
}

impl Default for PolicyRegistry {
    fn default() -> Self {
        Self {
            policies: vec![Box::new(ProportionalToSplit)],
        }
    }
}

impl PolicyRegistry {
    /// Create an empty registry
    pub fn empty() -> Self {
        Self { policies: Vec::new() }
    }

    /// Register a policy. Later registrations take precedence.
    pub fn register(&mut self, policy: Box<dyn ChargebackPolicy>) -> &mut Self {
        self.policies.insert(0, policy);
        self
    }

    /// Resolve the policy handling `policy_id`
    pub fn resolve(&self, policy_id: &str) -> Result<&dyn ChargebackPolicy> {
        self.policies
            .iter()
            .find(|p| p.is_applicable(policy_id))
            .map(|p| p.as_ref())
            .ok_or_else(|| Error::UnknownPolicy(policy_id.to_string()))
    }

    /// Resolve the configured default policy
    pub fn resolve_default(&self, config: &Config) -> Result<&dyn ChargebackPolicy> {
        self.resolve(&config.default_chargeback_policy)
    }

    /// Registered policy ids, in resolution order
    pub fn ids(&self) -> Vec<&'static str> {
        self.policies.iter().map(|p| p.id()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CardBrand, PayableStatus, PayableType, PaymentMethod};
    use chrono::{Duration, NaiveDate, TimeZone};

    fn captured_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 5, 10, 0, 0).unwrap()
    }

    fn split_credit(recipient: &str, installment: u32, amount: i64, status: PayableStatus) -> Payable {
        Payable {
            recipient_id: Some(recipient.to_string()),
            amount,
            fee: amount / 10,
            mdr_fee: amount / 10,
            mdr_amount: amount - amount / 10,
            installment,
            total_installments: 2,
            status,
            ..Payable::credit(
                "tx_split",
                CardBrand::new("mastercard"),
                PaymentMethod::Credit,
                captured_at(),
                NaiveDate::from_ymd_opt(2024, 2, 5).unwrap(),
            )
        }
    }

    #[test]
    fn test_proportional_reverses_every_recipient_credit() {
        let originals = vec![
            split_credit("seller", 1, 7_000, PayableStatus::Paid),
            split_credit("seller", 2, 7_000, PayableStatus::WaitingFunds),
            split_credit("marketplace", 1, 3_000, PayableStatus::Paid),
            split_credit("marketplace", 2, 3_000, PayableStatus::WaitingFunds),
        ];
        let now = captured_at() + Duration::days(45);

        let chargebacks = ProportionalToSplit
            .apply(&originals, &AdjustmentGenerator::default(), now)
            .unwrap();

        assert_eq!(chargebacks.len(), 4);
        assert!(chargebacks
            .iter()
            .all(|c| c.payable_type == PayableType::ChargebackDebit));

        let seller: i64 = chargebacks
            .iter()
            .filter(|c| c.recipient_id.as_deref() == Some("seller"))
            .map(|c| c.amount)
            .sum();
        let marketplace: i64 = chargebacks
            .iter()
            .filter(|c| c.recipient_id.as_deref() == Some("marketplace"))
            .map(|c| c.amount)
            .sum();
        assert_eq!(seller, -14_000);
        assert_eq!(marketplace, -6_000);
    }

    #[test]
    fn test_proportional_skips_adjustments_and_reversed_credits() {
        let generator = AdjustmentGenerator::default();
        let now = captured_at() + Duration::days(10);

        let refunded = split_credit("seller", 1, 5_000, PayableStatus::Paid);
        let open = split_credit("seller", 2, 5_000, PayableStatus::WaitingFunds);
        let refund = generator.refund(&refunded, now).unwrap();

        let originals = vec![refunded, open.clone(), refund];
        let chargebacks = ProportionalToSplit.apply(&originals, &generator, now).unwrap();

        assert_eq!(chargebacks.len(), 1);
        assert_eq!(chargebacks[0].origin_payable_id, Some(open.id));
    }

    #[test]
    fn test_future_payables_are_the_unpaid_ones() {
        let paid = split_credit("seller", 1, 1_000, PayableStatus::Paid);
        let waiting = split_credit("seller", 2, 1_000, PayableStatus::WaitingFunds);
        let prepaid = split_credit("marketplace", 2, 1_000, PayableStatus::Prepaid);

        let ids = ProportionalToSplit
            .future_payables_to_advance(&[paid, waiting.clone(), prepaid.clone()]);

        assert_eq!(ids, vec![waiting.id, prepaid.id]);
    }

    #[derive(Debug)]
    struct NoLiability;

    impl ChargebackPolicy for NoLiability {
        fn id(&self) -> &'static str {
            "no_liability"
        }

        fn apply(
            &self,
            _originals: &[Payable],
            _generator: &AdjustmentGenerator,
            _now: DateTime<Utc>,
        ) -> Result<Vec<Payable>> {
            Ok(Vec::new())
        }

        fn future_payables_to_advance(&self, _originals: &[Payable]) -> Vec<Uuid> {
            Vec::new()
        }
    }

    #[test]
    fn test_registry_resolution() {
        let mut registry = PolicyRegistry::default();
        assert_eq!(
            registry.resolve(PROPORTIONAL_TO_SPLIT).unwrap().id(),
            PROPORTIONAL_TO_SPLIT
        );
        assert!(matches!(
            registry.resolve("no_liability"),
            Err(Error::UnknownPolicy(id)) if id == "no_liability"
        ));

        registry.register(Box::new(NoLiability));
        assert_eq!(registry.resolve("no_liability").unwrap().id(), "no_liability");
        assert_eq!(registry.ids(), vec!["no_liability", PROPORTIONAL_TO_SPLIT]);

        assert!(PolicyRegistry::empty().resolve(PROPORTIONAL_TO_SPLIT).is_err());
    }

    #[test]
    fn test_resolve_configured_default() {
        let registry = PolicyRegistry::default();
        let config = Config::default();
        assert_eq!(registry.resolve_default(&config).unwrap().id(), PROPORTIONAL_TO_SPLIT);

        let config = Config {
            default_chargeback_policy: "merchant_only".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            registry.resolve_default(&config),
            Err(Error::UnknownPolicy(_))
        ));
    }
}
