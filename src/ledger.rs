//! The ledger aggregate and its transitions.
//!
//! Every transition takes `&self` and returns a fresh snapshot; a rejected
//! transition returns the reason and leaves the receiver as it was.

use crate::decimal::{Money, Percent};
use crate::error::LedgerError;
use crate::ids::IdGenerator;
use crate::step::{PaymentMethod, Step};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

/// Title given to the step every ledger starts with.
pub const INITIAL_STEP_TITLE: &str = "Anticipo";

/// An ordered sequence of payment steps against a fixed total.
///
/// # Invariants
///
/// - `steps` is never empty
/// - The percentages of paid steps add up to at most 100
/// - A step is only paid if every step before it is paid
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ledger {
    id: Uuid,
    total: Money,
    steps: Vec<Step>,
}

impl Ledger {
    /// Creates a ledger with a single pending placeholder step.
    pub fn new(total: Money, ids: &mut dyn IdGenerator) -> Result<Self, LedgerError> {
        if !total.is_positive() || total > Self::max_total() {
            return Err(LedgerError::InvalidTotal(total));
        }

        let id = ids.next_id();
        let initial = Step::pending(ids.next_id(), INITIAL_STEP_TITLE, Percent::ZERO, total);

        Ok(Ledger {
            id,
            total,
            steps: vec![initial],
        })
    }

    /// Largest accepted total: any share of it up to 100% stays within the
    /// decimal range.
    pub fn max_total() -> Money {
        Money::new(Decimal::MAX / Decimal::ONE_HUNDRED)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn total(&self) -> Money {
        self.total
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Sum of the percentages of paid steps.
    pub fn paid_percentage(&self) -> Percent {
        self.steps
            .iter()
            .filter(|s| s.is_paid())
            .map(|s| s.percentage)
            .sum()
    }

    /// `100 - paid_percentage()`.
    pub fn remaining_percentage(&self) -> Percent {
        Percent::HUNDRED - self.paid_percentage()
    }

    /// Share of the total still to be paid.
    pub fn remaining_amount(&self) -> Money {
        self.remaining_percentage().of(self.total)
    }

    /// Returns `true` if the step at `index` may be paid now: it is the first
    /// step, or the step right before it is already paid.
    pub fn is_payable(&self, index: usize) -> bool {
        if index == 0 {
            return true;
        }

        self.steps
            .get(index - 1)
            .map(Step::is_paid)
            .unwrap_or(false)
    }

    /// Index of the first pending step, if any.
    pub fn first_pending(&self) -> Option<usize> {
        self.steps.iter().position(Step::is_pending)
    }

    /// Settles the step at `index`.
    ///
    /// The confirmed `percentage` replaces whatever placeholder share the step
    /// held.
    pub fn register_payment(
        &self,
        index: usize,
        percentage: Percent,
        date: NaiveDate,
        method: PaymentMethod,
    ) -> Result<Ledger, LedgerError> {
        if index >= self.steps.len() {
            return Err(LedgerError::StepNotFound {
                index,
                len: self.steps.len(),
            });
        }

        if !self.is_payable(index) {
            return Err(LedgerError::OutOfOrderPayment { index });
        }

        if self.steps[index].is_paid() {
            return Err(LedgerError::AlreadyPaid { index });
        }

        let remaining = self.remaining_percentage();
        if percentage <= Percent::ZERO || percentage > remaining {
            return Err(LedgerError::InvalidPercentage {
                percentage,
                remaining,
            });
        }

        let mut steps = self.steps.clone();
        steps[index].mark_paid(percentage, self.total, date, method);

        Ok(self.with_steps(steps))
    }

    /// Introduces a new pending step named `title`.
    ///
    /// The first pending step is split in two halves, the second of which
    /// becomes the new step. A placeholder with no share yet is treated as
    /// holding the whole remaining budget. When every step is paid, a new step
    /// carrying the remaining budget is appended instead.
    pub fn create_step(
        &self,
        title: &str,
        ids: &mut dyn IdGenerator,
    ) -> Result<Ledger, LedgerError> {
        let remaining = self.remaining_percentage();
        if remaining <= Percent::ZERO {
            return Err(LedgerError::BudgetExhausted);
        }

        let title = title.trim();
        if title.is_empty() {
            return Err(LedgerError::EmptyTitle);
        }

        let mut steps = self.steps.clone();

        match self.first_pending() {
            Some(open) => {
                let base = if steps[open].percentage.is_zero() {
                    remaining
                } else {
                    steps[open].percentage
                };

                if base <= Percent::ONE {
                    return Err(LedgerError::DegenerateSplit { index: open, base });
                }

                let half = base.half();
                steps[open].reprice(half, self.total);
                steps.insert(open + 1, Step::pending(ids.next_id(), title, half, self.total));
            }
            None => {
                steps.push(Step::pending(ids.next_id(), title, remaining, self.total));
            }
        }

        Ok(self.with_steps(steps))
    }

    /// Steps of `self` that are absent from `previous` or whose share differs.
    pub fn delta_from(&self, previous: &Ledger) -> Vec<Step> {
        self.steps
            .iter()
            .filter(|step| {
                previous
                    .steps
                    .iter()
                    .find(|old| old.id == step.id)
                    .map_or(true, |old| old != *step)
            })
            .cloned()
            .collect()
    }

    fn with_steps(&self, steps: Vec<Step>) -> Ledger {
        Ledger {
            id: self.id,
            total: self.total,
            steps,
        }
    }

    /// Verifies the ledger invariants.
    #[cfg(any(test, debug_assertions))]
    pub fn check_invariant(&self) -> bool {
        let budget_ok = self.paid_percentage() <= Percent::HUNDRED;
        let ordered = self
            .steps
            .windows(2)
            .all(|pair| pair[0].is_paid() || pair[1].is_pending());
        let derived = self
            .steps
            .iter()
            .all(|s| s.amount == s.percentage.of(self.total));

        !self.steps.is_empty() && budget_ok && ordered && derived
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::SequentialIds;
    use crate::step::StepState;
    use rust_decimal_macros::dec;

    fn pct(value: rust_decimal::Decimal) -> Percent {
        Percent::new(value)
    }

    fn tomorrow() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 17).unwrap()
    }

    fn new_ledger(total: rust_decimal::Decimal) -> (Ledger, SequentialIds) {
        let mut ids = SequentialIds::new();
        let ledger = Ledger::new(Money::new(total), &mut ids).unwrap();
        (ledger, ids)
    }

    #[test]
    fn test_new_ledger_has_one_placeholder_step() {
        let (ledger, _) = new_ledger(dec!(182));

        assert_eq!(ledger.id(), Uuid::from_u128(1));
        assert_eq!(ledger.steps().len(), 1);

        let step = &ledger.steps()[0];
        assert_eq!(step.id, Uuid::from_u128(2));
        assert_eq!(step.title, INITIAL_STEP_TITLE);
        assert!(step.percentage.is_zero());
        assert_eq!(step.amount, Money::ZERO);
        assert_eq!(step.state, StepState::Pending);
        assert_eq!(ledger.remaining_percentage(), Percent::HUNDRED);
        assert!(ledger.check_invariant());
    }

    #[test]
    fn test_new_ledger_rejects_non_positive_total() {
        let mut ids = SequentialIds::new();
        assert_eq!(
            Ledger::new(Money::ZERO, &mut ids),
            Err(LedgerError::InvalidTotal(Money::ZERO))
        );
        assert!(Ledger::new(Money::new(dec!(-5)), &mut ids).is_err());
    }

    #[test]
    fn test_new_ledger_rejects_total_beyond_decimal_range() {
        let mut ids = SequentialIds::new();
        let huge = Money::new(dec!(10000000000000000000000000000));

        assert_eq!(
            Ledger::new(huge, &mut ids),
            Err(LedgerError::InvalidTotal(huge))
        );
        assert!(Ledger::new(Money::new(Decimal::MAX), &mut ids).is_err());
    }

    #[test]
    fn test_largest_total_supports_full_share() {
        let mut ids = SequentialIds::new();
        let ledger = Ledger::new(Ledger::max_total(), &mut ids).unwrap();

        let split = ledger.create_step("A", &mut ids).unwrap();
        assert_eq!(split.steps()[1].percentage, pct(dec!(50)));

        let paid = ledger
            .register_payment(0, Percent::HUNDRED, tomorrow(), PaymentMethod::Cash)
            .unwrap();
        assert_eq!(paid.steps()[0].amount, Ledger::max_total());
        assert_eq!(paid.remaining_amount(), Money::ZERO);
    }

    #[test]
    fn test_register_payment_settles_step() {
        let (ledger, _) = new_ledger(dec!(182));

        let next = ledger
            .register_payment(0, pct(dec!(40)), tomorrow(), PaymentMethod::Cash)
            .unwrap();

        let step = &next.steps()[0];
        assert!(step.is_paid());
        assert_eq!(step.percentage, pct(dec!(40)));
        assert_eq!(step.amount.to_string(), "72.8000");
        assert_eq!(step.date, Some(tomorrow()));
        assert_eq!(step.payment_method, Some(PaymentMethod::Cash));
        assert_eq!(next.remaining_percentage(), pct(dec!(60)));
        assert_eq!(next.remaining_amount().visual(), "109.2");

        // the receiver is a separate snapshot
        assert!(ledger.steps()[0].is_pending());
        assert!(next.check_invariant());
    }

    #[test]
    fn test_register_payment_accepts_full_remaining() {
        let (ledger, _) = new_ledger(dec!(100));
        let next = ledger
            .register_payment(0, Percent::HUNDRED, tomorrow(), PaymentMethod::Card)
            .unwrap();
        assert_eq!(next.remaining_percentage(), Percent::ZERO);
    }

    #[test]
    fn test_register_payment_rejects_bad_percentages() {
        let (ledger, _) = new_ledger(dec!(100));

        for bad in [dec!(0), dec!(-1), dec!(100.0001), dec!(150)] {
            assert!(matches!(
                ledger.register_payment(0, pct(bad), tomorrow(), PaymentMethod::Cash),
                Err(LedgerError::InvalidPercentage { .. })
            ));
        }
    }

    #[test]
    fn test_register_payment_rejects_missing_step() {
        let (ledger, _) = new_ledger(dec!(100));
        assert_eq!(
            ledger.register_payment(3, pct(dec!(10)), tomorrow(), PaymentMethod::Cash),
            Err(LedgerError::StepNotFound { index: 3, len: 1 })
        );
    }

    #[test]
    fn test_register_payment_enforces_order() {
        let (ledger, mut ids) = new_ledger(dec!(100));
        let ledger = ledger.create_step("Segunda cuota", &mut ids).unwrap();

        assert!(ledger.is_payable(0));
        assert!(!ledger.is_payable(1));
        assert_eq!(
            ledger.register_payment(1, pct(dec!(10)), tomorrow(), PaymentMethod::Cash),
            Err(LedgerError::OutOfOrderPayment { index: 1 })
        );
    }

    #[test]
    fn test_register_payment_twice_is_rejected() {
        let (ledger, _) = new_ledger(dec!(100));
        let paid = ledger
            .register_payment(0, pct(dec!(30)), tomorrow(), PaymentMethod::Cash)
            .unwrap();

        assert_eq!(
            paid.register_payment(0, pct(dec!(30)), tomorrow(), PaymentMethod::Cash),
            Err(LedgerError::AlreadyPaid { index: 0 })
        );
    }

    #[test]
    fn test_create_step_splits_placeholder_using_remaining() {
        let (ledger, mut ids) = new_ledger(dec!(100));
        let next = ledger.create_step("A", &mut ids).unwrap();

        assert_eq!(next.steps().len(), 2);
        assert_eq!(next.steps()[0].percentage, pct(dec!(50)));
        assert_eq!(next.steps()[0].amount, Money::new(dec!(50)));
        assert_eq!(next.steps()[1].title, "A");
        assert_eq!(next.steps()[1].percentage, pct(dec!(50)));
        assert_eq!(next.steps()[1].id, Uuid::from_u128(3));
        assert!(next.steps().iter().all(Step::is_pending));
    }

    #[test]
    fn test_create_step_inserts_after_open_step() {
        let (ledger, mut ids) = new_ledger(dec!(200));
        let ledger = ledger
            .register_payment(0, pct(dec!(20)), tomorrow(), PaymentMethod::Cash)
            .unwrap();
        let ledger = ledger.create_step("Second", &mut ids).unwrap();
        let ledger = ledger.create_step("Third", &mut ids).unwrap();

        let titles: Vec<_> = ledger.steps().iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, ["Anticipo", "Second", "Third"]);
        assert_eq!(ledger.steps()[1].percentage, pct(dec!(40)));
        assert_eq!(ledger.steps()[2].percentage, pct(dec!(40)));
        assert_eq!(ledger.steps()[2].amount, Money::new(dec!(80)));
    }

    #[test]
    fn test_create_step_appends_when_all_paid() {
        let (ledger, mut ids) = new_ledger(dec!(182));
        let ledger = ledger
            .register_payment(0, pct(dec!(40)), tomorrow(), PaymentMethod::Cash)
            .unwrap();
        let next = ledger.create_step("Segunda cuota", &mut ids).unwrap();

        assert_eq!(next.steps().len(), 2);
        let added = &next.steps()[1];
        assert_eq!(added.percentage, pct(dec!(60)));
        assert_eq!(added.amount.to_string(), "109.2000");
        assert!(added.is_pending());
        assert_eq!(next.steps()[0], ledger.steps()[0]);
    }

    #[test]
    fn test_create_step_rejects_when_budget_exhausted() {
        let (ledger, mut ids) = new_ledger(dec!(100));
        let ledger = ledger
            .register_payment(0, Percent::HUNDRED, tomorrow(), PaymentMethod::Cash)
            .unwrap();
        assert_eq!(
            ledger.create_step("More", &mut ids),
            Err(LedgerError::BudgetExhausted)
        );
    }

    #[test]
    fn test_create_step_rejects_blank_title() {
        let (ledger, mut ids) = new_ledger(dec!(100));
        assert_eq!(
            ledger.create_step("   ", &mut ids),
            Err(LedgerError::EmptyTitle)
        );
    }

    #[test]
    fn test_create_step_trims_title() {
        let (ledger, mut ids) = new_ledger(dec!(100));
        let next = ledger.create_step("  Cuota 2 ", &mut ids).unwrap();
        assert_eq!(next.steps()[1].title, "Cuota 2");
    }

    #[test]
    fn test_create_step_refuses_degenerate_split() {
        let (mut ledger, mut ids) = new_ledger(dec!(100));
        let mut created = 0;
        let rejection = loop {
            match ledger.create_step("Split", &mut ids) {
                Ok(next) => {
                    ledger = next;
                    created += 1;
                }
                Err(e) => break e,
            }
        };

        assert_eq!(created, 7);
        assert_eq!(ledger.steps().len(), 8);
        assert_eq!(
            rejection,
            LedgerError::DegenerateSplit {
                index: 0,
                base: pct(dec!(0.78125)),
            }
        );
        assert!(ledger.check_invariant());
    }

    #[test]
    fn test_rejection_does_not_consume_ids() {
        let (ledger, mut ids) = new_ledger(dec!(100));
        let _ = ledger.create_step("", &mut ids);
        let next = ledger.create_step("A", &mut ids).unwrap();
        assert_eq!(next.steps()[1].id, Uuid::from_u128(3));
    }

    #[test]
    fn test_delta_reports_split_steps() {
        let (ledger, mut ids) = new_ledger(dec!(100));
        let next = ledger.create_step("A", &mut ids).unwrap();

        let delta = next.delta_from(&ledger);
        assert_eq!(delta.len(), 2);
        assert_eq!(delta[0].id, ledger.steps()[0].id);
        assert_eq!(delta[1].title, "A");

        assert!(next.delta_from(&next).is_empty());
    }
}
