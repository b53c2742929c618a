//! Payment step model.
//!
//! A step moves from `Pending` to `Paid` exactly once. Its amount is always
//! re-derived from the ledger total and its percentage.

use crate::decimal::{Money, Percent};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// Settlement state of a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepState {
    Pending,
    Paid,
}

impl fmt::Display for StepState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepState::Pending => f.write_str("pending"),
            StepState::Paid => f.write_str("paid"),
        }
    }
}

/// The closed set of accepted payment methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    BankTransfer,
    Card,
    MobileWalletA,
    MobileWalletB,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 5] = [
        PaymentMethod::Cash,
        PaymentMethod::BankTransfer,
        PaymentMethod::Card,
        PaymentMethod::MobileWalletA,
        PaymentMethod::MobileWalletB,
    ];

    /// Wire name, as accepted by `FromStr`.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::BankTransfer => "bank_transfer",
            PaymentMethod::Card => "card",
            PaymentMethod::MobileWalletA => "mobile_wallet_a",
            PaymentMethod::MobileWalletB => "mobile_wallet_b",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a payment method name is outside the accepted set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown payment method '{0}'")]
pub struct UnknownPaymentMethod(pub String);

impl FromStr for PaymentMethod {
    type Err = UnknownPaymentMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        PaymentMethod::ALL
            .into_iter()
            .find(|m| m.as_str() == name)
            .ok_or_else(|| UnknownPaymentMethod(name.to_string()))
    }
}

/// One unit of the payment sequence.
///
/// # Invariants
///
/// - `amount == total * percentage / 100` for the owning ledger's total
/// - `date` and `payment_method` are `Some` iff `state == Paid`
/// - Once paid, none of the fields change again
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    /// Stable identifier.
    pub id: Uuid,

    pub title: String,

    /// Share of the ledger total. May be zero on a pending placeholder.
    pub percentage: Percent,

    /// Derived: `total * percentage / 100`.
    pub amount: Money,

    /// Settlement date, set when paid.
    pub date: Option<NaiveDate>,

    pub state: StepState,

    /// Set when paid.
    pub payment_method: Option<PaymentMethod>,
}

impl Step {
    /// Creates a pending step holding `percentage` of `total`.
    pub fn pending(id: Uuid, title: impl Into<String>, percentage: Percent, total: Money) -> Self {
        Step {
            id,
            title: title.into(),
            percentage,
            amount: percentage.of(total),
            date: None,
            state: StepState::Pending,
            payment_method: None,
        }
    }

    pub fn is_paid(&self) -> bool {
        self.state == StepState::Paid
    }

    pub fn is_pending(&self) -> bool {
        self.state == StepState::Pending
    }

    /// Changes the share of a pending step and re-derives its amount.
    ///
    /// Returns `false` if the step is already paid.
    pub fn reprice(&mut self, percentage: Percent, total: Money) -> bool {
        if self.is_paid() {
            return false;
        }

        self.percentage = percentage;
        self.amount = percentage.of(total);
        true
    }

    /// Settles the step with the confirmed share, date and method.
    ///
    /// Returns `false` if the step is already paid.
    pub fn mark_paid(
        &mut self,
        percentage: Percent,
        total: Money,
        date: NaiveDate,
        method: PaymentMethod,
    ) -> bool {
        if self.is_paid() {
            return false;
        }

        self.state = StepState::Paid;
        self.percentage = percentage;
        self.amount = percentage.of(total);
        self.date = Some(date);
        self.payment_method = Some(method);
        true
    }
}
