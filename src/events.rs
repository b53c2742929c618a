//! Records handed to a persistence collaborator after successful transitions.

use crate::decimal::{Money, Percent};
use crate::step::{PaymentMethod, Step};
use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LedgerEvent {
    /// A step was settled.
    PaymentRegistered {
        ledger_id: Uuid,
        step_id: Uuid,
        percentage: Percent,
        amount: Money,
        date: NaiveDate,
        method: PaymentMethod,
    },

    /// Steps that were added or repriced by a step creation.
    StepsChanged { ledger_id: Uuid, steps: Vec<Step> },
}

impl LedgerEvent {
    pub fn ledger_id(&self) -> Uuid {
        match self {
            LedgerEvent::PaymentRegistered { ledger_id, .. } => *ledger_id,
            LedgerEvent::StepsChanged { ledger_id, .. } => *ledger_id,
        }
    }
}
