//! A ledger engine behind a single lock, for hosts that call in from several
//! threads.

use crate::decimal::Percent;
use crate::engine::LedgerEngine;
use crate::error::LedgerError;
use crate::events::LedgerEvent;
use crate::ledger::Ledger;
use crate::step::PaymentMethod;
use chrono::NaiveDate;
use std::sync::{Mutex, MutexGuard};

/// Serializes every read-compute-publish cycle on one ledger.
///
/// Operations return a clone of the snapshot they published.
pub struct SharedLedger {
    inner: Mutex<LedgerEngine>,
}

impl SharedLedger {
    pub fn new(engine: LedgerEngine) -> Self {
        SharedLedger {
            inner: Mutex::new(engine),
        }
    }

    /// Clone of the current snapshot.
    pub fn snapshot(&self) -> Ledger {
        self.lock().ledger().clone()
    }

    pub fn register_payment(
        &self,
        index: usize,
        percentage: Percent,
        date: NaiveDate,
        method: PaymentMethod,
    ) -> Result<Ledger, LedgerError> {
        self.lock()
            .register_payment(index, percentage, date, method)
            .cloned()
    }

    pub fn create_step(&self, title: &str) -> Result<Ledger, LedgerError> {
        self.lock().create_step(title).cloned()
    }

    pub fn drain_events(&self) -> Vec<LedgerEvent> {
        self.lock().drain_events()
    }

    /// Unwraps the engine once no other handle remains.
    pub fn into_inner(self) -> LedgerEngine {
        self.inner
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    // A panic while the lock is held cannot leave a half-applied transition:
    // the snapshot is only replaced after the new one is fully built.
    fn lock(&self) -> MutexGuard<'_, LedgerEngine> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
