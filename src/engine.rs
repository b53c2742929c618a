//! Intent processor.
//!
//! Holds the current ledger snapshot, applies user intents to it one at a time
//! and publishes the resulting snapshot. Successful transitions queue a
//! `LedgerEvent` for whoever persists the ledger.

use crate::decimal::{Money, Percent};
use crate::error::{LedgerError, Result};
use crate::events::LedgerEvent;
use crate::ids::{IdGenerator, RandomIds};
use crate::intent::{Intent, IntentRecord, DATE_FORMAT};
use crate::ledger::Ledger;
use crate::step::PaymentMethod;
use chrono::NaiveDate;
use csv::{ReaderBuilder, Trim};
use log::{debug, warn};
use std::io::{Read, Write};

/// The ledger intent processor.
///
/// Rejected intents leave the published snapshot untouched.
pub struct LedgerEngine {
    /// Current published snapshot.
    ledger: Ledger,

    ids: Box<dyn IdGenerator + Send>,

    /// Earliest accepted payment date.
    today: NaiveDate,

    /// Records not yet handed to persistence.
    outbox: Vec<LedgerEvent>,
}

impl LedgerEngine {
    /// Creates an engine for a new ledger over `total`, with random ids.
    pub fn new(total: Money, today: NaiveDate) -> Result<Self> {
        Self::with_ids(total, today, RandomIds)
    }

    /// Creates an engine drawing ledger and step ids from `ids`.
    pub fn with_ids<G>(total: Money, today: NaiveDate, ids: G) -> Result<Self>
    where
        G: IdGenerator + Send + 'static,
    {
        let mut ids: Box<dyn IdGenerator + Send> = Box::new(ids);
        let ledger = Ledger::new(total, ids.as_mut())?;

        debug!("Created ledger {} over {}", ledger.id(), total);

        Ok(LedgerEngine {
            ledger,
            ids,
            today,
            outbox: Vec::new(),
        })
    }

    /// The current snapshot.
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Registers a payment against the step at `index` and publishes the result.
    ///
    /// Dates before `today` are refused before the ledger is consulted.
    pub fn register_payment(
        &mut self,
        index: usize,
        percentage: Percent,
        date: NaiveDate,
        method: PaymentMethod,
    ) -> std::result::Result<&Ledger, LedgerError> {
        if date < self.today {
            return Err(LedgerError::PastDate {
                date,
                today: self.today,
            });
        }

        let next = self
            .ledger
            .register_payment(index, percentage, date, method)?;
        let step = &next.steps()[index];
        let event = LedgerEvent::PaymentRegistered {
            ledger_id: next.id(),
            step_id: step.id,
            percentage: step.percentage,
            amount: step.amount,
            date,
            method,
        };

        self.queue(event);
        self.ledger = next;

        Ok(&self.ledger)
    }

    /// Creates a new named step and publishes the result.
    pub fn create_step(&mut self, title: &str) -> std::result::Result<&Ledger, LedgerError> {
        let next = self.ledger.create_step(title, self.ids.as_mut())?;
        let event = LedgerEvent::StepsChanged {
            ledger_id: next.id(),
            steps: next.delta_from(&self.ledger),
        };

        self.queue(event);
        self.ledger = next;

        Ok(&self.ledger)
    }

    /// Applies a parsed intent.
    pub fn apply(&mut self, intent: Intent) -> std::result::Result<&Ledger, LedgerError> {
        match intent {
            Intent::Pay {
                index,
                percentage,
                date,
                method,
            } => self.register_payment(index, percentage, date, method),
            Intent::Create { title } => self.create_step(&title),
        }
    }

    /// Takes every queued persistence record, oldest first.
    pub fn drain_events(&mut self) -> Vec<LedgerEvent> {
        std::mem::take(&mut self.outbox)
    }

    pub fn pending_events(&self) -> &[LedgerEvent] {
        &self.outbox
    }

    fn queue(&mut self, event: LedgerEvent) {
        debug!("Queued {:?} for ledger {}", event, event.ledger_id());
        self.outbox.push(event);
    }

    /// Processes intents from a CSV reader in streaming fashion.
    ///
    /// Invalid rows and rejected intents are logged at warn level and skipped.
    pub fn process_csv<R: Read>(&mut self, reader: R) -> Result<()> {
        let mut csv_reader = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .from_reader(reader);

        for (row_idx, result) in csv_reader.deserialize::<IntentRecord>().enumerate() {
            let row_num = row_idx + 2; // 1-indexed, accounting for header row

            match result {
                Ok(record) => {
                    if let Some(intent) = record.parse() {
                        self.process_intent(intent, row_num);
                    } else {
                        warn!("Row {}: Failed to parse intent record", row_num);
                    }
                }
                Err(e) => {
                    warn!("Row {}: CSV parse error: {}", row_num, e);
                }
            }
        }

        Ok(())
    }

    fn process_intent(&mut self, intent: Intent, row: usize) {
        let description = format!("{:?}", intent);

        match self.apply(intent) {
            Ok(ledger) => {
                debug!(
                    "Row {}: Applied {}, remaining {}%",
                    row,
                    description,
                    ledger.remaining_percentage()
                );
            }
            Err(e) => {
                warn!("Row {}: Rejected {}: {}", row, description, e);
            }
        }
    }

    /// Writes the current steps to CSV, in payment order.
    ///
    /// Amounts are formatted with exactly 4 decimal places.
    pub fn write_output<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record([
            "index",
            "title",
            "percentage",
            "amount",
            "state",
            "date",
            "method",
            "id",
        ])?;

        for (index, step) in self.ledger.steps().iter().enumerate() {
            csv_writer.write_record([
                index.to_string(),
                step.title.clone(),
                step.percentage.to_string(),
                step.amount.to_string(),
                step.state.to_string(),
                step.date
                    .map(|d| d.format(DATE_FORMAT).to_string())
                    .unwrap_or_default(),
                step.payment_method
                    .map(|m| m.as_str().to_string())
                    .unwrap_or_default(),
                step.id.to_string(),
            ])?;
        }

        csv_writer.flush()?;
        Ok(())
    }

    /// One-line description of what is left to pay.
    pub fn summary(&self) -> String {
        format!(
            "Remaining: {}% ({})",
            self.ledger.remaining_percentage(),
            self.ledger.remaining_amount().visual()
        )
    }
}
