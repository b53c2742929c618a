//! # Installment Ledger
//!
//! Tracks ordered partial payments against a fixed loan total. A ledger holds
//! a sequence of payment steps; steps are settled strictly in order, and a new
//! named step is introduced by splitting the first pending one in half.
//!
//! ## Design Principles
//!
//! - **Snapshots**: every transition returns a new `Ledger`; a rejected one
//!   returns a `LedgerError` and the previous snapshot stays current
//! - **Fixed-point arithmetic**: percentages and amounts use `rust_decimal`
//! - **Strict invariants**: paid percentages never exceed 100, paid steps
//!   never change again
//! - **Injected ids**: step and ledger ids come from an `IdGenerator`
//!
//! ## Example
//!
//! ```
//! use installment_ledger::{Ledger, Money, PaymentMethod, Percent, SequentialIds};
//! use chrono::NaiveDate;
//! use std::str::FromStr;
//!
//! let mut ids = SequentialIds::new();
//! let ledger = Ledger::new(Money::from_str("182").unwrap(), &mut ids).unwrap();
//!
//! let date = NaiveDate::from_ymd_opt(2026, 10, 17).unwrap();
//! let ledger = ledger
//!     .register_payment(0, Percent::from_str("40").unwrap(), date, PaymentMethod::Cash)
//!     .unwrap();
//! let ledger = ledger.create_step("Segunda cuota", &mut ids).unwrap();
//!
//! assert_eq!(ledger.steps()[1].amount.to_string(), "109.2000");
//! ```

pub mod config;
pub mod decimal;
pub mod engine;
pub mod error;
pub mod events;
pub mod ids;
pub mod intent;
pub mod ledger;
pub mod shared;
pub mod step;

pub use config::Config;
pub use decimal::{Money, Percent};
pub use engine::LedgerEngine;
pub use error::{EngineError, LedgerError, Result};
pub use events::LedgerEvent;
pub use ids::{IdGenerator, RandomIds, SequentialIds};
pub use intent::{Intent, IntentRecord};
pub use ledger::Ledger;
pub use shared::SharedLedger;
pub use step::{PaymentMethod, Step, StepState};
