//! Error types for the ledger and the intent processor.

use crate::decimal::{Money, Percent};
use chrono::NaiveDate;
use thiserror::Error;

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;

/// Reasons a ledger transition is refused.
///
/// A refused transition never touches the snapshot it was applied to, so the
/// caller keeps publishing the previous one.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// Payment attempted while the preceding step is still pending
    #[error("step {index} cannot be paid while the previous step is pending")]
    OutOfOrderPayment { index: usize },

    /// Percentage is not positive or exceeds the remaining budget
    #[error("percentage {percentage}% must be greater than 0 and at most {remaining}%")]
    InvalidPercentage {
        percentage: Percent,
        remaining: Percent,
    },

    #[error("step {index} is already paid")]
    AlreadyPaid { index: usize },

    /// Nothing left to distribute
    #[error("the full total has already been paid")]
    BudgetExhausted,

    /// Splitting would produce steps of at most 1%
    #[error("step {index} holds {base}%, too small to split")]
    DegenerateSplit { index: usize, base: Percent },

    #[error("no step at index {index} (ledger has {len} steps)")]
    StepNotFound { index: usize, len: usize },

    #[error("step title must not be empty")]
    EmptyTitle,

    #[error("payment date {date} is before {today}")]
    PastDate { date: NaiveDate, today: NaiveDate },

    #[error("ledger total must be positive and at most 1% of the decimal range (got {0})")]
    InvalidTotal(Money),
}

/// Errors that can occur while running the intent processor.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Failed to open or read the input file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing or writing error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    /// Command-line argument or environment value that could not be parsed
    #[error("Invalid {name}: '{value}'")]
    InvalidArgument { name: &'static str, value: String },

    /// Missing positional arguments
    #[error("Missing arguments. Usage: installment-ledger <total> <intents.csv>")]
    MissingArgument,
}
