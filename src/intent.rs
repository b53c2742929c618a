//! Intent models for CSV parsing and internal representation.

use crate::decimal::Percent;
use crate::step::PaymentMethod;
use chrono::NaiveDate;
use serde::Deserialize;
use std::str::FromStr;

/// Date format accepted in intent scripts.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Raw intent record as read from CSV.
///
/// Columns not used by an action may be left empty.
#[derive(Debug, Deserialize)]
pub struct IntentRecord {
    /// Intent type: pay, create
    pub action: String,

    /// Zero-based step index (pay)
    pub index: Option<String>,

    /// New step title (create)
    pub title: Option<String>,

    /// Confirmed percentage (pay)
    pub percentage: Option<String>,

    /// Payment date, `YYYY-MM-DD` (pay)
    pub date: Option<String>,

    /// Payment method wire name (pay)
    pub method: Option<String>,
}

impl IntentRecord {
    /// Parses the raw CSV record into a typed intent.
    ///
    /// Returns `None` if the record is invalid (unknown action, missing field,
    /// unknown payment method, etc.).
    pub fn parse(&self) -> Option<Intent> {
        let action = self.action.trim().to_lowercase();

        match action.as_str() {
            "pay" => Some(Intent::Pay {
                index: field(&self.index)?.parse().ok()?,
                percentage: Percent::from_str(field(&self.percentage)?).ok()?,
                date: NaiveDate::parse_from_str(field(&self.date)?, DATE_FORMAT).ok()?,
                method: PaymentMethod::from_str(field(&self.method)?).ok()?,
            }),
            "create" => Some(Intent::Create {
                title: field(&self.title)?.to_string(),
            }),
            _ => None,
        }
    }
}

/// Trimmed, non-empty column value.
fn field(value: &Option<String>) -> Option<&str> {
    let trimmed = value.as_deref()?.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

/// A parsed user intent ready to be applied to the ledger.
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    /// Settle the step at `index`.
    Pay {
        index: usize,
        percentage: Percent,
        date: NaiveDate,
        method: PaymentMethod,
    },

    /// Add a named step, splitting the first pending one.
    Create { title: String },
}
