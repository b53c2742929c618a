//! Command-line configuration.
//!
//! Positional arguments: `<total> <intents.csv>`. The date floor for payments
//! defaults to the local current date and can be pinned with `LEDGER_TODAY`.

use crate::decimal::Money;
use crate::error::{EngineError, Result};
use crate::intent::DATE_FORMAT;
use chrono::{Local, NaiveDate};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

/// Environment variable overriding the payment date floor (`YYYY-MM-DD`).
pub const TODAY_ENV: &str = "LEDGER_TODAY";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Ledger total.
    pub total: Money,

    /// Intent script to replay.
    pub input: PathBuf,

    /// Earliest accepted payment date.
    pub today: NaiveDate,
}

impl Config {
    /// Loads configuration from the process arguments and environment.
    pub fn from_env() -> Result<Self> {
        let args: Vec<String> = env::args().skip(1).collect();
        Self::from_parts(&args, env::var(TODAY_ENV).ok().as_deref())
    }

    /// Builds a configuration from positional arguments (program name
    /// excluded) and an optional date-floor override.
    pub fn from_parts(args: &[String], today: Option<&str>) -> Result<Self> {
        let (total, input) = match args {
            [total, input, ..] => (total, input),
            _ => return Err(EngineError::MissingArgument),
        };

        let total = Money::from_str(total).map_err(|_| EngineError::InvalidArgument {
            name: "total",
            value: total.clone(),
        })?;

        let today = match today {
            Some(value) => NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|_| {
                EngineError::InvalidArgument {
                    name: TODAY_ENV,
                    value: value.to_string(),
                }
            })?,
            None => Local::now().date_naive(),
        };

        Ok(Config {
            total,
            input: PathBuf::from(input),
            today,
        })
    }
}
