//! Installment Ledger CLI
//!
//! Replays a CSV script of payment intents against a new ledger and outputs
//! the resulting payment steps.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- 182 intents.csv > steps.csv
//! ```
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Set to `debug`, `info` or `warn` to control logging verbosity
//! - `LEDGER_TODAY`: Earliest accepted payment date (`YYYY-MM-DD`), defaults to today

use installment_ledger::{Config, LedgerEngine, Result};
use log::info;
use std::fs::File;
use std::io::{self, BufReader};
use std::process;

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let config = Config::from_env()?;

    let file = File::open(&config.input)?;
    let reader = BufReader::new(file);

    let mut engine = LedgerEngine::new(config.total, config.today)?;
    engine.process_csv(reader)?;

    for event in engine.drain_events() {
        // TODO: post to the loans backend once its endpoint exists
        info!("Pending persistence: {:?}", event);
    }
    info!("{}", engine.summary());

    let stdout = io::stdout();
    let handle = stdout.lock();
    engine.write_output(handle)?;

    Ok(())
}
