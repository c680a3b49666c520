pub mod cli;
pub mod core;
pub mod providers;
pub mod store;

use crate::core::config::AppConfig;
use crate::store::ReferenceStore;
use anyhow::Result;
use chrono::{Datelike, NaiveDate};
use tracing::debug;

#[derive(Debug, Clone)]
pub enum AppCommand {
    Sync { start: NaiveDate, end: NaiveDate },
    Compute { base_date: Option<NaiveDate> },
    Report {
        start: NaiveDate,
        end: NaiveDate,
        currencies: Vec<String>,
    },
    Currencies,
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let store = ReferenceStore::open(&config.default_data_path()?.join("store"))?;

    match command {
        AppCommand::Sync { start, end } => cli::sync::run(&config, &store, start, end).await,
        AppCommand::Compute { base_date } => cli::compute::run(&store, base_date),
        AppCommand::Report {
            start,
            end,
            currencies,
        } => cli::report::run(&store, start, end, &currencies),
        AppCommand::Currencies => cli::currencies::run(&store),
    }
}

/// Next-available-trading-date fallback: the rate sources publish no
/// quotes for the first ten days of January, so a base date in that gap
/// is moved to January 11 of the same year. Applied at the command
/// boundary only; the computation engine never adjusts dates.
pub fn next_available_trading_date(date: NaiveDate) -> NaiveDate {
    if date.month() == 1 && date.day() <= 10 {
        date.with_day(11).unwrap_or(date)
    } else {
        date
    }
}
