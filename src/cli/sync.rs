use super::ui;
use crate::core::config::{AppConfig, DEFAULT_RATES_URL, DEFAULT_REFERENCE_URL};
use crate::core::error::CoreError;
use crate::core::fetch::{RateFetcher, ReferenceFetcher};
use crate::core::model::BASE_DATE_PARAM;
use crate::core::{compute_relative_changes, synchronize};
use crate::next_available_trading_date;
use crate::providers::cbr::CbrRatesProvider;
use crate::providers::iso4217::Iso4217Provider;
use crate::store::ReferenceStore;
use anyhow::Result;
use chrono::NaiveDate;
use tracing::info;

/// Fetches both source tables for the window, synchronizes them into the
/// store, records `start` as the base date and recomputes relative
/// changes against it (after the January-gap fallback).
pub async fn run(
    config: &AppConfig,
    store: &ReferenceStore,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<()> {
    super::validate_range(start, end)?;

    let rates_url = config
        .providers
        .rates
        .as_ref()
        .map_or(DEFAULT_RATES_URL, |c| &c.base_url);
    let reference_url = config
        .providers
        .reference
        .as_ref()
        .map_or(DEFAULT_REFERENCE_URL, |c| &c.base_url);
    let rate_fetcher = CbrRatesProvider::new(rates_url);
    let reference_fetcher = Iso4217Provider::new(reference_url);

    let spinner = ui::new_spinner("Fetching rate and reference tables...");
    let (rate_rows, reference_rows) = futures::future::join(
        rate_fetcher.fetch_rates(start, end),
        reference_fetcher.fetch_reference_data(),
    )
    .await;
    spinner.finish_and_clear();

    let rate_rows = rate_rows.map_err(CoreError::fetch)?;
    let reference_rows = reference_rows.map_err(CoreError::fetch)?;

    let report = synchronize(store, &rate_rows, &reference_rows)?;
    store.set_parameter(BASE_DATE_PARAM, start)?;

    let base_date = next_available_trading_date(start);
    if base_date != start {
        info!(%start, %base_date, "base date falls in the January data gap; using the next trading date");
    }
    let outcome = compute_relative_changes(store, base_date)?;
    info!(
        rates = report.rates,
        references = report.references,
        changes = outcome.records,
        "synchronization finished"
    );

    println!(
        "Synchronized {} rate rows and {} reference rows for {start}..{end}.",
        report.rates, report.references
    );
    println!(
        "Computed {} relative change records against {base_date}.",
        outcome.records
    );
    for currency in &outcome.skipped {
        println!(
            "{}",
            ui::style_text(
                &format!("Skipped {currency}: base rate on {base_date} is zero"),
                ui::StyleType::Error
            )
        );
    }

    Ok(())
}
