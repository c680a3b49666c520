use super::ui;
use crate::core::compute_relative_changes;
use crate::core::model::BASE_DATE_PARAM;
use crate::next_available_trading_date;
use crate::store::ReferenceStore;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use tracing::info;

/// Recomputes relative changes against `base_date`, or against the
/// stored parameter when no date is given. An explicit date also becomes
/// the new stored parameter.
pub fn run(store: &ReferenceStore, base_date: Option<NaiveDate>) -> Result<()> {
    let configured = match base_date {
        Some(date) => {
            store.set_parameter(BASE_DATE_PARAM, date)?;
            date
        }
        None => store
            .parameter(BASE_DATE_PARAM)?
            .context("No base date configured; run `fxtrend sync` or pass --base-date")?,
    };

    let effective = next_available_trading_date(configured);
    if effective != configured {
        info!(%configured, %effective, "base date falls in the January data gap; using the next trading date");
    }

    let outcome = compute_relative_changes(store, effective)?;
    if outcome.records == 0 {
        println!(
            "{}",
            ui::style_text(
                &format!("No rate observations stored for {effective}."),
                ui::StyleType::Subtle
            )
        );
    } else {
        println!(
            "Computed {} relative change records against {effective}.",
            outcome.records
        );
    }
    for currency in &outcome.skipped {
        println!(
            "{}",
            ui::style_text(
                &format!("Skipped {currency}: base rate on {effective} is zero"),
                ui::StyleType::Error
            )
        );
    }

    Ok(())
}
