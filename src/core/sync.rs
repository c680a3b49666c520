//! Rate synchronizer: turns raw fetched rows into stored records.
//!
//! Input rows come straight from the fetch collaborators and may repeat
//! natural keys across calls (overlapping date windows on re-runs). All
//! parsing happens before anything is written, and the write itself is a
//! single atomic batch, so a malformed row fails the whole call and the
//! same input applied twice converges to the same stored state.

use crate::core::error::CoreError;
use crate::core::fetch::{RawCurrency, RawRate};
use crate::core::model::{CurrencyReference, RateObservation, SCALE};
use crate::store::ReferenceStore;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::str::FromStr;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncReport {
    pub rates: usize,
    pub references: usize,
}

pub fn synchronize(
    store: &ReferenceStore,
    rate_rows: &[RawRate],
    reference_rows: &[RawCurrency],
) -> Result<SyncReport, CoreError> {
    let now = Utc::now();

    let rates = rate_rows
        .iter()
        .map(|row| parse_rate(row, now))
        .collect::<Result<Vec<_>, _>>()?;
    let references = reference_rows
        .iter()
        .map(|row| parse_reference(row, now))
        .collect::<Result<Vec<_>, _>>()?;

    store.upsert_snapshot(&rates, &references)?;
    debug!(
        rates = rates.len(),
        references = references.len(),
        "synchronized fetched tables"
    );

    Ok(SyncReport {
        rates: rates.len(),
        references: references.len(),
    })
}

fn parse_rate(row: &RawRate, now: DateTime<Utc>) -> Result<RateObservation, CoreError> {
    let currency = row.currency.trim();
    if currency.is_empty() {
        return Err(CoreError::Validation(format!(
            "rate row for {} has no currency code",
            row.date
        )));
    }

    Ok(RateObservation {
        date: row.date,
        currency: currency.to_string(),
        rate: parse_decimal("rate", &row.rate)?,
        change: parse_decimal("change", &row.change)?,
        currency_code: row.currency_code,
        uploaded_at: now,
    })
}

fn parse_reference(row: &RawCurrency, now: DateTime<Utc>) -> Result<CurrencyReference, CoreError> {
    let country = row.country.trim();
    let currency_code = row.currency_code.trim();
    if country.is_empty() {
        return Err(CoreError::Validation(
            "reference row has no country name".to_string(),
        ));
    }
    if currency_code.is_empty() {
        return Err(CoreError::Validation(format!(
            "reference row for {country} has no currency code"
        )));
    }

    // The source table leaves the numeric code blank for a few
    // territories; those are stored as 0.
    let number = row.currency_number.trim();
    let currency_number = if number.is_empty() {
        0
    } else {
        number.parse().map_err(|_| {
            CoreError::Validation(format!(
                "reference row for {country} has an unparsable numeric code '{number}'"
            ))
        })?
    };

    Ok(CurrencyReference {
        country: country.to_string(),
        currency_name: row.currency_name.trim().to_string(),
        currency_code: currency_code.to_string(),
        currency_number,
        uploaded_at: now,
    })
}

/// Parses a decimal column, accepting the comma separator the sources
/// use, and rounds to the stored scale (banker's rounding).
fn parse_decimal(column: &str, raw: &str) -> Result<Decimal, CoreError> {
    let normalized = raw.trim().replace(',', ".");
    Decimal::from_str(&normalized)
        .map(|value| value.round_dp(SCALE))
        .map_err(|_| CoreError::Validation(format!("unparsable {column} value '{raw}'")))
}
