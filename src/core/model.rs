//! Persisted entities of the reference store.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Fractional digits kept for every stored decimal value.
pub const SCALE: u32 = 4;

/// Name of the stored parameter holding the configured base date.
pub const BASE_DATE_PARAM: &str = "base_date";

/// One exchange rate quote for a currency on a date, as ingested from the
/// rates source. Natural key: (currency, date).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateObservation {
    pub date: NaiveDate,
    /// Alphabetic currency code, e.g. "USD".
    pub currency: String,
    pub rate: Decimal,
    /// Day-over-day change of the rate.
    pub change: Decimal,
    /// Numeric currency code from the source.
    pub currency_code: i64,
    pub uploaded_at: DateTime<Utc>,
}

impl RateObservation {
    pub fn key(&self) -> String {
        observation_key(&self.currency, self.date)
    }
}

/// A country and the currency it uses, as ingested from the reference
/// source. Natural key: country.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyReference {
    pub country: String,
    pub currency_name: String,
    pub currency_code: String,
    pub currency_number: i64,
    pub uploaded_at: DateTime<Utc>,
}

/// Percentage deviation of a currency's rate on `date` from its rate on
/// `base_date`. Natural key: (currency, date).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelativeChange {
    pub date: NaiveDate,
    pub currency: String,
    /// Signed percentage, 4 fractional digits.
    pub relative_change: Decimal,
    /// The base date this value was computed against.
    pub base_date: NaiveDate,
    pub uploaded_at: DateTime<Utc>,
}

impl RelativeChange {
    pub fn key(&self) -> String {
        observation_key(&self.currency, self.date)
    }
}

/// Partition key for per-currency, per-date records. `NaiveDate` displays
/// as `YYYY-MM-DD`, so lexicographic key order is chronological within a
/// currency prefix.
pub fn observation_key(currency: &str, date: NaiveDate) -> String {
    format!("{currency}/{date}")
}
