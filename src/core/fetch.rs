//! Abstractions over the external rate and reference data sources.

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;

/// One scraped rate row. Decimal columns stay as source text (the sources
/// quote a comma as the decimal separator); parsing happens during
/// synchronization so that a single malformed row rejects the whole batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRate {
    pub date: NaiveDate,
    pub currency: String,
    pub rate: String,
    pub change: String,
    pub currency_code: i64,
}

/// One scraped country/currency reference row. The numeric code column is
/// blank for some territories, so it stays as text here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCurrency {
    pub country: String,
    pub currency_name: String,
    pub currency_code: String,
    pub currency_number: String,
}

#[async_trait]
pub trait RateFetcher: Send + Sync {
    /// Fetches rate rows for every date in `[start, end]`, both inclusive.
    async fn fetch_rates(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<RawRate>>;
}

#[async_trait]
pub trait ReferenceFetcher: Send + Sync {
    async fn fetch_reference_data(&self) -> Result<Vec<RawCurrency>>;
}
