//! Error taxonomy for the synchronization and computation pipeline.

use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    /// Caller-supplied input is invalid: malformed fetched row, bad date
    /// range or empty currency selection.
    #[error("invalid input: {0}")]
    Validation(String),

    /// An external data source could not be reached or parsed. The call
    /// that triggered the fetch fails as a whole; nothing is written.
    #[error("fetch failed: {0}")]
    Fetch(String),

    /// The base rate for a currency is zero, so relative change is
    /// undefined. Isolated to that currency's records.
    #[error("base rate for {currency} on {base_date} is zero")]
    ZeroBaseRate {
        currency: String,
        base_date: NaiveDate,
    },

    #[error("storage error: {0}")]
    Storage(#[from] fjall::Error),

    /// A stored record could not be encoded or decoded.
    #[error("codec error: {0}")]
    Codec(#[from] serde_json::Error),
}

impl CoreError {
    /// Wraps a provider failure, flattening the anyhow context chain.
    pub fn fetch(err: anyhow::Error) -> Self {
        CoreError::Fetch(format!("{err:#}"))
    }
}
