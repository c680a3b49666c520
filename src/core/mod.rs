//! Core data model and pipeline operations

pub mod config;
pub mod engine;
pub mod error;
pub mod fetch;
pub mod log;
pub mod model;
pub mod query;
pub mod sync;

// Re-export main types for cleaner imports
pub use engine::{ComputeOutcome, compute_relative_changes};
pub use error::CoreError;
pub use fetch::{RateFetcher, RawCurrency, RawRate, ReferenceFetcher};
pub use model::{BASE_DATE_PARAM, CurrencyReference, RateObservation, RelativeChange};
pub use query::{CurrencyChoice, SeriesPoint, available_currencies, relative_change_series};
pub use sync::{SyncReport, synchronize};
