pub mod compute;
pub mod currencies;
pub mod report;
pub mod setup;
pub mod sync;
pub mod ui;

use crate::core::error::CoreError;
use chrono::NaiveDate;

/// Maximum report/sync window, matching the original two-year rule.
const MAX_RANGE_DAYS: i64 = 730;

pub(crate) fn validate_range(start: NaiveDate, end: NaiveDate) -> Result<(), CoreError> {
    if start > end {
        return Err(CoreError::Validation(format!(
            "start date {start} is after end date {end}"
        )));
    }
    if (end - start).num_days() > MAX_RANGE_DAYS {
        return Err(CoreError::Validation(
            "date range longer than two years".to_string(),
        ));
    }
    Ok(())
}
