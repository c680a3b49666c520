//! Relative change engine.
//!
//! Given a base date, every currency quoted on that date gets one
//! relative-change record per observation of that currency, measuring the
//! percentage deviation from the base-date rate. The engine is a pure
//! function of the base date and the store contents; it never adjusts the
//! date it is given.

use crate::core::error::CoreError;
use crate::core::model::{RelativeChange, SCALE};
use crate::store::ReferenceStore;
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use tracing::{debug, warn};

/// Result of one computation run. `skipped` lists currencies whose base
/// rate was zero; their records are left untouched while every other
/// currency is still processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComputeOutcome {
    pub records: usize,
    pub skipped: Vec<String>,
}

pub fn compute_relative_changes(
    store: &ReferenceStore,
    base_date: NaiveDate,
) -> Result<ComputeOutcome, CoreError> {
    let base_rates = store.rates_on(base_date)?;
    if base_rates.is_empty() {
        // A base date without observations is a valid empty outcome.
        debug!(%base_date, "no observations for base date");
        return Ok(ComputeOutcome {
            records: 0,
            skipped: Vec::new(),
        });
    }

    let now = Utc::now();
    let mut records = Vec::new();
    let mut skipped = Vec::new();

    for base in &base_rates {
        if base.rate.is_zero() {
            let err = CoreError::ZeroBaseRate {
                currency: base.currency.clone(),
                base_date,
            };
            warn!(%err, "skipping currency");
            skipped.push(base.currency.clone());
            continue;
        }

        for observed in store.rates_for(&base.currency)? {
            let relative_change = ((observed.rate - base.rate) / base.rate
                * Decimal::ONE_HUNDRED)
                .round_dp(SCALE);
            records.push(RelativeChange {
                date: observed.date,
                currency: observed.currency,
                relative_change,
                base_date,
                uploaded_at: now,
            });
        }
    }

    store.upsert_changes(&records)?;
    debug!(
        %base_date,
        records = records.len(),
        skipped = skipped.len(),
        "computed relative changes"
    );

    Ok(ComputeOutcome {
        records: records.len(),
        skipped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::RateObservation;
    use rust_decimal_macros::dec;
    use tempfile::TempDir;

    fn open_store() -> (TempDir, ReferenceStore) {
        let dir = TempDir::new().unwrap();
        let store = ReferenceStore::open(dir.path()).unwrap();
        (dir, store)
    }

    fn seed(store: &ReferenceStore, rows: &[(&str, &str, Decimal)]) {
        let observations: Vec<RateObservation> = rows
            .iter()
            .map(|(currency, date, rate)| RateObservation {
                date: date.parse().unwrap(),
                currency: currency.to_string(),
                rate: *rate,
                change: dec!(0),
                currency_code: 0,
                uploaded_at: Utc::now(),
            })
            .collect();
        store.upsert_snapshot(&observations, &[]).unwrap();
    }

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn base_date_record_is_always_zero() {
        let (_dir, store) = open_store();
        seed(
            &store,
            &[
                ("USD", "2023-01-01", dec!(75.0000)),
                ("EUR", "2023-01-01", dec!(81.3000)),
                ("USD", "2023-02-01", dec!(80.0000)),
            ],
        );

        compute_relative_changes(&store, date("2023-01-01")).unwrap();

        for code in ["USD", "EUR"] {
            let base_record = store
                .changes_between(code, date("2023-01-01"), date("2023-01-01"))
                .unwrap();
            assert_eq!(base_record[0].relative_change, dec!(0.0000));
            assert_eq!(base_record[0].base_date, date("2023-01-01"));
        }
    }

    #[test]
    fn computes_percentage_against_base_rate() {
        let (_dir, store) = open_store();
        seed(
            &store,
            &[
                ("USD", "2023-01-01", dec!(75.0000)),
                ("USD", "2023-02-01", dec!(80.0000)),
            ],
        );

        let outcome = compute_relative_changes(&store, date("2023-01-01")).unwrap();
        assert_eq!(outcome.records, 2);
        assert!(outcome.skipped.is_empty());

        let feb = store
            .changes_between("USD", date("2023-02-01"), date("2023-02-01"))
            .unwrap();
        // (80 - 75) / 75 * 100, banker's-rounded to 4 digits.
        assert_eq!(feb[0].relative_change, dec!(6.6667));
    }

    #[test]
    fn earlier_dates_get_negative_changes() {
        let (_dir, store) = open_store();
        seed(
            &store,
            &[
                ("USD", "2023-01-01", dec!(60.0000)),
                ("USD", "2023-02-01", dec!(80.0000)),
            ],
        );

        compute_relative_changes(&store, date("2023-02-01")).unwrap();

        let jan = store
            .changes_between("USD", date("2023-01-01"), date("2023-01-01"))
            .unwrap();
        assert_eq!(jan[0].relative_change, dec!(-25.0000));
    }

    #[test]
    fn zero_base_rate_is_isolated_to_that_currency() {
        let (_dir, store) = open_store();
        seed(
            &store,
            &[
                ("XAU", "2023-01-01", dec!(0.0000)),
                ("XAU", "2023-02-01", dec!(5.0000)),
                ("USD", "2023-01-01", dec!(75.0000)),
                ("USD", "2023-02-01", dec!(80.0000)),
            ],
        );

        let outcome = compute_relative_changes(&store, date("2023-01-01")).unwrap();

        assert_eq!(outcome.skipped, vec!["XAU".to_string()]);
        assert_eq!(outcome.records, 2);
        assert!(
            store
                .changes_between("XAU", date("2023-01-01"), date("2023-12-31"))
                .unwrap()
                .is_empty()
        );
        assert_eq!(
            store
                .changes_between("USD", date("2023-01-01"), date("2023-12-31"))
                .unwrap()
                .len(),
            2
        );
    }

    #[test]
    fn base_date_without_observations_yields_empty_outcome() {
        let (_dir, store) = open_store();
        seed(&store, &[("USD", "2023-01-01", dec!(75.0000))]);

        let outcome = compute_relative_changes(&store, date("2024-06-01")).unwrap();

        assert_eq!(outcome.records, 0);
        assert!(outcome.skipped.is_empty());
        assert_eq!(store.change_count().unwrap(), 0);
    }

    #[test]
    fn recomputing_against_a_new_base_overwrites_records() {
        let (_dir, store) = open_store();
        seed(
            &store,
            &[
                ("USD", "2023-01-01", dec!(50.0000)),
                ("USD", "2023-02-01", dec!(75.0000)),
            ],
        );

        compute_relative_changes(&store, date("2023-01-01")).unwrap();
        compute_relative_changes(&store, date("2023-02-01")).unwrap();

        let jan = store
            .changes_between("USD", date("2023-01-01"), date("2023-01-01"))
            .unwrap();
        assert_eq!(jan[0].base_date, date("2023-02-01"));
        assert_eq!(jan[0].relative_change, dec!(-33.3333));
        assert_eq!(store.change_count().unwrap(), 2);
    }
}
