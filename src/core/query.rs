//! Read-side facade over the reference store, consumed by the
//! presentation layer.

use crate::core::error::CoreError;
use crate::store::ReferenceStore;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub relative_change: Decimal,
}

/// Per-currency, date-ordered relative-change series.
pub type ChangeSeries = BTreeMap<String, Vec<SeriesPoint>>;

/// Returns the relative-change series for each requested currency,
/// restricted to dates in `[start, end]`. Currencies without matching
/// records map to an empty series; a reversed range yields empty series
/// for every code rather than an error.
pub fn relative_change_series(
    store: &ReferenceStore,
    start: NaiveDate,
    end: NaiveDate,
    currencies: &BTreeSet<String>,
) -> Result<ChangeSeries, CoreError> {
    let mut series = ChangeSeries::new();
    for code in currencies {
        let points = store
            .changes_between(code, start, end)?
            .into_iter()
            .map(|record| SeriesPoint {
                date: record.date,
                relative_change: record.relative_change,
            })
            .collect();
        series.insert(code.clone(), points);
    }
    Ok(series)
}

/// A currency the presentation layer can offer for selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrencyChoice {
    pub code: String,
    pub label: String,
}

/// Currencies that have both reference data and at least one rate
/// observation: the intersection of the two tables' currency-code sets,
/// one entry per country, ordered by currency name.
pub fn available_currencies(store: &ReferenceStore) -> Result<Vec<CurrencyChoice>, CoreError> {
    let observed = store.rate_currencies()?;

    let mut references: Vec<_> = store
        .references()?
        .into_iter()
        .filter(|entry| observed.contains(&entry.currency_code))
        .collect();
    references.sort_by(|a, b| {
        a.currency_name
            .cmp(&b.currency_name)
            .then_with(|| a.country.cmp(&b.country))
    });

    Ok(references
        .into_iter()
        .map(|entry| CurrencyChoice {
            label: format!(
                "{} ({} | {})",
                entry.country, entry.currency_name, entry.currency_code
            ),
            code: entry.currency_code,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::{CurrencyReference, RateObservation, RelativeChange};
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use tempfile::TempDir;

    fn open_store() -> (TempDir, ReferenceStore) {
        let dir = TempDir::new().unwrap();
        let store = ReferenceStore::open(dir.path()).unwrap();
        (dir, store)
    }

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn seed_changes(store: &ReferenceStore, rows: &[(&str, &str, Decimal)]) {
        let records: Vec<RelativeChange> = rows
            .iter()
            .map(|(currency, day, value)| RelativeChange {
                date: day.parse().unwrap(),
                currency: currency.to_string(),
                relative_change: *value,
                base_date: date("2023-01-11"),
                uploaded_at: Utc::now(),
            })
            .collect();
        store.upsert_changes(&records).unwrap();
    }

    fn codes(list: &[&str]) -> BTreeSet<String> {
        list.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn series_respects_range_and_currency_filters() {
        let (_dir, store) = open_store();
        seed_changes(
            &store,
            &[
                ("USD", "2023-01-11", dec!(0.0000)),
                ("USD", "2023-02-01", dec!(6.6667)),
                ("USD", "2023-06-01", dec!(9.1000)),
                ("EUR", "2023-02-01", dec!(-1.2000)),
                ("JPY", "2023-02-01", dec!(2.0000)),
            ],
        );

        let series = relative_change_series(
            &store,
            date("2023-01-01"),
            date("2023-03-01"),
            &codes(&["USD", "EUR"]),
        )
        .unwrap();

        assert_eq!(series.len(), 2);
        assert!(!series.contains_key("JPY"));
        let usd = &series["USD"];
        assert_eq!(usd.len(), 2);
        assert!(usd.iter().all(|p| p.date <= date("2023-03-01")));
        assert_eq!(usd[1].relative_change, dec!(6.6667));
        assert_eq!(series["EUR"].len(), 1);
    }

    #[test]
    fn unmatched_currency_yields_an_empty_series() {
        let (_dir, store) = open_store();
        seed_changes(&store, &[("USD", "2023-02-01", dec!(1.0000))]);

        let series = relative_change_series(
            &store,
            date("2023-01-01"),
            date("2023-03-01"),
            &codes(&["GBP"]),
        )
        .unwrap();

        assert_eq!(series["GBP"], Vec::new());
    }

    #[test]
    fn reversed_range_yields_empty_series_for_every_code() {
        let (_dir, store) = open_store();
        seed_changes(&store, &[("USD", "2023-02-01", dec!(1.0000))]);

        let series = relative_change_series(
            &store,
            date("2023-03-01"),
            date("2023-01-01"),
            &codes(&["USD"]),
        )
        .unwrap();

        assert!(series["USD"].is_empty());
    }

    #[test]
    fn available_currencies_is_the_intersection_ordered_by_name() {
        let (_dir, store) = open_store();

        let reference = |country: &str, name: &str, code: &str| CurrencyReference {
            country: country.to_string(),
            currency_name: name.to_string(),
            currency_code: code.to_string(),
            currency_number: 0,
            uploaded_at: Utc::now(),
        };
        let observation = |currency: &str| RateObservation {
            date: date("2023-02-01"),
            currency: currency.to_string(),
            rate: dec!(10),
            change: dec!(0),
            currency_code: 0,
            uploaded_at: Utc::now(),
        };

        store
            .upsert_snapshot(
                &[observation("USD"), observation("EUR")],
                &[
                    reference("UNITED STATES OF AMERICA", "US Dollar", "USD"),
                    reference("GERMANY", "Euro", "EUR"),
                    reference("AUSTRIA", "Euro", "EUR"),
                    // No observations stored for GBP.
                    reference("UNITED KINGDOM", "Pound Sterling", "GBP"),
                ],
            )
            .unwrap();

        let choices = available_currencies(&store).unwrap();
        let labels: Vec<&str> = choices.iter().map(|c| c.label.as_str()).collect();

        assert_eq!(
            labels,
            [
                "AUSTRIA (Euro | EUR)",
                "GERMANY (Euro | EUR)",
                "UNITED STATES OF AMERICA (US Dollar | USD)",
            ]
        );
        assert_eq!(choices[2].code, "USD");
    }
}
