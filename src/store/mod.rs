//! Persistent reference store backed by a fjall keyspace.
//!
//! Four partitions hold the ingested and computed tables: `rates`,
//! `reference`, `params` and `changes`. Every write path goes through a
//! single [`fjall::Batch`], so one synchronization or computation call
//! either fully applies or fully fails.

use crate::core::error::CoreError;
use crate::core::model::{CurrencyReference, RateObservation, RelativeChange, observation_key};
use chrono::NaiveDate;
use fjall::{Keyspace, PartitionCreateOptions, PartitionHandle};
use std::collections::BTreeSet;
use std::path::Path;
use tracing::debug;

pub struct ReferenceStore {
    keyspace: Keyspace,
    rates: PartitionHandle,
    reference: PartitionHandle,
    params: PartitionHandle,
    changes: PartitionHandle,
}

impl ReferenceStore {
    pub fn open(path: &Path) -> Result<Self, CoreError> {
        let keyspace = fjall::Config::new(path).open()?;
        let rates = keyspace.open_partition("rates", PartitionCreateOptions::default())?;
        let reference = keyspace.open_partition("reference", PartitionCreateOptions::default())?;
        let params = keyspace.open_partition("params", PartitionCreateOptions::default())?;
        let changes = keyspace.open_partition("changes", PartitionCreateOptions::default())?;

        Ok(Self {
            keyspace,
            rates,
            reference,
            params,
            changes,
        })
    }

    /// Upserts a full synchronization snapshot (rate observations plus
    /// reference rows) in one atomic batch. Existing rows keep their
    /// original `uploaded_at`, so re-applying identical input leaves the
    /// store byte-identical.
    pub fn upsert_snapshot(
        &self,
        rates: &[RateObservation],
        references: &[CurrencyReference],
    ) -> Result<(), CoreError> {
        let mut batch = self.keyspace.batch();

        for row in rates {
            let key = row.key();
            let mut stored = row.clone();
            if let Some(existing) = self.rates.get(&key)? {
                stored.uploaded_at =
                    serde_json::from_slice::<RateObservation>(&existing)?.uploaded_at;
            }
            batch.insert(&self.rates, key.as_str(), serde_json::to_vec(&stored)?);
        }

        for row in references {
            let mut stored = row.clone();
            if let Some(existing) = self.reference.get(&row.country)? {
                stored.uploaded_at =
                    serde_json::from_slice::<CurrencyReference>(&existing)?.uploaded_at;
            }
            batch.insert(&self.reference, stored.country.as_str(), serde_json::to_vec(&stored)?);
        }

        batch.commit()?;
        debug!(
            rates = rates.len(),
            references = references.len(),
            "committed snapshot batch"
        );
        Ok(())
    }

    /// Upserts computed relative-change records in one atomic batch.
    pub fn upsert_changes(&self, records: &[RelativeChange]) -> Result<(), CoreError> {
        let mut batch = self.keyspace.batch();
        for record in records {
            let key = record.key();
            let mut stored = record.clone();
            if let Some(existing) = self.changes.get(&key)? {
                stored.uploaded_at =
                    serde_json::from_slice::<RelativeChange>(&existing)?.uploaded_at;
            }
            batch.insert(&self.changes, key.as_str(), serde_json::to_vec(&stored)?);
        }
        batch.commit()?;
        debug!(records = records.len(), "committed relative-change batch");
        Ok(())
    }

    /// Stores a named date parameter, overwriting any previous value.
    /// Uniqueness by name makes each parameter a singleton.
    pub fn set_parameter(&self, name: &str, value: NaiveDate) -> Result<(), CoreError> {
        self.params.insert(name, serde_json::to_vec(&value)?)?;
        Ok(())
    }

    pub fn parameter(&self, name: &str) -> Result<Option<NaiveDate>, CoreError> {
        match self.params.get(name)? {
            Some(raw) => Ok(Some(serde_json::from_slice(&raw)?)),
            None => Ok(None),
        }
    }

    /// All observations recorded for `date`, ordered by currency code.
    pub fn rates_on(&self, date: NaiveDate) -> Result<Vec<RateObservation>, CoreError> {
        let mut out = Vec::new();
        // Keys are currency-first, so a date lookup is a filtered scan.
        for entry in self.rates.iter() {
            let (_, value) = entry?;
            let row: RateObservation = serde_json::from_slice(&value)?;
            if row.date == date {
                out.push(row);
            }
        }
        Ok(out)
    }

    /// All observations for one currency, in date order.
    pub fn rates_for(&self, currency: &str) -> Result<Vec<RateObservation>, CoreError> {
        let mut out = Vec::new();
        for entry in self.rates.prefix(format!("{currency}/")) {
            let (_, value) = entry?;
            out.push(serde_json::from_slice(&value)?);
        }
        Ok(out)
    }

    /// Relative-change records for one currency with date in
    /// `[start, end]`, in date order. A reversed range yields nothing.
    pub fn changes_between(
        &self,
        currency: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<RelativeChange>, CoreError> {
        if start > end {
            return Ok(Vec::new());
        }
        let lo = observation_key(currency, start);
        let hi = observation_key(currency, end);
        let mut out = Vec::new();
        for entry in self.changes.range(lo..=hi) {
            let (_, value) = entry?;
            out.push(serde_json::from_slice(&value)?);
        }
        Ok(out)
    }

    /// Distinct currency codes with at least one stored observation.
    pub fn rate_currencies(&self) -> Result<BTreeSet<String>, CoreError> {
        let mut codes = BTreeSet::new();
        for entry in self.rates.iter() {
            let (key, _) = entry?;
            let key = std::str::from_utf8(&key)
                .map_err(|e| CoreError::Validation(format!("non-utf8 rate key: {e}")))?;
            if let Some((code, _)) = key.split_once('/') {
                codes.insert(code.to_string());
            }
        }
        Ok(codes)
    }

    pub fn references(&self) -> Result<Vec<CurrencyReference>, CoreError> {
        let mut out = Vec::new();
        for entry in self.reference.iter() {
            let (_, value) = entry?;
            out.push(serde_json::from_slice(&value)?);
        }
        Ok(out)
    }

    pub fn rate_count(&self) -> Result<usize, CoreError> {
        Self::count(&self.rates)
    }

    pub fn reference_count(&self) -> Result<usize, CoreError> {
        Self::count(&self.reference)
    }

    pub fn change_count(&self) -> Result<usize, CoreError> {
        Self::count(&self.changes)
    }

    fn count(partition: &PartitionHandle) -> Result<usize, CoreError> {
        let mut n = 0;
        for entry in partition.iter() {
            entry?;
            n += 1;
        }
        Ok(n)
    }
}
