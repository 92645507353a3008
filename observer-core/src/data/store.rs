//! Table store traits and the in-memory store.
//!
//! Stores are keyed by row `id`. Writes only ever insert: a row whose id is
//! already present is left untouched, so re-running a stage is idempotent.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Mutex;

use chrono::NaiveDate;

use super::provider::DataError;
use crate::domain::{Row, Table};

/// Read side of a table store.
pub trait HistoricalStore: Send + Sync {
    /// Rows of `ticker` with `date >= since` (all rows when `since` is `None`), ascending by date.
    fn query<R: Row>(&self, ticker: &str, since: Option<NaiveDate>) -> Result<Vec<R>, DataError>;

    /// Distinct tickers present in `R`'s table, sorted.
    fn tickers<R: Row>(&self) -> Result<Vec<String>, DataError>;

    /// Most recent date stored for `ticker`.
    fn latest_date<R: Row>(&self, ticker: &str) -> Result<Option<NaiveDate>, DataError> {
        Ok(self.query::<R>(ticker, None)?.last().map(Row::date))
    }
}

/// Write side of a table store.
pub trait PersistenceSink: Send + Sync {
    /// Insert rows whose id is absent; returns how many were inserted.
    fn upsert<R: Row>(&self, rows: &[R]) -> Result<usize, DataError>;
}

/// Rows kept as JSON values, one id-keyed map per table.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<HashMap<Table, BTreeMap<String, serde_json::Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows in a table.
    pub fn len(&self, table: Table) -> usize {
        self.tables
            .lock()
            .map(|t| t.get(&table).map_or(0, BTreeMap::len))
            .unwrap_or(0)
    }

    fn all<R: Row>(&self) -> Result<Vec<R>, DataError> {
        let tables = self
            .tables
            .lock()
            .map_err(|_| DataError::Store("memory store lock poisoned".into()))?;
        let Some(rows) = tables.get(&R::TABLE) else {
            return Ok(Vec::new());
        };
        rows.values()
            .map(|v| serde_json::from_value(v.clone()).map_err(DataError::from))
            .collect()
    }
}

impl HistoricalStore for MemoryStore {
    fn query<R: Row>(&self, ticker: &str, since: Option<NaiveDate>) -> Result<Vec<R>, DataError> {
        let mut rows: Vec<R> = self
            .all::<R>()?
            .into_iter()
            .filter(|r| r.ticker() == ticker && since.map_or(true, |s| r.date() >= s))
            .collect();
        rows.sort_by_key(Row::date);
        Ok(rows)
    }

    fn tickers<R: Row>(&self) -> Result<Vec<String>, DataError> {
        let set: BTreeSet<String> = self
            .all::<R>()?
            .iter()
            .map(|r| r.ticker().to_string())
            .collect();
        Ok(set.into_iter().collect())
    }
}

impl PersistenceSink for MemoryStore {
    fn upsert<R: Row>(&self, rows: &[R]) -> Result<usize, DataError> {
        let mut tables = self
            .tables
            .lock()
            .map_err(|_| DataError::Store("memory store lock poisoned".into()))?;
        let table = tables.entry(R::TABLE).or_default();
        let mut inserted = 0;
        for row in rows {
            if table.contains_key(row.id()) {
                continue;
            }
            table.insert(row.id().to_string(), serde_json::to_value(row)?);
            inserted += 1;
        }
        Ok(inserted)
    }
}
