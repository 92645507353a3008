//! CSV-file table store.
//!
//! One CSV file per table under the store directory, named after the
//! configured table name. Writes rewrite the whole file atomically: write a
//! `.tmp` sibling, then rename it into place.

use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::NaiveDate;
use observer_core::data::{DataError, HistoricalStore, PersistenceSink};
use observer_core::domain::{Row, Table};
use observer_core::table::sort_rows;

use crate::config::TableNames;

pub struct CsvStore {
    dir: PathBuf,
    names: TableNames,
    write_lock: Mutex<()>,
}

impl CsvStore {
    /// Open a store rooted at `dir`, creating it if needed.
    pub fn open(dir: &Path, names: TableNames) -> Result<Self, DataError> {
        fs::create_dir_all(dir)
            .map_err(|e| DataError::Store(format!("failed to create {}: {e}", dir.display())))?;
        Ok(Self {
            dir: dir.to_path_buf(),
            names,
            write_lock: Mutex::new(()),
        })
    }

    pub fn table_path(&self, table: Table) -> PathBuf {
        self.dir.join(format!("{}.csv", self.names.name(table)))
    }

    /// Every row of `R`'s table, in file order.
    pub fn read_all<R: Row>(&self) -> Result<Vec<R>, DataError> {
        let path = self.table_path(R::TABLE);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let mut reader = csv::Reader::from_path(&path).map_err(|e| store_error(&path, e))?;
        reader
            .deserialize()
            .map(|row| row.map_err(|e| store_error(&path, e)))
            .collect()
    }

    fn write_all<R: Row>(&self, rows: &[R]) -> Result<(), DataError> {
        let path = self.table_path(R::TABLE);
        let tmp_path = path.with_extension("csv.tmp");

        let mut writer = csv::Writer::from_path(&tmp_path).map_err(|e| store_error(&tmp_path, e))?;
        for row in rows {
            writer.serialize(row).map_err(|e| store_error(&tmp_path, e))?;
        }
        writer
            .flush()
            .map_err(|e| DataError::Store(format!("failed to flush {}: {e}", tmp_path.display())))?;
        drop(writer);

        fs::rename(&tmp_path, &path).map_err(|e| {
            let _ = fs::remove_file(&tmp_path);
            DataError::Store(format!("atomic rename failed for {}: {e}", path.display()))
        })
    }
}

fn store_error(path: &Path, e: csv::Error) -> DataError {
    DataError::Store(format!("{}: {e}", path.display()))
}

impl HistoricalStore for CsvStore {
    fn query<R: Row>(&self, ticker: &str, since: Option<NaiveDate>) -> Result<Vec<R>, DataError> {
        let mut rows: Vec<R> = self
            .read_all::<R>()?
            .into_iter()
            .filter(|r| r.ticker() == ticker && since.map_or(true, |s| r.date() >= s))
            .collect();
        rows.sort_by_key(Row::date);
        Ok(rows)
    }

    fn tickers<R: Row>(&self) -> Result<Vec<String>, DataError> {
        let set: BTreeSet<String> = self
            .read_all::<R>()?
            .iter()
            .map(|r| r.ticker().to_string())
            .collect();
        Ok(set.into_iter().collect())
    }
}

impl PersistenceSink for CsvStore {
    fn upsert<R: Row>(&self, rows: &[R]) -> Result<usize, DataError> {
        if rows.is_empty() {
            return Ok(0);
        }
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| DataError::Store("csv store lock poisoned".into()))?;

        let mut all = self.read_all::<R>()?;
        let mut seen: HashSet<String> = all.iter().map(|r| r.id().to_string()).collect();
        let before = all.len();
        all.extend(rows.iter().filter(|r| seen.insert(r.id().to_string())).cloned());
        let inserted = all.len() - before;
        if inserted == 0 {
            return Ok(0);
        }

        sort_rows(&mut all);
        self.write_all(&all)?;
        tracing::debug!(table = %R::TABLE, inserted, total = all.len(), "table written");
        Ok(inserted)
    }
}
