//! File-backed observer configuration.
//!
//! Every field has a default, so an empty TOML file is a valid config.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use observer_core::domain::Table;
use observer_core::EngineConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to read tickers file {}: {source}", path.display())]
    Tickers { path: PathBuf, source: csv::Error },

    #[error("tickers file {} has no `ticker` column", .0.display())]
    MissingTickerColumn(PathBuf),
}

/// Store file names of the four tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableNames {
    pub stage: String,
    pub main: String,
    pub analysis: String,
    pub decision: String,
}

impl Default for TableNames {
    fn default() -> Self {
        Self {
            stage: "stage_table".into(),
            main: "main_table".into(),
            analysis: "analysis_table".into(),
            decision: "decision_table".into(),
        }
    }
}

impl TableNames {
    pub fn name(&self, table: Table) -> &str {
        match table {
            Table::Stage => &self.stage,
            Table::Main => &self.main,
            Table::Analysis => &self.analysis,
            Table::Decision => &self.decision,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObserverConfig {
    /// Inline ticker list.
    pub tickers: Vec<String>,
    /// CSV file with a `ticker` column, merged after the inline list.
    pub tickers_file: Option<PathBuf>,

    pub store_dir: PathBuf,
    pub snapshot_dir: PathBuf,
    /// Directory for file alerts; alerts go to the log when unset.
    pub outbox_dir: Option<PathBuf>,
    pub tables: TableNames,

    /// Calendar days re-read before the latest main row so indicators warm up.
    pub transform_day_shift: i64,
    pub analyze_day_shift: i64,
    pub decide_day_shift: i64,
    /// Extra days added to every shift.
    pub buffer_days: i64,

    /// First date analyzed when the analysis table is empty.
    pub analysis_start: NaiveDate,
    /// First date decided when the decision table is empty.
    pub decision_start: NaiveDate,

    pub download_lookback_days: u32,
    /// Fan per-ticker work out over the rayon pool.
    pub parallel: bool,
    /// Decimal places persisted for indicator columns.
    pub precision: u32,

    pub engine: EngineConfig,
}

impl Default for ObserverConfig {
    fn default() -> Self {
        Self {
            tickers: Vec::new(),
            tickers_file: None,
            store_dir: PathBuf::from("data/store"),
            snapshot_dir: PathBuf::from("data/snapshots"),
            outbox_dir: None,
            tables: TableNames::default(),
            transform_day_shift: 60,
            analyze_day_shift: 60,
            decide_day_shift: 20,
            buffer_days: 3,
            analysis_start: NaiveDate::from_ymd_opt(2000, 1, 1).unwrap_or_default(),
            decision_start: NaiveDate::from_ymd_opt(2018, 12, 1).unwrap_or_default(),
            download_lookback_days: 5,
            parallel: false,
            precision: 4,
            engine: EngineConfig::default(),
        }
    }
}

impl ObserverConfig {
    /// Load a config from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse a config from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Inline and file tickers, upper-cased, first occurrence kept.
    pub fn resolve_tickers(&self) -> Result<Vec<String>, ConfigError> {
        let mut all = self.tickers.clone();
        if let Some(path) = &self.tickers_file {
            all.extend(read_tickers_file(path)?);
        }
        Ok(normalize_tickers(all))
    }
}

pub fn normalize_tickers(tickers: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    tickers
        .into_iter()
        .map(|t| t.trim().to_uppercase())
        .filter(|t| !t.is_empty() && seen.insert(t.clone()))
        .collect()
}

fn read_tickers_file(path: &Path) -> Result<Vec<String>, ConfigError> {
    let err = |source| ConfigError::Tickers {
        path: path.to_path_buf(),
        source,
    };
    let mut reader = csv::Reader::from_path(path).map_err(err)?;
    let column = reader
        .headers()
        .map_err(err)?
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case("ticker"))
        .ok_or_else(|| ConfigError::MissingTickerColumn(path.to_path_buf()))?;

    let mut tickers = Vec::new();
    for record in reader.records() {
        if let Some(t) = record.map_err(err)?.get(column) {
            tickers.push(t.to_string());
        }
    }
    Ok(tickers)
}
