//! Keyed output rows for each pipeline table.
//!
//! Every row carries the `(id, ticker, date)` key of the bar it was derived
//! from. Rows are flat so they serialize to one CSV record each.

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// The four tables the pipeline reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    /// Raw bars as downloaded.
    Stage,
    /// Bars joined with indicator columns.
    Main,
    /// Primitive signal codes.
    Analysis,
    /// Composite decision codes.
    Decision,
}

impl Table {
    pub const ALL: [Table; 4] = [Table::Stage, Table::Main, Table::Analysis, Table::Decision];

    pub fn as_str(&self) -> &'static str {
        match self {
            Table::Stage => "stage",
            Table::Main => "main",
            Table::Analysis => "analysis",
            Table::Decision => "decision",
        }
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A row that belongs to exactly one table and is keyed by `id`.
pub trait Row: Serialize + DeserializeOwned + Clone + Send + Sync {
    const TABLE: Table;

    fn id(&self) -> &str;
    fn ticker(&self) -> &str;
    fn date(&self) -> NaiveDate;
}

/// One bar plus its derived indicator columns.
///
/// Indicator columns are `None` where the rolling window had too little
/// history. Such rows are never persisted (see [`IndicatorRow::is_complete`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorRow {
    pub id: String,
    pub ticker: String,
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
    pub ma_fast: Option<f64>,
    pub ma_slow: Option<f64>,
    pub cci: Option<f64>,
    pub atr: Option<f64>,
    pub bb_upper: Option<f64>,
    pub bb_lower: Option<f64>,
    pub ma_fast_alpha: Option<f64>,
    pub ma_slow_alpha: Option<f64>,
    pub atr_alpha: Option<f64>,
    pub cci_alpha: Option<f64>,
}

impl IndicatorRow {
    /// `(open + close) / 2` of the underlying bar.
    pub fn op(&self) -> f64 {
        (self.open + self.close) / 2.0
    }

    /// `|open - close|` of the underlying bar.
    pub fn body(&self) -> f64 {
        (self.open - self.close).abs()
    }

    /// True when every column a signal classifier reads is present.
    ///
    /// `cci_alpha` is informational and not required.
    pub fn is_complete(&self) -> bool {
        [
            self.ma_fast,
            self.ma_slow,
            self.cci,
            self.atr,
            self.bb_upper,
            self.bb_lower,
            self.ma_fast_alpha,
            self.ma_slow_alpha,
            self.atr_alpha,
        ]
        .iter()
        .all(Option::is_some)
    }

    /// Round every indicator column to `places` decimal places.
    pub fn rounded(mut self, places: u32) -> Self {
        let r = |v: Option<f64>| v.map(|x| round_to(x, places));
        self.ma_fast = r(self.ma_fast);
        self.ma_slow = r(self.ma_slow);
        self.cci = r(self.cci);
        self.atr = r(self.atr);
        self.bb_upper = r(self.bb_upper);
        self.bb_lower = r(self.bb_lower);
        self.ma_fast_alpha = r(self.ma_fast_alpha);
        self.ma_slow_alpha = r(self.ma_slow_alpha);
        self.atr_alpha = r(self.atr_alpha);
        self.cci_alpha = r(self.cci_alpha);
        self
    }
}

impl Row for IndicatorRow {
    const TABLE: Table = Table::Main;

    fn id(&self) -> &str {
        &self.id
    }

    fn ticker(&self) -> &str {
        &self.ticker
    }

    fn date(&self) -> NaiveDate {
        self.date
    }
}

/// Primitive signal codes for one indicator row.
///
/// Codes are in `0..=5` except `price_diff_signal` (`-5..=5`) and
/// `cci_signal` (`-1..=1`). The metric columns record the value each ladder
/// was applied to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalRow {
    pub id: String,
    pub ticker: String,
    pub date: NaiveDate,
    pub bb_upper_signal: i8,
    pub bb_lower_signal: i8,
    pub ma_signal: i8,
    pub atr_slope_change_signal: i8,
    pub atr_candle_size_signal: i8,
    pub cci_signal: i8,
    pub price_diff_signal: i8,
    pub ma_angle_diff: Option<f64>,
    pub atr_angle_diff: Option<f64>,
    pub candle_atr_ratio: Option<f64>,
    pub price_diff: Option<f64>,
}

impl Row for SignalRow {
    const TABLE: Table = Table::Analysis;

    fn id(&self) -> &str {
        &self.id
    }

    fn ticker(&self) -> &str {
        &self.ticker
    }

    fn date(&self) -> NaiveDate {
        self.date
    }
}

/// Composite decision codes for one signal row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionRow {
    pub id: String,
    pub ticker: String,
    pub date: NaiveDate,
    pub bb_upper_pd_signal: i32,
    pub bb_lower_pd_signal: i32,
    pub atr_candle_pd_signal: i32,
    pub ma_signal: i32,
    pub atr_angle_cci_signal: i32,
    pub atr_angle_ma_signal: i32,
    pub cci_ma_signal: i32,
}

impl DecisionRow {
    /// `(rule name, value)` pairs in rule order.
    pub fn signals(&self) -> [(&'static str, i32); 7] {
        [
            ("bb_upper_pd", self.bb_upper_pd_signal),
            ("bb_lower_pd", self.bb_lower_pd_signal),
            ("atr_candle_pd", self.atr_candle_pd_signal),
            ("ma_angle", self.ma_signal),
            ("atr_angle_cci", self.atr_angle_cci_signal),
            ("atr_angle_ma", self.atr_angle_ma_signal),
            ("cci_ma", self.cci_ma_signal),
        ]
    }

    pub fn has_alert(&self) -> bool {
        self.signals().iter().any(|(_, v)| *v != 0)
    }
}

impl Row for DecisionRow {
    const TABLE: Table = Table::Decision;

    fn id(&self) -> &str {
        &self.id
    }

    fn ticker(&self) -> &str {
        &self.ticker
    }

    fn date(&self) -> NaiveDate {
        self.date
    }
}

/// Round half away from zero to `places` decimal places.
pub fn round_to(value: f64, places: u32) -> f64 {
    let scale = 10f64.powi(places as i32);
    (value * scale).round() / scale
}

#[cfg(test)]
mod tests {
    use super::*;

    fn indicator_row() -> IndicatorRow {
        IndicatorRow {
            id: "ABC-2024-01-02".into(),
            ticker: "ABC".into(),
            date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            open: 10.0,
            high: 12.0,
            low: 9.0,
            close: 11.0,
            volume: 100,
            ma_fast: Some(10.123456),
            ma_slow: Some(10.0),
            cci: Some(-33.33333),
            atr: Some(1.5),
            bb_upper: Some(12.0),
            bb_lower: Some(8.0),
            ma_fast_alpha: Some(12.0),
            ma_slow_alpha: Some(3.0),
            atr_alpha: Some(0.0),
            cci_alpha: None,
        }
    }

    #[test]
    fn complete_ignores_cci_alpha() {
        assert!(indicator_row().is_complete());
        let mut row = indicator_row();
        row.atr = None;
        assert!(!row.is_complete());
    }

    #[test]
    fn rounding_keeps_none() {
        let row = indicator_row().rounded(4);
        assert_eq!(row.ma_fast, Some(10.1235));
        assert_eq!(row.cci, Some(-33.3333));
        assert_eq!(row.cci_alpha, None);
    }

    #[test]
    fn round_half_away_from_zero() {
        assert_eq!(round_to(2.5, 0), 3.0);
        assert_eq!(round_to(-2.5, 0), -3.0);
        assert_eq!(round_to(1.005, 1), 1.0);
    }

    #[test]
    fn decision_alert_detection() {
        let mut row = DecisionRow {
            id: "ABC-2024-01-02".into(),
            ticker: "ABC".into(),
            date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            bb_upper_pd_signal: 0,
            bb_lower_pd_signal: 0,
            atr_candle_pd_signal: 0,
            ma_signal: 0,
            atr_angle_cci_signal: 0,
            atr_angle_ma_signal: 0,
            cci_ma_signal: 0,
        };
        assert!(!row.has_alert());
        row.cci_ma_signal = -2;
        assert!(row.has_alert());
    }

    #[test]
    fn table_names() {
        let names: Vec<_> = Table::ALL.iter().map(Table::as_str).collect();
        assert_eq!(names, ["stage", "main", "analysis", "decision"]);
    }
}
