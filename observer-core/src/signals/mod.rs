//! Signal classification: indicator trajectories to small integer codes.
//!
//! Each primitive signal sees a trailing window of one ticker's indicator
//! rows ending at the row being classified. Two-bar signals compare that row
//! with the one before it. A signal whose inputs are missing defaults to `0`
//! and logs a data-sufficiency warning.

pub mod atr;
pub mod bollinger;
pub mod cci;
pub mod ladder;
pub mod ma_cross;
pub mod price_change;

pub use atr::{AtrCandleSize, AtrSlopeChange};
pub use bollinger::BandBreakout;
pub use cci::{CciCross, CciLatch};
pub use ladder::{
    Ladder, ZeroBand, ATR_SLOPE_LADDER, CANDLE_LADDER, MA_ANGLE_LADDER, PRICE_CHANGE_LADDER,
};
pub use ma_cross::MaCross;
pub use price_change::PriceChange;

use crate::config::SignalConfig;
use crate::domain::{IndicatorRow, SignalRow};
use crate::error::EngineError;
use crate::table::{check_series, dedup_by_id, group_by_ticker, sort_rows, trailing};

/// A signal code plus the metric its ladder was applied to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalValue {
    pub code: i8,
    pub metric: Option<f64>,
}

impl SignalValue {
    pub const ZERO: SignalValue = SignalValue {
        code: 0,
        metric: None,
    };
}

/// A memoryless classifier over a trailing window of indicator rows.
///
/// The last row of `window` is the row being classified.
pub trait PrimitiveSignal: Send + Sync {
    fn name(&self) -> &'static str;

    fn evaluate(&self, window: &[IndicatorRow]) -> Result<SignalValue, EngineError>;
}

/// The row being classified.
pub(crate) fn today(window: &[IndicatorRow]) -> Result<&IndicatorRow, EngineError> {
    window
        .last()
        .ok_or_else(|| EngineError::Computation("empty signal window".into()))
}

pub(crate) fn insufficient(
    row: &IndicatorRow,
    signal: &'static str,
    required: usize,
    available: usize,
) -> EngineError {
    EngineError::InsufficientHistory {
        ticker: row.ticker.clone(),
        date: row.date,
        signal,
        required,
        available,
    }
}

/// Yesterday's value of a field.
pub(crate) fn previous<T>(
    window: &[IndicatorRow],
    signal: &'static str,
    field: impl Fn(&IndicatorRow) -> Option<T>,
) -> Result<T, EngineError> {
    let row = today(window)?;
    window
        .len()
        .checked_sub(2)
        .and_then(|i| field(&window[i]))
        .ok_or_else(|| insufficient(row, signal, 2, 1))
}

/// `(today, yesterday)` of a field; both must be present.
pub(crate) fn pair<T>(
    window: &[IndicatorRow],
    signal: &'static str,
    field: impl Fn(&IndicatorRow) -> Option<T>,
) -> Result<(T, T), EngineError> {
    let row = today(window)?;
    let today_value = field(row);
    let yesterday_value = window
        .len()
        .checked_sub(2)
        .and_then(|i| field(&window[i]));
    match (today_value, yesterday_value) {
        (Some(t), Some(y)) => Ok((t, y)),
        (t, y) => Err(insufficient(
            row,
            signal,
            2,
            usize::from(t.is_some()) + usize::from(y.is_some()),
        )),
    }
}

/// Runs every primitive signal over a ticker's indicator rows.
pub struct SignalClassifier {
    window: usize,
    bb_upper: BandBreakout,
    bb_lower: BandBreakout,
    ma_cross: MaCross,
    atr_slope: AtrSlopeChange,
    atr_candle: AtrCandleSize,
    cci: CciCross,
    price: PriceChange,
}

impl SignalClassifier {
    pub fn new(config: &SignalConfig) -> Self {
        Self {
            window: config.window.max(2),
            bb_upper: BandBreakout::upper(),
            bb_lower: BandBreakout::lower(),
            ma_cross: MaCross,
            atr_slope: AtrSlopeChange,
            atr_candle: AtrCandleSize,
            cci: CciCross,
            price: PriceChange,
        }
    }

    /// Classify the row at `index` using the trailing window that ends there.
    pub fn classify_at(&self, rows: &[IndicatorRow], index: usize) -> Result<SignalRow, EngineError> {
        let window = trailing(rows, index, self.window);
        let row = today(window)?;

        let bb_upper = run(&self.bb_upper, window)?;
        let bb_lower = run(&self.bb_lower, window)?;
        let ma = run(&self.ma_cross, window)?;
        let atr_slope = run(&self.atr_slope, window)?;
        let candle = run(&self.atr_candle, window)?;
        let cci = run(&self.cci, window)?;
        let price = run(&self.price, window)?;

        Ok(SignalRow {
            id: row.id.clone(),
            ticker: row.ticker.clone(),
            date: row.date,
            bb_upper_signal: bb_upper.code,
            bb_lower_signal: bb_lower.code,
            ma_signal: ma.code,
            atr_slope_change_signal: atr_slope.code,
            atr_candle_size_signal: candle.code,
            cci_signal: cci.code,
            price_diff_signal: price.code,
            ma_angle_diff: ma.metric,
            atr_angle_diff: atr_slope.metric,
            candle_atr_ratio: candle.metric,
            price_diff: price.metric,
        })
    }

    /// Classify every row of one ticker that has a prior row.
    ///
    /// `rows` must be one ticker, strictly ascending by date.
    pub fn classify_ticker(&self, rows: &[IndicatorRow]) -> Result<Vec<SignalRow>, EngineError> {
        check_series(rows)?;
        (1..rows.len()).map(|i| self.classify_at(rows, i)).collect()
    }

    /// Classify a mixed batch. A ticker that fails is logged and skipped.
    ///
    /// Output is de-duplicated by id and sorted by `(ticker, date)`.
    pub fn classify_all(&self, rows: Vec<IndicatorRow>) -> Vec<SignalRow> {
        let mut out = Vec::new();
        for (ticker, series) in group_by_ticker(dedup_by_id(rows)) {
            match self.classify_ticker(&series) {
                Ok(signals) => out.extend(signals),
                Err(e) => tracing::warn!(ticker = %ticker, error = %e, "skipping ticker"),
            }
        }
        let mut out = dedup_by_id(out);
        sort_rows(&mut out);
        out
    }
}

/// Evaluate one signal, recovering insufficient history as a zero code.
fn run(signal: &dyn PrimitiveSignal, window: &[IndicatorRow]) -> Result<SignalValue, EngineError> {
    match signal.evaluate(window) {
        Ok(value) => {
            if value.code != 0 {
                if let Some(row) = window.last() {
                    tracing::debug!(
                        ticker = %row.ticker,
                        date = %row.date,
                        signal = signal.name(),
                        code = value.code,
                        metric = ?value.metric,
                        "signal fired"
                    );
                }
            }
            Ok(value)
        }
        Err(e @ EngineError::InsufficientHistory { .. }) => {
            tracing::warn!(error = %e, "data sufficiency: defaulting signal to 0");
            Ok(SignalValue::ZERO)
        }
        Err(e) => Err(e),
    }
}

/// A complete indicator row for signal tests, dated 2024-01-02 + `day`.
#[cfg(test)]
pub(crate) fn test_row(day: i64) -> IndicatorRow {
    let date = chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap() + chrono::Duration::days(day);
    IndicatorRow {
        id: crate::domain::row_id("TEST", date),
        ticker: "TEST".into(),
        date,
        open: 100.0,
        high: 101.0,
        low: 99.0,
        close: 100.0,
        volume: 1000,
        ma_fast: Some(100.0),
        ma_slow: Some(100.0),
        cci: Some(0.0),
        atr: Some(2.0),
        bb_upper: Some(110.0),
        bb_lower: Some(90.0),
        ma_fast_alpha: Some(0.0),
        ma_slow_alpha: Some(0.0),
        atr_alpha: Some(0.0),
        cci_alpha: Some(0.0),
    }
}
