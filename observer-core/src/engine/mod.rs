//! Indicator engine: one ticker's bars in, one `IndicatorRow` per bar out.
//!
//! Computes, in dependency order, the fast and slow moving averages, CCI,
//! ATR and both Bollinger bands, then the angle of the two averages, ATR
//! and CCI. Rows are returned for every bar; columns a window cannot yet
//! support are `None`.

pub mod precompute;

pub use precompute::{add_angles, alpha_name, compute_warmup, precompute_indicators};

use crate::components::indicator::{Indicator, IndicatorValues};
use crate::config::IndicatorConfig;
use crate::domain::{Bar, IndicatorRow};
use crate::error::EngineError;
use crate::table::{check_series, dedup_by_id, group_by_ticker};

/// Column names of the indicator set, fixed at construction.
#[derive(Debug, Clone)]
struct Columns {
    ma_fast: String,
    ma_slow: String,
    cci: String,
    atr: String,
    bb_upper: String,
    bb_lower: String,
}

pub struct IndicatorEngine {
    indicators: Vec<Box<dyn Indicator>>,
    columns: Columns,
}

impl IndicatorEngine {
    pub fn new(config: &IndicatorConfig) -> Self {
        use crate::indicators::{Atr, Bollinger, Cci, Sma};

        let indicators: Vec<Box<dyn Indicator>> = vec![
            Box::new(Sma::new(config.ma_fast)),
            Box::new(Sma::new(config.ma_slow)),
            Box::new(Cci::new(config.cci_period, config.typical_price)),
            Box::new(Atr::new(config.atr_period, config.first_true_range)),
            Box::new(Bollinger::upper(config.bollinger_period, config.bollinger_width)),
            Box::new(Bollinger::lower(config.bollinger_period, config.bollinger_width)),
        ];
        let name = |i: usize| indicators[i].name().to_string();
        let columns = Columns {
            ma_fast: name(0),
            ma_slow: name(1),
            cci: name(2),
            atr: name(3),
            bb_upper: name(4),
            bb_lower: name(5),
        };
        Self {
            indicators,
            columns,
        }
    }

    /// Bars a ticker needs before its first complete row.
    pub fn warmup(&self) -> usize {
        compute_warmup(&self.indicators)
    }

    /// Compute every indicator column for one ticker.
    ///
    /// `bars` must belong to a single ticker and be strictly ascending by date.
    pub fn compute_ticker(&self, bars: &[Bar]) -> Result<Vec<IndicatorRow>, EngineError> {
        check_series(bars)?;

        let mut iv = precompute_indicators(bars, &self.indicators);
        let c = &self.columns;
        add_angles(
            &mut iv,
            &[
                c.ma_fast.as_str(),
                c.ma_slow.as_str(),
                c.atr.as_str(),
                c.cci.as_str(),
            ],
        );

        Ok(bars
            .iter()
            .enumerate()
            .map(|(i, bar)| self.row(bar, i, &iv))
            .collect())
    }

    /// Compute every ticker in a mixed batch.
    ///
    /// Duplicate ids keep their first occurrence. A ticker whose series is
    /// rejected is logged and skipped.
    pub fn compute_all(&self, bars: Vec<Bar>) -> Vec<IndicatorRow> {
        let mut out = Vec::new();
        for (ticker, series) in group_by_ticker(dedup_by_id(bars)) {
            match self.compute_ticker(&series) {
                Ok(rows) => out.extend(rows),
                Err(e) => tracing::warn!(ticker = %ticker, error = %e, "skipping ticker"),
            }
        }
        out
    }

    fn row(&self, bar: &Bar, i: usize, iv: &IndicatorValues) -> IndicatorRow {
        let c = &self.columns;
        let alpha = |name: &str| iv.get(&alpha_name(name), i);
        IndicatorRow {
            id: bar.id.clone(),
            ticker: bar.ticker.clone(),
            date: bar.date,
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
            volume: bar.volume,
            ma_fast: iv.get(&c.ma_fast, i),
            ma_slow: iv.get(&c.ma_slow, i),
            cci: iv.get(&c.cci, i),
            atr: iv.get(&c.atr, i),
            bb_upper: iv.get(&c.bb_upper, i),
            bb_lower: iv.get(&c.bb_lower, i),
            ma_fast_alpha: alpha(c.ma_fast.as_str()),
            ma_slow_alpha: alpha(c.ma_slow.as_str()),
            atr_alpha: alpha(c.atr.as_str()),
            cci_alpha: alpha(c.cci.as_str()),
        }
    }
}
