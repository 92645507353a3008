//! Composite decision engine: primitive signal rows to decision rows.

pub mod rules;

pub use rules::CompositeRule;

use crate::config::DecisionConfig;
use crate::domain::{DecisionRow, SignalRow};
use crate::error::EngineError;
use crate::table::{check_series, dedup_by_id, group_by_ticker, sort_rows, trailing};

/// Evaluates every composite rule for each signal row of a ticker.
#[derive(Debug, Clone)]
pub struct DecisionEngine {
    lookback: usize,
}

impl DecisionEngine {
    pub fn new(config: &DecisionConfig) -> Self {
        Self {
            lookback: config.lookback.max(1),
        }
    }

    /// Decide the row at `index`. Look-back rules see at most `lookback` rows ending there.
    pub fn decide_at(&self, rows: &[SignalRow], index: usize) -> Option<DecisionRow> {
        let window = trailing(rows, index, self.lookback);
        let row = window.last()?;
        let eval = |rule: CompositeRule| rule.evaluate(window);
        Some(DecisionRow {
            id: row.id.clone(),
            ticker: row.ticker.clone(),
            date: row.date,
            bb_upper_pd_signal: eval(CompositeRule::BbUpperPriceDiff),
            bb_lower_pd_signal: eval(CompositeRule::BbLowerPriceDiff),
            atr_candle_pd_signal: eval(CompositeRule::AtrCandlePriceDiff),
            ma_signal: eval(CompositeRule::MaAngle),
            atr_angle_cci_signal: eval(CompositeRule::AtrAngleCci),
            atr_angle_ma_signal: eval(CompositeRule::AtrAngleMa),
            cci_ma_signal: eval(CompositeRule::CciMa),
        })
    }

    /// Decide every row of one ticker, ascending by date.
    pub fn decide_ticker(&self, rows: &[SignalRow]) -> Result<Vec<DecisionRow>, EngineError> {
        check_series(rows)?;
        let decisions: Vec<DecisionRow> = (0..rows.len())
            .filter_map(|i| self.decide_at(rows, i))
            .collect();
        for d in decisions.iter().filter(|d| d.has_alert()) {
            tracing::debug!(ticker = %d.ticker, date = %d.date, "composite signal");
        }
        Ok(decisions)
    }

    /// Decide a mixed batch, de-duplicated by id and sorted by `(ticker, date)`.
    pub fn decide_all(&self, rows: Vec<SignalRow>) -> Vec<DecisionRow> {
        let mut out = Vec::new();
        for (ticker, series) in group_by_ticker(dedup_by_id(rows)) {
            match self.decide_ticker(&series) {
                Ok(decisions) => out.extend(decisions),
                Err(e) => tracing::warn!(ticker = %ticker, error = %e, "skipping ticker"),
            }
        }
        let mut out = dedup_by_id(out);
        sort_rows(&mut out);
        out
    }
}

/// An all-zero signal row for decision tests, dated 2024-01-02 + `day`.
#[cfg(test)]
pub(crate) fn test_signal_row(day: i64) -> SignalRow {
    let date = chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap() + chrono::Duration::days(day);
    SignalRow {
        id: crate::domain::row_id("TEST", date),
        ticker: "TEST".into(),
        date,
        bb_upper_signal: 0,
        bb_lower_signal: 0,
        ma_signal: 0,
        atr_slope_change_signal: 0,
        atr_candle_size_signal: 0,
        cci_signal: 0,
        price_diff_signal: 0,
        ma_angle_diff: None,
        atr_angle_diff: None,
        candle_atr_ratio: None,
        price_diff: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_decision_per_signal_row() {
        let rows: Vec<SignalRow> = (0..12).map(test_signal_row).collect();
        let engine = DecisionEngine::new(&DecisionConfig::default());
        let out = engine.decide_ticker(&rows).unwrap();
        assert_eq!(out.len(), 12);
        assert!(out.iter().all(|d| !d.has_alert()));
    }

    #[test]
    fn two_triggers_in_one_window_fire_twice() {
        let mut rows: Vec<SignalRow> = (0..10).map(test_signal_row).collect();
        rows[0].atr_slope_change_signal = 3;
        rows[2].cci_signal = 1;
        rows[6].cci_signal = -1;
        let engine = DecisionEngine::new(&DecisionConfig::default());
        let out = engine.decide_ticker(&rows).unwrap();
        assert_eq!(out[2].atr_angle_cci_signal, 3);
        assert_eq!(out[6].atr_angle_cci_signal, -3);
        let firings = rows
            .iter()
            .zip(&out)
            .filter(|(s, d)| s.cci_signal != 0 && d.atr_angle_cci_signal != 0)
            .count();
        assert_eq!(firings, 2);
    }

    #[test]
    fn lookback_limits_the_scan() {
        let mut rows: Vec<SignalRow> = (0..15).map(test_signal_row).collect();
        rows[0].ma_signal = 2;
        rows[0].atr_slope_change_signal = 2;
        let engine = DecisionEngine::new(&DecisionConfig { lookback: 10 });
        let out = engine.decide_ticker(&rows).unwrap();
        assert_eq!(out[9].atr_angle_ma_signal, 4);
        // row 0 left the window
        assert_eq!(out[10].atr_angle_ma_signal, 0);
    }

    #[test]
    fn decide_all_dedups() {
        let mut rows: Vec<SignalRow> = (0..3).map(test_signal_row).collect();
        rows.push(test_signal_row(1));
        let engine = DecisionEngine::new(&DecisionConfig::default());
        assert_eq!(engine.decide_all(rows).len(), 3);
    }
}
