//! Indicator trait and the named-series container the engine fills.
//!
//! Indicators are pure functions: one ticker's bar history in, one value per
//! bar out. Values a window cannot support are `None`, never zero or NaN.

use crate::domain::Bar;
use std::collections::HashMap;

/// Trait for indicators.
///
/// `compute` returns a `Vec` of the same length as `bars`. The first
/// `lookback()` entries are `None` (warmup).
///
/// # Look-ahead contamination guard
/// No indicator value at bar t may depend on bar t+1 or later. Every
/// indicator must pass the truncated-vs-full series test.
pub trait Indicator: Send + Sync {
    /// Column name (e.g. "ma_5", "atr_20").
    fn name(&self) -> &str;

    /// Number of bars before the first defined value.
    fn lookback(&self) -> usize;

    /// Compute the indicator over the whole ordered bar series.
    fn compute(&self, bars: &[Bar]) -> Vec<Option<f64>>;
}

/// Named indicator series for one ticker, indexed by bar position.
#[derive(Debug, Clone, Default)]
pub struct IndicatorValues {
    series: HashMap<String, Vec<Option<f64>>>,
}

impl IndicatorValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a named series.
    pub fn insert(&mut self, name: impl Into<String>, values: Vec<Option<f64>>) {
        self.series.insert(name.into(), values);
    }

    /// Value at a bar index; `None` when undefined, out of range, or unknown.
    pub fn get(&self, name: &str, bar_index: usize) -> Option<f64> {
        self.series
            .get(name)
            .and_then(|v| v.get(bar_index).copied().flatten())
    }

    /// The full series for a name.
    pub fn get_series(&self, name: &str) -> Option<&[Option<f64>]> {
        self.series.get(name).map(|v| v.as_slice())
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_get() {
        let mut iv = IndicatorValues::new();
        iv.insert("ma_3", vec![None, None, Some(100.0), Some(101.0)]);
        assert_eq!(iv.get("ma_3", 0), None);
        assert_eq!(iv.get("ma_3", 2), Some(100.0));
        assert_eq!(iv.get("ma_3", 4), None); // out of bounds
        assert_eq!(iv.get_series("ma_3").map(|s| s.len()), Some(4));
    }

    #[test]
    fn missing_name() {
        let iv = IndicatorValues::new();
        assert_eq!(iv.get("nonexistent", 0), None);
        assert!(iv.is_empty());
    }
}
