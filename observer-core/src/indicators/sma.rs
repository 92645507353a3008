//! Simple moving average of the mid-body price `(open + close) / 2`.
//!
//! Lookback: period - 1 (first defined value at index period-1).

use super::rolling::{op_series, rolling, Aggregation};
use crate::components::indicator::Indicator;
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
    name: String,
}

impl Sma {
    pub fn new(period: usize) -> Self {
        Self {
            period: period.max(1),
            name: format!("ma_{period}"),
        }
    }
}

impl Indicator for Sma {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period - 1
    }

    fn compute(&self, bars: &[Bar]) -> Vec<Option<f64>> {
        rolling(&op_series(bars), self.period, Aggregation::Mean)
    }
}
