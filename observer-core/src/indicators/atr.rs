//! Average True Range: simple rolling mean of true range.
//!
//! With an undefined first true range the first ATR lands at index `period`
//! (needs period+1 bars). With the high-low fallback it lands at period-1.

use super::rolling::{rolling, true_range, Aggregation};
use crate::components::indicator::Indicator;
use crate::config::FirstTrueRange;
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct Atr {
    period: usize,
    first: FirstTrueRange,
    name: String,
}

impl Atr {
    pub fn new(period: usize, first: FirstTrueRange) -> Self {
        Self {
            period: period.max(1),
            first,
            name: format!("atr_{period}"),
        }
    }
}

impl Indicator for Atr {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        match self.first {
            FirstTrueRange::Undefined => self.period,
            FirstTrueRange::HighLow => self.period - 1,
        }
    }

    fn compute(&self, bars: &[Bar]) -> Vec<Option<f64>> {
        rolling(&true_range(bars, self.first), self.period, Aggregation::Mean)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_ohlc_bars, DEFAULT_EPSILON};

    fn sample() -> Vec<Bar> {
        make_ohlc_bars(&[
            (100.0, 105.0, 95.0, 102.0),  // TR undefined (or 10)
            (102.0, 108.0, 100.0, 106.0), // TR = 8
            (106.0, 107.0, 98.0, 99.0),   // TR = 9
            (99.0, 103.0, 97.0, 101.0),   // TR = 6
            (101.0, 106.0, 100.0, 105.0), // TR = 6
        ])
    }

    #[test]
    fn atr_period_3_undefined_first() {
        let result = Atr::new(3, FirstTrueRange::Undefined).compute(&sample());
        assert!(result[..3].iter().all(Option::is_none));
        assert_approx(result[3].unwrap(), 23.0 / 3.0, DEFAULT_EPSILON);
        assert_approx(result[4].unwrap(), 7.0, DEFAULT_EPSILON);
    }

    #[test]
    fn atr_period_3_high_low_first() {
        let result = Atr::new(3, FirstTrueRange::HighLow).compute(&sample());
        assert_eq!(result[1], None);
        assert_approx(result[2].unwrap(), 9.0, DEFAULT_EPSILON);
    }

    #[test]
    fn atr_lookback() {
        assert_eq!(Atr::new(20, FirstTrueRange::Undefined).lookback(), 20);
        assert_eq!(Atr::new(20, FirstTrueRange::HighLow).lookback(), 19);
    }
}
