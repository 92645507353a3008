//! Bollinger Bands on the mid-body price.
//!
//! - Upper: MA_k(op) + width * stddev_k(op)
//! - Lower: MA_k(op) - width * stddev_k(op)
//!
//! Uses sample stddev (divide by N - 1). Each band is its own indicator.
//! Lookback: period - 1.

use super::rolling::{finite, op_series, rolling, Aggregation};
use crate::components::indicator::Indicator;
use crate::domain::Bar;

/// Which band to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BollingerBand {
    Upper,
    Lower,
}

#[derive(Debug, Clone)]
pub struct Bollinger {
    period: usize,
    width: f64,
    band: BollingerBand,
    name: String,
}

impl Bollinger {
    pub fn upper(period: usize, width: f64) -> Self {
        Self::new(period, width, BollingerBand::Upper)
    }

    pub fn lower(period: usize, width: f64) -> Self {
        Self::new(period, width, BollingerBand::Lower)
    }

    fn new(period: usize, width: f64, band: BollingerBand) -> Self {
        let side = match band {
            BollingerBand::Upper => "upper",
            BollingerBand::Lower => "lower",
        };
        Self {
            period: period.max(2),
            width,
            band,
            name: format!("bb_{side}_{period}"),
        }
    }
}

impl Indicator for Bollinger {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period - 1
    }

    fn compute(&self, bars: &[Bar]) -> Vec<Option<f64>> {
        let op = op_series(bars);
        let mean = rolling(&op, self.period, Aggregation::Mean);
        let std = rolling(&op, self.period, Aggregation::SampleStdDev);
        let sign = match self.band {
            BollingerBand::Upper => 1.0,
            BollingerBand::Lower => -1.0,
        };
        mean.iter()
            .zip(&std)
            .map(|(m, s)| finite((*m)? + sign * self.width * (*s)?))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_flat_bars, DEFAULT_EPSILON};

    #[test]
    fn bands_are_symmetric_around_mean() {
        let bars = make_flat_bars(&[10.0, 11.0, 12.0, 13.0, 14.0]);
        let upper = Bollinger::upper(3, 2.0).compute(&bars);
        let lower = Bollinger::lower(3, 2.0).compute(&bars);

        assert_eq!(upper[1], None);
        // window [10, 11, 12]: mean 11, sample std 1
        assert_approx(upper[2].unwrap(), 13.0, DEFAULT_EPSILON);
        assert_approx(lower[2].unwrap(), 9.0, DEFAULT_EPSILON);
        for i in 2..5 {
            let mid = (upper[i].unwrap() + lower[i].unwrap()) / 2.0;
            assert_approx(mid, (i as f64) + 10.0 - 1.0, DEFAULT_EPSILON);
        }
    }

    #[test]
    fn constant_price_zero_width() {
        let bars = make_flat_bars(&[100.0; 4]);
        let upper = Bollinger::upper(3, 2.0).compute(&bars);
        let lower = Bollinger::lower(3, 2.0).compute(&bars);
        assert_approx(upper[2].unwrap(), 100.0, DEFAULT_EPSILON);
        assert_approx(lower[2].unwrap(), 100.0, DEFAULT_EPSILON);
    }

    #[test]
    fn bollinger_name_and_lookback() {
        let bb = Bollinger::upper(20, 2.0);
        assert_eq!(bb.name(), "bb_upper_20");
        assert_eq!(bb.lookback(), 19);
    }
}
