//! Commodity Channel Index.
//!
//! `(tp - MA_k(tp)) / (0.015 * MAD_k(tp))` where MAD is the mean absolute
//! deviation of the same window around its own mean. A deviation of exactly
//! zero is floored to `1e-5`.

use super::rolling::{finite, rolling, Aggregation};
use crate::components::indicator::Indicator;
use crate::config::TypicalPrice;
use crate::domain::Bar;
use crate::table::windowed;

const CCI_SCALE: f64 = 0.015;
const MIN_DEVIATION: f64 = 1e-5;

#[derive(Debug, Clone)]
pub struct Cci {
    period: usize,
    typical: TypicalPrice,
    name: String,
}

impl Cci {
    pub fn new(period: usize, typical: TypicalPrice) -> Self {
        Self {
            period: period.max(1),
            typical,
            name: format!("cci_{period}"),
        }
    }

    /// Typical price per bar under the configured formula.
    pub fn typical_price(&self, bars: &[Bar]) -> Vec<Option<f64>> {
        match self.typical {
            TypicalPrice::HighLowClose => bars
                .iter()
                .map(|b| finite((b.high + b.low + b.close) / 3.0))
                .collect(),
            TypicalPrice::HighCloseClose => bars
                .iter()
                .map(|b| finite((b.high + b.close + b.close) / 3.0))
                .collect(),
            TypicalPrice::WindowHighLow => windowed(bars, self.period, |w| {
                let hh = w.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max);
                let ll = w.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);
                w.last().and_then(|b| finite((hh + b.close + ll) / 3.0))
            }),
        }
    }
}

impl Indicator for Cci {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        match self.typical {
            TypicalPrice::WindowHighLow => 2 * (self.period - 1),
            _ => self.period - 1,
        }
    }

    fn compute(&self, bars: &[Bar]) -> Vec<Option<f64>> {
        let tp = self.typical_price(bars);
        let mean = rolling(&tp, self.period, Aggregation::Mean);
        let deviation = rolling(&tp, self.period, Aggregation::MeanAbsDeviation);

        tp.iter()
            .zip(mean.iter().zip(&deviation))
            .map(|(tp, (mean, dev))| {
                let (tp, mean, dev) = ((*tp)?, (*mean)?, (*dev)?);
                let dev = if dev == 0.0 { MIN_DEVIATION } else { dev };
                finite((tp - mean) / (CCI_SCALE * dev))
            })
            .collect()
    }
}
