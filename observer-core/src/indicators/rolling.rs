//! Rolling window statistics over one ticker's date-ordered series.
//!
//! Every aggregate requires a full window: a window shorter than `n`, or one
//! containing an undefined value, produces `None`.

use crate::config::FirstTrueRange;
use crate::domain::Bar;
use crate::table::windowed;

/// Aggregate applied to each full window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregation {
    Mean,
    /// Sample standard deviation (divide by n - 1).
    SampleStdDev,
    Max,
    Min,
    /// Mean of `|x - mean(window)|`.
    MeanAbsDeviation,
}

impl Aggregation {
    /// Aggregate a non-empty window. `None` when the statistic is undefined.
    pub fn apply(self, window: &[f64]) -> Option<f64> {
        if window.is_empty() {
            return None;
        }
        let n = window.len() as f64;
        let mean = || window.iter().sum::<f64>() / n;
        match self {
            Aggregation::Mean => Some(mean()),
            Aggregation::SampleStdDev => {
                if window.len() < 2 {
                    return None;
                }
                let m = mean();
                let ss: f64 = window.iter().map(|x| (x - m) * (x - m)).sum();
                Some((ss / (n - 1.0)).sqrt())
            }
            Aggregation::Max => window.iter().copied().reduce(f64::max),
            Aggregation::Min => window.iter().copied().reduce(f64::min),
            Aggregation::MeanAbsDeviation => {
                let m = mean();
                Some(window.iter().map(|x| (x - m).abs()).sum::<f64>() / n)
            }
        }
    }
}

/// Rolling aggregate with `min_periods == window`.
pub fn rolling(values: &[Option<f64>], window: usize, aggregation: Aggregation) -> Vec<Option<f64>> {
    windowed(values, window, |w| {
        let xs: Option<Vec<f64>> = w.iter().copied().collect();
        xs.and_then(|xs| aggregation.apply(&xs))
    })
}

/// Per-bar `(open + close) / 2`.
pub fn op_series(bars: &[Bar]) -> Vec<Option<f64>> {
    bars.iter().map(|b| finite(b.op())).collect()
}

/// True range `max(|high-low|, |high-prevClose|, |prevClose-low|)`.
///
/// The first bar has no previous close. Under [`FirstTrueRange::Undefined`]
/// it has no true range; under [`FirstTrueRange::HighLow`] it uses
/// `|high - low|`.
pub fn true_range(bars: &[Bar], first: FirstTrueRange) -> Vec<Option<f64>> {
    bars.iter()
        .enumerate()
        .map(|(i, bar)| {
            let hl = (bar.high - bar.low).abs();
            let tr = match i.checked_sub(1).map(|p| bars[p].close) {
                Some(pc) => hl.max((bar.high - pc).abs()).max((pc - bar.low).abs()),
                None => match first {
                    FirstTrueRange::Undefined => return None,
                    FirstTrueRange::HighLow => hl,
                },
            };
            finite(tr)
        })
        .collect()
}

pub(crate) fn finite(x: f64) -> Option<f64> {
    x.is_finite().then_some(x)
}
