//! Indicator precomputation for one ticker.
//!
//! Every indicator runs once over the full ordered bar slice; angle columns
//! are derived afterwards from the stored series.

use crate::components::indicator::{Indicator, IndicatorValues};
use crate::domain::Bar;
use crate::indicators::{rolling_angle, ANGLE_WINDOW};

/// Run every indicator over one ticker's bars.
pub fn precompute_indicators(bars: &[Bar], indicators: &[Box<dyn Indicator>]) -> IndicatorValues {
    let mut iv = IndicatorValues::new();
    for indicator in indicators {
        let series = indicator.compute(bars);
        debug_assert_eq!(
            series.len(),
            bars.len(),
            "indicator '{}' produced {} values for {} bars",
            indicator.name(),
            series.len(),
            bars.len(),
        );
        iv.insert(indicator.name(), series);
    }
    iv
}

/// Column name of an indicator's angle series.
pub fn alpha_name(indicator: &str) -> String {
    format!("{indicator}_alpha")
}

/// Insert `{name}_alpha` for each named series already in `iv`.
pub fn add_angles(iv: &mut IndicatorValues, names: &[&str]) {
    for name in names {
        if let Some(series) = iv.get_series(name) {
            let angles = rolling_angle(series);
            iv.insert(alpha_name(name), angles);
        }
    }
}

/// Bars needed before every indicator and its angle are defined.
pub fn compute_warmup(indicators: &[Box<dyn Indicator>]) -> usize {
    indicators.iter().map(|i| i.lookback()).max().unwrap_or(0) + ANGLE_WINDOW - 1
}
