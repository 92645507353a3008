//! Indicator implementations and the primitives they share.
//!
//! Every indicator implements `Indicator` from `components::indicator` and is
//! built on `rolling` (window statistics, true range) and `slope` (angle of a
//! five-point trajectory).
//!
//! Bollinger Bands are exposed as one named instance per band, keeping the
//! single-series `Indicator` trait unchanged.

pub mod atr;
pub mod bollinger;
pub mod cci;
pub mod rolling;
pub mod slope;
pub mod sma;

pub use atr::Atr;
pub use bollinger::{Bollinger, BollingerBand};
pub use cci::Cci;
pub use rolling::{op_series, rolling, true_range, Aggregation};
pub use slope::{rolling_angle, slope_angle, ANGLE_WINDOW};
pub use sma::Sma;

#[cfg(test)]
fn test_date(i: usize) -> chrono::NaiveDate {
    chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap() + chrono::Duration::days(i as i64)
}

/// Create synthetic bars from close prices for testing.
///
/// open = prev_close (or close for first bar),
/// high = max(open,close) + 1.0, low = min(open,close) - 1.0, volume = 1000.
#[cfg(test)]
pub fn make_bars(closes: &[f64]) -> Vec<crate::domain::Bar> {
    use crate::domain::Bar;
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            let high = open.max(close) + 1.0;
            let low = open.min(close) - 1.0;
            Bar::new("TEST", test_date(i), open, high, low, close, 1000)
        })
        .collect()
}

/// Bars with open == close == price, so the mid-body price is exactly `price`.
#[cfg(test)]
pub fn make_flat_bars(prices: &[f64]) -> Vec<crate::domain::Bar> {
    use crate::domain::Bar;
    prices
        .iter()
        .enumerate()
        .map(|(i, &p)| Bar::new("TEST", test_date(i), p, p + 1.0, p - 1.0, p, 1000))
        .collect()
}

/// Bars from explicit `(open, high, low, close)` tuples.
#[cfg(test)]
pub fn make_ohlc_bars(data: &[(f64, f64, f64, f64)]) -> Vec<crate::domain::Bar> {
    use crate::domain::Bar;
    data.iter()
        .enumerate()
        .map(|(i, &(open, high, low, close))| {
            Bar::new("TEST", test_date(i), open, high, low, close, 1000)
        })
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
