//! Slope estimator: the angle of a short trajectory, in degrees.
//!
//! Five points at x = 1..5 are min-max normalized to the unit square. The
//! four consecutive finite-difference slopes are weighted 4, 3, 2, 1 from the
//! newest pair back, averaged, and mapped through `atan`.

use crate::table::windowed;

/// Points the estimator consumes.
pub const ANGLE_WINDOW: usize = 5;

/// Normalization denominator used when the window is flat.
const FLAT_RANGE: f64 = 0.01;

/// Weights for the newest pair first.
const WEIGHTS: [f64; ANGLE_WINDOW - 1] = [4.0, 3.0, 2.0, 1.0];

/// Angle of `y` (oldest first) in degrees, in `(-90, 90)`.
///
/// A flat window gives `0.0`. A non-finite input gives NaN.
pub fn slope_angle(y: &[f64; ANGLE_WINDOW]) -> f64 {
    let min = y.iter().copied().fold(f64::INFINITY, f64::min);
    let max = y.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = if max == min { FLAT_RANGE } else { max - min };
    let norm = y.map(|v| (v - min) / range);

    // x spans 1..5, so normalized points sit 1/4 apart.
    let dx = 1.0 / (ANGLE_WINDOW - 1) as f64;

    let weighted: f64 = WEIGHTS
        .iter()
        .enumerate()
        .map(|(k, w)| {
            let newer = ANGLE_WINDOW - 1 - k;
            w * (norm[newer] - norm[newer - 1]) / dx
        })
        .sum();
    let slope = weighted / WEIGHTS.iter().sum::<f64>();

    slope.atan().to_degrees()
}

/// Rolling angle over a series: each defined value needs the four before it.
pub fn rolling_angle(series: &[Option<f64>]) -> Vec<Option<f64>> {
    windowed(series, ANGLE_WINDOW, |w| {
        let mut points = [0.0; ANGLE_WINDOW];
        for (slot, v) in points.iter_mut().zip(w) {
            *slot = (*v)?;
        }
        let angle = slope_angle(&points);
        angle.is_finite().then_some(angle)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn linear_rise_is_45_degrees() {
        assert_approx(slope_angle(&[1.0, 2.0, 3.0, 4.0, 5.0]), 45.0, DEFAULT_EPSILON);
    }

    #[test]
    fn linear_fall_is_minus_45_degrees() {
        assert_approx(slope_angle(&[5.0, 4.0, 3.0, 2.0, 1.0]), -45.0, DEFAULT_EPSILON);
    }

    #[test]
    fn flat_is_zero() {
        assert_eq!(slope_angle(&[5.0, 5.0, 5.0, 5.0, 5.0]), 0.0);
    }

    #[test]
    fn newest_pair_weighs_most() {
        // Only the newest step moves: slope = 4 * 4 / 10 = 1.6
        let late = slope_angle(&[0.0, 0.0, 0.0, 0.0, 1.0]);
        assert_approx(late, 1.6_f64.atan().to_degrees(), DEFAULT_EPSILON);
        // Only the oldest step moves: slope = 1 * 4 / 10 = 0.4
        let early = slope_angle(&[0.0, 1.0, 1.0, 1.0, 1.0]);
        assert_approx(early, 0.4_f64.atan().to_degrees(), DEFAULT_EPSILON);
        assert!(late > early);
    }

    #[test]
    fn scale_invariant() {
        let a = slope_angle(&[1.0, 3.0, 2.0, 5.0, 4.0]);
        let b = slope_angle(&[100.0, 300.0, 200.0, 500.0, 400.0]);
        assert_approx(a, b, 1e-9);
    }

    #[test]
    fn non_finite_input_is_nan() {
        assert!(slope_angle(&[1.0, f64::NAN, 3.0, 4.0, 5.0]).is_nan());
    }

    #[test]
    fn rolling_angle_needs_five_points() {
        let series: Vec<Option<f64>> = (1..=6).map(|v| Some(v as f64)).collect();
        let out = rolling_angle(&series);
        assert!(out[..4].iter().all(Option::is_none));
        assert_approx(out[4].unwrap(), 45.0, DEFAULT_EPSILON);
        assert_approx(out[5].unwrap(), 45.0, DEFAULT_EPSILON);
    }

    #[test]
    fn rolling_angle_skips_gaps() {
        let series = vec![None, Some(1.0), Some(2.0), Some(3.0), Some(4.0), Some(5.0)];
        let out = rolling_angle(&series);
        assert_eq!(out[4], None);
        assert_approx(out[5].unwrap(), 45.0, DEFAULT_EPSILON);
    }
}
