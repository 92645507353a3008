//! Property tests for the numeric building blocks.
//!
//! Uses proptest to verify:
//! 1. Ladder levels are bounded, monotone and symmetric
//! 2. The slope estimator stays inside (-90, 90) and ignores affine rescaling
//! 3. Rolling windows never emit a value from a partial window
//! 4. The CCI latch only fires from the matching armed state

use observer_core::config::FirstTrueRange;
use observer_core::domain::Bar;
use observer_core::indicators::{rolling, slope_angle, true_range, Aggregation};
use observer_core::signals::{
    CciLatch, Ladder, ATR_SLOPE_LADDER, CANDLE_LADDER, MA_ANGLE_LADDER, PRICE_CHANGE_LADDER,
};
use proptest::prelude::*;

const LADDERS: [Ladder; 4] = [MA_ANGLE_LADDER, ATR_SLOPE_LADDER, CANDLE_LADDER, PRICE_CHANGE_LADDER];

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_points() -> impl Strategy<Value = [f64; 5]> {
    prop::array::uniform5(-1000.0..1000.0_f64)
}

fn arb_series() -> impl Strategy<Value = Vec<Option<f64>>> {
    prop::collection::vec(prop::option::weighted(0.9, -100.0..100.0_f64), 0..60)
}

// ── 1. Ladders ───────────────────────────────────────────────────────

proptest! {
    #[test]
    fn ladder_levels_bounded(x in -500.0..500.0_f64) {
        for ladder in LADDERS {
            let level = ladder.level(x.abs());
            prop_assert!((0..=5).contains(&level));
            let signed = ladder.signed_level(x);
            prop_assert!((-5..=5).contains(&signed));
        }
    }

    #[test]
    fn ladder_monotone(a in 0.0..200.0_f64, b in 0.0..200.0_f64) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        for ladder in LADDERS {
            prop_assert!(ladder.level(lo) <= ladder.level(hi));
        }
    }

    #[test]
    fn signed_ladder_symmetric(x in 0.001..200.0_f64) {
        prop_assert_eq!(PRICE_CHANGE_LADDER.signed_level(-x), -PRICE_CHANGE_LADDER.signed_level(x));
    }
}

// ── 2. Slope estimator ───────────────────────────────────────────────

proptest! {
    #[test]
    fn slope_angle_in_range(points in arb_points()) {
        let angle = slope_angle(&points);
        prop_assert!(angle.is_finite());
        prop_assert!(angle > -90.0 && angle < 90.0);
    }

    #[test]
    fn slope_angle_scale_invariant(
        points in arb_points(),
        scale in 0.01..100.0_f64,
        shift in -1000.0..1000.0_f64,
    ) {
        let spread = points.iter().copied().fold(f64::NEG_INFINITY, f64::max)
            - points.iter().copied().fold(f64::INFINITY, f64::min);
        prop_assume!(spread > 1.0);
        let moved = points.map(|p| p * scale + shift);
        prop_assert!((slope_angle(&points) - slope_angle(&moved)).abs() < 1e-6);
    }
}

// ── 3. Window sufficiency ────────────────────────────────────────────

proptest! {
    #[test]
    fn rolling_never_uses_partial_windows(series in arb_series(), window in 1usize..25) {
        let out = rolling(&series, window, Aggregation::Mean);
        prop_assert_eq!(out.len(), series.len());
        for (i, value) in out.iter().enumerate() {
            if value.is_some() {
                prop_assert!(i + 1 >= window);
                prop_assert!(series[i + 1 - window..=i].iter().all(Option::is_some));
            }
        }
    }

    #[test]
    fn true_range_is_non_negative(
        closes in prop::collection::vec(10.0..200.0_f64, 1..40),
        spread in 0.0..5.0_f64,
    ) {
        let date = chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let bars: Vec<Bar> = closes
            .iter()
            .enumerate()
            .map(|(i, &c)| {
                Bar::new("P", date + chrono::Duration::days(i as i64), c, c + spread, c - spread, c, 1)
            })
            .collect();
        let tr = true_range(&bars, FirstTrueRange::HighLow);
        prop_assert!(tr.iter().flatten().all(|v| *v >= 0.0));
    }
}

// ── 4. CCI latch ─────────────────────────────────────────────────────

proptest! {
    #[test]
    fn latch_fires_only_when_armed(cci in prop::collection::vec(-300.0..300.0_f64, 0..80)) {
        let mut state = CciLatch::Idle;
        for value in cci {
            let (next, code) = state.step(value);
            match code {
                0 => {}
                -1 => prop_assert_eq!(state, CciLatch::ArmedHigh),
                1 => prop_assert_eq!(state, CciLatch::ArmedLow),
                other => prop_assert!(false, "unexpected code {}", other),
            }
            // a firing bar never leaves the same latch armed
            if code != 0 {
                prop_assert_ne!(next, state);
            }
            state = next;
        }
    }
}
