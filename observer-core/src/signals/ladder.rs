//! Threshold ladders that map a continuous metric to a signal level.
//!
//! A ladder has a zero band and four ascending steps. Past the zero band the
//! level is `1 + (number of steps reached)`, so levels run `0..=5`. Each step
//! interval is half-open `[step, next_step)`.

/// Where level 0 ends.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ZeroBand {
    /// `x <= bound` is level 0.
    UpTo(f64),
    /// `x < bound` is level 0.
    Below(f64),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ladder {
    zero: ZeroBand,
    steps: [f64; 4],
}

impl Ladder {
    pub const fn new(zero: ZeroBand, steps: [f64; 4]) -> Self {
        Self { zero, steps }
    }

    /// Level of a non-negative metric, `0..=5`. NaN maps to 0.
    pub fn level(&self, x: f64) -> i8 {
        let in_zero = match self.zero {
            ZeroBand::UpTo(bound) => x.is_nan() || x <= bound,
            ZeroBand::Below(bound) => x.is_nan() || x < bound,
        };
        if in_zero {
            return 0;
        }
        1 + self.steps.iter().filter(|&&step| x >= step).count() as i8
    }

    /// Symmetric level: negative metrics map to `-level(-x)`, `-5..=5`.
    pub fn signed_level(&self, x: f64) -> i8 {
        if x < 0.0 {
            -self.level(-x)
        } else {
            self.level(x)
        }
    }
}

/// MA cross angle difference: `<=10 -> 0`, `(10,45) -> 1`, ..., `>=90 -> 5`.
pub const MA_ANGLE_LADDER: Ladder = Ladder::new(ZeroBand::UpTo(10.0), [45.0, 60.0, 75.0, 90.0]);

/// ATR angle change: `<=30 -> 0`, `(30,45) -> 1`, ..., `>=90 -> 5`.
pub const ATR_SLOPE_LADDER: Ladder = Ladder::new(ZeroBand::UpTo(30.0), [45.0, 60.0, 75.0, 90.0]);

/// Candle body over yesterday's ATR: `<=1 -> 0`, `(1,1.55) -> 1`, ..., `>=2 -> 5`.
pub const CANDLE_LADDER: Ladder = Ladder::new(ZeroBand::UpTo(1.0), [1.55, 1.7, 1.85, 2.0]);

/// Percent change of the mid-body price, symmetric: `(-3,3) -> 0`, `[3,5) -> 1`,
/// ..., `>=12 -> 5`, `(-5,-3] -> -1`, ..., `<=-12 -> -5`.
pub const PRICE_CHANGE_LADDER: Ladder =
    Ladder::new(ZeroBand::Below(3.0), [5.0, 7.5, 10.0, 12.0]);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ma_angle_boundaries() {
        let l = MA_ANGLE_LADDER;
        assert_eq!(l.level(0.0), 0);
        assert_eq!(l.level(10.0), 0);
        assert_eq!(l.level(11.0), 1);
        assert_eq!(l.level(44.0), 1);
        assert_eq!(l.level(45.0), 2);
        assert_eq!(l.level(59.0), 2);
        assert_eq!(l.level(60.0), 3);
        assert_eq!(l.level(75.0), 4);
        assert_eq!(l.level(89.0), 4);
        assert_eq!(l.level(90.0), 5);
        assert_eq!(l.level(180.0), 5);
    }

    #[test]
    fn atr_slope_boundaries() {
        let l = ATR_SLOPE_LADDER;
        assert_eq!(l.level(30.0), 0);
        assert_eq!(l.level(31.0), 1);
        assert_eq!(l.level(45.0), 2);
        assert_eq!(l.level(90.0), 5);
    }

    #[test]
    fn candle_boundaries() {
        let l = CANDLE_LADDER;
        assert_eq!(l.level(1.0), 0);
        assert_eq!(l.level(1.2), 1);
        assert_eq!(l.level(1.55), 2);
        assert_eq!(l.level(1.7), 3);
        assert_eq!(l.level(1.85), 4);
        assert_eq!(l.level(1.99), 4);
        assert_eq!(l.level(2.0), 5);
    }

    #[test]
    fn price_change_boundaries() {
        let l = PRICE_CHANGE_LADDER;
        let cases = [
            (-15.0, -5),
            (-12.0, -5),
            (-11.0, -4),
            (-10.0, -4),
            (-7.5, -3),
            (-5.0, -2),
            (-4.0, -1),
            (-3.0, -1),
            (-2.99, 0),
            (0.0, 0),
            (2.99, 0),
            (3.0, 1),
            (5.0, 2),
            (7.5, 3),
            (10.0, 4),
            (11.99, 4),
            (12.0, 5),
        ];
        for (pc, expected) in cases {
            assert_eq!(l.signed_level(pc), expected, "pc = {pc}");
        }
    }

    #[test]
    fn nan_is_level_zero() {
        assert_eq!(CANDLE_LADDER.level(f64::NAN), 0);
        assert_eq!(PRICE_CHANGE_LADDER.signed_level(f64::NAN), 0);
    }
}
