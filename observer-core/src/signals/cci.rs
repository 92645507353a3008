//! CCI crossing: a three-state latch folded over the CCI series.
//!
//! Crossing above +100 arms the high latch; a later drop below -50 fires `-1`
//! and clears it. Crossing below -100 arms the low latch; a later rise above
//! +50 fires `+1` and clears it. A bar that fires can arm the opposite latch.

use super::{insufficient, today, PrimitiveSignal, SignalValue};
use crate::domain::IndicatorRow;
use crate::error::EngineError;

const ARM_LEVEL: f64 = 100.0;
const FIRE_LEVEL: f64 = 50.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CciLatch {
    #[default]
    Idle,
    ArmedHigh,
    ArmedLow,
}

impl CciLatch {
    /// Advance by one CCI observation, returning the next state and the code emitted on this bar.
    pub fn step(self, cci: f64) -> (Self, i8) {
        match self {
            CciLatch::Idle if cci > ARM_LEVEL => (CciLatch::ArmedHigh, 0),
            CciLatch::Idle if cci < -ARM_LEVEL => (CciLatch::ArmedLow, 0),
            CciLatch::Idle => (CciLatch::Idle, 0),
            CciLatch::ArmedHigh if cci < -FIRE_LEVEL => {
                let next = if cci < -ARM_LEVEL {
                    CciLatch::ArmedLow
                } else {
                    CciLatch::Idle
                };
                (next, -1)
            }
            CciLatch::ArmedHigh => (CciLatch::ArmedHigh, 0),
            CciLatch::ArmedLow if cci > FIRE_LEVEL => {
                let next = if cci > ARM_LEVEL {
                    CciLatch::ArmedHigh
                } else {
                    CciLatch::Idle
                };
                (next, 1)
            }
            CciLatch::ArmedLow => (CciLatch::ArmedLow, 0),
        }
    }

    /// Per-observation codes for a series, starting idle.
    pub fn scan(values: &[f64]) -> Vec<i8> {
        values
            .iter()
            .scan(CciLatch::Idle, |state, &cci| {
                let (next, code) = state.step(cci);
                *state = next;
                Some(code)
            })
            .collect()
    }
}

/// Emits the latch code of the evaluated row after scanning the window.
///
/// Rows in the window without a CCI value are not observations.
#[derive(Debug, Clone, Default)]
pub struct CciCross;

impl PrimitiveSignal for CciCross {
    fn name(&self) -> &'static str {
        "cci"
    }

    fn evaluate(&self, window: &[IndicatorRow]) -> Result<SignalValue, EngineError> {
        let row = today(window)?;
        if row.cci.is_none() {
            return Err(insufficient(row, self.name(), 1, 0));
        }
        let series: Vec<f64> = window.iter().filter_map(|r| r.cci).collect();
        let code = CciLatch::scan(&series).last().copied().unwrap_or(0);
        Ok(SignalValue { code, metric: None })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_once_on_drop_after_high() {
        assert_eq!(CciLatch::scan(&[110.0, 90.0, -60.0]), vec![0, 0, -1]);
    }

    #[test]
    fn no_fire_without_crossing_fire_level() {
        let series = [150.0, 40.0, -50.0, 0.0, 50.0, -20.0];
        assert!(CciLatch::scan(&series).iter().all(|&c| c == 0));
    }

    #[test]
    fn fires_once_on_rise_after_low() {
        assert_eq!(CciLatch::scan(&[-120.0, -80.0, 60.0, 70.0]), vec![0, 0, 1, 0]);
    }

    #[test]
    fn firing_bar_can_arm_opposite_latch() {
        // -150 fires -1 and arms low; 120 then fires +1 and arms high.
        assert_eq!(CciLatch::scan(&[120.0, -150.0, 120.0, -60.0]), vec![0, -1, 1, -1]);
    }

    #[test]
    fn latch_clears_after_firing() {
        assert_eq!(CciLatch::scan(&[110.0, -60.0, -70.0, -80.0]), vec![0, -1, 0, 0]);
    }

    #[test]
    fn boundaries_are_strict() {
        assert_eq!(CciLatch::Idle.step(100.0), (CciLatch::Idle, 0));
        assert_eq!(CciLatch::ArmedHigh.step(-50.0), (CciLatch::ArmedHigh, 0));
        assert_eq!(CciLatch::ArmedLow.step(50.0), (CciLatch::ArmedLow, 0));
    }
}
