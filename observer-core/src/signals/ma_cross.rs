//! Moving average cross gated by the angle between the two averages.

use super::ladder::MA_ANGLE_LADDER;
use super::{insufficient, pair, today, PrimitiveSignal, SignalValue};
use crate::domain::IndicatorRow;
use crate::error::EngineError;

/// Fires when fast and slow averages swap order between yesterday and today.
///
/// The level is today's `round(|fast_alpha - slow_alpha|)` on the angle
/// ladder. Equal averages on either day are not a cross.
#[derive(Debug, Clone, Default)]
pub struct MaCross;

impl PrimitiveSignal for MaCross {
    fn name(&self) -> &'static str {
        "ma_cross"
    }

    fn evaluate(&self, window: &[IndicatorRow]) -> Result<SignalValue, EngineError> {
        let ((fast_t, slow_t), (fast_y, slow_y)) =
            pair(window, self.name(), |r| Some((r.ma_fast?, r.ma_slow?)))?;
        let row = today(window)?;
        let Some(alpha_gap) = row
            .ma_fast_alpha
            .zip(row.ma_slow_alpha)
            .map(|(fast, slow)| (fast - slow).abs())
        else {
            return Err(insufficient(row, self.name(), 2, 1));
        };

        let crossed_up = fast_y < slow_y && fast_t > slow_t;
        let crossed_down = fast_y > slow_y && fast_t < slow_t;
        let angle_diff = alpha_gap.round();
        let code = if crossed_up || crossed_down {
            MA_ANGLE_LADDER.level(angle_diff)
        } else {
            0
        };
        Ok(SignalValue {
            code,
            metric: Some(angle_diff),
        })
    }
}
