//! Day-over-day percent change of the mid-body price.

use super::ladder::PRICE_CHANGE_LADDER;
use super::{insufficient, pair, PrimitiveSignal, SignalValue};
use crate::domain::{round_to, IndicatorRow};
use crate::error::EngineError;

/// `pc = round(100 * (op_t - op_y) / op_y, 2)` on the symmetric price ladder.
#[derive(Debug, Clone, Default)]
pub struct PriceChange;

impl PrimitiveSignal for PriceChange {
    fn name(&self) -> &'static str {
        "price_diff"
    }

    fn evaluate(&self, window: &[IndicatorRow]) -> Result<SignalValue, EngineError> {
        let (today, yesterday) = pair(window, self.name(), |r| Some(r.op()))?;
        // a zero base price has no percent change; treat it like a missing one
        if yesterday == 0.0 {
            return Err(insufficient(super::today(window)?, self.name(), 2, 1));
        }
        let pc = round_to((today - yesterday) * 100.0 / yesterday, 2);
        Ok(SignalValue {
            code: PRICE_CHANGE_LADDER.signed_level(pc),
            metric: Some(pc),
        })
    }
}
