//! ATR-based signals: slope change of the ATR angle and candle size.

use super::ladder::{ATR_SLOPE_LADDER, CANDLE_LADDER};
use super::{pair, previous, today, PrimitiveSignal, SignalValue};
use crate::domain::{round_to, IndicatorRow};
use crate::error::EngineError;

/// Yesterday's ATR below this floor is replaced by it.
const MIN_ATR: f64 = 0.001;

/// `round(|atr_alpha_today - atr_alpha_yesterday|)` on the ATR slope ladder.
#[derive(Debug, Clone, Default)]
pub struct AtrSlopeChange;

impl PrimitiveSignal for AtrSlopeChange {
    fn name(&self) -> &'static str {
        "atr_slope_change"
    }

    fn evaluate(&self, window: &[IndicatorRow]) -> Result<SignalValue, EngineError> {
        let (today, yesterday) = pair(window, self.name(), |r| r.atr_alpha)?;
        let angle_diff = (today - yesterday).abs().round();
        Ok(SignalValue {
            code: ATR_SLOPE_LADDER.level(angle_diff),
            metric: Some(angle_diff),
        })
    }
}

/// Today's candle body over yesterday's ATR, on the candle ladder.
///
/// An ATR of exactly zero is floored to 0.001.
#[derive(Debug, Clone, Default)]
pub struct AtrCandleSize;

impl PrimitiveSignal for AtrCandleSize {
    fn name(&self) -> &'static str {
        "atr_candle_size"
    }

    fn evaluate(&self, window: &[IndicatorRow]) -> Result<SignalValue, EngineError> {
        let atr_yesterday = previous(window, self.name(), |r| r.atr)?;
        let atr = if atr_yesterday == 0.0 {
            MIN_ATR
        } else {
            atr_yesterday
        };
        let ratio = today(window)?.body() / atr;
        Ok(SignalValue {
            code: CANDLE_LADDER.level(ratio),
            metric: Some(round_to(ratio, 2)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signals::test_row;

    fn candle(body: f64, atr_yesterday: f64) -> Vec<IndicatorRow> {
        let mut y = test_row(0);
        y.atr = Some(atr_yesterday);
        let mut t = test_row(1);
        // open at zero keeps the body exact
        t.open = 0.0;
        t.close = body;
        t.high = body;
        t.low = 0.0;
        vec![y, t]
    }

    #[test]
    fn candle_ratio_boundaries() {
        assert_eq!(AtrCandleSize.evaluate(&candle(1.0, 1.0)).unwrap().code, 0);
        assert_eq!(AtrCandleSize.evaluate(&candle(1.55, 1.0)).unwrap().code, 2);
        assert_eq!(AtrCandleSize.evaluate(&candle(2.0, 1.0)).unwrap().code, 5);
        assert_eq!(AtrCandleSize.evaluate(&candle(1.2, 1.0)).unwrap().code, 1);
    }

    #[test]
    fn zero_atr_is_floored() {
        let out = AtrCandleSize.evaluate(&candle(0.5, 0.0)).unwrap();
        assert_eq!(out.code, 5);
        assert_eq!(out.metric, Some(500.0));
    }

    #[test]
    fn slope_change_rounds_before_ladder() {
        let mut y = test_row(0);
        y.atr_alpha = Some(10.0);
        let mut t = test_row(1);
        t.atr_alpha = Some(40.4);
        // 30.4 rounds to 30: still in the zero band
        let out = AtrSlopeChange.evaluate(&[y.clone(), t.clone()]).unwrap();
        assert_eq!(out.code, 0);
        assert_eq!(out.metric, Some(30.0));
        t.atr_alpha = Some(-40.0);
        assert_eq!(AtrSlopeChange.evaluate(&[y, t]).unwrap().code, 2);
    }

    #[test]
    fn only_yesterday_atr_is_required() {
        let mut rows = candle(1.55, 1.0);
        rows[1].atr = None;
        let out = AtrCandleSize.evaluate(&rows).unwrap();
        assert_eq!(out.code, 2);
        assert_eq!(out.metric, Some(1.55));
    }

    #[test]
    fn missing_yesterday_atr_is_insufficient() {
        let mut rows = candle(1.0, 1.0);
        rows[0].atr = None;
        assert!(matches!(
            AtrCandleSize.evaluate(&rows),
            Err(EngineError::InsufficientHistory { .. })
        ));
    }
}
