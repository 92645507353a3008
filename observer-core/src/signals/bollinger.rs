//! Bollinger band breakout: the candle body pierces a band.

use super::{insufficient, today, PrimitiveSignal, SignalValue};
use crate::domain::IndicatorRow;
use crate::error::EngineError;
use crate::indicators::BollingerBand;

/// `1` when `max(open, close) > upper` (or `min(open, close) < lower`), else `0`.
#[derive(Debug, Clone)]
pub struct BandBreakout {
    band: BollingerBand,
}

impl BandBreakout {
    pub fn upper() -> Self {
        Self {
            band: BollingerBand::Upper,
        }
    }

    pub fn lower() -> Self {
        Self {
            band: BollingerBand::Lower,
        }
    }
}

impl PrimitiveSignal for BandBreakout {
    fn name(&self) -> &'static str {
        match self.band {
            BollingerBand::Upper => "bb_upper",
            BollingerBand::Lower => "bb_lower",
        }
    }

    fn evaluate(&self, window: &[IndicatorRow]) -> Result<SignalValue, EngineError> {
        let row = today(window)?;
        let broke = match self.band {
            BollingerBand::Upper => row.bb_upper.map(|band| row.open.max(row.close) > band),
            BollingerBand::Lower => row.bb_lower.map(|band| row.open.min(row.close) < band),
        };
        match broke {
            Some(broke) => Ok(SignalValue {
                code: i8::from(broke),
                metric: None,
            }),
            None => Err(insufficient(row, self.name(), 1, 0)),
        }
    }
}
