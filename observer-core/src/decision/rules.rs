//! The seven composite rules.
//!
//! Same-bar rules read only the evaluated row. Look-back rules scan the
//! trailing window oldest to newest, keeping a running max of a level signal
//! that starts at zero.

use crate::domain::SignalRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompositeRule {
    /// Upper band break times a rising price change.
    BbUpperPriceDiff,
    /// Lower band break times a falling price change.
    BbLowerPriceDiff,
    /// Candle size times price change; the sign carries the direction.
    AtrCandlePriceDiff,
    /// The MA cross signal unchanged.
    MaAngle,
    /// Last CCI trigger times the running max of ATR slope change.
    AtrAngleCci,
    /// Running max of MA cross times running max of ATR slope change.
    AtrAngleMa,
    /// Last CCI trigger times the running max of MA cross.
    CciMa,
}

impl CompositeRule {
    pub const ALL: [CompositeRule; 7] = [
        CompositeRule::BbUpperPriceDiff,
        CompositeRule::BbLowerPriceDiff,
        CompositeRule::AtrCandlePriceDiff,
        CompositeRule::MaAngle,
        CompositeRule::AtrAngleCci,
        CompositeRule::AtrAngleMa,
        CompositeRule::CciMa,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            CompositeRule::BbUpperPriceDiff => "bb_upper_pd",
            CompositeRule::BbLowerPriceDiff => "bb_lower_pd",
            CompositeRule::AtrCandlePriceDiff => "atr_candle_pd",
            CompositeRule::MaAngle => "ma_angle",
            CompositeRule::AtrAngleCci => "atr_angle_cci",
            CompositeRule::AtrAngleMa => "atr_angle_ma",
            CompositeRule::CciMa => "cci_ma",
        }
    }

    /// True for rules that scan more than the evaluated row.
    pub fn is_lookback(&self) -> bool {
        matches!(
            self,
            CompositeRule::AtrAngleCci | CompositeRule::AtrAngleMa | CompositeRule::CciMa
        )
    }

    /// Evaluate at the last row of `window`. An empty window yields 0.
    pub fn evaluate(&self, window: &[SignalRow]) -> i32 {
        let Some(row) = window.last() else {
            return 0;
        };
        let pd = i32::from(row.price_diff_signal);
        match self {
            CompositeRule::BbUpperPriceDiff if pd > 0 => i32::from(row.bb_upper_signal) * pd,
            CompositeRule::BbLowerPriceDiff if pd < 0 => i32::from(row.bb_lower_signal) * pd,
            CompositeRule::BbUpperPriceDiff | CompositeRule::BbLowerPriceDiff => 0,
            CompositeRule::AtrCandlePriceDiff => i32::from(row.atr_candle_size_signal) * pd,
            CompositeRule::MaAngle => i32::from(row.ma_signal),
            CompositeRule::AtrAngleCci => cci_trigger(window, |r| r.atr_slope_change_signal),
            CompositeRule::AtrAngleMa => {
                let ma = running_max(window, |r| r.ma_signal);
                let atr = running_max(window, |r| r.atr_slope_change_signal);
                ma * atr
            }
            CompositeRule::CciMa => cci_trigger(window, |r| r.ma_signal),
        }
    }
}

fn running_max(window: &[SignalRow], level: impl Fn(&SignalRow) -> i8) -> i32 {
    window
        .iter()
        .map(|r| i32::from(level(r)))
        .fold(0, i32::max)
}

/// Scan the window; on each `+1`/`-1` CCI bar the latch fires once with the
/// running max of `level` seen so far (inclusive) and is cleared. The last
/// firing wins. The running max itself is never reset.
fn cci_trigger(window: &[SignalRow], level: impl Fn(&SignalRow) -> i8) -> i32 {
    let mut level_max = 0;
    let mut signal = 0;
    for row in window {
        level_max = level_max.max(i32::from(level(row)));
        if row.cci_signal == 1 || row.cci_signal == -1 {
            signal = i32::from(row.cci_signal) * level_max;
        }
    }
    signal
}
