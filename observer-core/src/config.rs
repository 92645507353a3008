//! Engine configuration.
//!
//! Passed into each engine at construction. Every field has a default, so a
//! partial TOML table is enough.

use serde::{Deserialize, Serialize};

/// Top-level engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub indicators: IndicatorConfig,
    pub signals: SignalConfig,
    pub decisions: DecisionConfig,
}

impl EngineConfig {
    /// Parse an engine configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

/// Which typical price the CCI runs on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypicalPrice {
    /// `(high + low + close) / 3`
    #[default]
    HighLowClose,
    /// `(high + close + close) / 3`
    HighCloseClose,
    /// `(highest_high_k + close + lowest_low_k) / 3`
    WindowHighLow,
}

/// How the first bar of a ticker gets a true range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FirstTrueRange {
    /// No previous close, no true range.
    #[default]
    Undefined,
    /// Use `high - low` for the first bar.
    HighLow,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorConfig {
    pub ma_fast: usize,
    pub ma_slow: usize,
    pub cci_period: usize,
    pub atr_period: usize,
    pub bollinger_period: usize,
    pub bollinger_width: f64,
    pub typical_price: TypicalPrice,
    pub first_true_range: FirstTrueRange,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            ma_fast: 5,
            ma_slow: 20,
            cci_period: 30,
            atr_period: 20,
            bollinger_period: 20,
            bollinger_width: 2.0,
            typical_price: TypicalPrice::default(),
            first_true_range: FirstTrueRange::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalConfig {
    /// Trailing rows each classifier sees, ending at the evaluated row.
    pub window: usize,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self { window: 30 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecisionConfig {
    /// Trailing rows the look-back composite rules scan.
    pub lookback: usize,
}

impl Default for DecisionConfig {
    fn default() -> Self {
        Self { lookback: 10 }
    }
}
