//! Component traits shared across engines.

pub mod indicator;

pub use indicator::{Indicator, IndicatorValues};
