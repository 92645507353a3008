//! Bar: one ticker's trading day.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::rows::{Row, Table};
use crate::error::EngineError;

/// OHLCV bar for a single ticker on a single trading day.
///
/// `id` is `"{ticker}-{date}"` and is unique across the whole table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub id: String,
    pub ticker: String,
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl Bar {
    pub fn new(
        ticker: impl Into<String>,
        date: NaiveDate,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: u64,
    ) -> Self {
        let ticker = ticker.into();
        Self {
            id: row_id(&ticker, date),
            ticker,
            date,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Mid-body price `(open + close) / 2`, the series every moving average runs on.
    pub fn op(&self) -> f64 {
        (self.open + self.close) / 2.0
    }

    /// Candle body size `|open - close|`.
    pub fn body(&self) -> f64 {
        (self.open - self.close).abs()
    }

    /// Returns true if any OHLC field is NaN or infinite.
    pub fn is_void(&self) -> bool {
        !(self.open.is_finite()
            && self.high.is_finite()
            && self.low.is_finite()
            && self.close.is_finite())
    }

    /// `high >= max(open, close) >= min(open, close) >= low`, all finite.
    pub fn is_sane(&self) -> bool {
        self.validate().is_ok()
    }

    /// Check the OHLC invariant, naming the violated condition.
    pub fn validate(&self) -> Result<(), EngineError> {
        let reason = if self.is_void() {
            Some("non-finite OHLC value")
        } else if self.high < self.open.max(self.close) {
            Some("high below body")
        } else if self.low > self.open.min(self.close) {
            Some("low above body")
        } else if self.id != row_id(&self.ticker, self.date) {
            Some("id does not match ticker and date")
        } else {
            None
        };
        match reason {
            Some(reason) => Err(EngineError::MalformedBar {
                id: self.id.clone(),
                reason: reason.to_string(),
            }),
            None => Ok(()),
        }
    }
}

impl Row for Bar {
    const TABLE: Table = Table::Stage;

    fn id(&self) -> &str {
        &self.id
    }

    fn ticker(&self) -> &str {
        &self.ticker
    }

    fn date(&self) -> NaiveDate {
        self.date
    }
}

/// Primary key shared by every table: `"{ticker}-{date}"`.
pub fn row_id(ticker: &str, date: NaiveDate) -> String {
    format!("{ticker}-{}", date.format("%Y-%m-%d"))
}
