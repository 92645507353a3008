//! Collaborator error type, the bar source trait and the batch fetch loop.
//!
//! Sources are interchangeable: the pipeline only sees `BarSource`, so the
//! Yahoo chart API and the synthetic walk can be swapped and mocked in tests.

use serde::Serialize;
use thiserror::Error;

use crate::domain::Bar;

/// Failures raised by sources, stores and notifiers.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("no bars available for {ticker}")]
    DataUnavailable { ticker: String },

    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("store error: {0}")]
    Store(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("notification failed: {0}")]
    Notification(String),
}

impl From<serde_json::Error> for DataError {
    fn from(e: serde_json::Error) -> Self {
        DataError::Serialization(e.to_string())
    }
}

/// Something that can produce daily bars for a ticker.
pub trait BarSource: Send + Sync {
    /// Human-readable name of this source.
    fn name(&self) -> &str;

    /// Fetch recent daily bars for one ticker, ascending by date.
    fn fetch(&self, ticker: &str) -> Result<Vec<Bar>, DataError>;
}

/// A ticker left out of a batch and why.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedTicker {
    pub ticker: String,
    pub reason: String,
}

/// Outcome counts of one `fetch_all` call.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FetchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub skipped: Vec<SkippedTicker>,
    /// Bars dropped for breaking the OHLC invariant.
    pub rejected_bars: usize,
}

/// Fetch every ticker in turn. Failures are logged and recorded, never fatal.
pub fn fetch_all(source: &dyn BarSource, tickers: &[String]) -> (Vec<Bar>, FetchSummary) {
    let mut summary = FetchSummary {
        total: tickers.len(),
        ..FetchSummary::default()
    };
    let mut bars = Vec::new();

    for ticker in tickers {
        match source.fetch(ticker) {
            Ok(fetched) => {
                let before = fetched.len();
                for bar in fetched {
                    match bar.validate() {
                        Ok(()) => bars.push(bar),
                        Err(e) => {
                            summary.rejected_bars += 1;
                            tracing::warn!(ticker = %ticker, error = %e, "dropping bar");
                        }
                    }
                }
                tracing::debug!(ticker = %ticker, source = source.name(), bars = before, "fetched");
                summary.succeeded += 1;
            }
            Err(e) => {
                tracing::warn!(ticker = %ticker, source = source.name(), error = %e, "fetch failed");
                summary.skipped.push(SkippedTicker {
                    ticker: ticker.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }
    (bars, summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    struct Fixed;

    impl BarSource for Fixed {
        fn name(&self) -> &str {
            "fixed"
        }

        fn fetch(&self, ticker: &str) -> Result<Vec<Bar>, DataError> {
            if ticker == "GONE" {
                return Err(DataError::DataUnavailable {
                    ticker: ticker.into(),
                });
            }
            let d = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
            Ok(vec![
                Bar::new(ticker, d, 10.0, 11.0, 9.0, 10.5, 100),
                // high below the body
                Bar::new(ticker, d.succ_opt().unwrap(), 10.0, 9.5, 9.0, 10.5, 100),
            ])
        }
    }

    #[test]
    fn failures_are_recorded_not_fatal() {
        let tickers = vec!["AAA".to_string(), "GONE".to_string(), "BBB".to_string()];
        let (bars, summary) = fetch_all(&Fixed, &tickers);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.skipped.len(), 1);
        assert_eq!(summary.skipped[0].ticker, "GONE");
        assert_eq!(summary.rejected_bars, 2);
        assert_eq!(bars.len(), 2);
    }
}
