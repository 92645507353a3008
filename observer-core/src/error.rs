//! Engine error taxonomy.

use chrono::NaiveDate;
use thiserror::Error;

/// Errors raised by the indicator, signal and decision engines.
///
/// `InsufficientHistory` and `DataUnavailable` are recoverable and handled at
/// the signal or ticker boundary. `Computation` marks a broken caller contract.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error(
        "insufficient history for {ticker} at {date}: {signal} needs {required} rows, found {available}"
    )]
    InsufficientHistory {
        ticker: String,
        date: NaiveDate,
        signal: &'static str,
        required: usize,
        available: usize,
    },

    #[error("no bars available for {ticker}")]
    DataUnavailable { ticker: String },

    #[error("malformed bar {id}: {reason}")]
    MalformedBar { id: String, reason: String },

    #[error("computation error: {0}")]
    Computation(String),
}
