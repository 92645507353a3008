//! Yahoo Finance chart API source.
//!
//! One blocking request per ticker covering the last few calendar days.
//! There is no retry: a failed ticker is simply skipped for this run.

use chrono::{Duration, NaiveDate, Utc};
use serde::Deserialize;

use super::provider::{BarSource, DataError};
use crate::domain::Bar;

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    timestamp: Option<Vec<i64>>,
    indicators: Quotes,
}

#[derive(Debug, Deserialize)]
struct Quotes {
    quote: Vec<QuoteData>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    open: Vec<Option<f64>>,
    high: Vec<Option<f64>>,
    low: Vec<Option<f64>>,
    close: Vec<Option<f64>>,
    volume: Vec<Option<u64>>,
}

pub struct YahooSource {
    client: reqwest::blocking::Client,
    lookback_days: i64,
}

impl YahooSource {
    pub fn new(lookback_days: u32) -> Result<Self, DataError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()
            .map_err(|e| DataError::NetworkUnreachable(e.to_string()))?;
        Ok(Self {
            client,
            lookback_days: i64::from(lookback_days.max(1)),
        })
    }

    fn chart_url(ticker: &str, start: NaiveDate, end: NaiveDate) -> String {
        let start_ts = start.and_time(chrono::NaiveTime::MIN).and_utc().timestamp();
        let end_ts = (end + Duration::days(1))
            .and_time(chrono::NaiveTime::MIN)
            .and_utc()
            .timestamp();
        format!(
            "https://query2.finance.yahoo.com/v8/finance/chart/{ticker}\
             ?period1={start_ts}&period2={end_ts}&interval=1d"
        )
    }

    fn parse(ticker: &str, resp: ChartResponse) -> Result<Vec<Bar>, DataError> {
        let result = match (resp.chart.result, resp.chart.error) {
            (Some(result), _) => result,
            (None, Some(err)) if err.code == "Not Found" => {
                return Err(DataError::DataUnavailable {
                    ticker: ticker.to_string(),
                })
            }
            (None, Some(err)) => {
                return Err(DataError::ResponseFormatChanged(format!(
                    "{}: {}",
                    err.code, err.description
                )))
            }
            (None, None) => {
                return Err(DataError::ResponseFormatChanged(
                    "empty result with no error".into(),
                ))
            }
        };

        let Some(data) = result.into_iter().next() else {
            return Err(DataError::DataUnavailable {
                ticker: ticker.to_string(),
            });
        };
        let timestamps = data.timestamp.unwrap_or_default();
        let quote = data
            .indicators
            .quote
            .into_iter()
            .next()
            .ok_or_else(|| DataError::ResponseFormatChanged("no quote data".into()))?;

        let mut bars = Vec::with_capacity(timestamps.len());
        for (i, &ts) in timestamps.iter().enumerate() {
            let date = chrono::DateTime::from_timestamp(ts, 0)
                .map(|dt| dt.date_naive())
                .ok_or_else(|| DataError::ResponseFormatChanged(format!("invalid timestamp: {ts}")))?;
            let at = |v: &[Option<f64>]| v.get(i).copied().flatten();
            let (open, high, low, close) = (at(&quote.open), at(&quote.high), at(&quote.low), at(&quote.close));

            // Holidays come back as all-null rows.
            if open.is_none() && high.is_none() && low.is_none() && close.is_none() {
                continue;
            }
            bars.push(Bar::new(
                ticker,
                date,
                open.unwrap_or(f64::NAN),
                high.unwrap_or(f64::NAN),
                low.unwrap_or(f64::NAN),
                close.unwrap_or(f64::NAN),
                quote.volume.get(i).copied().flatten().unwrap_or(0),
            ));
        }

        if bars.is_empty() {
            return Err(DataError::DataUnavailable {
                ticker: ticker.to_string(),
            });
        }
        Ok(bars)
    }
}

impl BarSource for YahooSource {
    fn name(&self) -> &str {
        "yahoo"
    }

    fn fetch(&self, ticker: &str) -> Result<Vec<Bar>, DataError> {
        let end = Utc::now().date_naive();
        let start = end - Duration::days(self.lookback_days);
        let url = Self::chart_url(ticker, start, end);

        let resp = self
            .client
            .get(&url)
            .send()
            .map_err(|e| DataError::NetworkUnreachable(e.to_string()))?;
        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(DataError::DataUnavailable {
                ticker: ticker.to_string(),
            });
        }
        if !status.is_success() {
            return Err(DataError::NetworkUnreachable(format!("HTTP {status} for {ticker}")));
        }
        let chart: ChartResponse = resp.json().map_err(|e| {
            DataError::ResponseFormatChanged(format!("failed to parse response for {ticker}: {e}"))
        })?;
        Self::parse(ticker, chart)
    }
}
