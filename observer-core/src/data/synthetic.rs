//! Deterministic synthetic bars for offline runs and tests.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::provider::{BarSource, DataError};
use crate::domain::Bar;

/// A seeded random walk per ticker over a fixed date range, weekdays only.
///
/// The same ticker and range always produce the same bars.
#[derive(Debug, Clone)]
pub struct SyntheticSource {
    start: NaiveDate,
    end: NaiveDate,
}

impl SyntheticSource {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn generate(&self, ticker: &str) -> Vec<Bar> {
        let mut rng = StdRng::from_seed(*blake3::hash(ticker.as_bytes()).as_bytes());

        let mut bars = Vec::new();
        let mut price = rng.gen_range(20.0..200.0_f64);
        let mut current = self.start;
        while current <= self.end {
            if matches!(current.weekday(), Weekday::Sat | Weekday::Sun) {
                current += Duration::days(1);
                continue;
            }
            let daily_return: f64 = rng.gen_range(-0.03..0.03);
            let open = price;
            let close = price * (1.0 + daily_return);
            let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.01));
            let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.01));
            let volume = rng.gen_range(500_000..5_000_000u64);
            bars.push(Bar::new(ticker, current, open, high, low, close, volume));

            price = close;
            current += Duration::days(1);
        }
        bars
    }
}

impl BarSource for SyntheticSource {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn fetch(&self, ticker: &str) -> Result<Vec<Bar>, DataError> {
        let bars = self.generate(ticker);
        if bars.is_empty() {
            return Err(DataError::DataUnavailable {
                ticker: ticker.to_string(),
            });
        }
        Ok(bars)
    }
}
