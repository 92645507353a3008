//! Keyed table helpers shared by every stage.
//!
//! `windowed` is the single rolling primitive: every indicator and angle is a
//! fixed-size trailing window over one ticker's date-ordered series.

use std::collections::{BTreeMap, HashSet};

use crate::domain::Row;
use crate::error::EngineError;

/// Apply `f` to each full trailing window of `values`.
///
/// Output has the same length as `values`. Positions with fewer than `window`
/// values (inclusive of themselves) are `None`, as is any window `f` rejects.
pub fn windowed<T, O, F>(values: &[T], window: usize, f: F) -> Vec<Option<O>>
where
    F: Fn(&[T]) -> Option<O>,
{
    if window == 0 {
        return values.iter().map(|_| None).collect();
    }
    (0..values.len())
        .map(|i| {
            if i + 1 < window {
                None
            } else {
                f(&values[i + 1 - window..=i])
            }
        })
        .collect()
}

/// The trailing slice of at most `window` items ending at `index` (inclusive).
pub fn trailing<T>(values: &[T], index: usize, window: usize) -> &[T] {
    let end = index + 1;
    let start = end.saturating_sub(window.max(1));
    &values[start..end]
}

/// Split rows by ticker, each group sorted ascending by date.
pub fn group_by_ticker<R: Row>(rows: Vec<R>) -> BTreeMap<String, Vec<R>> {
    let mut groups: BTreeMap<String, Vec<R>> = BTreeMap::new();
    for row in rows {
        groups.entry(row.ticker().to_string()).or_default().push(row);
    }
    for group in groups.values_mut() {
        group.sort_by_key(|r| r.date());
    }
    groups
}

/// Sort by `(ticker, date)`.
pub fn sort_rows<R: Row>(rows: &mut [R]) {
    rows.sort_by(|a, b| a.ticker().cmp(b.ticker()).then(a.date().cmp(&b.date())));
}

/// Drop rows whose `id` was already seen, keeping the first occurrence.
pub fn dedup_by_id<R: Row>(rows: Vec<R>) -> Vec<R> {
    let mut seen = HashSet::new();
    rows.into_iter()
        .filter(|r| seen.insert(r.id().to_string()))
        .collect()
}

/// A per-ticker series must hold one ticker, strictly ascending by date.
pub fn check_series<R: Row>(rows: &[R]) -> Result<(), EngineError> {
    let Some(first) = rows.first() else {
        return Ok(());
    };
    for pair in rows.windows(2) {
        if pair[1].ticker() != first.ticker() {
            return Err(EngineError::Computation(format!(
                "mixed tickers in one series: {} and {}",
                first.ticker(),
                pair[1].ticker()
            )));
        }
        if pair[1].date() <= pair[0].date() {
            return Err(EngineError::Computation(format!(
                "{} rows not strictly ascending at {}",
                first.ticker(),
                pair[1].date()
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Bar;
    use chrono::NaiveDate;

    fn bar(ticker: &str, day: u32, close: f64) -> Bar {
        let date = NaiveDate::from_ymd_opt(2024, 1, day).unwrap();
        Bar::new(ticker, date, close, close, close, close, 1)
    }

    #[test]
    fn windowed_requires_full_window() {
        let out = windowed(&[1, 2, 3, 4], 3, |w| Some(w.iter().sum::<i32>()));
        assert_eq!(out, vec![None, None, Some(6), Some(9)]);
    }

    #[test]
    fn windowed_zero_window_is_empty() {
        let out = windowed(&[1, 2], 0, |w| Some(w.len()));
        assert_eq!(out, vec![None, None]);
    }

    #[test]
    fn windowed_rejected_window_is_none() {
        let values = [Some(1.0), None, Some(3.0), Some(4.0)];
        let out = windowed(&values, 2, |w| {
            let xs: Option<Vec<f64>> = w.iter().copied().collect();
            xs.map(|xs| xs.iter().sum::<f64>())
        });
        assert_eq!(out, vec![None, None, None, Some(7.0)]);
    }

    #[test]
    fn trailing_clamps_at_start() {
        let values = [1, 2, 3, 4, 5];
        assert_eq!(trailing(&values, 1, 3), &[1, 2]);
        assert_eq!(trailing(&values, 4, 3), &[3, 4, 5]);
    }

    #[test]
    fn group_sorts_by_date() {
        let rows = vec![bar("B", 3, 1.0), bar("A", 2, 1.0), bar("B", 1, 1.0)];
        let groups = group_by_ticker(rows);
        assert_eq!(groups.len(), 2);
        let b: Vec<u32> = groups["B"].iter().map(|r| chrono::Datelike::day(&r.date)).collect();
        assert_eq!(b, vec![1, 3]);
    }

    #[test]
    fn dedup_keeps_first() {
        let rows = vec![bar("A", 2, 1.0), bar("A", 2, 2.0), bar("A", 3, 3.0)];
        let out = dedup_by_id(rows);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].close, 1.0);
    }

    #[test]
    fn check_series_rejects_duplicates_and_mixing() {
        assert!(check_series(&[bar("A", 1, 1.0), bar("A", 2, 1.0)]).is_ok());
        assert!(check_series(&[bar("A", 2, 1.0), bar("A", 2, 1.0)]).is_err());
        assert!(check_series(&[bar("A", 1, 1.0), bar("B", 2, 1.0)]).is_err());
        assert!(check_series::<Bar>(&[]).is_ok());
    }

    #[test]
    fn sort_by_ticker_then_date() {
        let mut rows = vec![bar("B", 1, 1.0), bar("A", 3, 1.0), bar("A", 2, 1.0)];
        sort_rows(&mut rows);
        let ids: Vec<&str> = rows.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["A-2024-01-02", "A-2024-01-03", "B-2024-01-01"]);
    }
}
