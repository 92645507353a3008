//! The six pipeline steps.
//!
//! Each step reads what earlier steps left in the store, works one ticker at
//! a time and writes only rows whose id is not stored yet. Per-ticker errors
//! are recorded and skipped; store errors fail the step.

use std::collections::HashSet;
use std::path::PathBuf;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use rayon::prelude::*;

use observer_core::data::{fetch_all, BarSource, HistoricalStore, Notifier, PersistenceSink};
use observer_core::domain::{Bar, DecisionRow, IndicatorRow, Row, SignalRow};
use observer_core::table::sort_rows;
use observer_core::{DecisionEngine, IndicatorEngine, SignalClassifier};

use crate::alert::render_alert;
use crate::config::ObserverConfig;
use crate::pipeline::PipelineError;
use crate::report::{StepReport, StepStatus, TickerOutcome};
use crate::snapshot::write_snapshot;

/// What one ticker produced in a step.
enum TickerWork<R> {
    Produced { all: Vec<R>, new: Vec<R> },
    Skipped(String),
}

/// Run `work` for every ticker, on the rayon pool when `parallel`.
fn for_each_ticker<R, F>(
    tickers: &[String],
    parallel: bool,
    work: F,
) -> Vec<(String, Result<TickerWork<R>, PipelineError>)>
where
    R: Send,
    F: Fn(&str) -> Result<TickerWork<R>, PipelineError> + Sync + Send,
{
    if parallel {
        tickers
            .par_iter()
            .map(|t| (t.clone(), work(t)))
            .collect()
    } else {
        tickers.iter().map(|t| (t.clone(), work(t))).collect()
    }
}

/// Record per-ticker outcomes; returns `(all, new)` sorted by `(ticker, date)`.
fn gather<R: Row>(
    report: &mut StepReport,
    results: Vec<(String, Result<TickerWork<R>, PipelineError>)>,
) -> (Vec<R>, Vec<R>) {
    let mut all = Vec::new();
    let mut new = Vec::new();
    for (ticker, result) in results {
        match result {
            Ok(TickerWork::Produced { all: a, new: n }) => {
                report.ticker(&ticker, TickerOutcome::Ok { rows: n.len() });
                all.extend(a);
                new.extend(n);
            }
            Ok(TickerWork::Skipped(reason)) => {
                report.ticker(&ticker, TickerOutcome::Skipped { reason });
            }
            Err(e) => {
                report.ticker(&ticker, TickerOutcome::Failed { reason: e.to_string() });
            }
        }
    }
    sort_rows(&mut all);
    sort_rows(&mut new);
    (all, new)
}

/// Ids of `R` rows already stored for `ticker` since `since`.
fn stored_ids<R: Row, S: HistoricalStore>(
    store: &S,
    ticker: &str,
    since: Option<NaiveDate>,
) -> Result<HashSet<String>, PipelineError> {
    Ok(store
        .query::<R>(ticker, since)?
        .iter()
        .map(|r| r.id().to_string())
        .collect())
}

/// The re-read window start: `latest` (or `fallback`) minus `days`.
fn window_start(latest: Option<NaiveDate>, fallback: Option<NaiveDate>, days: i64) -> Option<NaiveDate> {
    latest.or(fallback).map(|d| d - Duration::days(days))
}

/// Where Transform starts re-reading `bars` (ascending) after `latest`.
///
/// The earlier of `latest - days` and the date `warmup + 1` bars before the
/// first bar past `latest`, so new rows always see full indicator windows.
fn replay_start(bars: &[Bar], latest: Option<NaiveDate>, days: i64, warmup: usize) -> Option<NaiveDate> {
    let latest = latest?;
    let by_days = latest - Duration::days(days);
    let next = bars.partition_point(|b| b.date <= latest);
    match bars.get(next.saturating_sub(warmup + 1)) {
        Some(bar) => Some(bar.date.min(by_days)),
        None => Some(by_days),
    }
}

fn persist<R: Row, S: PersistenceSink>(
    store: &S,
    report: &mut StepReport,
    rows: &[R],
) -> Result<usize, PipelineError> {
    let inserted = store.upsert(rows)?;
    report.written(rows, inserted);
    report.info(format!("{inserted} row(s) written to {}", R::TABLE));
    Ok(inserted)
}

pub fn download(source: &dyn BarSource, tickers: &[String], report: &mut StepReport) -> (Vec<Bar>, StepStatus) {
    let (bars, summary) = fetch_all(source, tickers);
    for ticker in tickers {
        if let Some(skip) = summary.skipped.iter().find(|s| &s.ticker == ticker) {
            report.ticker(ticker, TickerOutcome::Skipped { reason: skip.reason.clone() });
        } else {
            let rows = bars.iter().filter(|b| &b.ticker == ticker).count();
            report.ticker(ticker, TickerOutcome::Ok { rows });
        }
    }
    if summary.rejected_bars > 0 {
        report.warn(format!("{} malformed bar(s) dropped", summary.rejected_bars));
    }
    report.info(format!(
        "{}/{} ticker(s) fetched from {}, {} bar(s)",
        summary.succeeded,
        summary.total,
        source.name(),
        bars.len()
    ));
    let status = if summary.total > 0 && summary.succeeded == 0 {
        StepStatus::Failure
    } else {
        StepStatus::Success
    };
    (bars, status)
}

pub fn stage<S: PersistenceSink>(
    store: &S,
    bars: &[Bar],
    report: &mut StepReport,
) -> Result<StepStatus, PipelineError> {
    if bars.is_empty() {
        report.info("nothing downloaded");
        return Ok(StepStatus::Skipped);
    }
    let mut bars = bars.to_vec();
    sort_rows(&mut bars);
    persist(store, report, &bars)?;
    Ok(StepStatus::Success)
}

pub fn transform<S: HistoricalStore + PersistenceSink>(
    store: &S,
    config: &ObserverConfig,
    engine: &IndicatorEngine,
    report: &mut StepReport,
) -> Result<StepStatus, PipelineError> {
    let tickers = store.tickers::<Bar>()?;
    let shift = config.transform_day_shift + config.buffer_days;

    let warmup = engine.warmup();

    let results = for_each_ticker(&tickers, config.parallel, |ticker| {
        let latest = store.latest_date::<IndicatorRow>(ticker)?;
        let mut bars = store.query::<Bar>(ticker, None)?;
        let since = replay_start(&bars, latest, shift, warmup);
        if let Some(since) = since {
            bars.retain(|b| b.date >= since);
        }
        if bars.is_empty() {
            return Ok(TickerWork::Skipped("no staged bars".into()));
        }
        let existing = stored_ids::<IndicatorRow, _>(store, ticker, since)?;
        let rows: Vec<IndicatorRow> = engine
            .compute_ticker(&bars)?
            .into_iter()
            .filter(|r| r.is_complete() && !existing.contains(&r.id))
            .map(|r| r.rounded(config.precision))
            .collect();
        Ok(TickerWork::Produced {
            all: Vec::new(),
            new: rows,
        })
    });

    let (_, new) = gather(report, results);
    persist(store, report, &new)?;
    Ok(StepStatus::Success)
}

pub fn analyze<S: HistoricalStore + PersistenceSink>(
    store: &S,
    config: &ObserverConfig,
    classifier: &SignalClassifier,
    at: DateTime<Utc>,
    report: &mut StepReport,
) -> Result<StepStatus, PipelineError> {
    let tickers = store.tickers::<IndicatorRow>()?;
    let shift = config.analyze_day_shift + config.buffer_days;

    let results = for_each_ticker(&tickers, config.parallel, |ticker| {
        let latest = store.latest_date::<SignalRow>(ticker)?;
        let since = window_start(latest, Some(config.analysis_start), shift);
        let rows = store.query::<IndicatorRow>(ticker, since)?;
        if rows.len() < 2 {
            return Ok(TickerWork::Skipped(format!("{} indicator row(s), need 2", rows.len())));
        }
        let existing = stored_ids::<SignalRow, _>(store, ticker, since)?;
        let all = classifier.classify_ticker(&rows)?;
        let new = all.iter().filter(|s| !existing.contains(&s.id)).cloned().collect();
        Ok(TickerWork::Produced { all, new })
    });

    let (all, new) = gather(report, results);
    if !all.is_empty() {
        let path = write_snapshot(&config.snapshot_dir, "analysis", at, &all)?;
        report.info(format!("snapshot {}", path.display()));
    }
    persist(store, report, &new)?;
    Ok(StepStatus::Success)
}

pub fn decide<S: HistoricalStore + PersistenceSink>(
    store: &S,
    config: &ObserverConfig,
    engine: &DecisionEngine,
    at: DateTime<Utc>,
    report: &mut StepReport,
) -> Result<(Vec<DecisionRow>, Option<PathBuf>), PipelineError> {
    let tickers = store.tickers::<SignalRow>()?;
    let shift = config.decide_day_shift + config.buffer_days;

    let results = for_each_ticker(&tickers, config.parallel, |ticker| {
        let latest = store.latest_date::<DecisionRow>(ticker)?;
        let since = window_start(latest, Some(config.decision_start), shift);
        let rows = store.query::<SignalRow>(ticker, since)?;
        if rows.is_empty() {
            return Ok(TickerWork::Skipped("no signal rows".into()));
        }
        let existing = stored_ids::<DecisionRow, _>(store, ticker, since)?;
        let new = engine
            .decide_ticker(&rows)?
            .into_iter()
            .filter(|d| !existing.contains(&d.id))
            .collect();
        Ok(TickerWork::Produced {
            all: Vec::new(),
            new,
        })
    });

    let (_, new) = gather(report, results);
    let snapshot = if new.is_empty() {
        None
    } else {
        let path = write_snapshot(&config.snapshot_dir, "decision", at, &new)?;
        report.info(format!("snapshot {}", path.display()));
        Some(path)
    };
    persist(store, report, &new)?;
    Ok((new, snapshot))
}

pub fn notify(
    notifier: &dyn Notifier,
    decisions: &[DecisionRow],
    snapshot: Option<PathBuf>,
    report: &mut StepReport,
) -> Result<StepStatus, PipelineError> {
    let Some(message) = render_alert(decisions) else {
        report.info("no new signals");
        return Ok(StepStatus::Skipped);
    };
    let attachments: Vec<PathBuf> = snapshot.into_iter().collect();
    notifier.send(&message, &attachments)?;
    let alerts = decisions.iter().filter(|d| d.has_alert()).count();
    report.info(format!("alert sent for {alerts} row(s)"));
    Ok(StepStatus::Success)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_start_prefers_latest() {
        let latest = NaiveDate::from_ymd_opt(2024, 3, 10);
        let fallback = NaiveDate::from_ymd_opt(2000, 1, 1);
        assert_eq!(window_start(latest, fallback, 10), NaiveDate::from_ymd_opt(2024, 2, 29));
        assert_eq!(window_start(None, fallback, 1), NaiveDate::from_ymd_opt(1999, 12, 31));
        assert_eq!(window_start(None, None, 5), None);
    }

    #[test]
    fn replay_covers_the_warmup() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let bars: Vec<Bar> = (0..100)
            .map(|i| {
                Bar::new("T", start + Duration::days(i * 3), 10.0, 11.0, 9.0, 10.0, 1)
            })
            .collect();
        let latest = bars[80].date;
        // 10 calendar days cover only 3 bars; the warmup needs 40
        assert_eq!(replay_start(&bars, Some(latest), 10, 40), Some(bars[40].date));
        // a long day shift wins when it reaches further back
        assert_eq!(
            replay_start(&bars, Some(latest), 300, 40),
            Some(latest - Duration::days(300))
        );
        assert_eq!(replay_start(&bars, None, 10, 40), None);
        assert_eq!(replay_start(&[], Some(latest), 10, 40), Some(latest - Duration::days(10)));
    }

    #[test]
    fn sequential_and_parallel_agree() {
        let tickers: Vec<String> = ["C", "A", "B"].iter().map(|s| s.to_string()).collect();
        let work = |t: &str| -> Result<TickerWork<u8>, PipelineError> {
            Ok(TickerWork::Skipped(t.to_lowercase()))
        };
        let names = |results: Vec<(String, Result<TickerWork<u8>, PipelineError>)>| {
            results.into_iter().map(|(t, _)| t).collect::<Vec<_>>()
        };
        assert_eq!(names(for_each_ticker(&tickers, false, work)), vec!["C", "A", "B"]);
        assert_eq!(names(for_each_ticker(&tickers, true, work)), vec!["C", "A", "B"]);
    }
}
