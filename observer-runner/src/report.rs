//! Run report: one `StepReport` per executed step.

use std::fmt::Write as _;

use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;

/// The six pipeline steps, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Download,
    Stage,
    Transform,
    Analyze,
    Decide,
    Notify,
}

impl Step {
    pub const ALL: [Step; 6] = [
        Step::Download,
        Step::Stage,
        Step::Transform,
        Step::Analyze,
        Step::Decide,
        Step::Notify,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Step::Download => "download",
            Step::Stage => "stage",
            Step::Transform => "transform",
            Step::Analyze => "analyze",
            Step::Decide => "decide",
            Step::Notify => "notify",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StepStatus {
    Success,
    Failure,
    Skipped,
    /// Started but not finished.
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Detail {
    Info(String),
    Warning(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TickerOutcome {
    Ok { rows: usize },
    Skipped { reason: String },
    Failed { reason: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    pub step: Step,
    pub started: DateTime<Utc>,
    pub finished: Option<DateTime<Utc>>,
    pub status: StepStatus,
    pub details: Vec<Detail>,
    pub tickers: Vec<(String, TickerOutcome)>,
    pub rows_written: usize,
    /// blake3 of the rows this step wrote, in write order.
    pub digest: Option<String>,
}

impl StepReport {
    pub fn start(step: Step) -> Self {
        tracing::info!(step = step.name(), "step started");
        Self {
            step,
            started: Utc::now(),
            finished: None,
            status: StepStatus::Unknown,
            details: Vec::new(),
            tickers: Vec::new(),
            rows_written: 0,
            digest: None,
        }
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.details.push(Detail::Info(message.into()));
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(step = self.step.name(), "{message}");
        self.details.push(Detail::Warning(message));
    }

    pub fn ticker(&mut self, ticker: &str, outcome: TickerOutcome) {
        match &outcome {
            TickerOutcome::Ok { .. } => {}
            TickerOutcome::Skipped { reason } => {
                tracing::warn!(step = self.step.name(), ticker = %ticker, reason = %reason, "ticker skipped");
            }
            TickerOutcome::Failed { reason } => {
                tracing::warn!(step = self.step.name(), ticker = %ticker, reason = %reason, "ticker failed");
            }
        }
        self.tickers.push((ticker.to_string(), outcome));
    }

    /// Record the rows this step persisted.
    pub fn written<R: Serialize>(&mut self, rows: &[R], inserted: usize) {
        self.rows_written += inserted;
        self.digest = Some(digest_rows(rows));
    }

    pub fn finish(&mut self, status: StepStatus) {
        self.finished = Some(Utc::now());
        self.status = status;
        tracing::info!(
            step = self.step.name(),
            status = ?status,
            rows = self.rows_written,
            elapsed = %format_elapsed(self.elapsed()),
            "step finished"
        );
    }

    pub fn mark_failure(&mut self, reason: impl Into<String>) {
        let reason = reason.into();
        tracing::warn!(step = self.step.name(), reason = %reason, "step failed");
        self.details.push(Detail::Warning(reason));
        self.finished = Some(Utc::now());
        self.status = StepStatus::Failure;
    }

    pub fn elapsed(&self) -> TimeDelta {
        self.finished.unwrap_or_else(Utc::now) - self.started
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub started: DateTime<Utc>,
    pub finished: Option<DateTime<Utc>>,
    pub steps: Vec<StepReport>,
    pub failed: bool,
}

impl Default for PipelineReport {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineReport {
    pub fn new() -> Self {
        Self {
            started: Utc::now(),
            finished: None,
            steps: Vec::new(),
            failed: false,
        }
    }

    pub fn push(&mut self, step: StepReport) {
        if step.status == StepStatus::Failure {
            self.failed = true;
        }
        self.steps.push(step);
    }

    /// Fail the run without a step to blame.
    pub fn mark_failure(&mut self, reason: impl Into<String>) {
        let reason = reason.into();
        tracing::warn!(reason = %reason, "run failed");
        self.failed = true;
    }

    pub fn step(&self, step: Step) -> Option<&StepReport> {
        self.steps.iter().find(|s| s.step == step)
    }

    pub fn is_success(&self) -> bool {
        !self.failed
    }

    pub fn finish(&mut self) {
        self.finished = Some(Utc::now());
        tracing::info!(
            success = self.is_success(),
            steps = self.steps.len(),
            elapsed = %format_elapsed(self.elapsed()),
            "run finished"
        );
    }

    pub fn elapsed(&self) -> TimeDelta {
        self.finished.unwrap_or_else(Utc::now) - self.started
    }

    /// Human-readable summary, one line per step plus per-ticker problems.
    pub fn summary(&self) -> String {
        let mut out = String::new();
        let verdict = if self.failed { "FAILED" } else { "OK" };
        let _ = writeln!(out, "run {verdict} in {}", format_elapsed(self.elapsed()));
        for step in &self.steps {
            let _ = writeln!(
                out,
                "  {:<10} {:<8} rows={:<6} {}",
                step.step.name(),
                format!("{:?}", step.status),
                step.rows_written,
                format_elapsed(step.elapsed()),
            );
            for detail in &step.details {
                match detail {
                    Detail::Info(m) => {
                        let _ = writeln!(out, "      {m}");
                    }
                    Detail::Warning(m) => {
                        let _ = writeln!(out, "      warning: {m}");
                    }
                }
            }
            for (ticker, outcome) in &step.tickers {
                match outcome {
                    TickerOutcome::Ok { .. } => {}
                    TickerOutcome::Skipped { reason } => {
                        let _ = writeln!(out, "      {ticker}: skipped ({reason})");
                    }
                    TickerOutcome::Failed { reason } => {
                        let _ = writeln!(out, "      {ticker}: failed ({reason})");
                    }
                }
            }
        }
        out
    }
}

/// `HHh:MMm:SS.sssS`
pub fn format_elapsed(elapsed: TimeDelta) -> String {
    let millis = elapsed.num_milliseconds().max(0);
    let hours = millis / 3_600_000;
    let minutes = (millis / 60_000) % 60;
    let seconds = (millis % 60_000) as f64 / 1000.0;
    format!("{hours:02}h:{minutes:02}m:{seconds:06.3}S")
}

/// blake3 over each row's JSON encoding, in order.
pub fn digest_rows<R: Serialize>(rows: &[R]) -> String {
    let mut hasher = blake3::Hasher::new();
    for row in rows {
        match serde_json::to_vec(row) {
            Ok(bytes) => {
                hasher.update(&bytes);
            }
            Err(e) => tracing::warn!(error = %e, "row left out of digest"),
        }
        hasher.update(b"\n");
    }
    hasher.finalize().to_hex().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_format() {
        assert_eq!(format_elapsed(TimeDelta::milliseconds(0)), "00h:00m:00.000S");
        assert_eq!(format_elapsed(TimeDelta::milliseconds(1_234)), "00h:00m:01.234S");
        assert_eq!(
            format_elapsed(TimeDelta::milliseconds(3_600_000 + 2 * 60_000 + 5_007)),
            "01h:02m:05.007S"
        );
    }

    #[test]
    fn failed_step_fails_the_run() {
        let mut report = PipelineReport::new();
        let mut ok = StepReport::start(Step::Download);
        ok.finish(StepStatus::Success);
        report.push(ok);
        assert!(report.is_success());

        let mut bad = StepReport::start(Step::Stage);
        bad.mark_failure("disk full");
        report.push(bad);
        assert!(!report.is_success());
        assert_eq!(report.step(Step::Stage).unwrap().status, StepStatus::Failure);
        assert!(report.summary().contains("warning: disk full"));
    }

    #[test]
    fn unfinished_step_is_unknown() {
        let step = StepReport::start(Step::Notify);
        assert_eq!(step.status, StepStatus::Unknown);
        assert!(step.finished.is_none());
    }

    #[test]
    fn summary_lists_ticker_problems() {
        let mut step = StepReport::start(Step::Transform);
        step.ticker("AAA", TickerOutcome::Ok { rows: 3 });
        step.ticker(
            "BBB",
            TickerOutcome::Skipped {
                reason: "no rows".into(),
            },
        );
        step.finish(StepStatus::Success);
        let mut report = PipelineReport::new();
        report.push(step);
        let summary = report.summary();
        assert!(summary.contains("BBB: skipped (no rows)"));
        assert!(!summary.contains("AAA"));
    }

    #[test]
    fn digest_is_order_sensitive() {
        let a = digest_rows(&[1, 2, 3]);
        assert_eq!(a, digest_rows(&[1, 2, 3]));
        assert_ne!(a, digest_rows(&[3, 2, 1]));
    }
}
