//! Pipeline orchestration: runs the selected steps in order over one store.

use std::path::PathBuf;

use thiserror::Error;

use observer_core::data::{BarSource, DataError, HistoricalStore, Notifier, PersistenceSink};
use observer_core::domain::{Bar, DecisionRow};
use observer_core::{DecisionEngine, EngineError, IndicatorEngine, SignalClassifier};

use crate::config::ObserverConfig;
use crate::report::{PipelineReport, Step, StepReport, StepStatus};
use crate::stages;

/// Failures that end a step.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Data(#[from] DataError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("snapshot failed: {0:#}")]
    Snapshot(#[from] anyhow::Error),
}

/// Which steps a run executes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepSelection {
    pub download: bool,
    pub stage: bool,
    pub transform: bool,
    pub analyze: bool,
    pub decide: bool,
    pub notify: bool,
}

impl StepSelection {
    pub fn all() -> Self {
        Self {
            download: true,
            stage: true,
            transform: true,
            analyze: true,
            decide: true,
            notify: true,
        }
    }

    pub fn only(steps: &[Step]) -> Self {
        let mut selection = Self::default();
        for step in steps {
            *selection.flag(*step) = true;
        }
        selection
    }

    pub fn contains(&self, step: Step) -> bool {
        match step {
            Step::Download => self.download,
            Step::Stage => self.stage,
            Step::Transform => self.transform,
            Step::Analyze => self.analyze,
            Step::Decide => self.decide,
            Step::Notify => self.notify,
        }
    }

    pub fn is_empty(&self) -> bool {
        !Step::ALL.iter().any(|s| self.contains(*s))
    }

    fn flag(&mut self, step: Step) -> &mut bool {
        match step {
            Step::Download => &mut self.download,
            Step::Stage => &mut self.stage,
            Step::Transform => &mut self.transform,
            Step::Analyze => &mut self.analyze,
            Step::Decide => &mut self.decide,
            Step::Notify => &mut self.notify,
        }
    }
}

/// Values handed from one step to the next within a run.
#[derive(Default)]
struct RunState {
    downloaded: Vec<Bar>,
    decisions: Vec<DecisionRow>,
    decision_snapshot: Option<PathBuf>,
}

pub struct Pipeline<'a, S> {
    config: &'a ObserverConfig,
    store: &'a S,
    source: &'a dyn BarSource,
    notifier: &'a dyn Notifier,
    indicators: IndicatorEngine,
    classifier: SignalClassifier,
    decisions: DecisionEngine,
}

impl<'a, S: HistoricalStore + PersistenceSink> Pipeline<'a, S> {
    pub fn new(
        config: &'a ObserverConfig,
        store: &'a S,
        source: &'a dyn BarSource,
        notifier: &'a dyn Notifier,
    ) -> Self {
        Self {
            config,
            store,
            source,
            notifier,
            indicators: IndicatorEngine::new(&config.engine.indicators),
            classifier: SignalClassifier::new(&config.engine.signals),
            decisions: DecisionEngine::new(&config.engine.decisions),
        }
    }

    /// Run the selected steps. A failed step ends the run.
    pub fn run(&self, tickers: &[String], selection: StepSelection) -> PipelineReport {
        let mut report = PipelineReport::new();
        let mut state = RunState::default();
        tracing::info!(tickers = tickers.len(), source = self.source.name(), "run started");

        for step in Step::ALL.into_iter().filter(|s| selection.contains(*s)) {
            let mut step_report = StepReport::start(step);
            match self.execute(step, tickers, &mut state, &report, &mut step_report) {
                Ok(status) => step_report.finish(status),
                Err(e) => step_report.mark_failure(e.to_string()),
            }
            let failed = step_report.status == StepStatus::Failure;
            report.push(step_report);
            if failed {
                break;
            }
        }

        report.finish();
        report
    }

    fn execute(
        &self,
        step: Step,
        tickers: &[String],
        state: &mut RunState,
        run: &PipelineReport,
        report: &mut StepReport,
    ) -> Result<StepStatus, PipelineError> {
        match step {
            Step::Download => {
                let (bars, status) = stages::download(self.source, tickers, report);
                state.downloaded = bars;
                Ok(status)
            }
            Step::Stage => stages::stage(self.store, &state.downloaded, report),
            Step::Transform => stages::transform(self.store, self.config, &self.indicators, report),
            Step::Analyze => {
                stages::analyze(self.store, self.config, &self.classifier, run.started, report)
            }
            Step::Decide => {
                let (decisions, snapshot) =
                    stages::decide(self.store, self.config, &self.decisions, run.started, report)?;
                state.decisions = decisions;
                state.decision_snapshot = snapshot;
                Ok(StepStatus::Success)
            }
            Step::Notify => stages::notify(
                self.notifier,
                &state.decisions,
                state.decision_snapshot.take(),
                report,
            ),
        }
    }
}
