//! Observer Runner: the download-to-notify pipeline on top of `observer-core`.
//!
//! This crate provides:
//! - TOML configuration with ticker lists and table names
//! - A CSV table store with atomic writes
//! - The six pipeline steps and the run report
//! - CSV snapshots, alert rendering and a file outbox notifier

pub mod alert;
pub mod config;
pub mod notify;
pub mod pipeline;
pub mod report;
pub mod snapshot;
pub mod stages;
pub mod store;

pub use config::{ConfigError, ObserverConfig, TableNames};
pub use notify::OutboxNotifier;
pub use pipeline::{Pipeline, PipelineError, StepSelection};
pub use report::{PipelineReport, Step, StepReport, StepStatus, TickerOutcome};
pub use store::CsvStore;
