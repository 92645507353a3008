//! Collaborators: bar sources, table stores and notifiers.

pub mod notify;
pub mod provider;
pub mod store;
pub mod synthetic;
pub mod yahoo;

pub use notify::{LogNotifier, Notifier};
pub use provider::{fetch_all, BarSource, DataError, FetchSummary, SkippedTicker};
pub use store::{HistoricalStore, MemoryStore, PersistenceSink};
pub use synthetic::SyntheticSource;
pub use yahoo::YahooSource;
