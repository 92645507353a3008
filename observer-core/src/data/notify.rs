//! Notification sink trait.

use std::path::PathBuf;

use super::provider::DataError;

/// Delivers a rendered alert, optionally with file attachments.
pub trait Notifier: Send + Sync {
    fn send(&self, message: &str, attachments: &[PathBuf]) -> Result<(), DataError>;
}

/// Emits alerts as `info!` events.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn send(&self, message: &str, attachments: &[PathBuf]) -> Result<(), DataError> {
        tracing::info!(attachments = attachments.len(), "alert\n{message}");
        Ok(())
    }
}
