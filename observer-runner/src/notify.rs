//! File outbox notifier.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use observer_core::data::{DataError, Notifier};

/// Writes each alert to `alert_<timestamp>.txt` and copies its attachments
/// next to it.
pub struct OutboxNotifier {
    dir: PathBuf,
}

impl OutboxNotifier {
    pub fn new(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
        }
    }
}

impl Notifier for OutboxNotifier {
    fn send(&self, message: &str, attachments: &[PathBuf]) -> Result<(), DataError> {
        let fail = |what: &str, path: &Path, e: std::io::Error| {
            DataError::Notification(format!("{what} {}: {e}", path.display()))
        };
        fs::create_dir_all(&self.dir).map_err(|e| fail("failed to create", &self.dir, e))?;

        let stamp = Utc::now().format("%Y%m%dT%H%M%S%.3f");
        let path = self.dir.join(format!("alert_{stamp}.txt"));
        fs::write(&path, message).map_err(|e| fail("failed to write", &path, e))?;

        for attachment in attachments {
            let Some(name) = attachment.file_name() else {
                continue;
            };
            fs::copy(attachment, self.dir.join(name))
                .map_err(|e| fail("failed to attach", attachment, e))?;
        }
        tracing::info!(path = %path.display(), attachments = attachments.len(), "alert written");
        Ok(())
    }
}
