//! Timestamped CSV snapshots of classified and decided rows.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// `{prefix}_{YYYY-MM-DD}_{HH}-{MM}.csv`
pub fn snapshot_name(prefix: &str, at: DateTime<Utc>) -> String {
    format!("{prefix}_{}.csv", at.format("%Y-%m-%d_%H-%M"))
}

/// Write `rows` as CSV under `dir`, returning the file path.
pub fn write_snapshot<R: Serialize>(
    dir: &Path,
    prefix: &str,
    at: DateTime<Utc>,
    rows: &[R],
) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create snapshot dir {}", dir.display()))?;
    let path = dir.join(snapshot_name(prefix, at));

    let mut wtr = csv::Writer::from_path(&path)
        .with_context(|| format!("failed to open snapshot {}", path.display()))?;
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    #[derive(Serialize)]
    struct Line {
        ticker: &'static str,
        code: i32,
    }

    #[test]
    fn name_carries_minute_stamp() {
        let at = Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap();
        assert_eq!(snapshot_name("analysis", at), "analysis_2024-05-06_07-08.csv");
    }

    #[test]
    fn writes_header_and_rows() {
        let dir = TempDir::new().unwrap();
        let at = Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap();
        let rows = [Line { ticker: "A", code: 1 }, Line { ticker: "B", code: -2 }];
        let path = write_snapshot(&dir.path().join("snaps"), "decision", at, &rows).unwrap();
        let text = std::fs::read_to_string(path).unwrap();
        assert_eq!(text, "ticker,code\nA,1\nB,-2\n");
    }
}
