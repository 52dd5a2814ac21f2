//! Snapshot persistence
//!
//! Mirrors the rolling window to a single JSON document on disk. Writes
//! go to a temporary file in the same directory followed by an atomic
//! rename, so a concurrent reader (or a crash mid-write) only ever sees
//! a complete document.

use crate::store::error::{StoreError, StoreResult};
use crate::store::types::StatsWindow;
use std::path::{Path, PathBuf};

/// Handle to the on-disk snapshot document
#[derive(Debug, Clone)]
pub struct SnapshotFile {
    path: PathBuf,
}

impl SnapshotFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the persisted window.
    ///
    /// A missing, unreadable, or malformed file is a recoverable
    /// condition: it is logged and an empty window is returned, never an
    /// error.
    pub fn load(&self) -> StatsWindow {
        match self.try_load() {
            Ok(window) => {
                tracing::info!(
                    entries = window.len(),
                    path = %self.path.display(),
                    "Loaded persisted stats window"
                );
                window
            }
            Err(StoreError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %self.path.display(), "No persisted stats found, starting fresh");
                StatsWindow::new()
            }
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Failed to read persisted stats, starting fresh");
                StatsWindow::new()
            }
        }
    }

    fn try_load(&self) -> StoreResult<StatsWindow> {
        let content = std::fs::read_to_string(&self.path)?;
        let window: StatsWindow = serde_json::from_str(&content)?;
        if !window.is_aligned() {
            return Err(StoreError::Corruption(
                "column lengths differ".to_string(),
            ));
        }
        Ok(window)
    }

    /// Persist a window atomically: write to `<path>.tmp`, then rename
    /// over the canonical path.
    pub fn save(&self, window: &StatsWindow) -> StoreResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let tmp = self.tmp_path();
        let content = serde_json::to_string(window)?;
        std::fs::write(&tmp, content)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    /// Most recently persisted strictly-positive price, or 0.0 if the
    /// file is missing, unreadable, or holds no positive price.
    ///
    /// Used by the price resolver as its fallback of last resort.
    pub fn last_price(&self) -> f64 {
        self.try_load()
            .ok()
            .and_then(|window| window.price.iter().rev().copied().find(|&p| p > 0.0))
            .unwrap_or(0.0)
    }

    fn tmp_path(&self) -> PathBuf {
        let mut os = self.path.clone().into_os_string();
        os.push(".tmp");
        PathBuf::from(os)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::types::Sample;
    use tempfile::tempdir;

    fn window(entries: &[(i64, f64)]) -> StatsWindow {
        entries
            .iter()
            .map(|&(ts, price)| Sample::at(ts, 100.0, 2000.0, 3.0e9, price))
            .collect()
    }

    #[test]
    fn test_load_missing_file_returns_empty() {
        let dir = tempdir().unwrap();
        let file = SnapshotFile::new(dir.path().join("stats_log.json"));

        assert!(file.load().is_empty());
    }

    #[test]
    fn test_load_corrupt_file_returns_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stats_log.json");
        std::fs::write(&path, "{not valid json").unwrap();

        let file = SnapshotFile::new(&path);
        assert!(file.load().is_empty());
    }

    #[test]
    fn test_load_misaligned_columns_returns_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stats_log.json");
        std::fs::write(
            &path,
            r#"{"timestamps":[1,2],"localHashrate":[1.0],"poolHashrate":[],"networkHashrate":[],"price":[]}"#,
        )
        .unwrap();

        let file = SnapshotFile::new(&path);
        assert!(file.load().is_empty());
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempdir().unwrap();
        let file = SnapshotFile::new(dir.path().join("stats_log.json"));

        let saved = window(&[(1, 150.0), (2, 151.5), (3, 0.0)]);
        file.save(&saved).unwrap();

        assert_eq!(file.load(), saved);
    }

    #[test]
    fn test_save_overwrites_previous_snapshot() {
        let dir = tempdir().unwrap();
        let file = SnapshotFile::new(dir.path().join("stats_log.json"));

        file.save(&window(&[(1, 150.0)])).unwrap();
        let second = window(&[(1, 150.0), (2, 149.0)]);
        file.save(&second).unwrap();

        assert_eq!(file.load(), second);
    }

    #[test]
    fn test_save_leaves_no_temp_file() {
        let dir = tempdir().unwrap();
        let file = SnapshotFile::new(dir.path().join("stats_log.json"));
        file.save(&window(&[(1, 150.0)])).unwrap();

        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, vec!["stats_log.json"]);
    }

    #[test]
    fn test_save_creates_parent_directories() {
        let dir = tempdir().unwrap();
        let file = SnapshotFile::new(dir.path().join("nested/deeper/stats_log.json"));

        file.save(&window(&[(1, 150.0)])).unwrap();
        assert_eq!(file.load().len(), 1);
    }

    #[test]
    fn test_last_price_skips_zero_tail() {
        let dir = tempdir().unwrap();
        let file = SnapshotFile::new(dir.path().join("stats_log.json"));

        file.save(&window(&[(1, 1.23), (2, 0.0)])).unwrap();
        assert_eq!(file.last_price(), 1.23);
    }

    #[test]
    fn test_last_price_missing_file_is_zero() {
        let dir = tempdir().unwrap();
        let file = SnapshotFile::new(dir.path().join("stats_log.json"));
        assert_eq!(file.last_price(), 0.0);
    }

    #[test]
    fn test_last_price_all_zero_is_zero() {
        let dir = tempdir().unwrap();
        let file = SnapshotFile::new(dir.path().join("stats_log.json"));
        file.save(&window(&[(1, 0.0), (2, 0.0)])).unwrap();
        assert_eq!(file.last_price(), 0.0);
    }
}
