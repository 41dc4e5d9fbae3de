//! Per-printer counter state: persistence, deltas, reset detection.
//!
//! One JSON file per printer holds the counters of the previous poll.
//! A poll computes `current − stored` per counter; any regression means
//! the device was reset or replaced, in which case the delta is withheld
//! and the new absolutes become the baseline.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Absolute page counters at one point in time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountersInfo {
    #[serde(default)]
    pub total_pages: i64,
    #[serde(default)]
    pub mono_pages: i64,
    #[serde(default)]
    pub color_pages: i64,
    #[serde(default)]
    pub scan_pages: i64,
    #[serde(default)]
    pub copy_pages: i64,
    #[serde(default)]
    pub fax_pages: i64,
}

/// Non-negative change between two consecutive polls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountersDiff {
    pub total_pages: i64,
    pub mono_pages: i64,
    pub color_pages: i64,
    pub scan_pages: i64,
    pub copy_pages: i64,
    pub fax_pages: i64,
}

/// Counters as emitted in a telemetry event: the absolute snapshot, the
/// delta against the prior poll when one exists, and whether a counter
/// reset was observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountersSnapshot {
    pub absolute: CountersInfo,
    pub delta: Option<CountersDiff>,
    pub reset_detected: bool,
}

/// The single persisted record per printer; overwritten every poll.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrinterState {
    pub last_poll_at: DateTime<Utc>,
    pub counters: CountersInfo,
}

/// Errors from state persistence.
#[derive(Debug, Error)]
pub enum StateError {
    #[error("state io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("state serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// One-file-per-printer counter store. No in-memory cache: one task polls
/// one printer, so the file is never contended.
#[derive(Debug, Clone)]
pub struct StateStore {
    state_dir: PathBuf,
}

impl StateStore {
    pub fn new(state_dir: impl Into<PathBuf>) -> Result<Self, StateError> {
        let state_dir = state_dir.into();
        fs::create_dir_all(&state_dir)?;
        Ok(Self { state_dir })
    }

    /// Previous state, or `None` on first poll. A corrupted file reads as
    /// absent and re-baselines the printer.
    pub fn load(&self, printer_id: &str) -> Option<PrinterState> {
        let data = fs::read(self.state_path(printer_id)).ok()?;
        match serde_json::from_slice(&data) {
            Ok(state) => Some(state),
            Err(e) => {
                tracing::warn!(printer_id, error = %e, "corrupted state treated as absent");
                None
            }
        }
    }

    /// Delta between the stored state and `current`.
    ///
    /// Returns `(None, false)` on first poll, `(None, true)` when any
    /// absolute counter moved backwards (reset), and
    /// `(Some(current − stored), false)` otherwise.
    pub fn calculate_delta(
        &self,
        printer_id: &str,
        current: &CountersInfo,
    ) -> (Option<CountersDiff>, bool) {
        let Some(previous) = self.load(printer_id) else {
            return (None, false);
        };
        let prev = previous.counters;

        let regressed = current.total_pages < prev.total_pages
            || current.mono_pages < prev.mono_pages
            || current.color_pages < prev.color_pages
            || current.scan_pages < prev.scan_pages
            || current.copy_pages < prev.copy_pages
            || current.fax_pages < prev.fax_pages;
        if regressed {
            return (None, true);
        }

        let delta = CountersDiff {
            total_pages: current.total_pages - prev.total_pages,
            mono_pages: current.mono_pages - prev.mono_pages,
            color_pages: current.color_pages - prev.color_pages,
            scan_pages: current.scan_pages - prev.scan_pages,
            copy_pages: current.copy_pages - prev.copy_pages,
            fax_pages: current.fax_pages - prev.fax_pages,
        };

        (Some(delta), false)
    }

    /// Overwrite the stored state atomically (temp file + rename).
    pub fn save(&self, printer_id: &str, counters: CountersInfo) -> Result<(), StateError> {
        let state = PrinterState {
            last_poll_at: Utc::now(),
            counters,
        };
        let data = serde_json::to_vec_pretty(&state)?;

        let path = self.state_path(printer_id);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, &data)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    pub fn dir(&self) -> &Path {
        &self.state_dir
    }

    fn state_path(&self, printer_id: &str) -> PathBuf {
        self.state_dir.join(format!("printer_{printer_id}.json"))
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn counters(total: i64) -> CountersInfo {
        CountersInfo {
            total_pages: total,
            mono_pages: total / 2,
            color_pages: total / 4,
            ..CountersInfo::default()
        }
    }

    #[test]
    fn test_first_poll_has_no_delta() {
        let dir = TempDir::new().unwrap();
        let store = StateStore::new(dir.path()).unwrap();

        let (delta, reset) = store.calculate_delta("10.0.0.5", &counters(12345));
        assert!(delta.is_none());
        assert!(!reset);
    }

    #[test]
    fn test_second_poll_delta() {
        let dir = TempDir::new().unwrap();
        let store = StateStore::new(dir.path()).unwrap();

        store.save("10.0.0.5", counters(12000)).unwrap();
        let (delta, reset) = store.calculate_delta("10.0.0.5", &counters(12345));

        assert!(!reset);
        let delta = delta.unwrap();
        assert_eq!(delta.total_pages, 345);
        assert_eq!(delta.mono_pages, 172);
        assert!(delta.total_pages >= 0);
    }

    #[test]
    fn test_reset_detection_withholds_delta() {
        let dir = TempDir::new().unwrap();
        let store = StateStore::new(dir.path()).unwrap();

        store.save("10.0.0.5", counters(50000)).unwrap();
        let (delta, reset) = store.calculate_delta("10.0.0.5", &counters(200));

        assert!(delta.is_none());
        assert!(reset);

        // The next baseline resumes diffing from the reset value.
        store.save("10.0.0.5", counters(200)).unwrap();
        let (delta, reset) = store.calculate_delta("10.0.0.5", &counters(260));
        assert!(!reset);
        assert_eq!(delta.unwrap().total_pages, 60);
    }

    #[test]
    fn test_regression_in_any_field_is_a_reset() {
        let dir = TempDir::new().unwrap();
        let store = StateStore::new(dir.path()).unwrap();

        let mut prev = counters(1000);
        prev.scan_pages = 40;
        store.save("p", prev).unwrap();

        let mut current = counters(1100);
        current.scan_pages = 30;
        let (delta, reset) = store.calculate_delta("p", &current);
        assert!(delta.is_none());
        assert!(reset);
    }

    #[test]
    fn test_corrupted_state_reads_as_first_poll() {
        let dir = TempDir::new().unwrap();
        let store = StateStore::new(dir.path()).unwrap();

        fs::write(dir.path().join("printer_p.json"), b"garbage").unwrap();
        let (delta, reset) = store.calculate_delta("p", &counters(10));
        assert!(delta.is_none());
        assert!(!reset);
    }

    #[test]
    fn test_save_overwrites() {
        let dir = TempDir::new().unwrap();
        let store = StateStore::new(dir.path()).unwrap();

        store.save("p", counters(100)).unwrap();
        store.save("p", counters(200)).unwrap();
        let state = store.load("p").unwrap();
        assert_eq!(state.counters.total_pages, 200);
    }
}
