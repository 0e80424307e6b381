// =============================================================================
// Alert Log Persistence — JSON file with atomic save
// =============================================================================
//
// The alert log is small (a handful of records per symbol per month), so it
// is written in full after every mutation rather than buffered.  Saves use
// the tmp + rename pattern to prevent a crash mid-write from corrupting the
// existing file.
// =============================================================================

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{Context, Result};

use super::log::AlertRecord;

/// The symbol → records mapping as persisted.
pub type AlertLogMap = HashMap<String, Vec<AlertRecord>>;

/// Storage backend for the alert log.
pub trait AlertStore: Send + Sync {
    /// Load the full mapping.  A missing file is an empty mapping, not an
    /// error; a present-but-unreadable file is an error so the caller can
    /// decide how to degrade.
    fn load(&self) -> Result<AlertLogMap>;

    /// Durably overwrite the full mapping.
    fn save(&self, log: &AlertLogMap) -> Result<()>;
}

/// JSON-file-backed store, one file for the whole log.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl AlertStore for JsonFileStore {
    fn load(&self) -> Result<AlertLogMap> {
        if !self.path.exists() {
            return Ok(AlertLogMap::new());
        }

        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read alert log from {}", self.path.display()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("failed to parse alert log from {}", self.path.display()))
    }

    fn save(&self, log: &AlertLogMap) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("failed to create alert log directory {}", parent.display())
            })?;
        }

        let content =
            serde_json::to_string_pretty(log).context("failed to serialise alert log to JSON")?;

        let tmp_path = self.path.with_extension("json.tmp");

        std::fs::write(&tmp_path, &content)
            .with_context(|| format!("failed to write tmp alert log to {}", tmp_path.display()))?;

        std::fs::rename(&tmp_path, &self.path).with_context(|| {
            format!("failed to rename tmp alert log to {}", self.path.display())
        })?;

        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Signal, SignalKind, SignalStrength};

    fn sample_record() -> AlertRecord {
        AlertRecord {
            date: "2026-02-10".parse().unwrap(),
            timestamp: "2026-02-10T09:30:00Z".parse().unwrap(),
            signals: vec![Signal {
                kind: SignalKind::RsiOversold,
                message: "RSI oversold: 24.50".to_string(),
                strength: SignalStrength::High,
            }],
            price: 1520.75,
        }
    }

    fn temp_store(name: &str) -> (JsonFileStore, PathBuf) {
        let dir = std::env::temp_dir().join(format!("sentinel_store_{name}"));
        std::fs::remove_dir_all(&dir).ok();
        let path = dir.join("alerts").join("alert_log.json");
        (JsonFileStore::new(path), dir)
    }

    #[test]
    fn load_of_missing_file_is_empty() {
        let (store, dir) = temp_store("missing");
        assert!(store.load().unwrap().is_empty());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn save_then_load_roundtrips() {
        let (store, dir) = temp_store("roundtrip");

        let mut log = AlertLogMap::new();
        log.insert("TCS.NS".to_string(), vec![sample_record()]);
        store.save(&log).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.len(), 1);
        let records = &loaded["TCS.NS"];
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].date, sample_record().date);
        assert!((records[0].price - 1520.75).abs() < f64::EPSILON);
        assert_eq!(records[0].signals[0].kind, SignalKind::RsiOversold);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn corrupt_file_surfaces_an_error() {
        let (store, dir) = temp_store("corrupt");
        std::fs::create_dir_all(dir.join("alerts")).unwrap();
        std::fs::write(dir.join("alerts").join("alert_log.json"), "{not json").unwrap();
        assert!(store.load().is_err());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn save_overwrites_previous_content() {
        let (store, dir) = temp_store("overwrite");

        let mut log = AlertLogMap::new();
        log.insert("INFY.NS".to_string(), vec![sample_record()]);
        store.save(&log).unwrap();

        log.clear();
        store.save(&log).unwrap();
        assert!(store.load().unwrap().is_empty());

        std::fs::remove_dir_all(&dir).ok();
    }
}
