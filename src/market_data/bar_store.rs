// =============================================================================
// Bar Store — per-symbol on-disk OHLCV history
// =============================================================================
//
// One JSON file per symbol under `<data_dir>/historical/`.  Saves are
// atomic (tmp + rename); loading a missing file yields an empty series so
// a fresh deployment starts cleanly.
// =============================================================================

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::types::Bar;

pub struct BarStore {
    dir: PathBuf,
}

impl BarStore {
    /// `data_dir` is the root data directory; bar files live in its
    /// `historical/` subdirectory.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: data_dir.into().join("historical"),
        }
    }

    /// File path for a symbol; the exchange suffix is stripped to keep
    /// filenames tidy.
    fn path_for(&self, symbol: &str) -> PathBuf {
        let name = symbol.strip_suffix(".NS").unwrap_or(symbol);
        self.dir.join(format!("{name}.json"))
    }

    /// Load a symbol's bar history.  A missing file is an empty series.
    pub fn load(&self, symbol: &str) -> Result<Vec<Bar>> {
        let path = self.path_for(symbol);
        if !path.exists() {
            return Ok(Vec::new());
        }

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read bar history from {}", path.display()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("failed to parse bar history from {}", path.display()))
    }

    /// Durably overwrite a symbol's bar history.
    pub fn save(&self, symbol: &str, bars: &[Bar]) -> Result<()> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("failed to create data directory {}", self.dir.display()))?;

        let path = self.path_for(symbol);
        let content =
            serde_json::to_string(bars).context("failed to serialise bar history to JSON")?;

        let tmp_path = path.with_extension("json.tmp");

        std::fs::write(&tmp_path, &content)
            .with_context(|| format!("failed to write tmp bar history to {}", tmp_path.display()))?;

        std::fs::rename(&tmp_path, &path)
            .with_context(|| format!("failed to rename tmp bar history to {}", path.display()))?;

        Ok(())
    }
}
