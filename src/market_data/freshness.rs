// =============================================================================
// Data Freshness Tracker — per-symbol last-refresh bookkeeping
// =============================================================================
//
// One instance owns the last-refresh map; the scan loop asks it which
// symbols need a new download, and the dashboard shows its snapshot.
// =============================================================================

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;

#[derive(Default)]
pub struct FreshnessTracker {
    last_refresh: RwLock<HashMap<String, DateTime<Utc>>>,
}

impl FreshnessTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a successful refresh for `symbol`.
    pub fn mark_refreshed(&self, symbol: &str, now: DateTime<Utc>) {
        self.last_refresh.write().insert(symbol.to_string(), now);
    }

    /// When `symbol` was last refreshed, if ever.
    pub fn last_refreshed(&self, symbol: &str) -> Option<DateTime<Utc>> {
        self.last_refresh.read().get(symbol).copied()
    }

    /// Whether `symbol` needs a refresh.  A symbol never refreshed is
    /// always stale.
    pub fn is_stale(&self, symbol: &str, max_age: Duration, now: DateTime<Utc>) -> bool {
        match self.last_refreshed(symbol) {
            Some(at) => now - at > max_age,
            None => true,
        }
    }

    /// Copy of the full map for the dashboard.
    pub fn snapshot(&self) -> HashMap<String, DateTime<Utc>> {
        self.last_refresh.read().clone()
    }
}
