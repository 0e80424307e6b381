// =============================================================================
// Central Application State — Nifty Sentinel
// =============================================================================
//
// The single source of truth for the engine.  The scan loop writes here,
// the dashboard API reads from here.
//
// Thread safety:
//   - Atomic counter for lock-free version tracking.
//   - parking_lot::RwLock for mutable shared collections.
//   - The alert engine serialises its own mutations internally.
// =============================================================================

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;

use crate::alerts::{AlertEngine, JsonFileStore, SmtpNotifier};
use crate::indicators::IndicatorSummary;
use crate::market_data::{BarFetcher, BarStore, FreshnessTracker};
use crate::runtime_config::RuntimeConfig;
use crate::types::Signal;

// =============================================================================
// Dashboard-facing records
// =============================================================================

/// A recorded error event for the dashboard error log.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorRecord {
    /// Human-readable error message.
    pub message: String,
    /// ISO 8601 timestamp.
    pub at: String,
}

/// Latest evaluated state of one symbol.
#[derive(Debug, Clone, Serialize)]
pub struct SymbolSnapshot {
    pub symbol: String,
    pub last_close: f64,
    pub last_bar_at: DateTime<Utc>,
    pub bar_count: usize,
    pub indicators: IndicatorSummary,
    pub signals: Vec<Signal>,
    pub evaluated_at: DateTime<Utc>,
}

// =============================================================================
// AppState
// =============================================================================

/// Maximum number of recent errors to retain.
const MAX_RECENT_ERRORS: usize = 50;

/// Central application state shared across all async tasks via
/// `Arc<AppState>`.
pub struct AppState {
    /// Monotonically increasing version counter, incremented on every
    /// meaningful mutation so dashboard clients can detect fresh data.
    pub state_version: AtomicU64,

    // ── Configuration ───────────────────────────────────────────────────
    pub runtime_config: Arc<RwLock<RuntimeConfig>>,

    // ── Market Data ─────────────────────────────────────────────────────
    pub bar_store: Arc<BarStore>,
    pub fetcher: Arc<BarFetcher>,
    pub freshness: Arc<FreshnessTracker>,

    // ── Alerting ────────────────────────────────────────────────────────
    pub alert_engine: Arc<AlertEngine<JsonFileStore, SmtpNotifier>>,

    // ── Latest Evaluations ──────────────────────────────────────────────
    pub snapshots: RwLock<HashMap<String, SymbolSnapshot>>,

    // ── Error Log ───────────────────────────────────────────────────────
    pub recent_errors: RwLock<Vec<ErrorRecord>>,

    // ── Timing ──────────────────────────────────────────────────────────
    /// Instant when the engine was started.  Used for uptime reporting.
    pub start_time: std::time::Instant,
}

impl AppState {
    /// Construct the shared state from the given runtime configuration.
    /// The returned value is typically wrapped in `Arc` immediately.
    pub fn new(config: RuntimeConfig) -> Self {
        let data_dir = config.data.data_dir.clone();

        let alert_store =
            JsonFileStore::new(std::path::Path::new(&data_dir).join("alerts/alert_log.json"));
        let notifier = SmtpNotifier::from_env(&config.email);
        let alert_engine = Arc::new(AlertEngine::new(alert_store, notifier));

        Self {
            state_version: AtomicU64::new(1),
            runtime_config: Arc::new(RwLock::new(config)),
            bar_store: Arc::new(BarStore::new(&data_dir)),
            fetcher: Arc::new(BarFetcher::new()),
            freshness: Arc::new(FreshnessTracker::new()),
            alert_engine,
            snapshots: RwLock::new(HashMap::new()),
            recent_errors: RwLock::new(Vec::new()),
            start_time: std::time::Instant::now(),
        }
    }

    // ── Version Management ──────────────────────────────────────────────

    /// Atomically increment the state version.  Call after every meaningful
    /// mutation.
    pub fn increment_version(&self) -> u64 {
        self.state_version.fetch_add(1, Ordering::SeqCst)
    }

    /// Read the current state version without modifying it.
    pub fn current_state_version(&self) -> u64 {
        self.state_version.load(Ordering::SeqCst)
    }

    // ── Error Logging ───────────────────────────────────────────────────

    /// Record an error message.  The ring buffer is capped at
    /// [`MAX_RECENT_ERRORS`]; oldest entries are evicted when the limit is
    /// reached.
    pub fn push_error(&self, msg: String) {
        let record = ErrorRecord {
            message: msg,
            at: Utc::now().to_rfc3339(),
        };

        let mut errors = self.recent_errors.write();
        errors.push(record);
        while errors.len() > MAX_RECENT_ERRORS {
            errors.remove(0);
        }

        self.increment_version();
    }

    // ── Snapshots ───────────────────────────────────────────────────────

    /// Store the latest evaluation for a symbol.
    pub fn update_snapshot(&self, snapshot: SymbolSnapshot) {
        self.snapshots
            .write()
            .insert(snapshot.symbol.clone(), snapshot);
        self.increment_version();
    }

    /// Copy of one symbol's latest evaluation.
    pub fn snapshot_for(&self, symbol: &str) -> Option<SymbolSnapshot> {
        self.snapshots.read().get(symbol).cloned()
    }
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::IndicatorSummary;

    fn state() -> AppState {
        let mut config = RuntimeConfig::default();
        config.data.data_dir = std::env::temp_dir()
            .join("sentinel_state_test")
            .to_string_lossy()
            .into_owned();
        AppState::new(config)
    }

    fn sample_snapshot(symbol: &str) -> SymbolSnapshot {
        SymbolSnapshot {
            symbol: symbol.to_string(),
            last_close: 123.45,
            last_bar_at: "2026-02-10T08:00:00Z".parse().unwrap(),
            bar_count: 60,
            indicators: IndicatorSummary::default(),
            signals: Vec::new(),
            evaluated_at: "2026-02-10T10:00:00Z".parse().unwrap(),
        }
    }

    #[test]
    fn version_increments_monotonically() {
        let state = state();
        let v0 = state.current_state_version();
        state.increment_version();
        state.increment_version();
        assert_eq!(state.current_state_version(), v0 + 2);
    }

    #[test]
    fn error_ring_buffer_is_capped() {
        let state = state();
        for i in 0..60 {
            state.push_error(format!("error {i}"));
        }
        let errors = state.recent_errors.read();
        assert_eq!(errors.len(), MAX_RECENT_ERRORS);
        // The oldest entries were evicted.
        assert_eq!(errors[0].message, "error 10");
    }

    #[test]
    fn snapshots_are_stored_per_symbol() {
        let state = state();
        state.update_snapshot(sample_snapshot("TCS.NS"));
        state.update_snapshot(sample_snapshot("INFY.NS"));

        assert!(state.snapshot_for("TCS.NS").is_some());
        assert!(state.snapshot_for("INFY.NS").is_some());
        assert!(state.snapshot_for("HDFCBANK.NS").is_none());
        assert_eq!(state.snapshots.read().len(), 2);
    }

    #[test]
    fn updating_a_snapshot_replaces_the_previous_one() {
        let state = state();
        state.update_snapshot(sample_snapshot("TCS.NS"));
        let mut updated = sample_snapshot("TCS.NS");
        updated.last_close = 150.0;
        state.update_snapshot(updated);

        let stored = state.snapshot_for("TCS.NS").unwrap();
        assert!((stored.last_close - 150.0).abs() < f64::EPSILON);
        assert_eq!(state.snapshots.read().len(), 1);
    }
}
