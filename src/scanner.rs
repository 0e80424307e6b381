// =============================================================================
// Scan Loop — refresh, enrich, detect, alert
// =============================================================================
//
// One pass over the configured universe:
//   1. Refresh a symbol's bar history when it has gone stale (rate-limited,
//      processed in batches).
//   2. Enrich the stored bars with indicators.
//   3. Detect signals on the latest bar and publish a dashboard snapshot.
//   4. Hand the enriched series to the alert engine, which deduplicates
//      and notifies.
//
// One symbol's failure (fetch error, corrupt file, indicator fault) is
// logged against the shared error buffer and never aborts the pass.
// =============================================================================

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info, warn};

use crate::app_state::{AppState, SymbolSnapshot};
use crate::indicators::enrich;
use crate::signals::detect;

/// Refresh `symbol`'s on-disk history if it is stale.  Returns whether a
/// download happened.
pub async fn refresh_if_stale(
    state: &Arc<AppState>,
    symbol: &str,
    now: DateTime<Utc>,
) -> Result<bool> {
    let (range, interval, resample_hours, max_age) = {
        let config = state.runtime_config.read();
        (
            config.data.fetch_range.clone(),
            config.data.fetch_interval.clone(),
            config.data.resample_hours,
            Duration::hours(i64::from(config.data.stale_after_hours)),
        )
    };

    if !state.freshness.is_stale(symbol, max_age, now) {
        return Ok(false);
    }

    let bars = state
        .fetcher
        .fetch_history(symbol, &range, &interval, resample_hours)
        .await?;

    if bars.is_empty() {
        warn!(symbol = %symbol, "provider returned no data");
        return Ok(false);
    }

    state
        .bar_store
        .save(symbol, &bars)
        .with_context(|| format!("failed to store refreshed bars for {symbol}"))?;
    state.freshness.mark_refreshed(symbol, now);

    debug!(symbol = %symbol, bars = bars.len(), "bar history refreshed");
    Ok(true)
}

/// Enrich a symbol's stored history, publish its dashboard snapshot, and
/// run the alert check.  Returns `None` when no data is stored yet.
pub async fn evaluate_symbol(
    state: &Arc<AppState>,
    symbol: &str,
    now: DateTime<Utc>,
) -> Result<Option<SymbolSnapshot>> {
    let bars = state.bar_store.load(symbol)?;
    if bars.is_empty() {
        return Ok(None);
    }

    let params = state.runtime_config.read().indicators.clone();
    let series = enrich(bars, &params);
    let signals = detect(&series);

    let Some(last) = series.last_bar() else {
        return Ok(None);
    };
    let snapshot = SymbolSnapshot {
        symbol: symbol.to_string(),
        last_close: last.close,
        last_bar_at: last.timestamp,
        bar_count: series.len(),
        indicators: series.latest().unwrap_or_default(),
        signals: signals.clone(),
        evaluated_at: now,
    };
    state.update_snapshot(snapshot.clone());

    if !signals.is_empty() {
        let outcome = state
            .alert_engine
            .check_and_notify(symbol, &series, now)
            .await?;
        debug!(symbol = %symbol, outcome = ?outcome, signals = signals.len(), "alert check");
    }

    Ok(Some(snapshot))
}

/// One full pass over the configured universe.
pub async fn run_scan_cycle(state: &Arc<AppState>) {
    let (symbols, batch_size, request_delay) = {
        let config = state.runtime_config.read();
        (
            config.symbols.clone(),
            config.data.batch_size.max(1),
            std::time::Duration::from_millis(config.data.request_delay_ms),
        )
    };

    let mut evaluated = 0usize;
    let mut failed = 0usize;

    for batch in symbols.chunks(batch_size) {
        for symbol in batch {
            let now = Utc::now();

            match refresh_if_stale(state, symbol, now).await {
                Ok(true) => {
                    // Rate-limit between provider requests.
                    tokio::time::sleep(request_delay).await;
                }
                Ok(false) => {}
                Err(e) => {
                    warn!(symbol = %symbol, error = %e, "refresh failed — using stored bars");
                    state.push_error(format!("{symbol}: refresh failed: {e:#}"));
                    failed += 1;
                }
            }

            match evaluate_symbol(state, symbol, now).await {
                Ok(Some(_)) => evaluated += 1,
                Ok(None) => debug!(symbol = %symbol, "no stored data yet"),
                Err(e) => {
                    warn!(symbol = %symbol, error = %e, "evaluation failed");
                    state.push_error(format!("{symbol}: evaluation failed: {e:#}"));
                    failed += 1;
                }
            }
        }
    }

    info!(
        total = symbols.len(),
        evaluated, failed, "scan cycle complete"
    );
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::test_support::bars_from_ohlcv;
    use crate::runtime_config::RuntimeConfig;
    use crate::types::SignalKind;

    /// State over a private temp data dir.  The SMTP notifier has no env
    /// credentials in tests, so every alert send fails fast offline —
    /// which is exactly what the alert-path assertions rely on.
    fn state(name: &str) -> Arc<AppState> {
        let dir = std::env::temp_dir().join(format!("sentinel_scanner_{name}"));
        std::fs::remove_dir_all(&dir).ok();
        let mut config = RuntimeConfig::default();
        config.data.data_dir = dir.to_string_lossy().into_owned();
        Arc::new(AppState::new(config))
    }

    fn now() -> DateTime<Utc> {
        "2026-02-10T10:00:00Z".parse().unwrap()
    }

    fn cleanup(state: &Arc<AppState>) {
        let dir = state.runtime_config.read().data.data_dir.clone();
        std::fs::remove_dir_all(dir).ok();
    }

    #[tokio::test]
    async fn evaluate_without_data_is_a_no_op() {
        let state = state("nodata");
        let result = evaluate_symbol(&state, "TCS.NS", now()).await.unwrap();
        assert!(result.is_none());
        assert!(state.snapshot_for("TCS.NS").is_none());
        cleanup(&state);
    }

    #[tokio::test]
    async fn evaluate_publishes_a_snapshot() {
        let state = state("snapshot");
        let rows: Vec<(f64, f64, f64, f64)> =
            (0..60).map(|_| (101.0, 99.0, 100.0, 1000.0)).collect();
        state
            .bar_store
            .save("TCS.NS", &bars_from_ohlcv(rows))
            .unwrap();

        let snapshot = evaluate_symbol(&state, "TCS.NS", now())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(snapshot.symbol, "TCS.NS");
        assert_eq!(snapshot.bar_count, 60);
        assert!((snapshot.last_close - 100.0).abs() < f64::EPSILON);
        assert!(snapshot.signals.is_empty());
        assert!(snapshot.indicators.rsi.is_some());

        // The snapshot is visible to the dashboard.
        assert!(state.snapshot_for("TCS.NS").is_some());
        cleanup(&state);
    }

    #[tokio::test]
    async fn evaluate_detects_signals_on_a_declining_series() {
        let state = state("signals");
        let rows: Vec<(f64, f64, f64, f64)> = (0..60)
            .map(|i| {
                let c = 200.0 - i as f64;
                (c + 1.0, c - 1.0, c, 1000.0)
            })
            .collect();
        state
            .bar_store
            .save("TCS.NS", &bars_from_ohlcv(rows))
            .unwrap();

        let snapshot = evaluate_symbol(&state, "TCS.NS", now())
            .await
            .unwrap()
            .unwrap();
        let kinds: Vec<SignalKind> = snapshot.signals.iter().map(|s| s.kind).collect();
        assert_eq!(kinds, vec![SignalKind::RsiOversold, SignalKind::MfiOversold]);

        // Unconfigured notifier => nothing recorded, but evaluation still
        // succeeded and the snapshot is published.
        let summary = state.alert_engine.summary(now()).await;
        assert_eq!(summary.total_alerts, 0);
        cleanup(&state);
    }

    #[tokio::test]
    async fn evaluation_failure_is_isolated_per_symbol() {
        let state = state("isolated");
        // Corrupt one symbol's file; seed another with good data.
        let dir = std::path::PathBuf::from(state.runtime_config.read().data.data_dir.clone());
        std::fs::create_dir_all(dir.join("historical")).unwrap();
        std::fs::write(dir.join("historical").join("BAD.json"), "[oops").unwrap();

        let rows: Vec<(f64, f64, f64, f64)> =
            (0..60).map(|_| (101.0, 99.0, 100.0, 1000.0)).collect();
        state
            .bar_store
            .save("GOOD.NS", &bars_from_ohlcv(rows))
            .unwrap();

        assert!(evaluate_symbol(&state, "BAD.NS", now()).await.is_err());
        assert!(evaluate_symbol(&state, "GOOD.NS", now())
            .await
            .unwrap()
            .is_some());
        cleanup(&state);
    }

    #[tokio::test]
    async fn fresh_symbol_is_not_refetched() {
        let state = state("fresh");
        state.freshness.mark_refreshed("TCS.NS", now());
        // Within the staleness window no network request is attempted, so
        // this returns immediately even with no provider reachable.
        let refreshed = refresh_if_stale(&state, "TCS.NS", now() + Duration::hours(1))
            .await
            .unwrap();
        assert!(!refreshed);
        cleanup(&state);
    }
}
