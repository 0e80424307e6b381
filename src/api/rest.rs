// =============================================================================
// REST API Endpoints — Axum 0.7
// =============================================================================
//
// All endpoints live under `/api/v1/`.  This is the read interface the
// dashboard polls, plus the explicit alert-log maintenance trigger.
//
// CORS is configured permissively for development; tighten
// `allowed_origins` in production.
// =============================================================================

use std::sync::Arc;

use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::app_state::AppState;

// =============================================================================
// Router construction
// =============================================================================

/// Build the full REST API router with CORS middleware and shared state.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/symbols", get(symbols))
        .route("/api/v1/symbols/:symbol/indicators", get(symbol_indicators))
        .route("/api/v1/symbols/:symbol/signals", get(symbol_signals))
        .route("/api/v1/alerts", get(alerts))
        .route("/api/v1/alerts/summary", get(alerts_summary))
        .route("/api/v1/alerts/prune", post(alerts_prune))
        .route("/api/v1/errors", get(errors))
        .layer(cors)
        .with_state(state)
}

// =============================================================================
// Health
// =============================================================================

async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "state_version": state.current_state_version(),
        "uptime_secs": state.start_time.elapsed().as_secs(),
        "server_time": chrono::Utc::now().timestamp_millis(),
    }))
}

// =============================================================================
// Symbols
// =============================================================================

async fn symbols(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let configured = state.runtime_config.read().symbols.clone();
    let snapshots = state.snapshots.read();
    let freshness = state.freshness.snapshot();

    let rows: Vec<serde_json::Value> = configured
        .iter()
        .map(|symbol| {
            let snapshot = snapshots.get(symbol);
            json!({
                "symbol": symbol,
                "last_close": snapshot.map(|s| s.last_close),
                "last_bar_at": snapshot.map(|s| s.last_bar_at),
                "bar_count": snapshot.map(|s| s.bar_count),
                "signal_count": snapshot.map(|s| s.signals.len()),
                "last_refreshed": freshness.get(symbol),
            })
        })
        .collect();

    Json(rows)
}

async fn symbol_indicators(
    State(state): State<Arc<AppState>>,
    Path(symbol): Path<String>,
) -> impl IntoResponse {
    match state.snapshot_for(&symbol) {
        Some(snapshot) => Json(json!({
            "symbol": snapshot.symbol,
            "evaluated_at": snapshot.evaluated_at,
            "indicators": snapshot.indicators,
        }))
        .into_response(),
        None => not_evaluated(&symbol),
    }
}

async fn symbol_signals(
    State(state): State<Arc<AppState>>,
    Path(symbol): Path<String>,
) -> impl IntoResponse {
    match state.snapshot_for(&symbol) {
        Some(snapshot) => Json(json!({
            "symbol": snapshot.symbol,
            "evaluated_at": snapshot.evaluated_at,
            "signals": snapshot.signals,
        }))
        .into_response(),
        None => not_evaluated(&symbol),
    }
}

fn not_evaluated(symbol: &str) -> axum::response::Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": format!("no evaluation yet for {symbol}") })),
    )
        .into_response()
}

// =============================================================================
// Alerts
// =============================================================================

async fn alerts(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.alert_engine.records().await)
}

async fn alerts_summary(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.alert_engine.summary(chrono::Utc::now()).await)
}

#[derive(Deserialize, Default)]
struct PruneRequest {
    /// Retention override; the configured retention applies when absent.
    days: Option<u32>,
}

async fn alerts_prune(
    State(state): State<Arc<AppState>>,
    body: Option<Json<PruneRequest>>,
) -> impl IntoResponse {
    let days = body
        .and_then(|Json(req)| req.days)
        .unwrap_or_else(|| state.runtime_config.read().alerts.retention_days);

    match state.alert_engine.prune(days, chrono::Utc::now()).await {
        Ok(removed) => {
            if removed > 0 {
                state.increment_version();
            }
            info!(days, removed, "alert log pruned via API");
            Json(json!({ "removed": removed, "retention_days": days })).into_response()
        }
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": format!("{e:#}") })),
        )
            .into_response(),
    }
}

// =============================================================================
// Errors
// =============================================================================

async fn errors(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.recent_errors.read().clone())
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::app_state::SymbolSnapshot;
    use crate::indicators::test_support::{bars_from_ohlcv, params};
    use crate::indicators::enrich;
    use crate::runtime_config::RuntimeConfig;
    use crate::signals::detect;

    fn state(name: &str) -> Arc<AppState> {
        let dir = std::env::temp_dir().join(format!("sentinel_api_{name}"));
        std::fs::remove_dir_all(&dir).ok();
        let mut config = RuntimeConfig::default();
        config.data.data_dir = dir.to_string_lossy().into_owned();
        Arc::new(AppState::new(config))
    }

    fn snapshot_from_series(symbol: &str) -> SymbolSnapshot {
        let rows: Vec<(f64, f64, f64, f64)> =
            (0..60).map(|_| (101.0, 99.0, 100.0, 1000.0)).collect();
        let series = enrich(bars_from_ohlcv(rows), &params());
        let last = series.last_bar().unwrap();
        SymbolSnapshot {
            symbol: symbol.to_string(),
            last_close: last.close,
            last_bar_at: last.timestamp,
            bar_count: series.len(),
            indicators: series.latest().unwrap(),
            signals: detect(&series),
            evaluated_at: "2026-02-10T10:00:00Z".parse().unwrap(),
        }
    }

    #[test]
    fn router_builds_with_all_routes() {
        // A smoke check that handler signatures satisfy axum's extractors.
        let _router = router(state("router"));
    }

    #[test]
    fn summary_serialises_defined_values_as_numbers() {
        let snapshot = snapshot_from_series("TCS.NS");
        let value = serde_json::to_value(&snapshot.indicators).unwrap();
        assert!(value["rsi"].is_number());
        assert!(value["macd_line"].is_number());
        assert!(value["volume_ratio"].is_number());
    }

    #[test]
    fn summary_serialises_undefined_values_as_nulls() {
        // Ten bars: MACD is defined from bar 0, the windowed families are
        // still warming up.  The dashboard must see explicit nulls.
        let rows: Vec<(f64, f64, f64, f64)> =
            (0..10).map(|_| (101.0, 99.0, 100.0, 1000.0)).collect();
        let series = enrich(bars_from_ohlcv(rows), &params());
        let value = serde_json::to_value(series.latest().unwrap()).unwrap();
        assert!(value["macd_line"].is_number());
        assert!(value["rsi"].is_null());
        assert!(value["mfi"].is_null());
        assert!(value["volume_ratio"].is_null());
    }
}
