// =============================================================================
// Nifty Sentinel — Main Entry Point
// =============================================================================
//
// Periodically refreshes OHLCV history for a fixed universe of NSE symbols,
// computes indicators, detects signals, and emails at most one alert per
// symbol per day.  A REST API exposes the results to the dashboard.
// =============================================================================

// ── Module declarations ──────────────────────────────────────────────────────
mod alerts;
mod api;
mod app_state;
mod indicators;
mod market_data;
mod runtime_config;
mod scanner;
mod signals;
mod types;

use std::sync::Arc;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::alerts::SmtpNotifier;
use crate::app_state::AppState;
use crate::runtime_config::RuntimeConfig;

const CONFIG_PATH: &str = "runtime_config.json";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("╔══════════════════════════════════════════════════════════╗");
    info!("║        Nifty Sentinel — Starting Up                     ║");
    info!("╚══════════════════════════════════════════════════════════╝");

    let mut config = RuntimeConfig::load(CONFIG_PATH).unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        RuntimeConfig::default()
    });

    // Override symbols from env if available.
    if let Ok(syms) = std::env::var("SENTINEL_SYMBOLS") {
        let symbols: Vec<String> = syms
            .split(',')
            .map(|s| s.trim().to_uppercase())
            .filter(|s| !s.is_empty())
            .collect();
        if !symbols.is_empty() {
            config.symbols = symbols;
        }
    }

    info!(symbols = config.symbols.len(), "Configured symbol universe");

    if !SmtpNotifier::from_env(&config.email).is_configured() {
        warn!("Email credentials not configured — alert notifications will fail until EMAIL_USER / EMAIL_PASSWORD / EMAIL_RECIPIENTS are set");
    }

    // ── 2. Build shared state ────────────────────────────────────────────
    let state = Arc::new(AppState::new(config));

    // ── 3. Start the API server ──────────────────────────────────────────
    let api_state = state.clone();
    let bind_addr =
        std::env::var("SENTINEL_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3001".into());
    let bind_addr_clone = bind_addr.clone();

    tokio::spawn(async move {
        let app = api::rest::router(api_state);
        match tokio::net::TcpListener::bind(&bind_addr_clone).await {
            Ok(listener) => {
                info!(addr = %bind_addr_clone, "API server listening");
                if let Err(e) = axum::serve(listener, app).await {
                    error!(error = %e, "API server failed");
                }
            }
            Err(e) => error!(addr = %bind_addr_clone, error = %e, "Failed to bind API server"),
        }
    });

    // ── 4. Scan loop ─────────────────────────────────────────────────────
    let scan_state = state.clone();
    tokio::spawn(async move {
        info!("Scan loop starting");
        let refresh_secs = scan_state.runtime_config.read().dashboard.refresh_secs;
        let mut interval =
            tokio::time::interval(tokio::time::Duration::from_secs(refresh_secs.max(1)));
        loop {
            interval.tick().await;
            scanner::run_scan_cycle(&scan_state).await;
        }
    });

    // ── 5. Daily alert-log pruning ───────────────────────────────────────
    let prune_state = state.clone();
    tokio::spawn(async move {
        let mut interval =
            tokio::time::interval(tokio::time::Duration::from_secs(24 * 60 * 60));
        interval.tick().await; // first tick fires immediately
        loop {
            interval.tick().await;
            let retention_days = prune_state.runtime_config.read().alerts.retention_days;
            match prune_state
                .alert_engine
                .prune(retention_days, chrono::Utc::now())
                .await
            {
                Ok(removed) if removed > 0 => {
                    prune_state.increment_version();
                    info!(removed, "daily alert-log pruning done");
                }
                Ok(_) => {}
                Err(e) => {
                    error!(error = %e, "daily alert-log pruning failed");
                    prune_state.push_error(format!("alert pruning failed: {e:#}"));
                }
            }
        }
    });

    info!("All subsystems running. Press Ctrl+C to stop.");

    // ── 6. Graceful shutdown ─────────────────────────────────────────────
    tokio::signal::ctrl_c().await?;
    warn!("Shutdown signal received — stopping gracefully");

    if let Err(e) = state.runtime_config.read().save(CONFIG_PATH) {
        error!(error = %e, "Failed to save runtime config on shutdown");
    }

    info!("Nifty Sentinel shut down complete.");
    Ok(())
}
