// =============================================================================
// Runtime Configuration — Engine settings with atomic save
// =============================================================================
//
// Central configuration hub for the Nifty Sentinel engine.  Every tunable
// parameter lives here: the symbol universe, indicator windows and
// thresholds, data-refresh cadence, alert retention, and SMTP settings.
//
// Persistence uses an atomic tmp + rename pattern to prevent corruption on
// crash.  All fields carry `#[serde(default)]` so that adding new fields
// never breaks loading an older config file.
//
// SMTP credentials are NOT part of this file — they come from the
// environment (`EMAIL_USER`, `EMAIL_PASSWORD`, `EMAIL_RECIPIENTS`).
// =============================================================================

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_symbols() -> Vec<String> {
    [
        "RELIANCE.NS", "HDFCBANK.NS", "TCS.NS", "BHARTIARTL.NS", "ICICIBANK.NS",
        "SBIN.NS", "INFY.NS", "LICI.NS", "BAJFINANCE.NS", "HINDUNILVR.NS",
        "ITC.NS", "LT.NS", "HCLTECH.NS", "KOTAKBANK.NS", "MARUTI.NS",
        "SUNPHARMA.NS", "M&M.NS", "AXISBANK.NS", "ULTRACEMCO.NS", "TITAN.NS",
        "BAJAJFINSV.NS", "NTPC.NS", "HAL.NS", "ONGC.NS", "ADANIPORTS.NS",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_macd_fast() -> usize {
    12
}

fn default_macd_slow() -> usize {
    26
}

fn default_macd_signal() -> usize {
    9
}

fn default_rsi_period() -> usize {
    14
}

fn default_mfi_period() -> usize {
    14
}

fn default_volume_ma_short() -> usize {
    20
}

fn default_volume_ma_long() -> usize {
    50
}

fn default_volume_surge_ratio() -> f64 {
    2.0
}

fn default_rsi_oversold() -> f64 {
    30.0
}

fn default_rsi_overbought() -> f64 {
    70.0
}

fn default_mfi_oversold() -> f64 {
    20.0
}

fn default_mfi_overbought() -> f64 {
    80.0
}

fn default_data_dir() -> String {
    "stock_data".to_string()
}

fn default_fetch_interval() -> String {
    "1h".to_string()
}

fn default_fetch_range() -> String {
    "6mo".to_string()
}

fn default_resample_hours() -> u32 {
    4
}

fn default_request_delay_ms() -> u64 {
    500
}

fn default_batch_size() -> usize {
    10
}

fn default_stale_after_hours() -> u32 {
    4
}

fn default_retention_days() -> u32 {
    30
}

fn default_refresh_secs() -> u64 {
    60
}

fn default_email_host() -> String {
    "smtp.gmail.com".to_string()
}

fn default_email_port() -> u16 {
    587
}

// =============================================================================
// IndicatorParams
// =============================================================================

/// Window lengths and thresholds for the indicator engine.
///
/// These are the only inputs the engine takes besides the bars themselves,
/// so two runs with equal params over equal bars produce identical output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorParams {
    /// Fast EMA span for the MACD line.
    #[serde(default = "default_macd_fast")]
    pub macd_fast: usize,

    /// Slow EMA span for the MACD line.
    #[serde(default = "default_macd_slow")]
    pub macd_slow: usize,

    /// EMA span for the MACD signal line.
    #[serde(default = "default_macd_signal")]
    pub macd_signal: usize,

    /// Rolling window for RSI gain/loss averages.
    #[serde(default = "default_rsi_period")]
    pub rsi_period: usize,

    /// Rolling window for MFI flow sums.
    #[serde(default = "default_mfi_period")]
    pub mfi_period: usize,

    /// Short volume moving-average window (the surge reference).
    #[serde(default = "default_volume_ma_short")]
    pub volume_ma_short: usize,

    /// Long volume moving-average window (dashboard context only).
    #[serde(default = "default_volume_ma_long")]
    pub volume_ma_long: usize,

    /// Volume ratio above which a bar counts as a surge.
    #[serde(default = "default_volume_surge_ratio")]
    pub volume_surge_ratio: f64,

    /// RSI below this is oversold.
    #[serde(default = "default_rsi_oversold")]
    pub rsi_oversold: f64,

    /// RSI above this is overbought.
    #[serde(default = "default_rsi_overbought")]
    pub rsi_overbought: f64,

    /// MFI below this is oversold.
    #[serde(default = "default_mfi_oversold")]
    pub mfi_oversold: f64,

    /// MFI above this is overbought.
    #[serde(default = "default_mfi_overbought")]
    pub mfi_overbought: f64,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        Self {
            macd_fast: default_macd_fast(),
            macd_slow: default_macd_slow(),
            macd_signal: default_macd_signal(),
            rsi_period: default_rsi_period(),
            mfi_period: default_mfi_period(),
            volume_ma_short: default_volume_ma_short(),
            volume_ma_long: default_volume_ma_long(),
            volume_surge_ratio: default_volume_surge_ratio(),
            rsi_oversold: default_rsi_oversold(),
            rsi_overbought: default_rsi_overbought(),
            mfi_oversold: default_mfi_oversold(),
            mfi_overbought: default_mfi_overbought(),
        }
    }
}

// =============================================================================
// DataConfig
// =============================================================================

/// Historical-data fetch, resample, and storage settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Root directory for on-disk bar history and the alert log.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Bar interval requested from the provider.
    #[serde(default = "default_fetch_interval")]
    pub fetch_interval: String,

    /// History range requested from the provider.
    #[serde(default = "default_fetch_range")]
    pub fetch_range: String,

    /// Width of the resampled bars, in hours.
    #[serde(default = "default_resample_hours")]
    pub resample_hours: u32,

    /// Delay between provider requests (rate limiting).
    #[serde(default = "default_request_delay_ms")]
    pub request_delay_ms: u64,

    /// Number of symbols refreshed per batch.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// A symbol's data older than this is considered stale.
    #[serde(default = "default_stale_after_hours")]
    pub stale_after_hours: u32,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            fetch_interval: default_fetch_interval(),
            fetch_range: default_fetch_range(),
            resample_hours: default_resample_hours(),
            request_delay_ms: default_request_delay_ms(),
            batch_size: default_batch_size(),
            stale_after_hours: default_stale_after_hours(),
        }
    }
}

// =============================================================================
// AlertConfig / DashboardConfig / EmailConfig
// =============================================================================

/// Alert-log maintenance settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertConfig {
    /// Alert records older than this many days are pruned.
    #[serde(default = "default_retention_days")]
    pub retention_days: u32,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            retention_days: default_retention_days(),
        }
    }
}

/// Dashboard-facing cadence settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Seconds between scan-loop passes over the universe.
    #[serde(default = "default_refresh_secs")]
    pub refresh_secs: u64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            refresh_secs: default_refresh_secs(),
        }
    }
}

/// SMTP server settings. Credentials and recipients come from env.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    #[serde(default = "default_email_host")]
    pub host: String,

    #[serde(default = "default_email_port")]
    pub port: u16,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            host: default_email_host(),
            port: default_email_port(),
        }
    }
}

// =============================================================================
// RuntimeConfig
// =============================================================================

/// Top-level runtime configuration for the Nifty Sentinel engine.
///
/// Every field has a serde default so that older JSON files missing new
/// fields will still deserialise correctly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Symbols the engine watches and alerts on.
    #[serde(default = "default_symbols")]
    pub symbols: Vec<String>,

    /// Indicator windows and thresholds.
    #[serde(default)]
    pub indicators: IndicatorParams,

    /// Fetch/resample/storage settings.
    #[serde(default)]
    pub data: DataConfig,

    /// Alert-log maintenance settings.
    #[serde(default)]
    pub alerts: AlertConfig,

    /// Dashboard cadence settings.
    #[serde(default)]
    pub dashboard: DashboardConfig,

    /// SMTP server settings.
    #[serde(default)]
    pub email: EmailConfig,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            symbols: default_symbols(),
            indicators: IndicatorParams::default(),
            data: DataConfig::default(),
            alerts: AlertConfig::default(),
            dashboard: DashboardConfig::default(),
            email: EmailConfig::default(),
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from a JSON file at `path`.
    ///
    /// If the file does not exist, returns an error so the caller can fall
    /// back to defaults with a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read runtime config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse runtime config from {}", path.display()))?;

        info!(
            path = %path.display(),
            symbols = config.symbols.len(),
            "runtime config loaded"
        );

        Ok(config)
    }

    /// Persist the current configuration to `path` using an atomic write
    /// (write to `.tmp`, then rename).
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        let content = serde_json::to_string_pretty(self)
            .context("failed to serialise runtime config to JSON")?;

        let tmp_path = path.with_extension("json.tmp");

        std::fs::write(&tmp_path, &content)
            .with_context(|| format!("failed to write tmp config to {}", tmp_path.display()))?;

        std::fs::rename(&tmp_path, path)
            .with_context(|| format!("failed to rename tmp config to {}", path.display()))?;

        info!(path = %path.display(), "runtime config saved (atomic)");
        Ok(())
    }
}
