// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free implementations of the indicators the engine
// alerts on.  Each family (MACD, RSI, MFI, volume) computes independently:
// a failure in one is recorded on the enriched series and logged, and the
// others still compute.  Within a computed family, warm-up bars are `None`
// — undefined means undefined, never a stand-in default.

pub mod ema;
pub mod macd;
pub mod mfi;
pub mod rsi;
pub mod series;
pub mod volume;

use tracing::warn;

use crate::runtime_config::IndicatorParams;
use crate::types::Bar;

pub use series::{EnrichedSeries, IndicatorSummary};

/// Why an indicator family could not be computed at all.
///
/// Warm-up gaps are not errors — they appear as `None` values inside the
/// computed columns.  An `IndicatorError` means the family produced nothing:
/// either the configuration is unusable or the input data is corrupt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndicatorError {
    /// A window/span parameter is zero.
    BadWindow { name: &'static str, value: usize },
    /// A non-finite value appeared in the input or a recurrence.
    NonFinite { index: usize },
}

impl std::fmt::Display for IndicatorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BadWindow { name, value } => {
                write!(f, "unusable window parameter {name} = {value}")
            }
            Self::NonFinite { index } => {
                write!(f, "non-finite value at bar index {index}")
            }
        }
    }
}

impl std::error::Error for IndicatorError {}

/// Compute every indicator family over `bars` and bundle the results into
/// an [`EnrichedSeries`].
///
/// Deterministic and idempotent: enriching the same bars with the same
/// params twice yields identical output.  A family that fails is logged and
/// carried as its `Err`; the remaining families are unaffected.
pub fn enrich(bars: Vec<Bar>, params: &IndicatorParams) -> EnrichedSeries {
    let macd = macd::compute(&bars, params);
    if let Err(e) = &macd {
        warn!(error = %e, "MACD computation failed");
    }

    let rsi = rsi::compute(&bars, params);
    if let Err(e) = &rsi {
        warn!(error = %e, "RSI computation failed");
    }

    let mfi = mfi::compute(&bars, params);
    if let Err(e) = &mfi {
        warn!(error = %e, "MFI computation failed");
    }

    let volume = volume::compute(&bars, params);
    if let Err(e) = &volume {
        warn!(error = %e, "volume indicator computation failed");
    }

    EnrichedSeries {
        bars,
        macd,
        rsi,
        mfi,
        volume,
    }
}

// =============================================================================
// Shared test fixtures
// =============================================================================
#[cfg(test)]
pub(crate) mod test_support {
    use chrono::{Duration, TimeZone, Utc};

    use crate::runtime_config::IndicatorParams;
    use crate::types::Bar;

    /// Default indicator parameters for tests.
    pub fn params() -> IndicatorParams {
        IndicatorParams::default()
    }

    /// Build a bar series from close prices alone; highs/lows straddle the
    /// close and volume is constant.
    pub fn bars_from_closes(closes: &[f64]) -> Vec<Bar> {
        bars_from_ohlcv(
            closes
                .iter()
                .map(|&c| (c + 1.0, c - 1.0, c, 10_000.0))
                .collect(),
        )
    }

    /// Build a bar series from (high, low, close, volume) tuples with
    /// 4-hourly timestamps.
    pub fn bars_from_ohlcv(rows: Vec<(f64, f64, f64, f64)>) -> Vec<Bar> {
        let start = Utc.with_ymd_and_hms(2026, 1, 5, 4, 0, 0).unwrap();
        rows.into_iter()
            .enumerate()
            .map(|(i, (high, low, close, volume))| Bar {
                timestamp: start + Duration::hours(4 * i as i64),
                open: close,
                high,
                low,
                close,
                volume,
            })
            .collect()
    }
}
