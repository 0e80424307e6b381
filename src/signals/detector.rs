// =============================================================================
// Signal Detector — latest-bar signal events
// =============================================================================
//
// Evaluates only the most recent bar of an enriched series and emits zero
// or more signals in a fixed order: MACD crossover, RSI oversold, RSI
// overbought, MFI oversold, volume surge.
//
// The MFI overbought flag is computed upstream and visible on the
// dashboard, but is not an alertable signal here.
//
// An undefined indicator value (warm-up, or a failed family) contributes
// no signal.
// =============================================================================

use crate::indicators::EnrichedSeries;
use crate::types::{Signal, SignalKind, SignalStrength};

/// Detect signal events on the latest bar of `series`.
///
/// An empty series yields an empty list, not an error.
pub fn detect(series: &EnrichedSeries) -> Vec<Signal> {
    let Some(latest) = series.latest() else {
        return Vec::new();
    };

    let mut signals = Vec::new();

    if latest.macd_bullish_crossover {
        signals.push(Signal {
            kind: SignalKind::MacdBullish,
            message: "MACD bullish crossover detected".to_string(),
            strength: SignalStrength::Medium,
        });
    }

    if let Some(rsi) = latest.rsi {
        if latest.rsi_oversold {
            signals.push(Signal {
                kind: SignalKind::RsiOversold,
                message: format!("RSI oversold: {rsi:.2}"),
                strength: SignalStrength::High,
            });
        }
        if latest.rsi_overbought {
            signals.push(Signal {
                kind: SignalKind::RsiOverbought,
                message: format!("RSI overbought: {rsi:.2}"),
                strength: SignalStrength::High,
            });
        }
    }

    if let Some(mfi) = latest.mfi {
        if latest.mfi_oversold {
            signals.push(Signal {
                kind: SignalKind::MfiOversold,
                message: format!("MFI oversold: {mfi:.2}"),
                strength: SignalStrength::Medium,
            });
        }
    }

    if let Some(ratio) = latest.volume_ratio {
        if latest.volume_surge {
            signals.push(Signal {
                kind: SignalKind::VolumeSurge,
                message: format!("Volume surge: {ratio:.2}x average"),
                strength: SignalStrength::Medium,
            });
        }
    }

    signals
}
