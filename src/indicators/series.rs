// =============================================================================
// Enriched Series — bars plus computed indicator columns
// =============================================================================
//
// The output of the indicator engine and the input to the signal detector
// and the dashboard.  Each family sits behind a `Result` so consumers can
// tell a family that failed outright from one that computed with warm-up
// gaps (`None` values inside the columns).
// =============================================================================

use serde::Serialize;

use crate::types::Bar;

use super::macd::MacdColumns;
use super::mfi::MfiColumns;
use super::rsi::RsiColumns;
use super::volume::VolumeColumns;
use super::IndicatorError;

/// A bar series augmented with per-bar indicator columns.
#[derive(Debug, Clone)]
pub struct EnrichedSeries {
    pub bars: Vec<Bar>,
    pub macd: Result<MacdColumns, IndicatorError>,
    pub rsi: Result<RsiColumns, IndicatorError>,
    pub mfi: Result<MfiColumns, IndicatorError>,
    pub volume: Result<VolumeColumns, IndicatorError>,
}

/// Snapshot of every indicator at the latest bar, with explicit `None` for
/// anything undefined.  This is what the detector evaluates and what the
/// dashboard renders.
#[derive(Debug, Clone, Default, Serialize)]
pub struct IndicatorSummary {
    pub macd_line: Option<f64>,
    pub macd_signal: Option<f64>,
    pub macd_histogram: Option<f64>,
    pub macd_bullish_crossover: bool,

    pub rsi: Option<f64>,
    pub rsi_oversold: bool,
    pub rsi_overbought: bool,

    pub mfi: Option<f64>,
    pub mfi_oversold: bool,
    pub mfi_overbought: bool,

    pub volume: Option<f64>,
    pub volume_ma_short: Option<f64>,
    pub volume_ma_long: Option<f64>,
    pub volume_ratio: Option<f64>,
    pub volume_surge: bool,
}

impl EnrichedSeries {
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// The most recent bar, if any.
    pub fn last_bar(&self) -> Option<&Bar> {
        self.bars.last()
    }

    /// Indicator values at the latest bar.
    ///
    /// Returns `None` for an empty series.  A failed family contributes
    /// only `None`/`false` fields — the summary never invents values.
    pub fn latest(&self) -> Option<IndicatorSummary> {
        if self.bars.is_empty() {
            return None;
        }
        let i = self.bars.len() - 1;
        let mut summary = IndicatorSummary {
            volume: Some(self.bars[i].volume),
            ..IndicatorSummary::default()
        };

        if let Ok(m) = &self.macd {
            summary.macd_line = Some(m.line[i]);
            summary.macd_signal = Some(m.signal[i]);
            summary.macd_histogram = Some(m.histogram[i]);
            summary.macd_bullish_crossover = m.bullish_crossover[i];
        }
        if let Ok(r) = &self.rsi {
            summary.rsi = r.rsi[i];
            summary.rsi_oversold = r.oversold[i];
            summary.rsi_overbought = r.overbought[i];
        }
        if let Ok(m) = &self.mfi {
            summary.mfi = m.mfi[i];
            summary.mfi_oversold = m.oversold[i];
            summary.mfi_overbought = m.overbought[i];
        }
        if let Ok(v) = &self.volume {
            summary.volume_ma_short = v.ma_short[i];
            summary.volume_ma_long = v.ma_long[i];
            summary.volume_ratio = v.ratio[i];
            summary.volume_surge = v.surge[i];
        }

        Some(summary)
    }
}
