// =============================================================================
// Moving Average Convergence Divergence (MACD)
// =============================================================================
//
//   macd_line = EMA(close, fast) - EMA(close, slow)
//   signal    = EMA(macd_line, signal_span)
//   histogram = macd_line - signal
//
// A bullish crossover is flagged at bar i (i >= 1) when the line moves from
// at-or-below the signal to strictly above it:
//
//   line[i] > signal[i]  &&  line[i-1] <= signal[i-1]
//
// Bar 0 is never a crossover (no prior bar).
// =============================================================================

use crate::runtime_config::IndicatorParams;
use crate::types::Bar;

use super::{ema, IndicatorError};

/// Per-bar MACD output columns, aligned index-for-index with the input bars.
///
/// Under the adjusted-weight EMA recursion every column is defined from
/// bar 0, though values need roughly `slow` bars to converge.
#[derive(Debug, Clone, PartialEq)]
pub struct MacdColumns {
    pub line: Vec<f64>,
    pub signal: Vec<f64>,
    pub histogram: Vec<f64>,
    pub bullish_crossover: Vec<bool>,
}

/// Compute the MACD family for `bars`.
///
/// An empty series yields empty columns, not an error.
pub fn compute(bars: &[Bar], params: &IndicatorParams) -> Result<MacdColumns, IndicatorError> {
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();

    let fast = ema::ewm_mean(&closes, params.macd_fast)?;
    let slow = ema::ewm_mean(&closes, params.macd_slow)?;

    let line: Vec<f64> = fast.iter().zip(&slow).map(|(f, s)| f - s).collect();
    let signal = ema::ewm_mean(&line, params.macd_signal)?;
    let histogram: Vec<f64> = line.iter().zip(&signal).map(|(l, s)| l - s).collect();

    let mut bullish_crossover = vec![false; bars.len()];
    for i in 1..bars.len() {
        bullish_crossover[i] = line[i] > signal[i] && line[i - 1] <= signal[i - 1];
    }

    Ok(MacdColumns {
        line,
        signal,
        histogram,
        bullish_crossover,
    })
}
