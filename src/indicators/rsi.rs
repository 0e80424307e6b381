// =============================================================================
// Relative Strength Index (RSI) — rolling simple means
// =============================================================================
//
// Step 1 — Per-bar close deltas; positive part is the gain, the absolute
//          value of the negative part is the loss.
// Step 2 — Simple moving average of gains and losses over `rsi_period`
//          deltas.
// Step 3 — RS  = avg_gain / avg_loss
//          RSI = 100 - 100 / (1 + RS)
//
// The first delta exists at bar 1, so a full window of W deltas is first
// available at bar index W; bars 0..W-1 are undefined.
//
// Zero-denominator policy (never a division fault):
//   avg_loss == 0 and avg_gain > 0  => RSI = 100
//   avg_loss == 0 and avg_gain == 0 => RSI = 50 (flat price, neutral)
// =============================================================================

use crate::runtime_config::IndicatorParams;
use crate::types::Bar;

use super::IndicatorError;

/// Per-bar RSI output columns, aligned index-for-index with the input bars.
///
/// `rsi[i]` is `None` for warm-up bars; the threshold flags are `false`
/// wherever the value is undefined.
#[derive(Debug, Clone, PartialEq)]
pub struct RsiColumns {
    pub rsi: Vec<Option<f64>>,
    pub oversold: Vec<bool>,
    pub overbought: Vec<bool>,
}

/// Compute the RSI family for `bars`.
///
/// A series shorter than `rsi_period + 1` yields all-undefined columns,
/// not an error.
pub fn compute(bars: &[Bar], params: &IndicatorParams) -> Result<RsiColumns, IndicatorError> {
    let w = params.rsi_period;
    if w == 0 {
        return Err(IndicatorError::BadWindow {
            name: "rsi_period",
            value: w,
        });
    }

    let n = bars.len();
    let mut rsi = vec![None; n];
    let mut oversold = vec![false; n];
    let mut overbought = vec![false; n];

    if n > w {
        // deltas[i] is the close change arriving at bar i+1.
        let mut gains = Vec::with_capacity(n - 1);
        let mut losses = Vec::with_capacity(n - 1);
        for i in 1..n {
            let delta = bars[i].close - bars[i - 1].close;
            if !delta.is_finite() {
                return Err(IndicatorError::NonFinite { index: i });
            }
            gains.push(delta.max(0.0));
            losses.push((-delta).max(0.0));
        }

        // Rolling sums over the last `w` deltas, updated incrementally.
        let mut gain_sum: f64 = gains[..w].iter().sum();
        let mut loss_sum: f64 = losses[..w].iter().sum();

        for bar_idx in w..n {
            let avg_gain = gain_sum / w as f64;
            let avg_loss = loss_sum / w as f64;

            let value = rsi_from_averages(avg_gain, avg_loss)
                .ok_or(IndicatorError::NonFinite { index: bar_idx })?;

            rsi[bar_idx] = Some(value);
            oversold[bar_idx] = value < params.rsi_oversold;
            overbought[bar_idx] = value > params.rsi_overbought;

            // Slide the window: drop the oldest delta, add the next one.
            if bar_idx + 1 < n {
                let oldest = bar_idx - w;
                gain_sum += gains[oldest + w] - gains[oldest];
                loss_sum += losses[oldest + w] - losses[oldest];
            }
        }
    }

    Ok(RsiColumns {
        rsi,
        oversold,
        overbought,
    })
}

/// Convert average gain / average loss into an RSI value in [0, 100].
///
/// Returns `None` when the result is non-finite.
fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> Option<f64> {
    let rsi = if avg_loss == 0.0 && avg_gain == 0.0 {
        50.0
    } else if avg_loss == 0.0 {
        100.0
    } else {
        let rs = avg_gain / avg_loss;
        100.0 - 100.0 / (1.0 + rs)
    };

    rsi.is_finite().then_some(rsi)
}
