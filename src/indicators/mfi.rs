// =============================================================================
// Money Flow Index (MFI) — volume-weighted RSI variant
// =============================================================================
//
// typical_price = (high + low + close) / 3
// raw_flow      = typical_price * volume
//
// A bar's flow is classified positive when its typical price rose versus the
// prior bar, negative when it fell, and contributes to neither side when
// unchanged.  The first bar has no prior bar and contributes zero flow, so
// a full window of W flows is available from bar index W - 1.
//
//   MFR = positive_sum / negative_sum
//   MFI = 100 - 100 / (1 + MFR)
//
// Zero-denominator policy mirrors RSI:
//   negative_sum == 0 and positive_sum > 0  => MFI = 100
//   both zero                               => MFI = 50
// =============================================================================

use crate::runtime_config::IndicatorParams;
use crate::types::Bar;

use super::IndicatorError;

/// Per-bar MFI output columns, aligned index-for-index with the input bars.
#[derive(Debug, Clone, PartialEq)]
pub struct MfiColumns {
    pub mfi: Vec<Option<f64>>,
    pub oversold: Vec<bool>,
    pub overbought: Vec<bool>,
}

/// Compute the MFI family for `bars`.
///
/// A series shorter than `mfi_period` yields all-undefined columns, not an
/// error.
pub fn compute(bars: &[Bar], params: &IndicatorParams) -> Result<MfiColumns, IndicatorError> {
    let w = params.mfi_period;
    if w == 0 {
        return Err(IndicatorError::BadWindow {
            name: "mfi_period",
            value: w,
        });
    }

    let n = bars.len();
    let mut mfi = vec![None; n];
    let mut oversold = vec![false; n];
    let mut overbought = vec![false; n];

    if n >= w {
        let typical: Vec<f64> = bars
            .iter()
            .map(|b| (b.high + b.low + b.close) / 3.0)
            .collect();

        // Signed classification of each bar's raw flow.
        let mut positive = vec![0.0_f64; n];
        let mut negative = vec![0.0_f64; n];
        for i in 1..n {
            let flow = typical[i] * bars[i].volume;
            if !flow.is_finite() {
                return Err(IndicatorError::NonFinite { index: i });
            }
            if typical[i] > typical[i - 1] {
                positive[i] = flow;
            } else if typical[i] < typical[i - 1] {
                negative[i] = flow;
            }
            // Unchanged typical price contributes to neither side.
        }

        let mut pos_sum: f64 = positive[..w].iter().sum();
        let mut neg_sum: f64 = negative[..w].iter().sum();

        for bar_idx in (w - 1)..n {
            let value = mfi_from_sums(pos_sum, neg_sum)
                .ok_or(IndicatorError::NonFinite { index: bar_idx })?;

            mfi[bar_idx] = Some(value);
            oversold[bar_idx] = value < params.mfi_oversold;
            overbought[bar_idx] = value > params.mfi_overbought;

            if bar_idx + 1 < n {
                pos_sum += positive[bar_idx + 1] - positive[bar_idx + 1 - w];
                neg_sum += negative[bar_idx + 1] - negative[bar_idx + 1 - w];
            }
        }
    }

    Ok(MfiColumns {
        mfi,
        oversold,
        overbought,
    })
}

/// Convert windowed flow sums into an MFI value in [0, 100].
///
/// Returns `None` when the result is non-finite.
fn mfi_from_sums(pos_sum: f64, neg_sum: f64) -> Option<f64> {
    let mfi = if neg_sum == 0.0 && pos_sum == 0.0 {
        50.0
    } else if neg_sum == 0.0 {
        100.0
    } else {
        let mfr = pos_sum / neg_sum;
        100.0 - 100.0 / (1.0 + mfr)
    };

    mfi.is_finite().then_some(mfi)
}
