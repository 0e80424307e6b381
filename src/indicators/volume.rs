// =============================================================================
// Volume indicators — rolling averages and surge detection
// =============================================================================
//
//   volume_ma_short = SMA(volume, short window)   (surge reference)
//   volume_ma_long  = SMA(volume, long window)    (dashboard context)
//   volume_ratio    = volume / volume_ma_short
//   volume_surge    = volume_ratio > surge threshold
//
// The ratio is undefined when the short MA is undefined or zero; the surge
// flag is false wherever the ratio is undefined.
// =============================================================================

use crate::runtime_config::IndicatorParams;
use crate::types::Bar;

use super::IndicatorError;

/// Per-bar volume output columns, aligned index-for-index with the input
/// bars.
#[derive(Debug, Clone, PartialEq)]
pub struct VolumeColumns {
    pub ma_short: Vec<Option<f64>>,
    pub ma_long: Vec<Option<f64>>,
    pub ratio: Vec<Option<f64>>,
    pub surge: Vec<bool>,
}

/// Compute the volume family for `bars`.
///
/// A series shorter than the short window yields all-undefined columns,
/// not an error.
pub fn compute(bars: &[Bar], params: &IndicatorParams) -> Result<VolumeColumns, IndicatorError> {
    if params.volume_ma_short == 0 {
        return Err(IndicatorError::BadWindow {
            name: "volume_ma_short",
            value: 0,
        });
    }
    if params.volume_ma_long == 0 {
        return Err(IndicatorError::BadWindow {
            name: "volume_ma_long",
            value: 0,
        });
    }

    let volumes: Vec<f64> = bars.iter().map(|b| b.volume).collect();
    if let Some(i) = volumes.iter().position(|v| !v.is_finite()) {
        return Err(IndicatorError::NonFinite { index: i });
    }

    let ma_short = rolling_mean(&volumes, params.volume_ma_short);
    let ma_long = rolling_mean(&volumes, params.volume_ma_long);

    let n = bars.len();
    let mut ratio = vec![None; n];
    let mut surge = vec![false; n];
    for i in 0..n {
        if let Some(ma) = ma_short[i] {
            if ma != 0.0 {
                let r = volumes[i] / ma;
                surge[i] = r > params.volume_surge_ratio;
                ratio[i] = Some(r);
            }
        }
    }

    Ok(VolumeColumns {
        ma_short,
        ma_long,
        ratio,
        surge,
    })
}

/// Simple rolling mean over `window` observations; `None` until the window
/// is full.
fn rolling_mean(values: &[f64], window: usize) -> Vec<Option<f64>> {
    let n = values.len();
    let mut result = vec![None; n];
    if n < window {
        return result;
    }

    let mut sum: f64 = values[..window].iter().sum();
    result[window - 1] = Some(sum / window as f64);
    for i in window..n {
        sum += values[i] - values[i - window];
        result[i] = Some(sum / window as f64);
    }
    result
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::test_support::{bars_from_ohlcv, params};

    fn bars_with_volumes(volumes: &[f64]) -> Vec<Bar> {
        bars_from_ohlcv(volumes.iter().map(|&v| (101.0, 99.0, 100.0, v)).collect())
    }

    #[test]
    fn empty_series_yields_empty_columns() {
        let cols = compute(&[], &params()).unwrap();
        assert!(cols.ratio.is_empty());
        assert!(cols.surge.is_empty());
    }

    #[test]
    fn zero_window_is_rejected() {
        let bars = bars_with_volumes(&[1.0, 2.0]);
        let mut p = params();
        p.volume_ma_short = 0;
        assert!(matches!(
            compute(&bars, &p),
            Err(IndicatorError::BadWindow { .. })
        ));
    }

    #[test]
    fn short_series_is_entirely_undefined() {
        let bars = bars_with_volumes(&vec![1000.0; 19]);
        let cols = compute(&bars, &params()).unwrap();
        assert!(cols.ma_short.iter().all(Option::is_none));
        assert!(cols.ratio.iter().all(Option::is_none));
        assert!(cols.surge.iter().all(|&f| !f));
    }

    #[test]
    fn long_ma_stays_undefined_when_only_short_window_fills() {
        // 30 bars: short (20) fills, long (50) never does.
        let bars = bars_with_volumes(&vec![1000.0; 30]);
        let cols = compute(&bars, &params()).unwrap();
        assert!(cols.ma_short[19].is_some());
        assert!(cols.ma_long.iter().all(Option::is_none));
    }

    #[test]
    fn rolling_mean_boundary_and_values() {
        let ma = rolling_mean(&[2.0, 4.0, 6.0, 8.0], 2);
        assert_eq!(ma[0], None);
        assert_eq!(ma[1], Some(3.0));
        assert_eq!(ma[2], Some(5.0));
        assert_eq!(ma[3], Some(7.0));
    }

    #[test]
    fn surge_fires_when_volume_spikes_above_twice_average() {
        // 20 bars at 1000 fill the short window, then one bar at 2500.
        // The final window covers 19x1000 + 2500, so the MA is 1075 and the
        // ratio comfortably clears the 2.0 threshold.
        let mut volumes = vec![1000.0; 20];
        volumes.push(2500.0);
        let bars = bars_with_volumes(&volumes);
        let cols = compute(&bars, &params()).unwrap();

        // Last bar's window: 19 bars of 1000 plus the 2500 bar.
        let last = volumes.len() - 1;
        let expected_ma = (19.0 * 1000.0 + 2500.0) / 20.0;
        assert!((cols.ma_short[last].unwrap() - expected_ma).abs() < 1e-10);
        let expected_ratio = 2500.0 / expected_ma;
        assert!((cols.ratio[last].unwrap() - expected_ratio).abs() < 1e-10);
        assert!(cols.surge[last], "ratio {expected_ratio} should surge");
    }

    #[test]
    fn ratio_of_two_and_a_half_with_ma_1000() {
        // The canonical check: short-window MA of 1000 and a current volume
        // of 2500 give ratio 2.5 and a surge.
        let mut p = params();
        p.volume_ma_short = 4;
        let volumes = vec![375.0, 375.0, 375.0, 750.0, 2500.0];
        // Final window: 375, 375, 750, 2500 => mean exactly 1000.
        let bars = bars_with_volumes(&volumes);
        let cols = compute(&bars, &p).unwrap();
        let last = volumes.len() - 1;
        assert!((cols.ma_short[last].unwrap() - 1000.0).abs() < 1e-10);
        assert!((cols.ratio[last].unwrap() - 2.5).abs() < 1e-10);
        assert!(cols.surge[last]);
    }

    #[test]
    fn flat_volume_never_surges() {
        let bars = bars_with_volumes(&vec![1000.0; 60]);
        let cols = compute(&bars, &params()).unwrap();
        for i in 19..60 {
            assert!((cols.ratio[i].unwrap() - 1.0).abs() < 1e-10);
        }
        assert!(cols.surge.iter().all(|&f| !f));
    }

    #[test]
    fn zero_average_volume_leaves_ratio_undefined() {
        // An illiquid stretch: all-zero volume makes the MA zero, which must
        // not produce an infinite ratio.
        let mut p = params();
        p.volume_ma_short = 3;
        let bars = bars_with_volumes(&[0.0, 0.0, 0.0, 0.0]);
        let cols = compute(&bars, &p).unwrap();
        assert!(cols.ma_short[3].is_some());
        assert!(cols.ratio.iter().all(Option::is_none));
        assert!(cols.surge.iter().all(|&f| !f));
    }
}
