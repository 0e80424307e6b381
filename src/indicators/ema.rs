// =============================================================================
// Exponential Moving Average (EMA) — adjusted-weight recursion
// =============================================================================
//
// EMA gives more weight to recent observations, making it more responsive
// to new information than the Simple Moving Average.
//
// This implementation uses the adjusted-weight formulation:
//
//   alpha = 2 / (span + 1)
//   y_i   = sum_{j<=i} (1-alpha)^(i-j) * x_j  /  sum_{j<=i} (1-alpha)^(i-j)
//
// computed with running numerator/denominator accumulators, so a value is
// defined for every input index starting at 0.  Early values are dominated
// by the few observations seen so far; practical convergence to the
// steady-state EMA takes roughly `span` bars.
// =============================================================================

use super::IndicatorError;

/// Compute the adjusted-weight EMA of `values` for the given `span`.
///
/// The output has the same length as the input; index `i` of the output is
/// the EMA over inputs `0..=i`.  An empty input yields an empty output.
///
/// # Errors
/// - `BadWindow` when `span == 0`.
/// - `NonFinite` when an input value or an accumulator turns non-finite.
pub fn ewm_mean(values: &[f64], span: usize) -> Result<Vec<f64>, IndicatorError> {
    if span == 0 {
        return Err(IndicatorError::BadWindow {
            name: "span",
            value: span,
        });
    }

    let alpha = 2.0 / (span as f64 + 1.0);
    let decay = 1.0 - alpha;

    let mut result = Vec::with_capacity(values.len());
    let mut numerator = 0.0_f64;
    let mut denominator = 0.0_f64;

    for (i, &x) in values.iter().enumerate() {
        numerator = x + decay * numerator;
        denominator = 1.0 + decay * denominator;

        let y = numerator / denominator;
        if !y.is_finite() {
            return Err(IndicatorError::NonFinite { index: i });
        }
        result.push(y);
    }

    Ok(result)
}
