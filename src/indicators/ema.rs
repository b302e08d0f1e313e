// =============================================================================
// Exponential Moving Average (EMA)
// =============================================================================
//
// EMA gives more weight to recent prices, making it more responsive to new
// information than the Simple Moving Average (SMA).
//
// Formula:
//   alpha  = 2 / (span + 1)
//   EMA_0  = close_0
//   EMA_t  = alpha * close_t + (1 - alpha) * EMA_{t-1}
//
// There is no warm-up window and no bias adjustment: the series is filled from
// the first observation, so the output always has the same length as the
// input.
// =============================================================================

/// Column name for the EMA of the given span, e.g. `ema_21`.
pub fn ema_name(span: usize) -> String {
    format!("ema_{span}")
}

/// Smoothing factor for a span.
pub fn alpha(span: usize) -> f64 {
    2.0 / (span as f64 + 1.0)
}

/// Compute the EMA series for `closes` with smoothing `span`.
///
/// The output is index-aligned with `closes`. `span` must be at least 1; the
/// caller validates this once at configuration time.
///
/// # Edge cases
/// - empty input => empty vec
/// - `span == 1` => alpha is 1, the EMA equals the closes
pub fn calculate_ema(closes: &[f64], span: usize) -> Vec<f64> {
    debug_assert!(span > 0, "EMA span must be positive");

    let Some((&first, rest)) = closes.split_first() else {
        return Vec::new();
    };

    let alpha = alpha(span);
    let mut result = Vec::with_capacity(closes.len());
    result.push(first);

    let mut prev_ema = first;
    for &close in rest {
        let ema = alpha * close + (1.0 - alpha) * prev_ema;
        result.push(ema);
        prev_ema = ema;
    }

    result
}
