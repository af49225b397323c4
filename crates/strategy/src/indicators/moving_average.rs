/// Simple Moving Average of the last `period` closes.
/// Returns `None` if there are fewer than `period` values.
pub fn sma(closes: &[f64], period: usize) -> Option<f64> {
    if period == 0 || closes.len() < period {
        return None;
    }
    let window = &closes[closes.len() - period..];
    // Averaging offsets from the first close keeps a flat window exact.
    let anchor = window[0];
    let offset = window.iter().map(|c| c - anchor).sum::<f64>() / period as f64;
    Some(anchor + offset)
}

/// Exponential Moving Average at every index of `values`.
///
/// Smoothing factor `2 / (span + 1)`, seeded with the first value and carried
/// through the whole slice, not only the last `span` points.
pub fn ema_series(values: &[f64], span: usize) -> Vec<f64> {
    let Some(&first) = values.first() else {
        return Vec::new();
    };
    let alpha = 2.0 / (span as f64 + 1.0);

    let mut out = Vec::with_capacity(values.len());
    let mut ema_val = first;
    out.push(ema_val);
    for &value in &values[1..] {
        ema_val = alpha * value + (1.0 - alpha) * ema_val;
        out.push(ema_val);
    }
    out
}

/// Latest EMA value. Requires at least `span` closes.
pub fn ema(closes: &[f64], span: usize) -> Option<f64> {
    if span == 0 || closes.len() < span {
        return None;
    }
    ema_series(closes, span).last().copied()
}
