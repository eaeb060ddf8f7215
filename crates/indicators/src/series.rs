//! Pure numeric helpers over price slices. No I/O, no shared state.

/// Arithmetic mean. Returns 0.0 for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Simple moving average of the last `period` values.
///
/// With fewer than `period` values, falls back to the most recent value —
/// a low-confidence degraded estimate, not a true SMA.
pub fn sma(values: &[f64], period: usize) -> f64 {
    if values.is_empty() || period == 0 {
        return 0.0;
    }
    if values.len() < period {
        return values[values.len() - 1];
    }
    values[values.len() - period..].iter().sum::<f64>() / period as f64
}

/// Exponential moving average: seeded with the SMA of the first `period`
/// values, then multiplier `2/(period+1)` applied forward through the rest.
///
/// With fewer than `period` values, falls back to the most recent value —
/// same degraded-estimate caveat as [`sma`].
pub fn ema(values: &[f64], period: usize) -> f64 {
    if values.is_empty() || period == 0 {
        return 0.0;
    }
    if values.len() < period {
        return values[values.len() - 1];
    }
    let k = 2.0 / (period as f64 + 1.0);
    let mut ema_val = values[..period].iter().sum::<f64>() / period as f64;
    for &value in &values[period..] {
        ema_val = value * k + ema_val * (1.0 - k);
    }
    ema_val
}

/// Population standard deviation (divide by N). Used for Bollinger Bands.
pub fn stdev_population(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Sample standard deviation (divide by N−1). Used for realized volatility
/// and the z-score. The population/sample split matches what downstream
/// consumers were calibrated against; do not unify the two.
pub fn stdev_sample(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let variance =
        values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}

/// `ln(p[i] / p[i-1])` for i ≥ 1. One element shorter than the input.
pub fn log_returns(prices: &[f64]) -> Vec<f64> {
    prices.windows(2).map(|w| (w[1] / w[0]).ln()).collect()
}
