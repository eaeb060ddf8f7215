//! The indicator engine: one ordered candle series in, one
//! [`IndicatorSnapshot`] out. Deterministic, side-effect free, no I/O.
//!
//! Every indicator recomputes from the full supplied window; there is no
//! incremental state between calls. Short windows degrade to documented
//! neutral/fallback values instead of failing (see the per-indicator notes),
//! so a snapshot always comes back complete and well-typed.

use std::collections::BTreeMap;

use common::{Bollinger, Candle, Donchian, Error, IndicatorSnapshot, Macd, Result, TailPoint};

use crate::series;

const EMA_PERIODS: [u32; 3] = [20, 50, 200];
const RSI_PERIOD: usize = 14;
const MACD_FAST: usize = 12;
const MACD_SLOW: usize = 26;
const MACD_SIGNAL: usize = 9;
/// How many trailing MACD-line points feed the signal EMA. The signal must
/// be an EMA over the *series* of line values, so we keep enough history for
/// EMA-9 to converge.
const MACD_LINE_WINDOW: usize = 35;
const BB_PERIOD: usize = 20;
const ATR_PERIOD: usize = 14;
const DONCHIAN_PERIOD: usize = 20;
const VOL_PERIOD: usize = 20;
/// Trading days per year, for annualizing realized volatility.
const ANNUALIZATION_DAYS: f64 = 252.0;
const TAIL_LEN: usize = 50;

/// Compute the full indicator snapshot for one symbol/timeframe.
///
/// Requires at least one candle; returns [`Error::EmptySeries`] otherwise.
/// Candle validity (bar invariant, ordering) is the caller's concern — see
/// `common::validate_series`.
pub fn compute_indicators(
    symbol: &str,
    timeframe: &str,
    candles: &[Candle],
) -> Result<IndicatorSnapshot> {
    let last = candles.last().ok_or(Error::EmptySeries)?;
    let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();

    let prev_close = (candles.len() >= 2).then(|| candles[candles.len() - 2].close);

    let mut ema = BTreeMap::new();
    for period in EMA_PERIODS {
        ema.insert(period, series::ema(&closes, period as usize));
    }

    Ok(IndicatorSnapshot {
        symbol: symbol.to_string(),
        timeframe: timeframe.to_string(),
        as_of: last.time,
        price: last.close,
        prev_close,
        ema,
        rsi14: rsi(&closes, RSI_PERIOD),
        macd: macd(&closes),
        bb20: bollinger(&closes),
        atr14: atr(candles, ATR_PERIOD),
        donchian20: donchian(candles, DONCHIAN_PERIOD),
        vol20_annual: annual_volatility(&closes),
        zscore20: zscore(&closes),
        vwap: vwap(candles),
        tail: tail(candles),
    })
}

/// RSI with Wilder's smoothing: simple average of the first `period`
/// gains/losses, then weight `(period−1)/period` per subsequent step.
/// Returns the neutral 50 when fewer than `period + 1` closes exist.
fn rsi(closes: &[f64], period: usize) -> f64 {
    if closes.len() < period + 1 {
        return 50.0;
    }

    let changes: Vec<f64> = closes.windows(2).map(|w| w[1] - w[0]).collect();
    let initial = &changes[..period];

    let mut avg_gain = initial.iter().filter(|&&c| c > 0.0).sum::<f64>() / period as f64;
    let mut avg_loss =
        initial.iter().filter(|&&c| c < 0.0).map(|c| c.abs()).sum::<f64>() / period as f64;

    for &change in &changes[period..] {
        let gain = if change > 0.0 { change } else { 0.0 };
        let loss = if change < 0.0 { change.abs() } else { 0.0 };
        avg_gain = (avg_gain * (period - 1) as f64 + gain) / period as f64;
        avg_loss = (avg_loss * (period - 1) as f64 + loss) / period as f64;
    }

    if avg_loss == 0.0 {
        return 100.0;
    }
    let rs = avg_gain / avg_loss;
    100.0 - 100.0 / (1.0 + rs)
}

/// MACD line plus a signal computed over the trailing *series* of line
/// values. Computing the signal EMA over a single latest value would
/// collapse it to `signal == line`, `hist == 0`.
fn macd(closes: &[f64]) -> Macd {
    let points = closes.len().min(MACD_LINE_WINDOW);
    let line_series: Vec<f64> = (closes.len() - points..closes.len())
        .map(|i| {
            let slice = &closes[..=i];
            series::ema(slice, MACD_FAST) - series::ema(slice, MACD_SLOW)
        })
        .collect();

    let line = line_series[line_series.len() - 1];
    let signal = series::ema(&line_series, MACD_SIGNAL);
    Macd { line, signal, hist: line - signal }
}

/// Bollinger Bands: SMA-20 mid, ±2 population stdev. With fewer than 20
/// closes all three bands collapse to the mean of whatever is available.
fn bollinger(closes: &[f64]) -> Bollinger {
    if closes.len() < BB_PERIOD {
        let m = series::mean(closes);
        return Bollinger { mid: m, upper: m, lower: m };
    }
    let window = &closes[closes.len() - BB_PERIOD..];
    let mid = series::sma(closes, BB_PERIOD);
    let sd = series::stdev_population(window);
    Bollinger { mid, upper: mid + 2.0 * sd, lower: mid - 2.0 * sd }
}

/// Unweighted average of the last `period` true ranges. The first candle has
/// no previous close, so its true range is just `h − l`.
fn atr(candles: &[Candle], period: usize) -> f64 {
    let mut true_ranges = Vec::with_capacity(candles.len());
    let mut prev_close: Option<f64> = None;
    for candle in candles {
        let tr = match prev_close {
            Some(pc) => (candle.high - candle.low)
                .max((candle.high - pc).abs())
                .max((candle.low - pc).abs()),
            None => candle.high - candle.low,
        };
        true_ranges.push(tr);
        prev_close = Some(candle.close);
    }
    let window = &true_ranges[true_ranges.len().saturating_sub(period)..];
    series::mean(window)
}

/// Rolling high/low envelope over the last `period` (or fewer) candles.
fn donchian(candles: &[Candle], period: usize) -> Donchian {
    let window = &candles[candles.len().saturating_sub(period)..];
    let high = window.iter().map(|c| c.high).fold(f64::MIN, f64::max);
    let low = window.iter().map(|c| c.low).fold(f64::MAX, f64::min);
    Donchian { high, low }
}

/// Sample stdev of the last 20 log returns, annualized by √252.
/// `None` until 21 closes exist (20 returns need 21 prices).
fn annual_volatility(closes: &[f64]) -> Option<f64> {
    if closes.len() < VOL_PERIOD + 1 {
        return None;
    }
    let returns = series::log_returns(closes);
    let window = &returns[returns.len() - VOL_PERIOD..];
    Some(series::stdev_sample(window) * ANNUALIZATION_DAYS.sqrt())
}

/// `(last − mean20) / sample-stdev20`. `None` with fewer than 20 closes or a
/// zero stdev (flat window).
fn zscore(closes: &[f64]) -> Option<f64> {
    if closes.len() < VOL_PERIOD {
        return None;
    }
    let window = &closes[closes.len() - VOL_PERIOD..];
    let sd = series::stdev_sample(window);
    if sd == 0.0 {
        return None;
    }
    Some((closes[closes.len() - 1] - series::mean(window)) / sd)
}

/// Volume-weighted average of typical price across the entire window.
/// Session boundaries are the caller's concern (pass the window you mean).
/// `None` when the window carries no volume at all.
fn vwap(candles: &[Candle]) -> Option<f64> {
    let total_volume: f64 = candles.iter().map(|c| c.volume).sum();
    if total_volume == 0.0 {
        return None;
    }
    let weighted: f64 = candles.iter().map(|c| c.typical_price() * c.volume).sum();
    Some(weighted / total_volume)
}

/// Last ≤50 `(t, c)` pairs, ascending, for lightweight charting.
fn tail(candles: &[Candle]) -> Vec<TailPoint> {
    candles[candles.len().saturating_sub(TAIL_LEN)..]
        .iter()
        .map(|c| TailPoint { t: c.time, c: c.close })
        .collect()
}
