use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// One OHLCV bar from the candle provider.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub time: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    /// `(h + l + c) / 3`, the VWAP input.
    pub fn typical_price(&self) -> f64 {
        (self.high + self.low + self.close) / 3.0
    }

    /// Check the bar invariant: `l ≤ min(o,c) ≤ max(o,c) ≤ h`, volume ≥ 0.
    pub fn validate(&self) -> Result<()> {
        let body_low = self.open.min(self.close);
        let body_high = self.open.max(self.close);
        if !(self.low <= body_low && body_high <= self.high) {
            return Err(Error::MalformedData(format!(
                "bar at {} violates l ≤ min(o,c) ≤ max(o,c) ≤ h: o={} h={} l={} c={}",
                self.time, self.open, self.high, self.low, self.close
            )));
        }
        if self.volume < 0.0 || !self.volume.is_finite() {
            return Err(Error::MalformedData(format!(
                "bar at {} has invalid volume {}",
                self.time, self.volume
            )));
        }
        Ok(())
    }
}

/// Validate every bar plus the strictly-ascending timestamp ordering.
pub fn validate_series(candles: &[Candle]) -> Result<()> {
    for candle in candles {
        candle.validate()?;
    }
    for pair in candles.windows(2) {
        if pair[1].time <= pair[0].time {
            return Err(Error::MalformedData(format!(
                "series not strictly ascending: {} followed by {}",
                pair[0].time, pair[1].time
            )));
        }
    }
    Ok(())
}

/// Asset class of a recommendation's symbol. Drives provider ticker prefixing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(type_name = "TEXT", rename_all = "UPPERCASE")]
pub enum Market {
    Stock,
    Crypto,
    Forex,
}

impl std::fmt::Display for Market {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Market::Stock => write!(f, "STOCK"),
            Market::Crypto => write!(f, "CRYPTO"),
            Market::Forex => write!(f, "FOREX"),
        }
    }
}

/// Direction of a trade recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "TEXT", rename_all = "lowercase")]
pub enum Direction {
    Long,
    Short,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Long => write!(f, "long"),
            Direction::Short => write!(f, "short"),
        }
    }
}

/// Evaluation result of a recommendation. `Pending` is the only
/// non-terminal state; terminal states are never revisited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "TEXT", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Outcome {
    Pending,
    TargetHit,
    StopHit,
    Expired,
}

impl Outcome {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Outcome::Pending)
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Pending => write!(f, "PENDING"),
            Outcome::TargetHit => write!(f, "TARGET_HIT"),
            Outcome::StopHit => write!(f, "STOP_HIT"),
            Outcome::Expired => write!(f, "EXPIRED"),
        }
    }
}

/// A previously issued trade recommendation as stored in the database.
///
/// Created externally with `outcome = NULL`; the evaluator only ever writes
/// the outcome fields and `checked_at`.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct TradeRecommendation {
    pub id: String,
    pub symbol: String,
    pub market: Market,
    pub timeframe: String,
    pub direction: Direction,
    pub entry_price: f64,
    pub stop_price: f64,
    pub target1_price: Option<f64>,
    pub target2_price: Option<f64>,
    pub target3_price: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub outcome: Option<Outcome>,
    pub outcome_price: Option<f64>,
    pub outcome_time: Option<DateTime<Utc>>,
    /// Which target was reached (1–3), when `outcome = TARGET_HIT`.
    pub target_hit: Option<i32>,
    pub hours_to_outcome: Option<f64>,
    pub pnl_percentage: Option<f64>,
    pub checked_at: Option<DateTime<Utc>>,
}

impl TradeRecommendation {
    /// True while the recommendation is still evaluatable.
    pub fn is_unresolved(&self) -> bool {
        matches!(self.outcome, None | Some(Outcome::Pending))
    }
}

/// The classifier's output: a fresh outcome record to apply to the stored
/// recommendation. The input row is never mutated in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomePatch {
    pub outcome: Outcome,
    pub outcome_price: Option<f64>,
    pub outcome_time: Option<DateTime<Utc>>,
    pub target_hit: Option<i32>,
    pub hours_to_outcome: Option<f64>,
    pub pnl_percentage: Option<f64>,
    pub checked_at: DateTime<Utc>,
}

impl OutcomePatch {
    /// A no-hit result: only `checked_at` moves.
    pub fn pending(checked_at: DateTime<Utc>) -> Self {
        Self {
            outcome: Outcome::Pending,
            outcome_price: None,
            outcome_time: None,
            target_hit: None,
            hours_to_outcome: None,
            pnl_percentage: None,
            checked_at,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.outcome.is_terminal()
    }
}

/// MACD line, signal and histogram.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Macd {
    pub line: f64,
    pub signal: f64,
    pub hist: f64,
}

/// Bollinger Bands (SMA-20 mid, ±2 population stdev).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bollinger {
    pub mid: f64,
    pub upper: f64,
    pub lower: f64,
}

/// Donchian channel over the trailing window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Donchian {
    pub high: f64,
    pub low: f64,
}

/// `(t, c)` pair for the lightweight chart tail.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TailPoint {
    pub t: DateTime<Utc>,
    pub c: f64,
}

/// Derived indicator set for one symbol/timeframe at one point in time.
///
/// Optional fields serialize as explicit `null` when the supplied window is
/// too short, so consumers never branch on missing keys.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    pub symbol: String,
    pub timeframe: String,
    pub as_of: DateTime<Utc>,
    pub price: f64,
    pub prev_close: Option<f64>,
    /// EMA value keyed by period (20, 50, 200).
    pub ema: BTreeMap<u32, f64>,
    pub rsi14: f64,
    pub macd: Macd,
    pub bb20: Bollinger,
    pub atr14: f64,
    pub donchian20: Donchian,
    pub vol20_annual: Option<f64>,
    pub zscore20: Option<f64>,
    pub vwap: Option<f64>,
    pub tail: Vec<TailPoint>,
}

/// Aggregate counters returned by one evaluation batch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchCounters {
    pub processed: u32,
    pub target_hits: u32,
    pub stop_hits: u32,
    pub expired: u32,
}
