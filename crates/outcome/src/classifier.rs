//! Replays price history against a trade recommendation and classifies the
//! result. Pure: same inputs, same output, no I/O, input never mutated.

use chrono::{DateTime, Duration, Utc};

use common::{Candle, Direction, Outcome, OutcomePatch, TradeRecommendation};

/// Recommendations older than this are expired without scanning candles.
pub const EXPIRY_DAYS: i64 = 7;

const MS_PER_HOUR: f64 = 3_600_000.0;

/// True when the recommendation's evaluation window has lapsed.
pub fn is_expired(created_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    now - created_at > Duration::days(EXPIRY_DAYS)
}

/// Classify one unresolved recommendation against the candles spanning
/// `[created_at, now]`.
///
/// Scan order per candle is deliberate and load-bearing:
/// 1. the stop is tested before any target (conservative bias — a candle
///    whose range covers both resolves as `STOP_HIT`),
/// 2. targets are tested most-distant first (3 → 2 → 1), so a wide candle
///    records the best target it reached.
///
/// No match leaves the record `PENDING` with only `checked_at` moved.
pub fn classify(
    rec: &TradeRecommendation,
    candles: &[Candle],
    now: DateTime<Utc>,
) -> OutcomePatch {
    if is_expired(rec.created_at, now) {
        return OutcomePatch {
            outcome: Outcome::Expired,
            outcome_price: None,
            outcome_time: Some(now),
            target_hit: None,
            hours_to_outcome: None,
            pnl_percentage: None,
            checked_at: now,
        };
    }

    for candle in candles {
        let stop_hit = match rec.direction {
            Direction::Long => candle.low <= rec.stop_price,
            Direction::Short => candle.high >= rec.stop_price,
        };
        if stop_hit {
            return terminal(rec, Outcome::StopHit, rec.stop_price, None, candle.time, now);
        }

        if let Some((index, target_price)) = best_target_reached(rec, candle) {
            return terminal(
                rec,
                Outcome::TargetHit,
                target_price,
                Some(index),
                candle.time,
                now,
            );
        }
    }

    OutcomePatch::pending(now)
}

/// The most distant target this candle's range reached, if any.
fn best_target_reached(rec: &TradeRecommendation, candle: &Candle) -> Option<(i32, f64)> {
    let targets = [
        (3, rec.target3_price),
        (2, rec.target2_price),
        (1, rec.target1_price),
    ];
    for (index, target) in targets {
        let Some(target_price) = target else { continue };
        let reached = match rec.direction {
            Direction::Long => candle.high >= target_price,
            Direction::Short => candle.low <= target_price,
        };
        if reached {
            return Some((index, target_price));
        }
    }
    None
}

fn terminal(
    rec: &TradeRecommendation,
    outcome: Outcome,
    outcome_price: f64,
    target_hit: Option<i32>,
    hit_time: DateTime<Utc>,
    now: DateTime<Utc>,
) -> OutcomePatch {
    let pnl_percentage = match rec.direction {
        Direction::Long => (outcome_price - rec.entry_price) / rec.entry_price * 100.0,
        Direction::Short => (rec.entry_price - outcome_price) / rec.entry_price * 100.0,
    };
    let hours_to_outcome = (hit_time - rec.created_at).num_milliseconds() as f64 / MS_PER_HOUR;

    OutcomePatch {
        outcome,
        outcome_price: Some(outcome_price),
        outcome_time: Some(hit_time),
        target_hit,
        hours_to_outcome: Some(hours_to_outcome),
        pnl_percentage: Some(pnl_percentage),
        checked_at: now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::Market;

    fn rec_long(entry: f64, stop: f64, targets: [Option<f64>; 3]) -> TradeRecommendation {
        TradeRecommendation {
            id: "rec-1".into(),
            symbol: "AAPL".into(),
            market: Market::Stock,
            timeframe: "1h".into(),
            direction: Direction::Long,
            entry_price: entry,
            stop_price: stop,
            target1_price: targets[0],
            target2_price: targets[1],
            target3_price: targets[2],
            created_at: Utc::now() - Duration::hours(12),
            outcome: None,
            outcome_price: None,
            outcome_time: None,
            target_hit: None,
            hours_to_outcome: None,
            pnl_percentage: None,
            checked_at: None,
        }
    }

    fn rec_short(entry: f64, stop: f64, targets: [Option<f64>; 3]) -> TradeRecommendation {
        TradeRecommendation {
            direction: Direction::Short,
            ..rec_long(entry, stop, targets)
        }
    }

    fn candle_at(created: DateTime<Utc>, hours: i64, h: f64, l: f64) -> Candle {
        Candle {
            time: created + Duration::hours(hours),
            open: (h + l) / 2.0,
            high: h,
            low: l,
            close: (h + l) / 2.0,
            volume: 1.0,
        }
    }

    #[test]
    fn stop_checked_before_targets_in_same_candle() {
        // One candle spans the stop and all three targets. Conservative bias:
        // the stop wins.
        let rec = rec_long(100.0, 95.0, [Some(105.0), Some(110.0), Some(120.0)]);
        let candle = candle_at(rec.created_at, 2, 125.0, 90.0);
        let patch = classify(&rec, &[candle], Utc::now());

        assert_eq!(patch.outcome, Outcome::StopHit);
        assert_eq!(patch.outcome_price, Some(95.0));
        assert_eq!(patch.target_hit, None);
        assert!((patch.pnl_percentage.unwrap() - -5.0).abs() < 1e-9);
    }

    #[test]
    fn short_target_hit_at_target_price() {
        let rec = rec_short(50.0, 55.0, [Some(45.0), None, None]);
        let candle = candle_at(rec.created_at, 3, 52.0, 44.0);
        let patch = classify(&rec, &[candle], Utc::now());

        assert_eq!(patch.outcome, Outcome::TargetHit);
        assert_eq!(patch.target_hit, Some(1));
        assert_eq!(patch.outcome_price, Some(45.0));
        assert!((patch.pnl_percentage.unwrap() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn most_distant_target_wins_within_one_candle() {
        // Range covers targets 1 and 2 but not the stop: target 2 recorded.
        let rec = rec_long(100.0, 95.0, [Some(105.0), Some(110.0), Some(120.0)]);
        let candle = candle_at(rec.created_at, 2, 112.0, 96.0);
        let patch = classify(&rec, &[candle], Utc::now());

        assert_eq!(patch.outcome, Outcome::TargetHit);
        assert_eq!(patch.target_hit, Some(2));
        assert_eq!(patch.outcome_price, Some(110.0));
    }

    #[test]
    fn expiry_short_circuits_before_scanning() {
        let mut rec = rec_long(100.0, 95.0, [Some(105.0), None, None]);
        rec.created_at = Utc::now() - Duration::days(8);
        // This candle would be a target hit, but the window lapsed first.
        let candle = candle_at(rec.created_at, 2, 110.0, 99.0);
        let patch = classify(&rec, &[candle], Utc::now());

        assert_eq!(patch.outcome, Outcome::Expired);
        assert_eq!(patch.outcome_price, None);
        assert_eq!(patch.pnl_percentage, None);
    }

    #[test]
    fn no_hit_stays_pending_with_checked_at() {
        let rec = rec_long(100.0, 95.0, [Some(105.0), None, None]);
        let candles = [
            candle_at(rec.created_at, 1, 102.0, 98.0),
            candle_at(rec.created_at, 2, 103.0, 99.0),
        ];
        let now = Utc::now();
        let patch = classify(&rec, &candles, now);

        assert_eq!(patch, OutcomePatch::pending(now));
    }

    #[test]
    fn earliest_hitting_candle_decides() {
        // The stop is breached in hour 2, a target in hour 5: the scan stops
        // at the first terminal candle.
        let rec = rec_long(100.0, 95.0, [Some(105.0), None, None]);
        let candles = [
            candle_at(rec.created_at, 1, 101.0, 99.0),
            candle_at(rec.created_at, 2, 101.0, 94.0),
            candle_at(rec.created_at, 5, 110.0, 100.0),
        ];
        let patch = classify(&rec, &candles, Utc::now());

        assert_eq!(patch.outcome, Outcome::StopHit);
        assert_eq!(patch.outcome_time, Some(candles[1].time));
        assert!((patch.hours_to_outcome.unwrap() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn short_stop_precedence_mirrors_long() {
        let rec = rec_short(50.0, 55.0, [Some(45.0), None, None]);
        // Candle covers both the stop (high ≥ 55) and the target (low ≤ 45).
        let candle = candle_at(rec.created_at, 1, 56.0, 44.0);
        let patch = classify(&rec, &[candle], Utc::now());

        assert_eq!(patch.outcome, Outcome::StopHit);
        assert_eq!(patch.outcome_price, Some(55.0));
        assert!((patch.pnl_percentage.unwrap() - -10.0).abs() < 1e-9);
    }

    #[test]
    fn missing_targets_are_skipped() {
        // Only target2 configured; a candle reaching it records index 2.
        let rec = rec_long(100.0, 95.0, [None, Some(110.0), None]);
        let candle = candle_at(rec.created_at, 1, 111.0, 99.0);
        let patch = classify(&rec, &[candle], Utc::now());

        assert_eq!(patch.outcome, Outcome::TargetHit);
        assert_eq!(patch.target_hit, Some(2));
    }

    #[test]
    fn hours_to_outcome_uses_candle_time() {
        let rec = rec_long(100.0, 95.0, [Some(105.0), None, None]);
        let candle = candle_at(rec.created_at, 36, 106.0, 100.0);
        let patch = classify(&rec, &[candle], Utc::now());

        assert!((patch.hours_to_outcome.unwrap() - 36.0).abs() < 1e-9);
        assert!((patch.pnl_percentage.unwrap() - 5.0).abs() < 1e-9);
    }
}
