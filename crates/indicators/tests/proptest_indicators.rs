use chrono::{Duration, TimeZone, Utc};
use common::Candle;
use indicators::compute_indicators;
use proptest::prelude::*;

fn candles_from_closes(closes: &[f64]) -> Vec<Candle> {
    let start = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| Candle {
            time: start + Duration::hours(i as i64),
            open: c,
            high: c * 1.01,
            low: c * 0.99,
            close: c,
            volume: 10.0,
        })
        .collect()
}

proptest! {
    /// Band ordering must hold for any window, including degraded short ones.
    #[test]
    fn bollinger_bands_are_ordered(
        closes in prop::collection::vec(0.01f64..100_000.0, 1..120)
    ) {
        let snap = compute_indicators("TEST", "1h", &candles_from_closes(&closes)).unwrap();
        prop_assert!(snap.bb20.lower <= snap.bb20.mid, "{:?}", snap.bb20);
        prop_assert!(snap.bb20.mid <= snap.bb20.upper, "{:?}", snap.bb20);
    }

    /// RSI stays in [0, 100] and is exactly 50 when history is too short.
    #[test]
    fn rsi_is_bounded(
        closes in prop::collection::vec(0.01f64..100_000.0, 1..120)
    ) {
        let snap = compute_indicators("TEST", "1h", &candles_from_closes(&closes)).unwrap();
        prop_assert!((0.0..=100.0).contains(&snap.rsi14), "rsi = {}", snap.rsi14);
        if closes.len() < 15 {
            prop_assert_eq!(snap.rsi14, 50.0);
        }
    }

    /// 21+ closes always produce a realized volatility.
    #[test]
    fn volatility_present_with_enough_history(
        closes in prop::collection::vec(0.01f64..100_000.0, 21..120)
    ) {
        let snap = compute_indicators("TEST", "1h", &candles_from_closes(&closes)).unwrap();
        prop_assert!(snap.vol20_annual.is_some());
        prop_assert!(snap.vol20_annual.unwrap() >= 0.0);
    }

    /// Under 20 closes both rolling statistics are null, never partial.
    #[test]
    fn short_series_nulls_optionals(
        closes in prop::collection::vec(0.01f64..100_000.0, 1..20)
    ) {
        let snap = compute_indicators("TEST", "1h", &candles_from_closes(&closes)).unwrap();
        prop_assert!(snap.vol20_annual.is_none());
        prop_assert!(snap.zscore20.is_none());
    }

    /// The histogram is definitionally line − signal.
    #[test]
    fn macd_histogram_consistent(
        closes in prop::collection::vec(0.01f64..100_000.0, 1..120)
    ) {
        let snap = compute_indicators("TEST", "1h", &candles_from_closes(&closes)).unwrap();
        let expected = snap.macd.line - snap.macd.signal;
        prop_assert!((snap.macd.hist - expected).abs() < 1e-9);
    }
}
