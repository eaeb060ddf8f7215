use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{Candle, Market, Result};

/// Abstraction over the market-data source.
///
/// `HttpCandleProvider` in `crates/provider` implements this against the real
/// endpoint, including the market-dependent ticker prefixing. The evaluation
/// runner only ever sees this trait, so tests can inject fakes.
#[async_trait]
pub trait CandleProvider: Send + Sync {
    /// Fetch an ascending OHLCV series for `symbol` covering `[from, to]`.
    ///
    /// An empty result means the provider has no data for the window; callers
    /// treat that the same as a fetch failure (record left pending).
    async fn candles(
        &self,
        symbol: &str,
        market: Market,
        timeframe: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Candle>>;
}
