use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use common::{Candle, CandleProvider, Error, Market, Result};

use crate::symbol::provider_symbol;

/// REST client for the market-data service's OHLCV endpoint.
///
/// Every request carries the configured timeout; a timed-out fetch surfaces
/// as `Error::Http` and counts as a per-record failure upstream.
pub struct HttpCandleProvider {
    base_url: String,
    api_key: String,
    http: Client,
}

impl HttpCandleProvider {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout_secs: u64,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            api_key: api_key.into(),
            http: Client::builder()
                .use_rustls_tls()
                .timeout(Duration::from_secs(timeout_secs))
                .build()
                .expect("Failed to build HTTP client"),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CandleRow {
    t: i64,
    o: f64,
    h: f64,
    l: f64,
    c: f64,
    v: f64,
}

#[derive(Debug, Deserialize)]
struct CandleResponse {
    candles: Vec<CandleRow>,
}

fn into_candles(resp: CandleResponse) -> Result<Vec<Candle>> {
    resp.candles
        .into_iter()
        .map(|row| {
            let time = DateTime::<Utc>::from_timestamp_millis(row.t).ok_or_else(|| {
                Error::MalformedData(format!("candle timestamp out of range: {}", row.t))
            })?;
            Ok(Candle {
                time,
                open: row.o,
                high: row.h,
                low: row.l,
                close: row.c,
                volume: row.v,
            })
        })
        .collect()
}

#[async_trait]
impl CandleProvider for HttpCandleProvider {
    async fn candles(
        &self,
        symbol: &str,
        market: Market,
        timeframe: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Candle>> {
        let ticker = provider_symbol(symbol, market);
        debug!(ticker = %ticker, timeframe, "Fetching candle window");

        let url = format!("{}/candles", self.base_url);
        let resp = self
            .http
            .get(&url)
            .query(&[
                ("symbol", ticker.as_str()),
                ("timeframe", timeframe),
                ("from", &from.timestamp_millis().to_string()),
                ("to", &to.timestamp_millis().to_string()),
            ])
            .header("X-API-KEY", &self.api_key)
            .send()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| Error::Http(e.to_string()))?;
        if !status.is_success() {
            return Err(Error::Provider(format!("HTTP {status}: {body}")));
        }

        let parsed: CandleResponse = serde_json::from_str(&body)?;
        into_candles(parsed)
    }
}
