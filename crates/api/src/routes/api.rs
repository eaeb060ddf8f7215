use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::warn;

use common::{validate_series, BatchCounters, Candle, Error, IndicatorSnapshot};
use indicators::compute_indicators;

use crate::AppState;

pub fn api_router() -> Router<AppState> {
    Router::new()
        .route("/api/indicators", post(post_indicators))
        .route("/api/evaluate", post(post_evaluate))
}

#[derive(Deserialize)]
struct IndicatorRequest {
    symbol: String,
    timeframe: String,
    candles: Vec<Candle>,
}

// ─── Indicators ──────────────────────────────────────────────────────────────

/// Compute the indicator snapshot for a supplied candle window. The caller
/// owns the window boundaries (and thereby the VWAP session).
async fn post_indicators(
    Json(req): Json<IndicatorRequest>,
) -> Result<Json<IndicatorSnapshot>, (StatusCode, Json<Value>)> {
    validate_series(&req.candles)
        .map_err(|e| reject(StatusCode::UNPROCESSABLE_ENTITY, &e))?;
    let snapshot = compute_indicators(&req.symbol, &req.timeframe, &req.candles)
        .map_err(|e| reject(StatusCode::UNPROCESSABLE_ENTITY, &e))?;
    Ok(Json(snapshot))
}

// ─── Evaluation ──────────────────────────────────────────────────────────────

/// Trigger one evaluation batch on demand (the scheduler runs the same pass
/// periodically). Returns the aggregate counters.
async fn post_evaluate(
    State(state): State<AppState>,
) -> Result<Json<BatchCounters>, (StatusCode, Json<Value>)> {
    match state.runner.evaluate_batch().await {
        Ok(counters) => Ok(Json(counters)),
        Err(e) => {
            warn!(error = %e, "On-demand evaluation failed");
            Err(reject(StatusCode::INTERNAL_SERVER_ERROR, &e))
        }
    }
}

fn reject(status: StatusCode, err: &Error) -> (StatusCode, Json<Value>) {
    (status, Json(json!({ "error": err.to_string() })))
}
