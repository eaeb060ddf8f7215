use axum::{routing::get, Json, Router};
use serde_json::{json, Value};

use crate::AppState;

pub fn health_router() -> Router<AppState> {
    Router::new().route("/healthz", get(healthz))
}

/// Health check endpoint — used by deploy checks and ops scripts.
async fn healthz() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
