use std::sync::Arc;
use std::time::Duration;

use sqlx::SqlitePool;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use common::Config;
use outcome::{EvaluationRunner, RunnerConfig};
use provider::HttpCandleProvider;
use store::SqliteStore;

#[tokio::main]
async fn main() {
    // ── Logging ──────────────────────────────────────────────────────────────
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse().unwrap()))
        .init();

    // ── Config ───────────────────────────────────────────────────────────────
    let cfg = Config::from_env();
    info!(port = cfg.api_port, "Pulse evaluator starting");

    // ── Database ─────────────────────────────────────────────────────────────
    let db = SqlitePool::connect(&cfg.database_url)
        .await
        .unwrap_or_else(|e| panic!("Failed to connect to database: {e}"));
    sqlx::migrate!("../../migrations")
        .run(&db)
        .await
        .unwrap_or_else(|e| panic!("Database migration failed: {e}"));
    info!("Database ready");

    // ── Collaborators (injected, no ambient singletons) ──────────────────────
    let candle_provider = Arc::new(HttpCandleProvider::new(
        cfg.provider_base_url.clone(),
        cfg.provider_api_key.clone(),
        cfg.provider_timeout_secs,
    ));
    let rec_store = Arc::new(SqliteStore::new(db.clone()));
    let runner = Arc::new(EvaluationRunner::new(
        candle_provider,
        rec_store,
        RunnerConfig::default(),
    ));

    // ── Scheduled evaluation pass ────────────────────────────────────────────
    let scheduled = runner.clone();
    let interval = Duration::from_secs(cfg.eval_interval_secs);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            match scheduled.evaluate_batch().await {
                Ok(counters) => info!(
                    processed = counters.processed,
                    target_hits = counters.target_hits,
                    stop_hits = counters.stop_hits,
                    expired = counters.expired,
                    "Scheduled evaluation pass complete"
                ),
                Err(e) => error!(error = %e, "Scheduled evaluation pass failed"),
            }
        }
    });

    // ── API server ───────────────────────────────────────────────────────────
    let state = api::AppState { runner };
    tokio::spawn(api::serve(state, cfg.api_port));

    info!("All subsystems started. Waiting for shutdown signal.");
    tokio::signal::ctrl_c().await.unwrap();
    info!("Shutdown signal received. Exiting.");
}
