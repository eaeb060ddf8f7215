//! The evaluation batch runner: drives the classifier over a bounded set of
//! eligible recommendations per invocation.
//!
//! Collaborators are injected (no ambient singletons), so unit tests run
//! against fakes. Per-record failures are logged and never abort the batch;
//! an aborted run simply leaves the remainder for the next pass, which is
//! safe because terminal outcomes are written exactly once.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use common::{
    validate_series, BatchCounters, CandleProvider, Error, Outcome, OutcomePatch,
    RecommendationStore, Result, TradeRecommendation,
};

use crate::classifier;

/// Hard cap on records per run. Compiled-in back-pressure against an
/// unbounded backlog — not user-configurable.
pub const MAX_BATCH_SIZE: u32 = 50;

/// Recommendations younger than this are left alone.
pub const ELIGIBLE_AFTER_HOURS: i64 = 1;

#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Records per run; clamped to [`MAX_BATCH_SIZE`].
    pub batch_limit: u32,
    pub older_than_hours: i64,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            batch_limit: MAX_BATCH_SIZE,
            older_than_hours: ELIGIBLE_AFTER_HOURS,
        }
    }
}

/// One logical evaluation pass: select eligible → claim → fetch window →
/// classify → persist, aggregating counters.
pub struct EvaluationRunner {
    provider: Arc<dyn CandleProvider>,
    store: Arc<dyn RecommendationStore>,
    config: RunnerConfig,
}

impl EvaluationRunner {
    pub fn new(
        provider: Arc<dyn CandleProvider>,
        store: Arc<dyn RecommendationStore>,
        config: RunnerConfig,
    ) -> Self {
        Self { provider, store, config }
    }

    /// Run one batch. Only selection/claim infrastructure errors surface as
    /// `Err`; anything that fails for a single record is logged and skipped.
    pub async fn evaluate_batch(&self) -> Result<BatchCounters> {
        let limit = self.config.batch_limit.min(MAX_BATCH_SIZE);
        let eligible = self
            .store
            .select_eligible(limit, self.config.older_than_hours)
            .await?;
        info!(count = eligible.len(), "Evaluating recommendation batch");

        let mut counters = BatchCounters::default();
        for rec in &eligible {
            match self.evaluate_one(rec).await {
                Ok(Some(outcome)) => {
                    counters.processed += 1;
                    match outcome {
                        Outcome::TargetHit => counters.target_hits += 1,
                        Outcome::StopHit => counters.stop_hits += 1,
                        Outcome::Expired => counters.expired += 1,
                        Outcome::Pending => {}
                    }
                }
                Ok(None) => {
                    debug!(id = %rec.id, "Claim lost to a concurrent run; skipping");
                }
                Err(e) => {
                    warn!(
                        id = %rec.id,
                        symbol = %rec.symbol,
                        error = %e,
                        "Evaluation failed; record left for next run"
                    );
                }
            }
        }

        info!(
            processed = counters.processed,
            target_hits = counters.target_hits,
            stop_hits = counters.stop_hits,
            expired = counters.expired,
            "Batch complete"
        );
        Ok(counters)
    }

    /// Evaluate a single recommendation. `Ok(None)` means the optimistic
    /// claim failed and the record was skipped without any fetch work.
    async fn evaluate_one(&self, rec: &TradeRecommendation) -> Result<Option<Outcome>> {
        let now = Utc::now();

        if !self.store.claim(&rec.id, rec.checked_at, now).await? {
            return Ok(None);
        }

        let patch = self.classify_with_window(rec, now).await?;
        self.store.update_outcome(&rec.id, &patch).await?;

        if patch.is_terminal() {
            info!(
                id = %rec.id,
                symbol = %rec.symbol,
                outcome = %patch.outcome,
                pnl = ?patch.pnl_percentage,
                "Recommendation resolved"
            );
        }
        Ok(Some(patch.outcome))
    }

    async fn classify_with_window(
        &self,
        rec: &TradeRecommendation,
        now: chrono::DateTime<Utc>,
    ) -> Result<OutcomePatch> {
        // Expiry needs no candle data; skip the fetch entirely.
        if classifier::is_expired(rec.created_at, now) {
            return Ok(classifier::classify(rec, &[], now));
        }

        let candles = self
            .provider
            .candles(&rec.symbol, rec.market, &rec.timeframe, rec.created_at, now)
            .await?;
        if candles.is_empty() {
            return Err(Error::EmptySeries);
        }
        validate_series(&candles)?;

        Ok(classifier::classify(rec, &candles, now))
    }
}
