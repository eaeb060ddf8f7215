//! SQLite-backed recommendation store.
//!
//! Writes are idempotent by construction: every outcome update is guarded by
//! `outcome IS NULL OR outcome = 'PENDING'`, so a terminal row can never be
//! overwritten, and re-applying the same patch is a no-op.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use common::{OutcomePatch, RecommendationStore, Result, TradeRecommendation};

const COLUMNS: &str = "id, symbol, market, timeframe, direction, entry_price, stop_price, \
                       target1_price, target2_price, target3_price, created_at, outcome, \
                       outcome_price, outcome_time, target_hit, hours_to_outcome, \
                       pnl_percentage, checked_at";

pub struct SqliteStore {
    db: SqlitePool,
}

impl SqliteStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Insert a recommendation row. The recommendation service owns creation;
    /// this is exposed for it and for test fixtures. Idempotent on `id`.
    pub async fn insert(&self, rec: &TradeRecommendation) -> Result<()> {
        sqlx::query(
            "INSERT INTO recommendations (id, symbol, market, timeframe, direction, \
             entry_price, stop_price, target1_price, target2_price, target3_price, \
             created_at, outcome, checked_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13) \
             ON CONFLICT(id) DO NOTHING",
        )
        .bind(&rec.id)
        .bind(&rec.symbol)
        .bind(rec.market)
        .bind(&rec.timeframe)
        .bind(rec.direction)
        .bind(rec.entry_price)
        .bind(rec.stop_price)
        .bind(rec.target1_price)
        .bind(rec.target2_price)
        .bind(rec.target3_price)
        .bind(rec.created_at)
        .bind(rec.outcome)
        .bind(rec.checked_at)
        .execute(&self.db)
        .await?;
        Ok(())
    }

    /// Fetch one row by id (dashboards, tests).
    pub async fn get(&self, id: &str) -> Result<Option<TradeRecommendation>> {
        let row = sqlx::query_as::<_, TradeRecommendation>(&format!(
            "SELECT {COLUMNS} FROM recommendations WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(row)
    }
}

#[async_trait]
impl RecommendationStore for SqliteStore {
    async fn select_eligible(
        &self,
        limit: u32,
        older_than_hours: i64,
    ) -> Result<Vec<TradeRecommendation>> {
        let cutoff = Utc::now() - Duration::hours(older_than_hours);
        let rows = sqlx::query_as::<_, TradeRecommendation>(&format!(
            "SELECT {COLUMNS} FROM recommendations \
             WHERE (outcome IS NULL OR outcome = 'PENDING') AND created_at < ?1 \
             ORDER BY created_at ASC LIMIT ?2"
        ))
        .bind(cutoff)
        .bind(limit)
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn claim(
        &self,
        id: &str,
        seen_checked_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE recommendations SET checked_at = ?1 \
             WHERE id = ?2 \
               AND (outcome IS NULL OR outcome = 'PENDING') \
               AND ((?3 IS NULL AND checked_at IS NULL) OR checked_at = ?3)",
        )
        .bind(now)
        .bind(id)
        .bind(seen_checked_at)
        .execute(&self.db)
        .await?;

        let claimed = result.rows_affected() > 0;
        if !claimed {
            debug!(id, "Claim refused — row resolved or touched since selection");
        }
        Ok(claimed)
    }

    async fn update_outcome(&self, id: &str, patch: &OutcomePatch) -> Result<()> {
        if patch.is_terminal() {
            sqlx::query(
                "UPDATE recommendations \
                 SET outcome = ?1, outcome_price = ?2, outcome_time = ?3, target_hit = ?4, \
                     hours_to_outcome = ?5, pnl_percentage = ?6, checked_at = ?7 \
                 WHERE id = ?8 AND (outcome IS NULL OR outcome = 'PENDING')",
            )
            .bind(patch.outcome)
            .bind(patch.outcome_price)
            .bind(patch.outcome_time)
            .bind(patch.target_hit)
            .bind(patch.hours_to_outcome)
            .bind(patch.pnl_percentage)
            .bind(patch.checked_at)
            .bind(id)
            .execute(&self.db)
            .await?;
        } else {
            sqlx::query(
                "UPDATE recommendations SET outcome = 'PENDING', checked_at = ?1 \
                 WHERE id = ?2 AND (outcome IS NULL OR outcome = 'PENDING')",
            )
            .bind(patch.checked_at)
            .bind(id)
            .execute(&self.db)
            .await?;
        }
        Ok(())
    }
}
