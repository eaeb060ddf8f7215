use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{OutcomePatch, Result, TradeRecommendation};

/// Abstraction over the recommendation store.
///
/// `SqliteStore` in `crates/store` is the real implementation. Writes are
/// idempotent: re-applying the same terminal outcome is harmless, and a
/// terminal row never goes back to pending.
#[async_trait]
pub trait RecommendationStore: Send + Sync {
    /// Unresolved recommendations older than `older_than_hours`, oldest
    /// first, capped at `limit`.
    async fn select_eligible(
        &self,
        limit: u32,
        older_than_hours: i64,
    ) -> Result<Vec<TradeRecommendation>>;

    /// Optimistic claim before the expensive fetch/classify work: bump
    /// `checked_at` to `now` only if the row is still unresolved and its
    /// `checked_at` equals what the caller saw at selection. Returns `false`
    /// when a concurrent run got there first.
    async fn claim(
        &self,
        id: &str,
        seen_checked_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Result<bool>;

    /// Apply the classifier's outcome. Terminal writes are guarded so an
    /// already-terminal row is never overwritten.
    async fn update_outcome(&self, id: &str, patch: &OutcomePatch) -> Result<()>;
}
