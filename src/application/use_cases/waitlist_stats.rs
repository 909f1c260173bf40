use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::instrument;

use crate::app_error::AppResult;
use crate::domain::entities::{daily_stats::DailyStats, user_type::UserType};

#[async_trait]
pub trait DailyStatsRepo: Send + Sync {
    /// Get-or-create the row for `date`, add one signup of `user_type` and
    /// recount `cumulative_total` from the entry table, atomically.
    async fn record_signup(&self, date: NaiveDate, user_type: UserType) -> AppResult<DailyStats>;

    /// Most recent `days` rows, newest first.
    async fn list_recent(&self, days: i64) -> AppResult<Vec<DailyStats>>;
}

/// Maintains the per-day rollups after each new entry.
#[derive(Clone)]
pub struct StatsAggregator {
    repo: Arc<dyn DailyStatsRepo>,
}

impl StatsAggregator {
    pub fn new(repo: Arc<dyn DailyStatsRepo>) -> Self {
        Self { repo }
    }

    #[instrument(skip(self))]
    pub async fn record_signup(&self, date: NaiveDate, user_type: UserType) -> AppResult<DailyStats> {
        let stats = self.repo.record_signup(date, user_type).await?;
        tracing::debug!(
            date = %stats.date,
            total_signups = stats.total_signups,
            cumulative_total = stats.cumulative_total,
            "Daily waitlist stats updated"
        );
        Ok(stats)
    }

    #[instrument(skip(self))]
    pub async fn history(&self, days: i64) -> AppResult<Vec<DailyStats>> {
        self.repo.list_recent(days).await
    }
}
