use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::FromRow;

use crate::{
    adapters::persistence::PostgresPersistence,
    app_error::AppResult,
    domain::entities::{daily_stats::DailyStats, user_type::UserType},
    use_cases::waitlist_stats::DailyStatsRepo,
};

#[derive(FromRow)]
struct DailyStatsDb {
    date: NaiveDate,
    total_signups: i64,
    business_signups: i64,
    influencer_signups: i64,
    cumulative_total: i64,
}

impl From<DailyStatsDb> for DailyStats {
    fn from(row: DailyStatsDb) -> Self {
        DailyStats {
            date: row.date,
            total_signups: row.total_signups,
            business_signups: row.business_signups,
            influencer_signups: row.influencer_signups,
            cumulative_total: row.cumulative_total,
        }
    }
}

#[async_trait]
impl DailyStatsRepo for PostgresPersistence {
    async fn record_signup(&self, date: NaiveDate, user_type: UserType) -> AppResult<DailyStats> {
        // ON CONFLICT DO UPDATE takes the row lock, so concurrent signups for
        // the same date queue up here instead of losing increments.
        let rec = sqlx::query_as::<_, DailyStatsDb>(
            r#"INSERT INTO waitlist_daily_stats AS s
                    (date, total_signups, business_signups, influencer_signups, cumulative_total)
               VALUES ($1, 1, $2, $3, (SELECT COUNT(*) FROM waitlist_entries))
               ON CONFLICT (date) DO UPDATE SET
                    total_signups = s.total_signups + 1,
                    business_signups = s.business_signups + EXCLUDED.business_signups,
                    influencer_signups = s.influencer_signups + EXCLUDED.influencer_signups,
                    cumulative_total = (SELECT COUNT(*) FROM waitlist_entries)
               RETURNING date, total_signups, business_signups, influencer_signups, cumulative_total"#,
        )
        .bind(date)
        .bind(i64::from(user_type.is_business()))
        .bind(i64::from(user_type.is_influencer()))
        .fetch_one(self.pool())
        .await?;

        Ok(rec.into())
    }

    async fn list_recent(&self, days: i64) -> AppResult<Vec<DailyStats>> {
        let recs = sqlx::query_as::<_, DailyStatsDb>(
            r#"SELECT date, total_signups, business_signups, influencer_signups, cumulative_total
               FROM waitlist_daily_stats
               ORDER BY date DESC
               LIMIT $1"#,
        )
        .bind(days)
        .fetch_all(self.pool())
        .await?;

        Ok(recs.into_iter().map(DailyStats::from).collect())
    }
}
