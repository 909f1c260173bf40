use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use crate::{
    adapters::persistence::PostgresPersistence,
    app_error::{AppError, AppResult},
    domain::entities::{
        user_type::UserType,
        waitlist_entry::{NewWaitlistEntry, WaitlistEntry},
    },
    use_cases::waitlist::{WaitlistCounts, WaitlistRepo},
};

const ENTRY_COLUMNS: &str =
    "id, email, user_type, created_at, ip_address, user_agent, is_notified, notified_at";

// Waitlist entry as stored in the db.
#[derive(FromRow, Debug)]
struct WaitlistEntryDb {
    id: Uuid,
    email: String,
    user_type: String,
    created_at: DateTime<Utc>,
    ip_address: Option<String>,
    user_agent: Option<String>,
    is_notified: bool,
    notified_at: Option<DateTime<Utc>>,
}

impl TryFrom<WaitlistEntryDb> for WaitlistEntry {
    type Error = AppError;

    fn try_from(row: WaitlistEntryDb) -> Result<Self, Self::Error> {
        let user_type = row.user_type.parse::<UserType>().map_err(|_| {
            AppError::Internal(format!(
                "waitlist entry {} has unknown user_type {:?}",
                row.id, row.user_type
            ))
        })?;

        Ok(WaitlistEntry {
            id: row.id,
            email: row.email,
            user_type,
            created_at: row.created_at,
            ip_address: row.ip_address,
            user_agent: row.user_agent,
            is_notified: row.is_notified,
            notified_at: row.notified_at,
        })
    }
}

#[derive(FromRow)]
struct WaitlistCountsDb {
    total: i64,
    business: i64,
    influencer: i64,
    recent_signups: i64,
}

#[async_trait]
impl WaitlistRepo for PostgresPersistence {
    async fn exists_by_email(&self, email: &str) -> AppResult<bool> {
        let exists: bool =
            sqlx::query_scalar(r#"SELECT EXISTS(SELECT 1 FROM waitlist_entries WHERE email = $1)"#)
                .bind(email)
                .fetch_one(self.pool())
                .await?;
        Ok(exists)
    }

    async fn insert(&self, entry: NewWaitlistEntry) -> AppResult<Option<WaitlistEntry>> {
        let id = Uuid::new_v4();
        let rec = sqlx::query_as::<_, WaitlistEntryDb>(&format!(
            r#"INSERT INTO waitlist_entries (id, email, user_type, ip_address, user_agent)
               VALUES ($1, $2, $3, $4, $5)
               ON CONFLICT (email) DO NOTHING
               RETURNING {ENTRY_COLUMNS}"#
        ))
        .bind(id)
        .bind(&entry.email)
        .bind(entry.user_type.as_str())
        .bind(entry.ip_address)
        .bind(entry.user_agent)
        .fetch_optional(self.pool())
        .await?;

        rec.map(WaitlistEntry::try_from).transpose()
    }

    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<WaitlistEntry>> {
        let rec = sqlx::query_as::<_, WaitlistEntryDb>(&format!(
            "SELECT {ENTRY_COLUMNS} FROM waitlist_entries WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await?;

        rec.map(WaitlistEntry::try_from).transpose()
    }

    async fn counts(&self, recent_since: DateTime<Utc>) -> AppResult<WaitlistCounts> {
        let rec = sqlx::query_as::<_, WaitlistCountsDb>(
            r#"SELECT COUNT(*) AS total,
                      COUNT(*) FILTER (WHERE user_type = 'business') AS business,
                      COUNT(*) FILTER (WHERE user_type = 'influencer') AS influencer,
                      COUNT(*) FILTER (WHERE created_at >= $1) AS recent_signups
               FROM waitlist_entries"#,
        )
        .bind(recent_since)
        .fetch_one(self.pool())
        .await?;

        Ok(WaitlistCounts {
            total: rec.total,
            business: rec.business,
            influencer: rec.influencer,
            recent_signups: rec.recent_signups,
        })
    }

    async fn list_recent(&self, limit: i64) -> AppResult<Vec<WaitlistEntry>> {
        let recs = sqlx::query_as::<_, WaitlistEntryDb>(&format!(
            r#"SELECT {ENTRY_COLUMNS}
               FROM waitlist_entries
               ORDER BY created_at DESC
               LIMIT $1"#
        ))
        .bind(limit)
        .fetch_all(self.pool())
        .await?;

        recs.into_iter().map(WaitlistEntry::try_from).collect()
    }

    async fn mark_notified(&self, id: Uuid, at: DateTime<Utc>) -> AppResult<Option<WaitlistEntry>> {
        let rec = sqlx::query_as::<_, WaitlistEntryDb>(&format!(
            r#"UPDATE waitlist_entries
               SET is_notified = TRUE, notified_at = $2
               WHERE id = $1 AND is_notified = FALSE
               RETURNING {ENTRY_COLUMNS}"#
        ))
        .bind(id)
        .bind(at)
        .fetch_optional(self.pool())
        .await?;

        rec.map(WaitlistEntry::try_from).transpose()
    }

    async fn mark_all_notified(&self, ids: &[Uuid], at: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query(
            r#"UPDATE waitlist_entries
               SET is_notified = TRUE, notified_at = $2
               WHERE id = ANY($1) AND is_notified = FALSE"#,
        )
        .bind(ids)
        .bind(at)
        .execute(self.pool())
        .await?;

        Ok(result.rows_affected())
    }
}
