use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tracing::instrument;
use uuid::Uuid;

use crate::app_error::{AppError, AppResult, FieldErrors};
use crate::application::use_cases::waitlist_stats::StatsAggregator;
use crate::application::validators::{is_valid_email, normalize_email, parse_clamped};
use crate::domain::entities::{
    daily_stats::DailyStats,
    user_type::UserType,
    waitlist_entry::{NewWaitlistEntry, WaitlistEntry, truncate_user_agent},
};

pub const DUPLICATE_EMAIL_MESSAGE: &str = "This email is already on our waitlist";

const REQUIRED_FIELD_MESSAGE: &str = "This field is required.";
const INVALID_EMAIL_MESSAGE: &str = "Enter a valid email address.";

const RECENT_SIGNUPS_WINDOW_DAYS: i64 = 7;

pub const RECENT_LIMIT_DEFAULT: i64 = 10;
pub const RECENT_LIMIT_MAX: i64 = 50;
pub const DAILY_HISTORY_DEFAULT: i64 = 30;
pub const DAILY_HISTORY_MAX: i64 = 365;

// ============================================================================
// Repository Trait
// ============================================================================

#[async_trait]
pub trait WaitlistRepo: Send + Sync {
    async fn exists_by_email(&self, email: &str) -> AppResult<bool>;

    /// Inserts the entry unless the email is taken. `Ok(None)` means the
    /// storage-level unique constraint rejected it.
    async fn insert(&self, entry: NewWaitlistEntry) -> AppResult<Option<WaitlistEntry>>;

    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<WaitlistEntry>>;

    /// Live counts; `recent_signups` covers entries created at or after `recent_since`.
    async fn counts(&self, recent_since: DateTime<Utc>) -> AppResult<WaitlistCounts>;

    /// Newest first.
    async fn list_recent(&self, limit: i64) -> AppResult<Vec<WaitlistEntry>>;

    /// Flags the entry as notified if it is not already. Returns the updated
    /// entry, or `None` if nothing transitioned.
    async fn mark_notified(&self, id: Uuid, at: DateTime<Utc>) -> AppResult<Option<WaitlistEntry>>;

    /// Bulk form of [`WaitlistRepo::mark_notified`]; returns how many transitioned.
    async fn mark_all_notified(&self, ids: &[Uuid], at: DateTime<Utc>) -> AppResult<u64>;
}

// ============================================================================
// Result Types
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WaitlistCounts {
    pub total: i64,
    pub business: i64,
    pub influencer: i64,
    pub recent_signups: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct JoinedEntry {
    pub id: Uuid,
    pub email: String,
    pub user_type: UserType,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailCheck {
    pub exists: bool,
    pub email: String,
}

// ============================================================================
// Use Cases
// ============================================================================

#[derive(Clone)]
pub struct WaitlistUseCases {
    repo: Arc<dyn WaitlistRepo>,
    stats: StatsAggregator,
}

impl WaitlistUseCases {
    pub fn new(repo: Arc<dyn WaitlistRepo>, stats: StatsAggregator) -> Self {
        Self { repo, stats }
    }

    /// Adds an email to the waitlist.
    ///
    /// The existence pre-check only gives a cheap early answer; the insert
    /// itself is what guarantees uniqueness, and losing that race is reported
    /// as the same conflict.
    #[instrument(skip(self, user_agent))]
    pub async fn join(
        &self,
        raw_email: &str,
        raw_user_type: &str,
        ip_address: Option<&str>,
        user_agent: Option<&str>,
    ) -> AppResult<JoinedEntry> {
        let (email, user_type) = validate_join(raw_email, raw_user_type).inspect_err(|err| {
            tracing::warn!(error = ?err, "Invalid waitlist signup attempt");
        })?;

        if self.repo.exists_by_email(&email).await? {
            return Err(AppError::Conflict(DUPLICATE_EMAIL_MESSAGE.into()));
        }

        let new_entry = NewWaitlistEntry {
            email,
            user_type,
            ip_address: ip_address.map(str::to_string),
            user_agent: truncate_user_agent(user_agent),
        };

        let entry = match self.repo.insert(new_entry).await {
            Ok(Some(entry)) => entry,
            Ok(None) | Err(AppError::Conflict(_)) => {
                return Err(AppError::Conflict(DUPLICATE_EMAIL_MESSAGE.into()));
            }
            Err(err) => return Err(err),
        };

        // The rollup is derived data: a failure here must not undo the signup.
        let today = entry.created_at.date_naive();
        if let Err(err) = self.stats.record_signup(today, entry.user_type).await {
            tracing::error!(
                entry_id = %entry.id,
                date = %today,
                error = ?err,
                "Failed to update daily waitlist stats"
            );
        }

        tracing::info!(
            entry_id = %entry.id,
            email = %entry.email,
            user_type = %entry.user_type,
            "New waitlist signup"
        );

        Ok(JoinedEntry {
            id: entry.id,
            email: entry.email,
            user_type: entry.user_type,
        })
    }

    #[instrument(skip(self))]
    pub async fn stats(&self) -> AppResult<WaitlistCounts> {
        let since = Utc::now() - Duration::days(RECENT_SIGNUPS_WINDOW_DAYS);
        self.repo.counts(since).await
    }

    /// Latest signups. `raw_limit` comes straight from the query string.
    #[instrument(skip(self))]
    pub async fn recent(&self, raw_limit: Option<&str>) -> AppResult<Vec<WaitlistEntry>> {
        let limit = parse_clamped(raw_limit, RECENT_LIMIT_DEFAULT, 1, RECENT_LIMIT_MAX);
        self.repo.list_recent(limit).await
    }

    #[instrument(skip(self))]
    pub async fn check_email(&self, raw_email: &str) -> AppResult<EmailCheck> {
        let email = normalize_email(raw_email);
        if email.is_empty() {
            return Err(AppError::InvalidInput("Email parameter is required".into()));
        }

        let exists = self.repo.exists_by_email(&email).await?;
        Ok(EmailCheck { exists, email })
    }

    /// Day-bucketed rollups, newest first.
    #[instrument(skip(self))]
    pub async fn daily_history(&self, raw_days: Option<&str>) -> AppResult<Vec<DailyStats>> {
        let days = parse_clamped(raw_days, DAILY_HISTORY_DEFAULT, 1, DAILY_HISTORY_MAX);
        self.stats.history(days).await
    }

    /// Marks an entry as notified. `notified_at` is only ever written once.
    #[instrument(skip(self))]
    pub async fn mark_notified(&self, id: Uuid) -> AppResult<WaitlistEntry> {
        if let Some(entry) = self.repo.mark_notified(id, Utc::now()).await? {
            tracing::info!(entry_id = %entry.id, "Waitlist entry marked as notified");
            return Ok(entry);
        }

        self.repo.get_by_id(id).await?.ok_or(AppError::NotFound)
    }

    #[instrument(skip(self, ids), fields(requested = ids.len()))]
    pub async fn mark_all_notified(&self, ids: &[Uuid]) -> AppResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let updated = self.repo.mark_all_notified(ids, Utc::now()).await?;
        tracing::info!(updated, "Waitlist entries marked as notified");
        Ok(updated)
    }
}

// ============================================================================
// Private Helpers
// ============================================================================

/// Normalizes and validates both join fields, collecting every field error.
fn validate_join(raw_email: &str, raw_user_type: &str) -> AppResult<(String, UserType)> {
    let mut errors = FieldErrors::new();

    let email = normalize_email(raw_email);
    if email.is_empty() {
        errors.insert("email".into(), vec![REQUIRED_FIELD_MESSAGE.into()]);
    } else if !is_valid_email(&email) {
        errors.insert("email".into(), vec![INVALID_EMAIL_MESSAGE.into()]);
    }

    let user_type = if raw_user_type.trim().is_empty() {
        errors.insert("userType".into(), vec![REQUIRED_FIELD_MESSAGE.into()]);
        None
    } else {
        match raw_user_type.trim().parse::<UserType>() {
            Ok(user_type) => Some(user_type),
            Err(msg) => {
                errors.insert("userType".into(), vec![msg]);
                None
            }
        }
    };

    match user_type {
        Some(user_type) if errors.is_empty() => Ok((email, user_type)),
        _ => Err(AppError::Validation(errors)),
    }
}
