//! In-memory mock implementations for the waitlist repository traits.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::{
    app_error::{AppError, AppResult},
    application::use_cases::{
        waitlist::{WaitlistCounts, WaitlistRepo},
        waitlist_stats::DailyStatsRepo,
    },
    domain::entities::{
        daily_stats::DailyStats,
        user_type::UserType,
        waitlist_entry::{NewWaitlistEntry, WaitlistEntry},
    },
};

// ============================================================================
// InMemoryWaitlistRepo
// ============================================================================

/// In-memory implementation of WaitlistRepo for testing.
/// The uniqueness check and the insert share one lock, like a unique index.
#[derive(Default)]
pub struct InMemoryWaitlistRepo {
    pub entries: Mutex<Vec<WaitlistEntry>>,
}

impl InMemoryWaitlistRepo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the repo with initial entries for testing.
    pub fn with_entries(entries: Vec<WaitlistEntry>) -> Self {
        Self {
            entries: Mutex::new(entries),
        }
    }

    /// Get all entries (for test assertions).
    pub fn get_all(&self) -> Vec<WaitlistEntry> {
        self.entries.lock().unwrap().clone()
    }

    pub fn count(&self) -> i64 {
        self.entries.lock().unwrap().len() as i64
    }
}

#[async_trait]
impl WaitlistRepo for InMemoryWaitlistRepo {
    async fn exists_by_email(&self, email: &str) -> AppResult<bool> {
        Ok(self.entries.lock().unwrap().iter().any(|e| e.email == email))
    }

    async fn insert(&self, entry: NewWaitlistEntry) -> AppResult<Option<WaitlistEntry>> {
        let mut entries = self.entries.lock().unwrap();

        if entries.iter().any(|e| e.email == entry.email) {
            return Ok(None);
        }

        let stored = WaitlistEntry {
            id: Uuid::new_v4(),
            email: entry.email,
            user_type: entry.user_type,
            created_at: Utc::now(),
            ip_address: entry.ip_address,
            user_agent: entry.user_agent,
            is_notified: false,
            notified_at: None,
        };
        entries.push(stored.clone());
        Ok(Some(stored))
    }

    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<WaitlistEntry>> {
        Ok(self
            .entries
            .lock()
            .unwrap()
            .iter()
            .find(|e| e.id == id)
            .cloned())
    }

    async fn counts(&self, recent_since: DateTime<Utc>) -> AppResult<WaitlistCounts> {
        let entries = self.entries.lock().unwrap();
        let mut counts = WaitlistCounts::default();
        for entry in entries.iter() {
            counts.total += 1;
            match entry.user_type {
                UserType::Business => counts.business += 1,
                UserType::Influencer => counts.influencer += 1,
            }
            if entry.created_at >= recent_since {
                counts.recent_signups += 1;
            }
        }
        Ok(counts)
    }

    async fn list_recent(&self, limit: i64) -> AppResult<Vec<WaitlistEntry>> {
        let mut entries = self.get_all();
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        entries.truncate(limit.max(0) as usize);
        Ok(entries)
    }

    async fn mark_notified(&self, id: Uuid, at: DateTime<Utc>) -> AppResult<Option<WaitlistEntry>> {
        let mut entries = self.entries.lock().unwrap();
        let Some(entry) = entries.iter_mut().find(|e| e.id == id && !e.is_notified) else {
            return Ok(None);
        };
        entry.is_notified = true;
        entry.notified_at = Some(at);
        Ok(Some(entry.clone()))
    }

    async fn mark_all_notified(&self, ids: &[Uuid], at: DateTime<Utc>) -> AppResult<u64> {
        let mut entries = self.entries.lock().unwrap();
        let mut updated = 0;
        for entry in entries
            .iter_mut()
            .filter(|e| ids.contains(&e.id) && !e.is_notified)
        {
            entry.is_notified = true;
            entry.notified_at = Some(at);
            updated += 1;
        }
        Ok(updated)
    }
}

// ============================================================================
// InMemoryDailyStatsRepo
// ============================================================================

/// In-memory implementation of DailyStatsRepo for testing.
/// `cumulative_total` is recounted from the linked entry repo on each update.
pub struct InMemoryDailyStatsRepo {
    rows: Mutex<BTreeMap<NaiveDate, DailyStats>>,
    entries: Arc<InMemoryWaitlistRepo>,
    failures_remaining: AtomicUsize,
}

impl InMemoryDailyStatsRepo {
    pub fn new(entries: Arc<InMemoryWaitlistRepo>) -> Self {
        Self {
            rows: Mutex::new(BTreeMap::new()),
            entries,
            failures_remaining: AtomicUsize::new(0),
        }
    }

    /// Make the next `n` calls to `record_signup` fail without side effects.
    pub fn fail_next(&self, n: usize) {
        self.failures_remaining.store(n, Ordering::SeqCst);
    }

    /// Get the row for a date (for test assertions).
    pub fn get(&self, date: NaiveDate) -> Option<DailyStats> {
        self.rows.lock().unwrap().get(&date).cloned()
    }
}

#[async_trait]
impl DailyStatsRepo for InMemoryDailyStatsRepo {
    async fn record_signup(&self, date: NaiveDate, user_type: UserType) -> AppResult<DailyStats> {
        let should_fail = self
            .failures_remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if should_fail {
            return Err(AppError::Database("Database operation failed".into()));
        }

        let cumulative_total = self.entries.count();
        let mut rows = self.rows.lock().unwrap();
        let row = rows.entry(date).or_insert_with(|| DailyStats::empty(date));
        row.record(user_type);
        row.cumulative_total = cumulative_total;
        Ok(row.clone())
    }

    async fn list_recent(&self, days: i64) -> AppResult<Vec<DailyStats>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .values()
            .rev()
            .take(days.max(0) as usize)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::create_test_entry;

    fn new_entry(email: &str) -> NewWaitlistEntry {
        NewWaitlistEntry {
            email: email.to_string(),
            user_type: UserType::Business,
            ip_address: None,
            user_agent: None,
        }
    }

    #[tokio::test]
    async fn test_insert_rejects_duplicate_email() {
        let repo = InMemoryWaitlistRepo::new();

        assert!(repo.insert(new_entry("a@b.com")).await.unwrap().is_some());
        assert!(repo.insert(new_entry("a@b.com")).await.unwrap().is_none());
        assert_eq!(repo.count(), 1);
    }

    #[tokio::test]
    async fn test_fail_next_is_consumed() {
        let entries = Arc::new(InMemoryWaitlistRepo::with_entries(vec![create_test_entry(
            |_| {},
        )]));
        let repo = InMemoryDailyStatsRepo::new(entries);
        let date = NaiveDate::from_ymd_opt(2025, 8, 1).unwrap();
        repo.fail_next(1);

        assert!(repo.record_signup(date, UserType::Business).await.is_err());
        assert!(repo.get(date).is_none());

        let row = repo.record_signup(date, UserType::Business).await.unwrap();
        assert_eq!(row.total_signups, 1);
        assert_eq!(row.cumulative_total, 1);
    }
}
