//! Test data factories for creating valid test fixtures.
//!
//! Each factory function creates a complete, valid object with sensible defaults.
//! Use the closure parameter to override specific fields as needed.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::{
    application::use_cases::{
        waitlist::WaitlistUseCases,
        waitlist_stats::{DailyStatsRepo, StatsAggregator},
    },
    domain::entities::{user_type::UserType, waitlist_entry::WaitlistEntry},
    use_cases::waitlist::WaitlistRepo,
};

/// Create a test waitlist entry with sensible defaults.
pub fn create_test_entry(overrides: impl FnOnce(&mut WaitlistEntry)) -> WaitlistEntry {
    let mut entry = WaitlistEntry {
        id: Uuid::new_v4(),
        email: format!("user-{}@example.com", Uuid::new_v4().simple()),
        user_type: UserType::Business,
        created_at: Utc::now(),
        ip_address: Some("198.51.100.1".to_string()),
        user_agent: Some("test-agent/1.0".to_string()),
        is_notified: false,
        notified_at: None,
    };
    overrides(&mut entry);
    entry
}

/// Wire the waitlist use cases over the given repos.
pub fn waitlist_use_cases(
    repo: Arc<dyn WaitlistRepo>,
    stats_repo: Arc<dyn DailyStatsRepo>,
) -> WaitlistUseCases {
    WaitlistUseCases::new(repo, StatsAggregator::new(stats_repo))
}
