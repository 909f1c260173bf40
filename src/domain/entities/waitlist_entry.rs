use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::user_type::UserType;

/// Longest user agent string kept with an entry, in characters.
pub const MAX_USER_AGENT_LEN: usize = 500;

#[derive(Debug, Clone, PartialEq)]
pub struct WaitlistEntry {
    pub id: Uuid,
    pub email: String,
    pub user_type: UserType,
    pub created_at: DateTime<Utc>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub is_notified: bool,
    pub notified_at: Option<DateTime<Utc>>,
}

impl WaitlistEntry {
    /// Whole days elapsed since signup, never negative.
    pub fn days_on_waitlist(&self, now: DateTime<Utc>) -> i64 {
        (now - self.created_at).num_days().max(0)
    }
}

/// An entry that has passed validation but has not been stored yet.
#[derive(Debug, Clone)]
pub struct NewWaitlistEntry {
    pub email: String,
    pub user_type: UserType,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

/// Cuts a raw user agent to [`MAX_USER_AGENT_LEN`] characters; blank input becomes `None`.
pub fn truncate_user_agent(raw: Option<&str>) -> Option<String> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }
    Some(raw.chars().take(MAX_USER_AGENT_LEN).collect())
}
