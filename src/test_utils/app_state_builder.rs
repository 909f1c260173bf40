//! Test app state builder for HTTP-level integration testing.
//!
//! This module provides `TestAppStateBuilder` which creates an `AppState`
//! backed by in-memory repositories.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::HeaderValue;
use secrecy::SecretString;

use crate::{
    adapters::http::app_state::AppState,
    domain::entities::waitlist_entry::WaitlistEntry,
    infra::{
        InMemoryRateLimiter, RateLimitPolicy, RateLimiterTrait, config::AppConfig,
    },
    test_utils::{InMemoryDailyStatsRepo, InMemoryWaitlistRepo, waitlist_use_cases},
};

/// Builder for creating `AppState` with in-memory mocks for testing.
///
/// # Example
///
/// ```ignore
/// let entry = create_test_entry(|e| e.email = "a@b.com".to_string());
///
/// let (app_state, entries, stats) = TestAppStateBuilder::new()
///     .with_entry(entry)
///     .build_with_mocks();
/// ```
pub struct TestAppStateBuilder {
    entries: Vec<WaitlistEntry>,
    rate_limiter: Option<Arc<dyn RateLimiterTrait>>,
    trust_proxy: bool,
}

impl TestAppStateBuilder {
    /// Create a builder with no entries and a limiter that never blocks.
    /// Forwarded headers are untrusted, matching the production default.
    pub fn new() -> Self {
        Self {
            entries: vec![],
            rate_limiter: None,
            trust_proxy: false,
        }
    }

    pub fn with_entry(mut self, entry: WaitlistEntry) -> Self {
        self.entries.push(entry);
        self
    }

    pub fn with_entries(mut self, entries: impl IntoIterator<Item = WaitlistEntry>) -> Self {
        self.entries.extend(entries);
        self
    }

    /// Swap in a limiter with real budgets (for rate limiting tests).
    pub fn with_rate_limiter(mut self, limiter: Arc<dyn RateLimiterTrait>) -> Self {
        self.rate_limiter = Some(limiter);
        self
    }

    pub fn with_trust_proxy(mut self, trust_proxy: bool) -> Self {
        self.trust_proxy = trust_proxy;
        self
    }

    /// Build the AppState and hand back the repos for test assertions.
    pub fn build_with_mocks(
        self,
    ) -> (
        AppState,
        Arc<InMemoryWaitlistRepo>,
        Arc<InMemoryDailyStatsRepo>,
    ) {
        let entries = Arc::new(InMemoryWaitlistRepo::with_entries(self.entries));
        let stats = Arc::new(InMemoryDailyStatsRepo::new(entries.clone()));

        let rate_limiter = self
            .rate_limiter
            .unwrap_or_else(|| Arc::new(InMemoryRateLimiter::permissive()));

        let policy = RateLimitPolicy::default();
        let config = Arc::new(AppConfig {
            database_url: SecretString::new("postgres://test".into()),
            db_max_connections: 1,
            bind_addr: "127.0.0.1:3001".parse::<SocketAddr>().unwrap(),
            cors_origin: HeaderValue::from_static("http://localhost:3000"),
            redis_url: None,
            trust_proxy: self.trust_proxy,
            rate_limit_window_secs: policy.window_secs,
            signup_rate_limit: policy.max_signup,
            anon_rate_limit: policy.max_anonymous,
            log_file: None,
        });

        let app_state = AppState {
            config,
            waitlist_use_cases: Arc::new(waitlist_use_cases(entries.clone(), stats.clone())),
            rate_limiter,
        };

        (app_state, entries, stats)
    }
}

impl Default for TestAppStateBuilder {
    fn default() -> Self {
        Self::new()
    }
}
