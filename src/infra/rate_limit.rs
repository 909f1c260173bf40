use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use redis::{Script, aio::ConnectionManager};

use super::InfraError;
use crate::app_error::{AppError, AppResult};

/// Which budget a request is charged against.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RateLimitScope {
    /// Waitlist join attempts.
    Signup,
    /// Any request to the public API.
    Anonymous,
}

impl RateLimitScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            RateLimitScope::Signup => "signup",
            RateLimitScope::Anonymous => "anon",
        }
    }

    fn key(&self, ip: &str) -> String {
        format!("rate:{}:ip:{ip}", self.as_str())
    }
}

/// Fixed-window budgets shared by all limiter backends.
#[derive(Clone, Copy, Debug)]
pub struct RateLimitPolicy {
    pub window_secs: u64,
    pub max_signup: u64,
    pub max_anonymous: u64,
}

impl RateLimitPolicy {
    pub fn limit_for(&self, scope: RateLimitScope) -> u64 {
        match scope {
            RateLimitScope::Signup => self.max_signup,
            RateLimitScope::Anonymous => self.max_anonymous,
        }
    }

    /// A policy that never rejects (for most tests).
    pub fn permissive() -> Self {
        Self {
            window_secs: 60,
            max_signup: u64::MAX,
            max_anonymous: u64::MAX,
        }
    }
}

impl Default for RateLimitPolicy {
    fn default() -> Self {
        Self {
            window_secs: 60,
            max_signup: 5,
            max_anonymous: 100,
        }
    }
}

/// Trait for rate limiting implementations.
#[async_trait]
pub trait RateLimiterTrait: Send + Sync {
    /// Charge one request from `ip` against `scope`.
    /// Returns Ok(()) if within limits, Err(AppError::RateLimited) if exceeded.
    async fn check(&self, scope: RateLimitScope, ip: &str) -> AppResult<()>;
}

/// Lua script for atomic increment with TTL.
/// Returns the new count after increment.
/// If the key doesn't exist, it's created with TTL.
/// If the key exists but has no TTL, TTL is set.
const INCR_WITH_TTL_SCRIPT: &str = r#"
local current = redis.call('INCR', KEYS[1])
if current == 1 then
    redis.call('EXPIRE', KEYS[1], ARGV[1])
elseif redis.call('TTL', KEYS[1]) == -1 then
    redis.call('EXPIRE', KEYS[1], ARGV[1])
end
return current
"#;

/// Redis-backed rate limiter, shared across service instances.
#[derive(Clone)]
pub struct RedisRateLimiter {
    manager: ConnectionManager,
    policy: RateLimitPolicy,
    script: Script,
}

impl RedisRateLimiter {
    pub async fn new(redis_url: &str, policy: RateLimitPolicy) -> Result<Self, InfraError> {
        let client = redis::Client::open(redis_url).map_err(InfraError::RedisConnection)?;
        let manager = ConnectionManager::new(client)
            .await
            .map_err(InfraError::RedisConnection)?;
        let script = Script::new(INCR_WITH_TTL_SCRIPT);
        Ok(Self {
            manager,
            policy,
            script,
        })
    }
}

#[async_trait]
impl RateLimiterTrait for RedisRateLimiter {
    async fn check(&self, scope: RateLimitScope, ip: &str) -> AppResult<()> {
        let mut conn = self.manager.clone();
        let current: u64 = self
            .script
            .key(scope.key(ip))
            .arg(self.policy.window_secs)
            .invoke_async(&mut conn)
            .await
            .map_err(|e| AppError::Internal(e.to_string()))?;

        if current > self.policy.limit_for(scope) {
            return Err(AppError::RateLimited);
        }

        Ok(())
    }
}

struct Window {
    started_at: Instant,
    count: u64,
}

/// In-process fixed-window limiter for single-instance deployments.
pub struct InMemoryRateLimiter {
    windows: Mutex<HashMap<String, Window>>,
    policy: RateLimitPolicy,
}

impl InMemoryRateLimiter {
    pub fn new(policy: RateLimitPolicy) -> Self {
        Self {
            windows: Mutex::new(HashMap::new()),
            policy,
        }
    }

    /// Create a permissive rate limiter that never blocks (for most tests).
    pub fn permissive() -> Self {
        Self::new(RateLimitPolicy::permissive())
    }

    fn check_at(&self, scope: RateLimitScope, ip: &str, now: Instant) -> AppResult<()> {
        let window_len = Duration::from_secs(self.policy.window_secs);
        let mut windows = self
            .windows
            .lock()
            .map_err(|_| AppError::Internal("rate limiter lock poisoned".into()))?;

        // Drop expired windows so the map stays bounded by active clients.
        windows.retain(|_, w| now.duration_since(w.started_at) < window_len);

        let window = windows.entry(scope.key(ip)).or_insert(Window {
            started_at: now,
            count: 0,
        });
        window.count += 1;

        if window.count > self.policy.limit_for(scope) {
            return Err(AppError::RateLimited);
        }

        Ok(())
    }
}

#[async_trait]
impl RateLimiterTrait for InMemoryRateLimiter {
    async fn check(&self, scope: RateLimitScope, ip: &str) -> AppResult<()> {
        self.check_at(scope, ip, Instant::now())
    }
}
