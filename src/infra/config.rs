use std::net::SocketAddr;

use axum::http::HeaderValue;
use env_helpers::{get_env, get_env_default};
use secrecy::SecretString;

use crate::infra::rate_limit::RateLimitPolicy;

pub struct AppConfig {
    pub database_url: SecretString,
    pub db_max_connections: u32,
    pub bind_addr: SocketAddr,
    pub cors_origin: HeaderValue,
    /// When unset, rate limit counters live in process memory.
    pub redis_url: Option<SecretString>,
    /// Whether to key rate limits on X-Forwarded-For / X-Real-IP. Set to true only
    /// when behind a reverse proxy that overwrites those headers.
    pub trust_proxy: bool,
    pub rate_limit_window_secs: u64,
    /// Join attempts allowed per client IP per window.
    pub signup_rate_limit: u64,
    /// Requests of any kind allowed per client IP per window.
    pub anon_rate_limit: u64,
    /// Optional path for structured JSON logs, in addition to the console.
    pub log_file: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let database_url = SecretString::new(get_env::<String>("DATABASE_URL").into());
        let db_max_connections: u32 = get_env_default("DB_MAX_CONNECTIONS", 5);

        let bind_addr: SocketAddr = get_env_default(
            "BIND_ADDR",
            SocketAddr::from(([127, 0, 0, 1], 3001)),
        );
        let cors_origin: HeaderValue =
            get_env_default("CORS_ORIGIN", String::from("http://localhost:3000"))
                .parse()
                .expect("CORS_ORIGIN must be a valid header value");

        let redis_url = std::env::var("REDIS_URL")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .map(|s| SecretString::new(s.into()));
        // Off unless explicitly enabled: clients choose forwarded headers themselves.
        let trust_proxy: bool = get_env_default("TRUST_PROXY", false);

        let rate_limit_window_secs: u64 = get_env_default("RATE_LIMIT_WINDOW_SECS", 60);
        let signup_rate_limit: u64 = get_env_default("SIGNUP_RATE_LIMIT", 5);
        let anon_rate_limit: u64 = get_env_default("ANON_RATE_LIMIT", 100);

        let log_file = std::env::var("LOG_FILE")
            .ok()
            .filter(|s| !s.trim().is_empty());

        Self {
            database_url,
            db_max_connections,
            bind_addr,
            cors_origin,
            redis_url,
            trust_proxy,
            rate_limit_window_secs,
            signup_rate_limit,
            anon_rate_limit,
            log_file,
        }
    }

    pub fn rate_limit_policy(&self) -> RateLimitPolicy {
        RateLimitPolicy {
            window_secs: self.rate_limit_window_secs,
            max_signup: self.signup_rate_limit,
            max_anonymous: self.anon_rate_limit,
        }
    }
}
