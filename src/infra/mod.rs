use crate::{adapters::persistence::PostgresPersistence, infra::db::init_db};

pub mod app;
pub mod config;
pub mod db;
mod error;
pub mod rate_limit;
pub mod setup;

pub use error::InfraError;
pub use rate_limit::{
    InMemoryRateLimiter, RateLimitPolicy, RateLimitScope, RateLimiterTrait, RedisRateLimiter,
};

pub async fn postgres_persistence(
    database_url: &str,
    max_connections: u32,
) -> Result<PostgresPersistence, InfraError> {
    let pool = init_db(database_url, max_connections).await?;
    let persistence = PostgresPersistence::new(pool);
    Ok(persistence)
}
