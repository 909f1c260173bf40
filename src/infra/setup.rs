use crate::{
    adapters::http::app_state::AppState,
    infra::{
        InfraError, config::AppConfig, postgres_persistence,
        rate_limit::{InMemoryRateLimiter, RateLimiterTrait, RedisRateLimiter},
    },
    use_cases::{
        waitlist::{WaitlistRepo, WaitlistUseCases},
        waitlist_stats::{DailyStatsRepo, StatsAggregator},
    },
};
use secrecy::ExposeSecret;
use std::fs::File;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub async fn init_app_state(config: AppConfig) -> Result<AppState, InfraError> {
    let postgres_arc = Arc::new(
        postgres_persistence(
            config.database_url.expose_secret(),
            config.db_max_connections,
        )
        .await?,
    );

    let policy = config.rate_limit_policy();
    let rate_limiter: Arc<dyn RateLimiterTrait> = match &config.redis_url {
        Some(redis_url) => {
            tracing::info!("Using Redis rate limiter");
            Arc::new(RedisRateLimiter::new(redis_url.expose_secret(), policy).await?)
        }
        None => {
            tracing::info!("REDIS_URL not set, using in-process rate limiter");
            Arc::new(InMemoryRateLimiter::new(policy))
        }
    };

    let waitlist_repo_arc = postgres_arc.clone() as Arc<dyn WaitlistRepo>;
    let stats_repo_arc = postgres_arc.clone() as Arc<dyn DailyStatsRepo>;

    let waitlist_use_cases =
        WaitlistUseCases::new(waitlist_repo_arc, StatsAggregator::new(stats_repo_arc));

    Ok(AppState {
        config: Arc::new(config),
        waitlist_use_cases: Arc::new(waitlist_use_cases),
        rate_limiter,
    })
}

pub fn init_tracing(log_file: Option<&str>) -> Result<(), InfraError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "waitlist_api=debug,tower_http=debug".into());

    // Console (pretty logs)
    let console_layer = fmt::layer()
        .with_target(false) // don't show target (module path)
        .with_level(true) // show log level
        .pretty(); // human-friendly, with colors

    // File (structured JSON logs), only when configured
    let json_layer = match log_file {
        Some(path) => {
            let file = File::create(path).map_err(|source| InfraError::LogFile {
                path: path.to_string(),
                source,
            })?;
            Some(
                fmt::layer()
                    .json()
                    .with_writer(file)
                    .with_current_span(true)
                    .with_span_list(true),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(json_layer)
        .try_init()
        .ok();

    Ok(())
}
