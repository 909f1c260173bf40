use axum::{
    Extension, Json, Router,
    extract::{Query, State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode, header::USER_AGENT},
    response::IntoResponse,
    routing::{get, post},
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    adapters::http::{app_state::AppState, middleware::ClientIp},
    app_error::{AppError, AppResult},
    domain::entities::{
        daily_stats::DailyStats, user_type::UserType, waitlist_entry::WaitlistEntry,
    },
    infra::RateLimitScope,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/join", post(join))
        .route("/stats", get(stats))
        .route("/recent", get(recent))
        .route("/check", get(check_email))
        .route("/daily", get(daily))
}

// ============================================================================
// Request / Response Types
// ============================================================================

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct JoinPayload {
    email: Option<String>,
    user_type: Option<String>,
}

#[derive(Serialize)]
struct JoinResponse {
    success: bool,
    message: &'static str,
    id: Uuid,
}

#[derive(Serialize)]
struct StatsResponse {
    total: i64,
    business: i64,
    influencer: i64,
    recent_signups: i64,
}

#[derive(Deserialize)]
struct RecentQuery {
    limit: Option<String>,
}

#[derive(Deserialize)]
struct CheckQuery {
    email: Option<String>,
}

#[derive(Deserialize)]
struct DailyQuery {
    days: Option<String>,
}

#[derive(Serialize)]
struct ListResponse<T> {
    count: usize,
    results: Vec<T>,
}

impl<T> From<Vec<T>> for ListResponse<T> {
    fn from(results: Vec<T>) -> Self {
        Self {
            count: results.len(),
            results,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RecentEntry {
    id: Uuid,
    email: String,
    user_type: UserType,
    created_at: DateTime<Utc>,
    days_on_waitlist: i64,
    is_notified: bool,
}

impl RecentEntry {
    fn from_entry(entry: WaitlistEntry, now: DateTime<Utc>) -> Self {
        Self {
            days_on_waitlist: entry.days_on_waitlist(now),
            id: entry.id,
            email: entry.email,
            user_type: entry.user_type,
            created_at: entry.created_at,
            is_notified: entry.is_notified,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DailyStatsItem {
    date: NaiveDate,
    total_signups: i64,
    business_signups: i64,
    influencer_signups: i64,
    cumulative_total: i64,
}

impl From<DailyStats> for DailyStatsItem {
    fn from(stats: DailyStats) -> Self {
        Self {
            date: stats.date,
            total_signups: stats.total_signups,
            business_signups: stats.business_signups,
            influencer_signups: stats.influencer_signups,
            cumulative_total: stats.cumulative_total,
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/waitlist/join
///
/// The signup budget is charged before the body is looked at.
async fn join(
    State(app_state): State<AppState>,
    Extension(client_ip): Extension<ClientIp>,
    headers: HeaderMap,
    payload: Result<Json<JoinPayload>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    app_state
        .rate_limiter
        .check(RateLimitScope::Signup, client_ip.rate_limit_key())
        .await?;

    let Json(payload) =
        payload.map_err(|rejection| AppError::field("body", rejection.body_text()))?;

    let user_agent = headers.get(USER_AGENT).and_then(|v| v.to_str().ok());

    let joined = app_state
        .waitlist_use_cases
        .join(
            payload.email.as_deref().unwrap_or_default(),
            payload.user_type.as_deref().unwrap_or_default(),
            client_ip.address.as_deref(),
            user_agent,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(JoinResponse {
            success: true,
            message: "Successfully joined the waitlist!",
            id: joined.id,
        }),
    ))
}

/// GET /api/waitlist/stats
async fn stats(State(app_state): State<AppState>) -> AppResult<impl IntoResponse> {
    let counts = app_state.waitlist_use_cases.stats().await?;

    Ok(Json(StatsResponse {
        total: counts.total,
        business: counts.business,
        influencer: counts.influencer,
        recent_signups: counts.recent_signups,
    }))
}

/// GET /api/waitlist/recent?limit=N
async fn recent(
    State(app_state): State<AppState>,
    Query(query): Query<RecentQuery>,
) -> AppResult<impl IntoResponse> {
    let entries = app_state
        .waitlist_use_cases
        .recent(query.limit.as_deref())
        .await?;

    let now = Utc::now();
    let results: Vec<RecentEntry> = entries
        .into_iter()
        .map(|entry| RecentEntry::from_entry(entry, now))
        .collect();

    Ok(Json(ListResponse::from(results)))
}

/// GET /api/waitlist/check?email=E
async fn check_email(
    State(app_state): State<AppState>,
    Query(query): Query<CheckQuery>,
) -> AppResult<impl IntoResponse> {
    let check = app_state
        .waitlist_use_cases
        .check_email(query.email.as_deref().unwrap_or_default())
        .await?;

    Ok(Json(serde_json::json!({
        "exists": check.exists,
        "email": check.email,
    })))
}

/// GET /api/waitlist/daily?days=N
async fn daily(
    State(app_state): State<AppState>,
    Query(query): Query<DailyQuery>,
) -> AppResult<impl IntoResponse> {
    let history = app_state
        .waitlist_use_cases
        .daily_history(query.days.as_deref())
        .await?;

    let results: Vec<DailyStatsItem> = history.into_iter().map(Into::into).collect();
    Ok(Json(ListResponse::from(results)))
}
