use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{Extensions, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::{
    adapters::http::app_state::AppState, app_error::AppError, infra::RateLimitScope,
};

/// Key used for rate limiting when no client address can be determined.
const UNKNOWN_CLIENT: &str = "unknown";

/// Client addresses resolved once per request by [`rate_limit_middleware`].
///
/// `address` is what gets recorded with a signup: the first forwarded hop,
/// else the socket peer. `limiter_key` only honors forwarded headers when the
/// proxy is trusted, since clients can set them freely.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientIp {
    pub address: Option<String>,
    limiter_key: String,
}

impl ClientIp {
    pub fn resolve(headers: &HeaderMap, extensions: &Extensions, trust_proxy: bool) -> Self {
        let forwarded = forwarded_ip(headers);
        let peer = peer_ip(extensions);

        let limiter_key = if trust_proxy {
            forwarded.clone().or_else(|| peer.clone())
        } else {
            peer.clone()
        }
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string());

        Self {
            address: forwarded.or(peer),
            limiter_key,
        }
    }

    pub fn rate_limit_key(&self) -> &str {
        &self.limiter_key
    }
}

pub async fn rate_limit_middleware(
    State(app_state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let client_ip = ClientIp::resolve(
        request.headers(),
        request.extensions(),
        app_state.config.trust_proxy,
    );

    tracing::debug!(
        trust_proxy = app_state.config.trust_proxy,
        client_address = ?client_ip.address,
        limiter_key = %client_ip.rate_limit_key(),
        "Rate limiting request"
    );

    app_state
        .rate_limiter
        .check(RateLimitScope::Anonymous, client_ip.rate_limit_key())
        .await?;

    request.extensions_mut().insert(client_ip);

    Ok(next.run(request).await)
}

fn peer_ip(extensions: &Extensions) -> Option<String> {
    extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
}

fn forwarded_ip(headers: &HeaderMap) -> Option<String> {
    if let Some(forwarded) = headers.get("x-forwarded-for")
        && let Ok(val) = forwarded.to_str()
        && let Some(first) = val.split(',').next()
    {
        let trimmed = first.trim();
        if !trimmed.is_empty() {
            return Some(trimmed.to_string());
        }
    }
    if let Some(real) = headers.get("x-real-ip")
        && let Ok(val) = real.to_str()
        && !val.trim().is_empty()
    {
        return Some(val.trim().to_string());
    }
    None
}
