use std::time::Instant;

use axum::extract::State;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::github::RateLimitSnapshot;
use crate::server::AppState;

/// Grace period a shared HTTP cache may serve a stale body while revalidating.
const STALE_WHILE_REVALIDATE_SECS: u64 = 60;

pub async fn github_stats(State(state): State<AppState>) -> Response {
    let payload = state.stats.get_or_refresh().await;

    if !payload.is_ok() {
        return (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response();
    }

    let directive = format!(
        "s-maxage={}, stale-while-revalidate={}",
        state.stats.ttl().as_secs(),
        STALE_WHILE_REVALIDATE_SECS
    );
    let mut response = (StatusCode::OK, Json(payload)).into_response();
    if let Ok(value) = HeaderValue::from_str(&directive) {
        response.headers_mut().insert(header::CACHE_CONTROL, value);
    }
    response
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub route: &'static str,
    pub cache: CacheStatus,
    pub rate_limit: RateLimitSnapshot,
}

#[derive(Debug, Serialize)]
pub struct CacheStatus {
    pub warm: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age_secs: Option<u64>,
}

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = Instant::now();
    let entry = state.stats.cache().get().await;
    let ttl = state.stats.ttl();

    let cache = CacheStatus {
        warm: entry.as_ref().is_some_and(|e| e.is_fresh(now, ttl)),
        age_secs: entry.map(|e| e.age(now).as_secs()),
    };

    Json(HealthResponse {
        ok: true,
        route: "health",
        cache,
        rate_limit: state.rate_limiter.snapshot().await,
    })
}
