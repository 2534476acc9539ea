use std::sync::Arc;

use reqwest::header::HeaderMap;
use serde::Serialize;
use tokio::sync::Mutex;

/// Remaining quota at which a warning is logged.
const LOW_QUOTA_THRESHOLD: u32 = 10;

/// Last rate-limit figures reported by GitHub.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RateLimitSnapshot {
    pub limit: Option<u32>,
    pub remaining: Option<u32>,
    /// Unix timestamp at which the quota window resets.
    pub reset: Option<u64>,
}

/// Records `x-ratelimit-*` headers. Observation only: requests are never delayed.
#[derive(Clone, Default)]
pub struct RateLimiter {
    state: Arc<Mutex<RateLimitSnapshot>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn snapshot(&self) -> RateLimitSnapshot {
        *self.state.lock().await
    }

    pub async fn update_from_headers(&self, headers: &HeaderMap) {
        let read = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_owned)
        };

        let limit = read("x-ratelimit-limit").and_then(|v| v.parse().ok());
        let remaining = read("x-ratelimit-remaining").and_then(|v| v.parse().ok());
        let reset = read("x-ratelimit-reset").and_then(|v| v.parse().ok());

        self.record(limit, remaining, reset).await;
    }

    async fn record(&self, limit: Option<u32>, remaining: Option<u32>, reset: Option<u64>) {
        if limit.is_none() && remaining.is_none() && reset.is_none() {
            return;
        }

        let mut state = self.state.lock().await;
        state.limit = limit.or(state.limit);
        state.remaining = remaining.or(state.remaining);
        state.reset = reset.or(state.reset);

        if let Some(remaining) = remaining {
            if remaining <= LOW_QUOTA_THRESHOLD {
                tracing::warn!(
                    remaining,
                    reset = ?state.reset,
                    "GitHub rate limit nearly exhausted"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_record_keeps_previous_values_for_missing_headers() {
        let limiter = RateLimiter::new();
        limiter.record(Some(60), Some(59), Some(1_700_000_000)).await;
        limiter.record(None, Some(58), None).await;

        let snapshot = limiter.snapshot().await;
        assert_eq!(snapshot.limit, Some(60));
        assert_eq!(snapshot.remaining, Some(58));
        assert_eq!(snapshot.reset, Some(1_700_000_000));
    }

    #[tokio::test]
    async fn test_empty_update_is_ignored() {
        let limiter = RateLimiter::new();
        limiter.record(None, None, None).await;
        assert_eq!(limiter.snapshot().await, RateLimitSnapshot::default());
    }
}
