use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::future::{BoxFuture, FutureExt, Shared};
use tokio::sync::Mutex;

use crate::analysis::aggregator::StatsAggregator;
use crate::cache::{CacheEntry, PayloadCache};
use crate::config::DEFAULT_CACHE_TTL;
use crate::error::Result;
use crate::github::ProfileSource;
use crate::models::{FailureKind, ProfileStats, StatsFailure, StatsPayload};

type Flight = Shared<BoxFuture<'static, StatsPayload>>;

/// Serves the aggregated payload from cache, refreshing it from the
/// upstream source once the entry is older than the TTL.
///
/// Concurrent misses join a single in-flight refresh. The refresh runs on
/// its own task, so it completes even if every caller goes away.
pub struct StatsService {
    source: Arc<dyn ProfileSource>,
    cache: Arc<dyn PayloadCache>,
    aggregator: StatsAggregator,
    account: Option<String>,
    ttl: Duration,
    in_flight: Arc<Mutex<Option<(u64, Flight)>>>,
    next_flight: AtomicU64,
}

impl StatsService {
    pub fn new(
        source: Arc<dyn ProfileSource>,
        cache: Arc<dyn PayloadCache>,
        account: Option<String>,
    ) -> Self {
        Self {
            source,
            cache,
            aggregator: StatsAggregator::new(),
            account,
            ttl: DEFAULT_CACHE_TTL,
            in_flight: Arc::new(Mutex::new(None)),
            next_flight: AtomicU64::new(0),
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn cache(&self) -> &Arc<dyn PayloadCache> {
        &self.cache
    }

    pub async fn get_or_refresh(&self) -> StatsPayload {
        self.get_or_refresh_at(Instant::now()).await
    }

    pub async fn get_or_refresh_at(&self, now: Instant) -> StatsPayload {
        if let Some(entry) = self.cache.get().await {
            if entry.is_fresh(now, self.ttl) {
                tracing::debug!(age = ?entry.age(now), "Serving cached profile stats");
                return StatsPayload::Ready(entry.payload);
            }
        }

        let Some(account) = self.account.clone() else {
            tracing::warn!("GITHUB_USERNAME is not configured");
            return StatsPayload::Failed(StatsFailure::configuration("Missing GITHUB_USERNAME"));
        };

        self.join_or_start(account, now).await.await
    }

    async fn join_or_start(&self, account: String, now: Instant) -> Flight {
        let mut slot = self.in_flight.lock().await;

        if let Some((_, current)) = slot.as_ref() {
            tracing::debug!("Joining in-flight refresh");
            return current.clone();
        }

        let id = self.next_flight.fetch_add(1, Ordering::Relaxed);
        let source = Arc::clone(&self.source);
        let cache = Arc::clone(&self.cache);
        let aggregator = self.aggregator;
        let in_flight = Arc::clone(&self.in_flight);

        // The slot lock is held until the flight is stored, so the task
        // cannot clear it before it is set.
        let task = tokio::spawn(async move {
            let payload = refresh(source, cache, aggregator, account, now).await;

            let mut slot = in_flight.lock().await;
            if slot.as_ref().is_some_and(|(current, _)| *current == id) {
                *slot = None;
            }
            payload
        });

        let flight = async move {
            match task.await {
                Ok(payload) => payload,
                Err(e) => {
                    tracing::error!("Refresh task failed: {}", e);
                    StatsPayload::Failed(StatsFailure {
                        kind: FailureKind::UpstreamError,
                        detail: format!("refresh task failed: {}", e),
                    })
                }
            }
        }
        .boxed()
        .shared();

        *slot = Some((id, flight.clone()));
        flight
    }
}

async fn refresh(
    source: Arc<dyn ProfileSource>,
    cache: Arc<dyn PayloadCache>,
    aggregator: StatsAggregator,
    account: String,
    now: Instant,
) -> StatsPayload {
    match fetch_stats(source.as_ref(), &aggregator, &account).await {
        Ok(stats) => {
            let stats = Arc::new(stats);
            cache.set(CacheEntry::new(Arc::clone(&stats), now)).await;
            StatsPayload::Ready(stats)
        }
        Err(e) => {
            tracing::error!("Failed to refresh stats for {}: {}", account, e);
            StatsPayload::Failed(StatsFailure::from(&e))
        }
    }
}

async fn fetch_stats(
    source: &dyn ProfileSource,
    aggregator: &StatsAggregator,
    account: &str,
) -> Result<ProfileStats> {
    // Step 1: Profile, possibly downgrading credentials
    let (user, auth) = source.fetch_profile(account).await?;

    // Step 2: Every owned repository with the same credentials
    let repos = source.fetch_all_repositories(account, auth).await?;
    tracing::info!("Fetched {} repositories for {}", repos.len(), account);

    // Step 3: Reduce
    Ok(aggregator.aggregate(&user, &repos))
}
