pub mod memory;

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;

use crate::models::ProfileStats;

pub use memory::MemoryCache;

/// A successful payload and the instant it was stored.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub payload: Arc<ProfileStats>,
    pub stored_at: Instant,
}

impl CacheEntry {
    pub fn new(payload: Arc<ProfileStats>, stored_at: Instant) -> Self {
        Self { payload, stored_at }
    }

    pub fn age(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.stored_at)
    }

    pub fn is_fresh(&self, now: Instant, ttl: Duration) -> bool {
        self.age(now) < ttl
    }
}

/// Single-slot store for the aggregated payload.
///
/// `set` replaces the whole entry; readers never observe a payload paired
/// with another write's timestamp.
#[async_trait]
pub trait PayloadCache: Send + Sync {
    async fn get(&self) -> Option<CacheEntry>;
    async fn set(&self, entry: CacheEntry);
}
