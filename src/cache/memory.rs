use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{CacheEntry, PayloadCache};

/// Process-local cache slot. Lost on restart.
#[derive(Default)]
pub struct MemoryCache {
    slot: RwLock<Option<CacheEntry>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PayloadCache for MemoryCache {
    async fn get(&self) -> Option<CacheEntry> {
        self.slot.read().await.clone()
    }

    async fn set(&self, entry: CacheEntry) {
        *self.slot.write().await = Some(entry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::tests::sample_stats;
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    #[tokio::test]
    async fn test_empty_until_set() {
        let cache = MemoryCache::new();
        assert!(cache.get().await.is_none());

        let now = Instant::now();
        cache.set(CacheEntry::new(sample_stats("octocat"), now)).await;

        let entry = cache.get().await.unwrap();
        assert_eq!(entry.payload.profile.login, "octocat");
        assert_eq!(entry.stored_at, now);
    }

    #[tokio::test]
    async fn test_last_write_wins() {
        let cache = MemoryCache::new();
        let now = Instant::now();
        let second = sample_stats("second");

        cache.set(CacheEntry::new(sample_stats("first"), now)).await;
        cache
            .set(CacheEntry::new(second.clone(), now + Duration::from_secs(1)))
            .await;

        let entry = cache.get().await.unwrap();
        assert!(Arc::ptr_eq(&entry.payload, &second));
        assert_eq!(entry.stored_at, now + Duration::from_secs(1));
    }
}
