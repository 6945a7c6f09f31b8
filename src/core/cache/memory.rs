//! In-process cache backend

use super::backend::CacheBackend;
use super::entry::CacheEntry;
use super::{CacheError, MAX_CACHE_TTL};
use async_trait::async_trait;
use moka::Expiry;
use moka::future::Cache;
use std::sync::Arc;
use std::time::{Duration, Instant};

type Entry = Arc<CacheEntry<String>>;

/// Expires each entry after its own TTL
struct PerEntryTtl;

impl Expiry<String, Entry> for PerEntryTtl {
    fn expire_after_create(&self, _key: &String, value: &Entry, _created_at: Instant) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// Bounded moka cache with per-entry TTL.
///
/// Reads also check `created_at + ttl` so an entry is never served past its
/// expiry even before moka evicts it.
pub struct MemoryCache {
    cache: Cache<String, Entry>,
}

impl MemoryCache {
    pub fn new(max_entries: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_entries)
            .expire_after(PerEntryTtl)
            .build();
        Self { cache }
    }

    /// Entries currently held, after pending maintenance has run
    pub async fn len(&self) -> u64 {
        self.cache.run_pending_tasks().await;
        self.cache.entry_count()
    }
}

#[async_trait]
impl CacheBackend for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        match self.cache.get(key).await {
            Some(entry) if entry.is_expired() => {
                self.cache.invalidate(key).await;
                Ok(None)
            }
            Some(entry) => Ok(Some(entry.value.clone())),
            None => Ok(None),
        }
    }

    async fn put(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError> {
        self.cache
            .insert(
                key.to_string(),
                Arc::new(CacheEntry::new(value, ttl.min(MAX_CACHE_TTL))),
            )
            .await;
        Ok(())
    }

    async fn clear(&self, prefix: &str) -> Result<u64, CacheError> {
        let keys: Vec<Arc<String>> = self
            .cache
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .map(|(key, _)| key)
            .collect();

        for key in &keys {
            self.cache.invalidate(key.as_str()).await;
        }
        Ok(keys.len() as u64)
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
