//! Cache backend abstraction

use super::CacheError;
use async_trait::async_trait;
use std::time::Duration;

/// Key/value store holding serialized responses.
///
/// Implementations must tolerate concurrent reads and writes; last writer
/// wins on a racing `put` for the same key.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Value stored under `key`, `None` when absent or expired
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Store `value` under `key` for `ttl`
    async fn put(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError>;

    /// Remove every key starting with `prefix`, returning how many were removed
    async fn clear(&self, prefix: &str) -> Result<u64, CacheError>;

    /// Backend name for logs and health output
    fn name(&self) -> &'static str;

    /// Check the backend is reachable
    async fn health_check(&self) -> Result<(), CacheError> {
        Ok(())
    }
}
