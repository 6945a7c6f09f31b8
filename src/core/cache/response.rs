//! Degrading response cache over a pluggable backend

use super::backend::CacheBackend;
use super::fingerprint::Fingerprint;
use super::CacheError;
use crate::core::router::Strategy;
use crate::core::types::{ChatCompletionRequest, ChatCompletionResponse};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Response cache used by the dispatcher.
///
/// Lookups and stores never fail: backend errors and undecodable values are
/// logged and treated as a miss or a skipped write.
#[derive(Clone)]
pub struct ResponseCache {
    backend: Arc<dyn CacheBackend>,
    namespace: String,
    default_ttl: Duration,
    enabled_by_default: bool,
}

impl ResponseCache {
    pub fn new(backend: Arc<dyn CacheBackend>, namespace: impl Into<String>, default_ttl: Duration) -> Self {
        Self {
            backend,
            namespace: namespace.into(),
            default_ttl,
            enabled_by_default: true,
        }
    }

    /// Whether strategies without their own cache policy are cached
    pub fn enabled_by_default(mut self, enabled: bool) -> Self {
        self.enabled_by_default = enabled;
        self
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// TTL to cache under, or `None` if this strategy's responses are not cached
    pub fn ttl_for(&self, strategy: &Strategy) -> Option<Duration> {
        match strategy.cache_policy() {
            Some(policy) => policy.ttl(self.default_ttl),
            None if self.enabled_by_default && !self.default_ttl.is_zero() => Some(self.default_ttl),
            None => None,
        }
    }

    pub fn fingerprint(
        &self,
        strategy: &Strategy,
        request: &ChatCompletionRequest,
    ) -> Result<Fingerprint, CacheError> {
        Fingerprint::compute(&self.namespace, strategy, request)
    }

    pub async fn lookup(&self, key: &Fingerprint) -> Option<ChatCompletionResponse> {
        let raw = match self.backend.get(key.key()).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!(key = key.short(), backend = self.backend.name(), "cache lookup failed, treating as miss: {}", e);
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(response) => Some(response),
            Err(e) => {
                warn!(key = key.short(), "discarding undecodable cache entry: {}", e);
                None
            }
        }
    }

    pub async fn store(&self, key: &Fingerprint, response: &ChatCompletionResponse, ttl: Duration) {
        let raw = match serde_json::to_string(response) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(key = key.short(), "could not serialize response for cache: {}", e);
                return;
            }
        };

        match self.backend.put(key.key(), raw, ttl).await {
            Ok(()) => debug!(key = key.short(), ttl_secs = ttl.as_secs(), "cached response"),
            Err(e) => warn!(key = key.short(), backend = self.backend.name(), "cache write skipped: {}", e),
        }
    }

    /// Remove every entry in this cache's namespace. Unlike lookups, errors surface.
    pub async fn clear(&self) -> Result<u64, CacheError> {
        let prefix = if self.namespace.is_empty() {
            String::new()
        } else {
            format!("{}:", self.namespace)
        };
        self.backend.clear(&prefix).await
    }

    pub async fn health_check(&self) -> Result<(), CacheError> {
        self.backend.health_check().await
    }
}
