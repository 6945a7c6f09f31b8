//! Response cache
//!
//! Successful upstream responses are stored under a deterministic request
//! fingerprint so that repeated identical requests are answered without
//! touching a backend. Caching is an optimization only: every backend failure
//! degrades to a miss.

mod backend;
mod entry;
mod fingerprint;
mod memory;
#[cfg(feature = "redis")]
mod redis;
mod response;

pub use backend::CacheBackend;
pub use entry::CacheEntry;
pub use fingerprint::Fingerprint;
pub use memory::MemoryCache;
#[cfg(feature = "redis")]
pub use redis::RedisCache;
pub use response::ResponseCache;

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Cache backend errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CacheError {
    /// The backend could not be reached or refused the command
    #[error("cache backend unavailable: {0}")]
    Unavailable(String),

    /// A stored value could not be encoded or decoded
    #[error("cache serialization error: {0}")]
    Serialization(String),
}

/// Longest lifetime any cache entry is stored with
pub const MAX_CACHE_TTL: Duration = Duration::from_secs(30 * 24 * 60 * 60);

/// Caching mode of a strategy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheMode {
    /// Exact-match caching on the request fingerprint
    #[default]
    Simple,
    /// Never read or write the cache
    Disabled,
}

/// Per-strategy cache policy
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachePolicy {
    #[serde(default)]
    pub mode: CacheMode,
    /// Entry lifetime in seconds; the gateway default when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_age: Option<u64>,
}

impl CachePolicy {
    pub fn simple(max_age: Duration) -> Self {
        Self {
            mode: CacheMode::Simple,
            max_age: Some(max_age.as_secs()),
        }
    }

    pub fn disabled() -> Self {
        Self {
            mode: CacheMode::Disabled,
            max_age: None,
        }
    }

    /// TTL to store with, or `None` if this policy does not cache.
    pub fn ttl(&self, default_ttl: Duration) -> Option<Duration> {
        match self.mode {
            CacheMode::Disabled => None,
            CacheMode::Simple => {
                let ttl = self.max_age.map(Duration::from_secs).unwrap_or(default_ttl);
                (!ttl.is_zero()).then_some(ttl.min(MAX_CACHE_TTL))
            }
        }
    }
}
