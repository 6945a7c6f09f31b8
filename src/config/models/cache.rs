//! Cache configuration

use super::*;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Which store holds cached responses
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackendKind {
    #[default]
    Memory,
    Redis,
}

/// Redis connection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedisConfig {
    /// Connection URL, e.g. `redis://:password@host:6379/0`
    #[serde(default)]
    pub url: String,
    /// Connect and command timeout in milliseconds
    #[serde(default = "default_redis_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            timeout_ms: default_redis_timeout_ms(),
        }
    }
}

/// Response cache configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Cache strategies that do not set their own policy
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub backend: CacheBackendKind,
    /// Default TTL in seconds
    #[serde(default = "default_cache_ttl")]
    pub default_ttl: u64,
    /// Capacity of the in-memory backend
    #[serde(default = "default_cache_max_entries")]
    pub max_entries: u64,
    /// Key prefix, `<namespace>:<digest>`
    #[serde(default = "default_cache_namespace")]
    pub namespace: String,
    #[serde(default)]
    pub redis: RedisConfig,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            backend: CacheBackendKind::default(),
            default_ttl: default_cache_ttl(),
            max_entries: default_cache_max_entries(),
            namespace: default_cache_namespace(),
            redis: RedisConfig::default(),
        }
    }
}

impl CacheConfig {
    pub fn default_ttl(&self) -> Duration {
        Duration::from_secs(self.default_ttl)
    }

    pub fn redis_timeout(&self) -> Duration {
        Duration::from_millis(self.redis.timeout_ms)
    }
}
