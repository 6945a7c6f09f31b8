//! Configuration data models
//!
//! This module defines all configuration structures used throughout the gateway.

pub mod cache;
pub mod dispatch;
pub mod gateway;
pub mod logging;
pub mod server;

// Re-export all configuration types
pub use cache::*;
pub use dispatch::*;
pub use gateway::*;
pub use logging::*;
pub use server::*;

/// Default values for configuration
pub fn default_host() -> String {
    "0.0.0.0".to_string()
}

/// Default server port
pub fn default_port() -> u16 {
    8787
}

/// Default maximum body size in bytes
pub fn default_max_body_size() -> usize {
    10 * 1024 * 1024 // 10MB
}

/// Default graceful shutdown window in seconds
pub fn default_shutdown_timeout() -> u64 {
    30
}

/// Default per-attempt upstream timeout in seconds
pub fn default_attempt_timeout() -> u64 {
    30
}

/// Default upstream connect timeout in seconds
pub fn default_connect_timeout() -> u64 {
    5
}

/// Default in-flight limit per backend
pub fn default_max_concurrent_per_target() -> usize {
    64
}

/// Default cache TTL in seconds
pub fn default_cache_ttl() -> u64 {
    300
}

/// Default in-memory cache capacity
pub fn default_cache_max_entries() -> u64 {
    10_000
}

/// Default cache key namespace
pub fn default_cache_namespace() -> String {
    "llm_cache".to_string()
}

/// Default redis connect/command timeout in milliseconds
pub fn default_redis_timeout_ms() -> u64 {
    1_000
}

/// Default log level
pub fn default_log_level() -> String {
    "info".to_string()
}

pub(crate) fn default_true() -> bool {
    true
}
