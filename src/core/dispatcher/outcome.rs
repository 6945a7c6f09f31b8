//! Dispatch results

use crate::core::target::Provider;
use crate::core::types::ChatCompletionResponse;
use crate::core::upstream::AttemptError;
use std::fmt;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Per-call dispatch switches
#[derive(Debug, Clone, Default)]
pub struct DispatchOptions {
    /// Cancelled when the inbound request goes away
    pub cancel: CancellationToken,
    /// Skip the cache lookup but still store the fresh response
    pub force_refresh: bool,
}

/// One candidate attempt
#[derive(Debug, Clone)]
pub struct AttemptRecord {
    pub target_index: usize,
    pub provider: Provider,
    pub base_url: String,
    pub latency: Duration,
    /// `None` for the attempt that served the request
    pub error: Option<AttemptError>,
}

impl AttemptRecord {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// Where the response came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServedBy {
    Cache,
    Target {
        index: usize,
        provider: Provider,
        base_url: String,
    },
}

impl ServedBy {
    pub fn target_index(&self) -> Option<usize> {
        match self {
            ServedBy::Cache => None,
            ServedBy::Target { index, .. } => Some(*index),
        }
    }

    pub fn is_cache(&self) -> bool {
        matches!(self, ServedBy::Cache)
    }
}

impl fmt::Display for ServedBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServedBy::Cache => f.write_str("cache"),
            ServedBy::Target { provider, .. } => write!(f, "{}", provider),
        }
    }
}

/// What the cache did for this dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    /// Answered from the cache
    Hit,
    /// Looked up, not found, stored on success
    Miss,
    /// Not cacheable (no cache, disabled policy)
    Bypass,
    /// Lookup skipped on request, stored on success
    Refresh,
}

impl CacheStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheStatus::Hit => "hit",
            CacheStatus::Miss => "miss",
            CacheStatus::Bypass => "bypass",
            CacheStatus::Refresh => "refresh",
        }
    }
}

impl fmt::Display for CacheStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A successful dispatch
#[derive(Debug, Clone)]
pub struct DispatchOutcome {
    pub response: ChatCompletionResponse,
    pub served_by: ServedBy,
    pub cache_status: CacheStatus,
    /// Upstream attempts in order; empty on a cache hit
    pub attempts: Vec<AttemptRecord>,
    pub latency: Duration,
}
