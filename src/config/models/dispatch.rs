//! Upstream dispatch configuration

use super::*;
use crate::core::upstream::UpstreamSettings;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Limits applied to outbound attempts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Per-attempt timeout in seconds
    #[serde(default = "default_attempt_timeout")]
    pub attempt_timeout_secs: u64,
    /// Connect timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    /// In-flight requests allowed against one backend
    #[serde(default = "default_max_concurrent_per_target")]
    pub max_concurrent_per_target: usize,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            attempt_timeout_secs: default_attempt_timeout(),
            connect_timeout_secs: default_connect_timeout(),
            max_concurrent_per_target: default_max_concurrent_per_target(),
        }
    }
}

impl From<&DispatchConfig> for UpstreamSettings {
    fn from(config: &DispatchConfig) -> Self {
        UpstreamSettings {
            attempt_timeout: Duration::from_secs(config.attempt_timeout_secs),
            connect_timeout: Duration::from_secs(config.connect_timeout_secs),
            max_concurrent_per_target: config.max_concurrent_per_target,
        }
    }
}
