//! Main gateway configuration

use super::*;
use crate::core::router::StrategyConfig;
use serde::{Deserialize, Serialize};

/// Main gateway configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Outbound attempt limits
    #[serde(default)]
    pub dispatch: DispatchConfig,
    /// Response cache
    #[serde(default)]
    pub cache: CacheConfig,
    /// Strategy used when a request brings none
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub routing: Option<StrategyConfig>,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}
