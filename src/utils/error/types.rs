//! Error types for the gateway

use crate::core::cache::CacheError;
use crate::core::dispatcher::DispatchError;
use crate::core::router::StrategyError;
use thiserror::Error;

/// Result type alias for the gateway
pub type Result<T> = std::result::Result<T, GatewayError>;

/// Main error type for the gateway
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Strategy or target description rejected at construction time
    #[error("Invalid routing strategy: {0}")]
    Strategy(#[from] StrategyError),

    /// Dispatch failures (exhaustion, cancellation)
    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    /// Cache backend errors surfaced by explicit cache operations
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    /// HTTP client construction errors
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Bad request errors
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server errors
    #[error("Internal server error: {0}")]
    Internal(String),
}
