//! Configuration validators
//!
//! Validation implementations for the gateway configuration sections.

use super::trait_def::Validate;
use crate::config::models::*;
use crate::core::cache::MAX_CACHE_TTL;
use crate::core::router::{Strategy, StrategyConfig};
use tracing::debug;
use url::Url;

impl Validate for GatewayConfig {
    fn validate(&self) -> Result<(), String> {
        debug!("Validating gateway configuration");

        self.server.validate()?;
        self.dispatch.validate()?;
        self.cache.validate()?;
        self.logging.validate()?;

        if let Some(routing) = &self.routing {
            routing.validate()?;
        }

        debug!("Gateway configuration validation completed");
        Ok(())
    }
}

impl Validate for ServerConfig {
    fn validate(&self) -> Result<(), String> {
        debug!("Validating server configuration");

        if self.host.is_empty() {
            return Err("Server host cannot be empty".to_string());
        }

        if self.port == 0 {
            return Err("Server port must be greater than 0".to_string());
        }

        if let Some(workers) = self.workers {
            if workers == 0 {
                return Err("Worker count must be greater than 0".to_string());
            }
            if workers > 1000 {
                return Err("Worker count seems too high (>1000)".to_string());
            }
        }

        if self.max_body_size == 0 {
            return Err("Max body size must be greater than 0".to_string());
        }

        Ok(())
    }
}

impl Validate for DispatchConfig {
    fn validate(&self) -> Result<(), String> {
        debug!("Validating dispatch configuration");

        if self.attempt_timeout_secs == 0 {
            return Err("Attempt timeout must be greater than 0".to_string());
        }

        if self.attempt_timeout_secs > 3600 {
            return Err("Attempt timeout should not exceed 1 hour".to_string());
        }

        if self.connect_timeout_secs == 0 {
            return Err("Connect timeout must be greater than 0".to_string());
        }

        if self.max_concurrent_per_target == 0 {
            return Err("max_concurrent_per_target must be greater than 0".to_string());
        }

        Ok(())
    }
}

impl Validate for CacheConfig {
    fn validate(&self) -> Result<(), String> {
        debug!("Validating cache configuration");

        if self.namespace.is_empty() {
            return Err("Cache namespace cannot be empty".to_string());
        }

        if self.namespace.contains(['*', '?', '[', ']']) {
            return Err(format!(
                "Cache namespace '{}' must not contain glob characters",
                self.namespace
            ));
        }

        if self.max_entries == 0 {
            return Err("Cache max_entries must be greater than 0".to_string());
        }

        if self.default_ttl > MAX_CACHE_TTL.as_secs() {
            return Err(format!(
                "Cache default_ttl must be at most {} seconds",
                MAX_CACHE_TTL.as_secs()
            ));
        }

        if self.backend == CacheBackendKind::Redis {
            if cfg!(not(feature = "redis")) {
                return Err("Redis cache backend requires the `redis` feature".to_string());
            }
            if self.redis.url.is_empty() {
                return Err("Redis cache backend requires cache.redis.url".to_string());
            }
            let url = Url::parse(&self.redis.url)
                .map_err(|e| format!("Invalid redis url: {}", e))?;
            if !matches!(url.scheme(), "redis" | "rediss") {
                return Err(format!(
                    "Redis url must use redis:// or rediss://, got: {}",
                    url.scheme()
                ));
            }
            if self.redis.timeout_ms == 0 {
                return Err("Redis timeout must be greater than 0".to_string());
            }
        }

        Ok(())
    }
}

impl Validate for LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        tracing_subscriber::EnvFilter::try_new(&self.level)
            .map(|_| ())
            .map_err(|e| format!("Invalid log level '{}': {}", self.level, e))
    }
}

impl Validate for StrategyConfig {
    fn validate(&self) -> Result<(), String> {
        debug!("Validating routing strategy");

        Strategy::try_from(self)
            .map(|_| ())
            .map_err(|e| format!("Invalid routing strategy: {}", e))
    }
}
