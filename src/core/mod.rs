//! Core functionality for the Gateway
//!
//! This module contains the routing logic and the data it moves around.

pub mod cache;
pub mod dispatcher;
pub mod router;
pub mod target;
pub mod types;
pub mod upstream;

use crate::config::{CacheBackendKind, CacheConfig, Config};
use crate::core::cache::{CacheBackend, MemoryCache, ResponseCache};
use crate::core::dispatcher::Dispatcher;
use crate::core::router::{Strategy, StrategyResolver};
use crate::core::upstream::{UpstreamClient, UpstreamSettings};
use crate::utils::error::{GatewayError, Result};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// How often expired sticky bindings are swept
const STICKY_PURGE_INTERVAL: Duration = Duration::from_secs(60);

/// Main Gateway struct that wires the components together
#[derive(Clone)]
pub struct Gateway {
    /// Gateway configuration
    config: Arc<Config>,
    /// Cache-aware dispatcher
    dispatcher: Dispatcher,
    /// Strategy for requests that bring none
    default_strategy: Option<Arc<Strategy>>,
    /// Stops background tasks
    shutdown: CancellationToken,
}

impl Gateway {
    /// Create a new Gateway instance
    pub async fn new(config: Config) -> Result<Self> {
        info!("Initializing Gateway");

        debug!("Initializing upstream client");
        let upstream = UpstreamClient::new(UpstreamSettings::from(config.dispatch()))?;

        let cache = build_cache(config.cache())?;
        info!(
            backend = cache.backend_name(),
            namespace = cache.namespace(),
            "Response cache ready"
        );
        let dispatcher =
            Dispatcher::new(Arc::new(upstream), StrategyResolver::default()).with_cache(cache);

        let default_strategy = match config.routing() {
            Some(routing) => {
                let strategy = Strategy::try_from(routing)?;
                info!(
                    mode = strategy.mode_name(),
                    targets = strategy.targets().len(),
                    "Loaded default routing strategy"
                );
                Some(Arc::new(strategy))
            }
            None => {
                debug!("No default routing strategy, requests must carry their own");
                None
            }
        };

        info!("Gateway initialized successfully");

        Ok(Self {
            config: Arc::new(config),
            dispatcher,
            default_strategy,
            shutdown: CancellationToken::new(),
        })
    }

    /// Start background services
    pub fn start_background_services(&self) {
        debug!("Starting background services");

        let sticky = Arc::clone(self.dispatcher.resolver().sticky_store());
        let shutdown = self.shutdown.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(STICKY_PURGE_INTERVAL);
            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    _ = interval.tick() => {
                        let purged = sticky.purge_expired();
                        if purged > 0 {
                            debug!(purged, "Purged expired sticky bindings");
                        }
                    }
                }
            }
        });
    }

    /// Get gateway configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Strategy from the `routing` section, if any
    pub fn default_strategy(&self) -> Option<&Arc<Strategy>> {
        self.default_strategy.as_ref()
    }

    /// Remove every cached response in the configured namespace
    pub async fn clear_cache(&self) -> Result<u64> {
        let cache = self
            .dispatcher
            .cache()
            .ok_or_else(|| GatewayError::bad_request("Response cache is not configured"))?;
        let cleared = cache.clear().await?;
        info!(cleared, namespace = cache.namespace(), "Cleared response cache");
        Ok(cleared)
    }

    /// Report component health
    pub async fn health(&self) -> HealthStatus {
        let cache = match self.dispatcher.cache() {
            None => ComponentHealth::disabled("none"),
            Some(cache) => match cache.health_check().await {
                Ok(()) => ComponentHealth::healthy(cache.backend_name()),
                Err(e) => {
                    warn!(error = %e, "Cache health check failed");
                    ComponentHealth::unhealthy(cache.backend_name(), e.to_string())
                }
            },
        };

        // The gateway keeps serving without a cache, so a cache outage only degrades.
        let status = if cache.status == "unhealthy" {
            "degraded"
        } else {
            "healthy"
        };

        HealthStatus {
            status,
            default_strategy: self.default_strategy.as_ref().map(|s| s.mode_name()),
            sticky_sessions: self.dispatcher.resolver().sticky_store().len(),
            cache,
        }
    }

    /// Graceful shutdown
    pub async fn shutdown(&self) -> Result<()> {
        info!("Shutting down Gateway");
        self.shutdown.cancel();
        info!("Gateway shutdown completed");
        Ok(())
    }
}

fn build_cache(config: &CacheConfig) -> Result<ResponseCache> {
    let backend: Arc<dyn CacheBackend> = match config.backend {
        CacheBackendKind::Memory => Arc::new(MemoryCache::new(config.max_entries)),
        #[cfg(feature = "redis")]
        CacheBackendKind::Redis => Arc::new(crate::core::cache::RedisCache::new(
            &config.redis.url,
            config.redis_timeout(),
        )?),
        #[cfg(not(feature = "redis"))]
        CacheBackendKind::Redis => {
            return Err(GatewayError::Config(
                "Redis cache backend requires the `redis` feature".to_string(),
            ));
        }
    };

    Ok(ResponseCache::new(backend, config.namespace.clone(), config.default_ttl())
        .enabled_by_default(config.enabled))
}

/// Health of one component
#[derive(Debug, Clone, Serialize)]
pub struct ComponentHealth {
    pub backend: &'static str,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ComponentHealth {
    fn healthy(backend: &'static str) -> Self {
        Self {
            backend,
            status: "healthy",
            error: None,
        }
    }

    fn unhealthy(backend: &'static str, error: String) -> Self {
        Self {
            backend,
            status: "unhealthy",
            error: Some(error),
        }
    }

    fn disabled(backend: &'static str) -> Self {
        Self {
            backend,
            status: "disabled",
            error: None,
        }
    }
}

/// Gateway health report
#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub default_strategy: Option<&'static str>,
    pub sticky_sessions: usize,
    pub cache: ComponentHealth,
}
