//! Configuration management for the Gateway
//!
//! Configuration is layered: built-in defaults, then the YAML file, then
//! environment variables, then command line overrides.

pub mod models;
pub mod validation;

pub use models::*;
pub use validation::Validate;

use crate::utils::error::{GatewayError, Result};
use crate::utils::logging::LogFormat;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use url::Url;

/// Config file read when no path is given, if it exists
pub const DEFAULT_CONFIG_PATH: &str = "config/gateway.yaml";

/// Main configuration struct for the Gateway
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Gateway configuration
    pub gateway: GatewayConfig,
}

/// Command line overrides, applied last
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub log_format: Option<LogFormat>,
}

impl Config {
    /// Load configuration from file
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = read_file(path.as_ref()).await?;
        let config = Self::from_yaml(&content)?;
        config.validate()?;

        debug!("Configuration loaded successfully");
        Ok(config)
    }

    /// Parse a YAML document without validating it
    pub fn from_yaml(content: &str) -> Result<Self> {
        // An empty file is a valid, all-defaults configuration.
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let gateway: GatewayConfig = serde_yaml::from_str(content)
            .map_err(|e| GatewayError::Config(format!("Failed to parse config: {}", e)))?;
        Ok(Self { gateway })
    }

    /// Full startup load: file (explicit path, or the default path if present),
    /// environment overlay, command line overrides, validation.
    pub async fn load(path: Option<&Path>, overrides: &ConfigOverrides) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_yaml(&read_file(path).await?)?,
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_PATH);
                if tokio::fs::try_exists(&default_path).await.unwrap_or(false) {
                    Self::from_yaml(&read_file(&default_path).await?)?
                } else {
                    info!("No config file found, using defaults");
                    Self::default()
                }
            }
        };

        config.apply_env(|name| std::env::var(name).ok())?;
        config.apply_overrides(overrides);
        config.validate()?;
        Ok(config)
    }

    /// Overlay environment variables. `lookup` maps a variable name to its value.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let gateway = &mut self.gateway;

        if let Some(host) = lookup("GATEWAY_HOST") {
            gateway.server.host = host;
        }
        if let Some(port) = lookup("GATEWAY_PORT") {
            gateway.server.port = parse_var("GATEWAY_PORT", &port)?;
        }
        if let Some(timeout) = lookup("GATEWAY_ATTEMPT_TIMEOUT_SECS") {
            gateway.dispatch.attempt_timeout_secs =
                parse_var("GATEWAY_ATTEMPT_TIMEOUT_SECS", &timeout)?;
        }
        if let Some(ttl) = lookup("CACHE_TTL_SECS") {
            gateway.cache.default_ttl = parse_var("CACHE_TTL_SECS", &ttl)?;
        }

        if let Some(url) = lookup("REDIS_URL") {
            gateway.cache.backend = CacheBackendKind::Redis;
            gateway.cache.redis.url = url;
        } else if let Some(host) = lookup("REDIS_HOST") {
            let port = match lookup("REDIS_PORT") {
                Some(port) => parse_var::<u16>("REDIS_PORT", &port)?,
                None => 6379,
            };
            let password = lookup("REDIS_PASSWORD").filter(|p| !p.is_empty());
            gateway.cache.backend = CacheBackendKind::Redis;
            gateway.cache.redis.url = redis_url(&host, port, password.as_deref())?;
        }

        Ok(())
    }

    /// Apply command line overrides
    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(host) = &overrides.host {
            self.gateway.server.host = host.clone();
        }
        if let Some(port) = overrides.port {
            self.gateway.server.port = port;
        }
        if let Some(format) = overrides.log_format {
            self.gateway.logging.format = format;
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        Validate::validate(&self.gateway).map_err(GatewayError::Config)
    }

    /// Serialize back to YAML
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(&self.gateway)?)
    }

    /// Get server configuration
    pub fn server(&self) -> &ServerConfig {
        &self.gateway.server
    }

    /// Get dispatch configuration
    pub fn dispatch(&self) -> &DispatchConfig {
        &self.gateway.dispatch
    }

    /// Get cache configuration
    pub fn cache(&self) -> &CacheConfig {
        &self.gateway.cache
    }

    /// Get the static routing strategy, if configured
    pub fn routing(&self) -> Option<&crate::core::router::StrategyConfig> {
        self.gateway.routing.as_ref()
    }

    /// Get logging configuration
    pub fn logging(&self) -> &LoggingConfig {
        &self.gateway.logging
    }
}

async fn read_file(path: &Path) -> Result<String> {
    info!("Loading configuration from: {:?}", path);
    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| GatewayError::Config(format!("Failed to read config file: {}", e)))
}

fn parse_var<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| {
        warn!(variable = name, "Rejected environment value");
        GatewayError::Config(format!("{} has an invalid value: {}", name, value))
    })
}

fn redis_url(host: &str, port: u16, password: Option<&str>) -> Result<String> {
    let mut url = Url::parse(&format!("redis://{}:{}", host, port))?;
    if let Some(password) = password {
        url.set_password(Some(password))
            .map_err(|_| GatewayError::Config("Cannot set redis password".to_string()))?;
    }
    Ok(url.to_string())
}
