//! Application state shared across HTTP handlers

use crate::config::Config;
use crate::core::Gateway;
use std::sync::Arc;

/// HTTP server state shared across handlers
///
/// Cloned into every actix worker; all fields are cheap handles onto shared
/// resources.
#[derive(Clone)]
pub struct AppState {
    /// Gateway configuration (shared read-only)
    pub config: Arc<Config>,
    /// Dispatcher, cache and default strategy
    pub gateway: Gateway,
}

impl AppState {
    /// Create a new AppState around an initialised gateway
    pub fn new(gateway: Gateway) -> Self {
        Self {
            config: Arc::new(gateway.config().clone()),
            gateway,
        }
    }
}
