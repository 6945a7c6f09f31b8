//! Server builder and run_server function

use crate::config::Config;
use crate::server::server::HttpServer;
use crate::utils::error::{GatewayError, Result};
use tracing::info;

/// Server builder for easier configuration
#[derive(Default)]
pub struct ServerBuilder {
    config: Option<Config>,
}

impl ServerBuilder {
    /// Create a new server builder
    pub fn new() -> Self {
        Self { config: None }
    }

    /// Set configuration
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Build the HTTP server
    pub async fn build(self) -> Result<HttpServer> {
        let config = self
            .config
            .ok_or_else(|| GatewayError::Config("Configuration is required".to_string()))?;

        HttpServer::new(&config).await
    }
}

/// Build and run the server until it is stopped
pub async fn run_server(config: Config) -> Result<()> {
    info!("Starting switchyard gateway");

    let server = ServerBuilder::new().with_config(config).build().await?;
    info!("Server starting at: http://{}", server.config().address());
    info!("API Endpoints:");
    info!("   POST   /v1/chat/completions - Chat completions");
    info!("   DELETE /v1/cache - Clear the response cache");
    info!("   GET    /health - Health check");

    server.start().await
}
