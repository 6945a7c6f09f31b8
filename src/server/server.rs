//! HTTP server core implementation
//!
//! This module provides the HttpServer struct and its core methods.

use crate::config::{Config, ServerConfig};
use crate::core::Gateway;
use crate::server::routes;
use crate::server::state::AppState;
use crate::utils::error::{GatewayError, Result};
use actix_web::{App, HttpServer as ActixHttpServer, middleware::DefaultHeaders, web};
use tracing::info;
use tracing_actix_web::TracingLogger;

/// HTTP server
pub struct HttpServer {
    /// Server configuration
    config: ServerConfig,
    /// Application state
    state: AppState,
}

impl HttpServer {
    /// Create a new HTTP server
    pub async fn new(config: &Config) -> Result<Self> {
        info!("Creating HTTP server");
        let gateway = Gateway::new(config.clone()).await?;
        Ok(Self::from_gateway(gateway))
    }

    /// Wrap an already initialised gateway
    pub fn from_gateway(gateway: Gateway) -> Self {
        Self {
            config: gateway.config().server().clone(),
            state: AppState::new(gateway),
        }
    }

    /// Create the Actix-web application
    pub fn create_app(
        state: web::Data<AppState>,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        let json_config = web::JsonConfig::default()
            .limit(state.config.server().max_body_size)
            .error_handler(|err, _req| GatewayError::from(err).into());

        App::new()
            .app_data(state)
            .app_data(json_config)
            .wrap(TracingLogger::default())
            .wrap(DefaultHeaders::new().add(("Server", concat!("switchyard/", env!("CARGO_PKG_VERSION")))))
            .configure(routes::configure_routes)
    }

    /// Start the HTTP server
    pub async fn start(self) -> Result<()> {
        let bind_addr = self.config.address();
        let workers = self.config.worker_count();

        info!("Starting HTTP server on {}", bind_addr);

        let gateway = self.state.gateway.clone();
        gateway.start_background_services();

        let state = web::Data::new(self.state);

        let server = ActixHttpServer::new(move || Self::create_app(state.clone()))
            .workers(workers)
            .shutdown_timeout(self.config.shutdown_timeout)
            .bind(&bind_addr)
            .map_err(|e| Self::format_bind_error(e, &bind_addr))?
            .run();

        info!("HTTP server listening on {}", bind_addr);

        let result = server.await;
        gateway.shutdown().await?;
        result.map_err(|e| GatewayError::server(format!("Server error: {}", e)))?;

        info!("HTTP server stopped");
        Ok(())
    }

    fn format_bind_error(e: std::io::Error, bind_addr: &str) -> GatewayError {
        if e.kind() == std::io::ErrorKind::AddrInUse {
            GatewayError::server(format!(
                "Address {} is already in use; pick another port with --port or GATEWAY_PORT",
                bind_addr
            ))
        } else {
            GatewayError::server(format!("Failed to bind to {}: {}", bind_addr, e))
        }
    }

    /// Get server configuration
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Get application state
    pub fn state(&self) -> &AppState {
        &self.state
    }
}
