//! # switchyard
//!
//! An LLM request-routing gateway. Clients send OpenAI-style chat completion
//! requests; the gateway picks an upstream backend according to a routing
//! strategy, retries down an ordered fallback list when a backend fails, and
//! answers repeated identical requests from a response cache.
//!
//! ## Features
//!
//! - **Strategies**: single target, ordered fallback, weighted load balancing
//! - **Sticky sessions**: pin a session to the backend that served it
//! - **Response caching**: in-memory (moka) or redis, keyed by a request fingerprint
//! - **Dialects**: OpenAI-compatible backends and Ollama's native API
//!
//! ## Embedding the dispatcher
//!
//! ```rust,no_run
//! use switchyard::core::dispatcher::{DispatchOptions, Dispatcher};
//! use switchyard::core::router::{Strategy, StrategyResolver};
//! use switchyard::core::target::{Provider, Target};
//! use switchyard::core::types::{ChatCompletionRequest, ChatMessage};
//! use switchyard::core::upstream::{UpstreamClient, UpstreamSettings};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let upstream = Arc::new(UpstreamClient::new(UpstreamSettings::default())?);
//!     let dispatcher = Dispatcher::new(upstream, StrategyResolver::default());
//!
//!     let strategy = Strategy::fallback(vec![
//!         Target::new(Provider::Ollama, "http://localhost:11434")?,
//!         Target::new(Provider::OpenAi, "https://api.openai.com/v1")?.with_credential("sk-..."),
//!     ])?;
//!
//!     let request = ChatCompletionRequest::new("llama3", vec![ChatMessage::user("Hello")]);
//!     let outcome = dispatcher
//!         .dispatch(&request, Some(&strategy), &DispatchOptions::default())
//!         .await?;
//!     println!("{} answered: {:?}", outcome.served_by, outcome.response.text());
//!     Ok(())
//! }
//! ```
//!
//! ## Gateway Mode
//!
//! ```rust,no_run
//! use switchyard::{Config, server};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_file("config/gateway.yaml").await?;
//!     server::run_server(config).await?;
//!     Ok(())
//! }
//! ```

#![warn(clippy::all)]
#![allow(clippy::module_inception)]

pub mod config;
pub mod core;
pub mod server;
pub mod utils;

// Re-export main types
pub use config::Config;
pub use core::Gateway;
pub use utils::error::{GatewayError, Result};

pub use core::dispatcher::{DispatchOptions, DispatchOutcome, Dispatcher};
pub use core::router::{Strategy, StrategyConfig};
pub use core::types::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage};

// Version information
/// Current version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Name of the crate
pub const NAME: &str = env!("CARGO_PKG_NAME");
