//! Common test utilities for switchyard
//!
//! - `fixtures`: requests, targets and completion bodies
//! - `upstream`: wiremock backends that answer like OpenAI or Ollama

pub mod fixtures;
pub mod upstream;

pub use fixtures::*;
pub use upstream::*;
