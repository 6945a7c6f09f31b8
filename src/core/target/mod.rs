//! Target descriptors
//!
//! A [`Target`] describes one backend: which wire dialect it speaks, where it
//! lives, what credential to present and which request fields it forces.

mod descriptor;
mod overrides;
mod provider;

pub use descriptor::Target;
pub use overrides::ParamOverrides;
pub use provider::Provider;

use thiserror::Error;

/// Errors raised while building a target
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TargetError {
    #[error("unknown provider '{0}' (expected openai, vllm or ollama)")]
    UnknownProvider(String),

    #[error("invalid base url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("weight must be a finite non-negative number, got {0}")]
    InvalidWeight(f64),
}
