//! Outbound calls to backend targets
//!
//! One shared HTTP client with a concurrency bound per backend, dialect
//! translation for non-OpenAI backends and classification of every attempt
//! into success or an [`AttemptError`].

mod client;
mod dialect;
mod error;

pub use client::{UpstreamClient, UpstreamSettings};
pub use dialect::{decode_response, encode_request};
pub use error::AttemptError;
