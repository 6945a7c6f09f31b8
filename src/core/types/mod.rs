//! Core type definition module
//!
//! OpenAI-shaped chat-completion request and response bodies exchanged with
//! clients and with upstream targets.

pub mod message;
pub mod params;
pub mod requests;
pub mod responses;

// Re-export all public types
pub use message::*;
pub use params::*;
pub use requests::*;
pub use responses::*;
