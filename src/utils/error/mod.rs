//! Error handling for the gateway
//!
//! Layer-specific errors (`AttemptError`, `DispatchError`, `CacheError`,
//! `StrategyError`) live next to the code that raises them and fold into
//! [`GatewayError`] at the HTTP boundary.

mod conversions;
mod helpers;
mod response;
mod types;

pub use response::{AttemptSummary, ErrorDetail, ErrorResponse};
pub use types::{GatewayError, Result};
