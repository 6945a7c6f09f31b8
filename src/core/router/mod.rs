//! Strategy resolution for outbound requests
//!
//! Turns a declarative strategy (single, fallback or weighted load balance
//! over a list of targets) into the ordered list of targets a dispatch should
//! try.
//!
//! ## Module Structure
//!
//! - `config` - Serializable strategy documents and their validation
//! - `error` - Strategy construction errors
//! - `strategy` - Validated `Strategy` and its modes
//! - `selection` - Weight normalization and weighted picking
//! - `sticky` - Session keys and the sticky binding store
//! - `resolver` - Candidate ordering, sticky first

pub mod config;
pub mod error;
pub mod resolver;
pub mod selection;
pub mod sticky;
pub mod strategy;

#[cfg(test)]
mod tests;

pub use config::{ModeName, StickySessionConfig, StrategyConfig, StrategySettings, TargetConfig};
pub use error::StrategyError;
pub use resolver::{Candidate, Resolution, StrategyResolver, candidate_order};
pub use selection::{normalize_weights, pick_weighted};
pub use sticky::{SessionKey, StickySessionStore};
pub use strategy::{FailurePolicy, MAX_STICKY_TTL, StickySession, Strategy, StrategyMode, WeightedTargets};
