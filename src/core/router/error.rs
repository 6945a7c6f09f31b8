//! Router error types
//!
//! Errors raised while turning a strategy description into a validated
//! [`Strategy`](super::Strategy). Everything here is a client or operator
//! mistake and is reported before any upstream call is made.

use crate::core::target::TargetError;

/// Strategy construction errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StrategyError {
    /// No targets were supplied
    #[error("strategy must name at least one target")]
    NoTargets,

    /// `single` mode with more than one target
    #[error("single mode takes exactly one target, got {0}")]
    SingleRequiresOneTarget(usize),

    /// A load-balanced target without a weight
    #[error("target {index} has no weight; every loadbalance target needs one")]
    MissingWeight { index: usize },

    /// A target failed its own validation
    #[error("target {index}: {source}")]
    Target {
        index: usize,
        #[source]
        source: TargetError,
    },

    /// A status code outside 100..=599
    #[error("invalid status code {0} in on_status_codes")]
    InvalidStatusCode(u16),

    /// Sticky sessions with nothing to hash
    #[error("sticky_session.hash_fields must not be empty")]
    EmptyStickyFields,

    /// Sticky sessions with a zero TTL
    #[error("sticky_session.ttl must be greater than zero")]
    ZeroStickyTtl,

    /// Sticky sessions asking for a binding longer than allowed
    #[error("sticky_session.ttl must be at most {max_secs} seconds")]
    StickyTtlTooLong { max_secs: u64 },

    /// A cache policy asking to keep entries longer than allowed
    #[error("cache.max_age must be at most {max_secs} seconds")]
    CacheMaxAgeTooLong { max_secs: u64 },

    /// The strategy document itself could not be parsed
    #[error("invalid strategy config: {0}")]
    InvalidConfig(String),
}

impl StrategyError {
    pub(crate) fn target(index: usize) -> impl FnOnce(TargetError) -> Self {
        move |source| StrategyError::Target { index, source }
    }
}
