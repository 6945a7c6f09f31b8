//! Validated routing strategies

use super::error::StrategyError;
use super::selection::{descending_order, normalize_weights};
use crate::core::cache::CachePolicy;
use crate::core::target::Target;
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use std::time::Duration;

/// How a strategy chooses among its targets
#[derive(Debug, Clone, PartialEq)]
pub enum StrategyMode {
    /// Always the one target
    Single(Target),
    /// Targets in configured order; later ones only after earlier ones fail
    Fallback(Vec<Target>),
    /// Weighted random primary, remaining targets as an implicit fallback chain
    LoadBalance(WeightedTargets),
}

/// Load-balanced targets with their weights pre-normalized
#[derive(Debug, Clone, PartialEq)]
pub struct WeightedTargets {
    targets: Vec<Target>,
    normalized: Vec<f64>,
}

impl WeightedTargets {
    pub fn new(targets: Vec<Target>) -> Result<Self, StrategyError> {
        if targets.is_empty() {
            return Err(StrategyError::NoTargets);
        }

        let raw = targets
            .iter()
            .enumerate()
            .map(|(index, target)| target.weight().ok_or(StrategyError::MissingWeight { index }))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            normalized: normalize_weights(&raw),
            targets,
        })
    }

    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    pub fn normalized_weights(&self) -> &[f64] {
        &self.normalized
    }

    /// Candidate order once `primary` has been drawn
    pub fn order_after(&self, primary: usize) -> Vec<usize> {
        let mut order = Vec::with_capacity(self.targets.len());
        order.push(primary);
        order.extend(descending_order(&self.normalized, primary));
        order
    }
}

/// Which upstream statuses count as a failed attempt
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FailurePolicy {
    on_status_codes: Option<BTreeSet<u16>>,
}

impl FailurePolicy {
    pub fn on_status_codes(codes: impl IntoIterator<Item = u16>) -> Result<Self, StrategyError> {
        let codes: BTreeSet<u16> = codes.into_iter().collect();
        if let Some(bad) = codes.iter().find(|c| !(100..=599).contains(*c)) {
            return Err(StrategyError::InvalidStatusCode(*bad));
        }
        Ok(Self {
            on_status_codes: Some(codes),
        })
    }

    /// Without an explicit list every non-2xx status is a failure.
    pub fn is_failure(&self, status: u16) -> bool {
        match &self.on_status_codes {
            Some(codes) => codes.contains(&status),
            None => !(200..300).contains(&status),
        }
    }

    pub fn codes(&self) -> Option<&BTreeSet<u16>> {
        self.on_status_codes.as_ref()
    }
}

/// Longest binding a sticky session may ask for
pub const MAX_STICKY_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Session affinity settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StickySession {
    hash_fields: Vec<String>,
    ttl: Duration,
}

impl StickySession {
    pub fn new(hash_fields: Vec<String>, ttl: Duration) -> Result<Self, StrategyError> {
        let hash_fields: Vec<String> = hash_fields
            .into_iter()
            .map(|f| f.trim().to_string())
            .filter(|f| !f.is_empty())
            .collect();
        if hash_fields.is_empty() {
            return Err(StrategyError::EmptyStickyFields);
        }
        if ttl.is_zero() {
            return Err(StrategyError::ZeroStickyTtl);
        }
        if ttl > MAX_STICKY_TTL {
            return Err(StrategyError::StickyTtlTooLong {
                max_secs: MAX_STICKY_TTL.as_secs(),
            });
        }
        Ok(Self { hash_fields, ttl })
    }

    pub fn hash_fields(&self) -> &[String] {
        &self.hash_fields
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

/// A validated routing strategy. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Strategy {
    mode: StrategyMode,
    failure: FailurePolicy,
    sticky: Option<StickySession>,
    cache: Option<CachePolicy>,
    id: String,
}

impl Strategy {
    fn from_mode(mode: StrategyMode) -> Self {
        let id = strategy_id(&mode);
        Self {
            mode,
            failure: FailurePolicy::default(),
            sticky: None,
            cache: None,
            id,
        }
    }

    pub fn single(target: Target) -> Self {
        Self::from_mode(StrategyMode::Single(target))
    }

    pub fn fallback(targets: Vec<Target>) -> Result<Self, StrategyError> {
        if targets.is_empty() {
            return Err(StrategyError::NoTargets);
        }
        Ok(Self::from_mode(StrategyMode::Fallback(targets)))
    }

    pub fn load_balance(targets: Vec<Target>) -> Result<Self, StrategyError> {
        Ok(Self::from_mode(StrategyMode::LoadBalance(
            WeightedTargets::new(targets)?,
        )))
    }

    pub fn with_failure_policy(mut self, failure: FailurePolicy) -> Self {
        self.failure = failure;
        self
    }

    pub fn with_sticky_session(mut self, sticky: StickySession) -> Self {
        self.sticky = Some(sticky);
        self
    }

    pub fn with_cache_policy(mut self, cache: CachePolicy) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn mode(&self) -> &StrategyMode {
        &self.mode
    }

    pub fn mode_name(&self) -> &'static str {
        match self.mode {
            StrategyMode::Single(_) => "single",
            StrategyMode::Fallback(_) => "fallback",
            StrategyMode::LoadBalance(_) => "loadbalance",
        }
    }

    pub fn targets(&self) -> &[Target] {
        match &self.mode {
            StrategyMode::Single(target) => std::slice::from_ref(target),
            StrategyMode::Fallback(targets) => targets,
            StrategyMode::LoadBalance(weighted) => weighted.targets(),
        }
    }

    pub fn failure_policy(&self) -> &FailurePolicy {
        &self.failure
    }

    pub fn sticky_session(&self) -> Option<&StickySession> {
        self.sticky.as_ref()
    }

    pub fn cache_policy(&self) -> Option<&CachePolicy> {
        self.cache.as_ref()
    }

    /// Stable digest of the target list; namespaces sticky bindings
    pub fn id(&self) -> &str {
        &self.id
    }
}

fn strategy_id(mode: &StrategyMode) -> String {
    let (name, targets): (&str, &[Target]) = match mode {
        StrategyMode::Single(t) => ("single", std::slice::from_ref(t)),
        StrategyMode::Fallback(ts) => ("fallback", ts),
        StrategyMode::LoadBalance(w) => ("loadbalance", w.targets()),
    };

    let mut hasher = Sha256::new();
    hasher.update(name.as_bytes());
    for target in targets {
        hasher.update(b"\n");
        hasher.update(target.provider().as_str().as_bytes());
        hasher.update(b"|");
        hasher.update(target.endpoint_key().as_bytes());
        hasher.update(b"|");
        hasher.update(target.overrides().model.as_deref().unwrap_or("").as_bytes());
        hasher.update(b"|");
        hasher.update(
            serde_json::to_string(&target.overrides().params)
                .unwrap_or_default()
                .as_bytes(),
        );
    }
    let digest = hex::encode(hasher.finalize());
    digest[..16].to_string()
}
