//! Serializable strategy documents
//!
//! The wire/YAML form of a strategy:
//!
//! ```yaml
//! strategy:
//!   mode: fallback
//!   on_status_codes: [429, 500, 503]
//! targets:
//!   - provider: ollama
//!     custom_host: http://ollama:11434
//!     override_params: { model: llama3 }
//!   - provider: openai
//!     api_key: sk-...
//! cache:
//!   mode: simple
//!   max_age: 60
//! ```
//!
//! A bare single target (`provider`, `custom_host`, `api_key`,
//! `override_params` at the top level) is also accepted.

use super::error::StrategyError;
use super::strategy::{FailurePolicy, StickySession, Strategy};
use crate::core::cache::{CachePolicy, MAX_CACHE_TTL};
use crate::core::target::{ParamOverrides, Provider, Target};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Strategy mode names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModeName {
    Single,
    Fallback,
    #[serde(alias = "load_balance", alias = "load-balance")]
    Loadbalance,
}

/// One hour when a sticky block gives no `ttl`
fn default_sticky_ttl() -> u64 {
    3600
}

/// Sticky session settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StickySessionConfig {
    pub hash_fields: Vec<String>,
    /// Binding lifetime in seconds
    #[serde(default = "default_sticky_ttl")]
    pub ttl: u64,
}

/// The `strategy` block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategySettings {
    pub mode: ModeName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_status_codes: Option<Vec<u16>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sticky_session: Option<StickySessionConfig>,
}

/// One entry of `targets`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetConfig {
    pub provider: Provider,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(default)]
    pub override_params: ParamOverrides,
}

impl TargetConfig {
    pub fn new(provider: Provider) -> Self {
        Self {
            provider,
            api_key: None,
            custom_host: None,
            weight: None,
            override_params: ParamOverrides::default(),
        }
    }

    fn build(&self, index: usize, default_weight: Option<f64>) -> Result<Target, StrategyError> {
        let mut target = match &self.custom_host {
            Some(host) => Target::new(self.provider, host),
            None => Target::with_default_host(self.provider),
        }
        .map_err(StrategyError::target(index))?
        .with_overrides(self.override_params.clone());

        if let Some(key) = &self.api_key {
            target = target.with_credential(key.clone());
        }
        if let Some(weight) = self.weight.or(default_weight) {
            target = target
                .with_weight(weight)
                .map_err(StrategyError::target(index))?;
        }
        Ok(target)
    }
}

/// A strategy document as supplied by configuration or a request header
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StrategyConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy: Option<StrategySettings>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub targets: Vec<TargetConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache: Option<CachePolicy>,

    // Single-target shorthand
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<Provider>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub override_params: Option<ParamOverrides>,
}

impl StrategyConfig {
    /// Parse a JSON strategy document (as carried by a request header).
    pub fn from_json(json: &str) -> Result<Self, StrategyError> {
        serde_json::from_str(json).map_err(|e| StrategyError::InvalidConfig(e.to_string()))
    }

    /// Shorthand for a single target
    pub fn single(target: TargetConfig) -> Self {
        Self {
            targets: vec![target],
            ..Default::default()
        }
    }

    fn target_list(&self) -> Result<Vec<TargetConfig>, StrategyError> {
        match (&self.provider, self.targets.is_empty()) {
            (Some(provider), true) => Ok(vec![TargetConfig {
                provider: *provider,
                api_key: self.api_key.clone(),
                custom_host: self.custom_host.clone(),
                weight: None,
                override_params: self.override_params.clone().unwrap_or_default(),
            }]),
            (Some(_), false) => Err(StrategyError::InvalidConfig(
                "use either a top-level provider or a targets list, not both".to_string(),
            )),
            (None, false) => Ok(self.targets.clone()),
            (None, true) => Err(StrategyError::NoTargets),
        }
    }
}

impl TryFrom<StrategyConfig> for Strategy {
    type Error = StrategyError;

    fn try_from(config: StrategyConfig) -> Result<Self, Self::Error> {
        Strategy::try_from(&config)
    }
}

impl TryFrom<&StrategyConfig> for Strategy {
    type Error = StrategyError;

    fn try_from(config: &StrategyConfig) -> Result<Self, Self::Error> {
        let entries = config.target_list()?;

        // Without a strategy block one target means single, several mean fallback.
        let mode = match &config.strategy {
            Some(settings) => settings.mode,
            None if entries.len() == 1 => ModeName::Single,
            None => ModeName::Fallback,
        };

        // A lone load-balanced target needs no explicit weight.
        let default_weight = (mode == ModeName::Loadbalance && entries.len() == 1).then_some(1.0);

        let targets = entries
            .iter()
            .enumerate()
            .map(|(index, entry)| entry.build(index, default_weight))
            .collect::<Result<Vec<_>, _>>()?;

        let mut strategy = match mode {
            ModeName::Single => {
                if targets.len() != 1 {
                    return Err(StrategyError::SingleRequiresOneTarget(targets.len()));
                }
                let mut targets = targets;
                match targets.pop() {
                    Some(target) => Strategy::single(target),
                    None => return Err(StrategyError::NoTargets),
                }
            }
            ModeName::Fallback => Strategy::fallback(targets)?,
            ModeName::Loadbalance => Strategy::load_balance(targets)?,
        };

        if let Some(settings) = &config.strategy {
            if let Some(codes) = &settings.on_status_codes {
                strategy = strategy.with_failure_policy(FailurePolicy::on_status_codes(
                    codes.iter().copied(),
                )?);
            }
            if let Some(sticky) = &settings.sticky_session {
                strategy = strategy.with_sticky_session(StickySession::new(
                    sticky.hash_fields.clone(),
                    Duration::from_secs(sticky.ttl),
                )?);
            }
        }

        if let Some(cache) = &config.cache {
            if cache.max_age.is_some_and(|secs| secs > MAX_CACHE_TTL.as_secs()) {
                return Err(StrategyError::CacheMaxAgeTooLong {
                    max_secs: MAX_CACHE_TTL.as_secs(),
                });
            }
            strategy = strategy.with_cache_policy(cache.clone());
        }

        Ok(strategy)
    }
}
