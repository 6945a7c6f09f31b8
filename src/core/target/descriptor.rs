//! The target descriptor itself

use super::{ParamOverrides, Provider, TargetError};
use crate::core::types::ChatCompletionRequest;
use std::fmt;
use url::Url;

/// One backend LLM endpoint.
///
/// Immutable once built; strategies share targets by value.
#[derive(Clone, PartialEq)]
pub struct Target {
    provider: Provider,
    base_url: Url,
    credential: Option<String>,
    overrides: ParamOverrides,
    weight: Option<f64>,
}

impl Target {
    pub fn new(provider: Provider, base_url: &str) -> Result<Self, TargetError> {
        let parsed = Url::parse(base_url.trim()).map_err(|e| TargetError::InvalidUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(TargetError::InvalidUrl {
                url: base_url.to_string(),
                reason: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }

        Ok(Self {
            provider,
            base_url: parsed,
            credential: None,
            overrides: ParamOverrides::default(),
            weight: None,
        })
    }

    /// Target at the provider's well-known address
    pub fn with_default_host(provider: Provider) -> Result<Self, TargetError> {
        Self::new(provider, provider.default_base_url())
    }

    /// Empty credentials are treated as absent.
    pub fn with_credential(mut self, credential: impl Into<String>) -> Self {
        let credential = credential.into();
        self.credential = (!credential.trim().is_empty()).then_some(credential);
        self
    }

    pub fn with_overrides(mut self, overrides: ParamOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    pub fn with_weight(mut self, weight: f64) -> Result<Self, TargetError> {
        if !weight.is_finite() || weight < 0.0 {
            return Err(TargetError::InvalidWeight(weight));
        }
        self.weight = Some(weight);
        Ok(self)
    }

    pub fn provider(&self) -> Provider {
        self.provider
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn credential(&self) -> Option<&str> {
        self.credential.as_deref()
    }

    pub fn overrides(&self) -> &ParamOverrides {
        &self.overrides
    }

    pub fn weight(&self) -> Option<f64> {
        self.weight
    }

    /// Model this target will actually be asked for
    pub fn resolved_model<'a>(&'a self, request: &'a ChatCompletionRequest) -> &'a str {
        self.overrides.resolve_model(request)
    }

    /// Merge the client request with this target's overrides.
    pub fn prepare(&self, request: &ChatCompletionRequest) -> ChatCompletionRequest {
        self.overrides.apply(request)
    }

    /// Full URL of the chat endpoint for this target's dialect
    pub fn completions_url(&self) -> String {
        let base = self.base_url.as_str().trim_end_matches('/');
        match self.provider {
            Provider::OpenAi if base.ends_with("/v1") => format!("{}/chat/completions", base),
            Provider::OpenAi => format!("{}/v1/chat/completions", base),
            Provider::Ollama => format!("{}/api/chat", base),
        }
    }

    /// Address used to key per-backend resources (connection limits, logs)
    pub fn endpoint_key(&self) -> String {
        self.base_url.as_str().trim_end_matches('/').to_string()
    }
}

impl fmt::Debug for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Target")
            .field("provider", &self.provider)
            .field("base_url", &self.base_url.as_str())
            .field("credential", &self.credential.as_ref().map(|_| "[REDACTED]"))
            .field("overrides", &self.overrides)
            .field("weight", &self.weight)
            .finish()
    }
}
