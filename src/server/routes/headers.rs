//! Gateway request and response headers

use crate::core::dispatcher::DispatchOutcome;
use crate::core::router::{Strategy, StrategyConfig, StrategyError, TargetConfig};
use crate::core::target::Provider;
use crate::utils::error::{GatewayError, Result};
use actix_web::HttpRequest;
use actix_web::HttpResponseBuilder;
use actix_web::http::header::AUTHORIZATION;

/// Full JSON strategy document
pub const CONFIG: &str = "x-gateway-config";
/// Single-target shorthand: provider name
pub const PROVIDER: &str = "x-gateway-provider";
/// Single-target shorthand: base URL
pub const CUSTOM_HOST: &str = "x-gateway-custom-host";
/// `true` skips the cache lookup
pub const CACHE_FORCE_REFRESH: &str = "x-gateway-cache-force-refresh";

pub const SERVED_BY: &str = "x-gateway-served-by";
pub const TARGET_INDEX: &str = "x-gateway-target-index";
pub const CACHE_STATUS: &str = "x-gateway-cache-status";
pub const ATTEMPTS: &str = "x-gateway-attempts";
pub const LATENCY_MS: &str = "x-gateway-latency-ms";
pub const REQUEST_ID: &str = "x-gateway-request-id";

fn header<'a>(req: &'a HttpRequest, name: &str) -> Result<Option<&'a str>> {
    match req.headers().get(name) {
        None => Ok(None),
        Some(value) => value
            .to_str()
            .map(|v| Some(v.trim()).filter(|v| !v.is_empty()))
            .map_err(|_| GatewayError::bad_request(format!("{} is not valid ASCII", name))),
    }
}

fn bearer_token(req: &HttpRequest) -> Result<Option<String>> {
    Ok(header(req, AUTHORIZATION.as_str())?.and_then(|value| {
        let (scheme, token) = value.split_once(' ')?;
        scheme
            .eq_ignore_ascii_case("bearer")
            .then(|| token.trim().to_string())
            .filter(|t| !t.is_empty())
    }))
}

/// The strategy a request carries, if any.
///
/// `x-gateway-config` wins over the provider shorthand. The caller falls back
/// to the configured default when this returns `None`.
pub fn strategy_from_headers(req: &HttpRequest) -> Result<Option<Strategy>> {
    if let Some(document) = header(req, CONFIG)? {
        let config = StrategyConfig::from_json(document)?;
        return Ok(Some(Strategy::try_from(&config)?));
    }

    let Some(provider) = header(req, PROVIDER)? else {
        return Ok(None);
    };
    let provider: Provider = provider.parse().map_err(StrategyError::target(0))?;

    let target = TargetConfig {
        api_key: bearer_token(req)?,
        custom_host: header(req, CUSTOM_HOST)?.map(str::to_string),
        ..TargetConfig::new(provider)
    };
    Ok(Some(Strategy::try_from(StrategyConfig::single(target))?))
}

/// Whether the caller asked to bypass the cache lookup
pub fn force_refresh(req: &HttpRequest) -> bool {
    matches!(
        header(req, CACHE_FORCE_REFRESH),
        Ok(Some(value)) if value.eq_ignore_ascii_case("true") || value == "1"
    )
}

/// Describe how a request was served
pub fn apply_outcome(builder: &mut HttpResponseBuilder, outcome: &DispatchOutcome, request_id: &str) {
    builder
        .insert_header((SERVED_BY, outcome.served_by.to_string()))
        .insert_header((CACHE_STATUS, outcome.cache_status.as_str()))
        .insert_header((ATTEMPTS, outcome.attempts.len().to_string()))
        .insert_header((LATENCY_MS, outcome.latency.as_millis().to_string()))
        .insert_header((REQUEST_ID, request_id.to_string()));

    if let Some(index) = outcome.served_by.target_index() {
        builder.insert_header((TARGET_INDEX, index.to_string()));
    }
}
