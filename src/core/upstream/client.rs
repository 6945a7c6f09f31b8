//! Shared HTTP client for backend calls

use super::dialect::{decode_response, encode_request};
use super::error::AttemptError;
use crate::core::router::FailurePolicy;
use crate::core::target::Target;
use crate::core::types::{ChatCompletionRequest, ChatCompletionResponse};
use dashmap::DashMap;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::debug;

/// Client-wide limits
#[derive(Debug, Clone)]
pub struct UpstreamSettings {
    /// Upper bound on one attempt, queueing for a permit included
    pub attempt_timeout: Duration,
    pub connect_timeout: Duration,
    /// In-flight requests allowed against a single backend
    pub max_concurrent_per_target: usize,
}

impl Default for UpstreamSettings {
    fn default() -> Self {
        Self {
            attempt_timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(5),
            max_concurrent_per_target: 64,
        }
    }
}

/// Issues single attempts against targets.
///
/// Connections are pooled across all targets; concurrency is bounded per
/// backend address so one slow backend cannot absorb every connection.
pub struct UpstreamClient {
    http: Client,
    limits: DashMap<String, Arc<Semaphore>>,
    settings: UpstreamSettings,
}

impl UpstreamClient {
    pub fn new(settings: UpstreamSettings) -> Result<Self, reqwest::Error> {
        let http = Client::builder()
            .connect_timeout(settings.connect_timeout)
            .pool_max_idle_per_host(settings.max_concurrent_per_target)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            limits: DashMap::new(),
            settings,
        })
    }

    pub fn settings(&self) -> &UpstreamSettings {
        &self.settings
    }

    fn limiter(&self, target: &Target) -> Arc<Semaphore> {
        self.limits
            .entry(target.endpoint_key())
            .or_insert_with(|| Arc::new(Semaphore::new(self.settings.max_concurrent_per_target.max(1))))
            .clone()
    }

    /// Permits currently free for `target`'s backend
    pub fn available_permits(&self, target: &Target) -> usize {
        self.limiter(target).available_permits()
    }

    /// One attempt: merge overrides, send, classify.
    pub async fn send(
        &self,
        target: &Target,
        request: &ChatCompletionRequest,
        failure: &FailurePolicy,
    ) -> Result<ChatCompletionResponse, AttemptError> {
        let timeout = self.settings.attempt_timeout;
        match tokio::time::timeout(timeout, self.send_inner(target, request, failure)).await {
            Ok(result) => result,
            Err(_) => Err(AttemptError::Timeout(timeout)),
        }
    }

    async fn send_inner(
        &self,
        target: &Target,
        request: &ChatCompletionRequest,
        failure: &FailurePolicy,
    ) -> Result<ChatCompletionResponse, AttemptError> {
        let limiter = self.limiter(target);
        let _permit = limiter
            .acquire_owned()
            .await
            .map_err(|_| AttemptError::Network("backend limiter closed".to_string()))?;

        let outbound = target.prepare(request);
        let body = encode_request(target.provider(), &outbound)?;
        let url = target.completions_url();
        debug!(url = %url, model = %outbound.model, "sending upstream attempt");

        let mut builder = self.http.post(&url).json(&body);
        if let Some(credential) = target.credential() {
            builder = builder.bearer_auth(credential);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let bytes = response.bytes().await?;

        if failure.is_failure(status) {
            return Err(AttemptError::status(status, &String::from_utf8_lossy(&bytes)));
        }

        match decode_response(target.provider(), &bytes) {
            Ok(parsed) => Ok(parsed),
            // A non-2xx outside the failure list that is not a completion is
            // still reported by its status.
            Err(_) if !(200..300).contains(&status) => {
                Err(AttemptError::status(status, &String::from_utf8_lossy(&bytes)))
            }
            Err(e) => Err(e),
        }
    }
}
