//! The dispatch loop

use super::error::DispatchError;
use super::outcome::{AttemptRecord, CacheStatus, DispatchOptions, DispatchOutcome, ServedBy};
use crate::core::cache::{Fingerprint, ResponseCache};
use crate::core::router::{Candidate, SessionKey, Strategy, StrategyResolver};
use crate::core::types::{ChatCompletionRequest, ChatCompletionResponse};
use crate::core::upstream::{AttemptError, UpstreamClient};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Cache work decided up front for one dispatch
struct CachePlan<'a> {
    cache: &'a ResponseCache,
    key: Fingerprint,
    ttl: Duration,
}

/// Routes requests to targets.
///
/// Holds no per-request state; the only shared mutable state it touches is the
/// response cache and the sticky binding store, both concurrent.
#[derive(Clone)]
pub struct Dispatcher {
    upstream: Arc<UpstreamClient>,
    resolver: StrategyResolver,
    cache: Option<ResponseCache>,
}

impl Dispatcher {
    pub fn new(upstream: Arc<UpstreamClient>, resolver: StrategyResolver) -> Self {
        Self {
            upstream,
            resolver,
            cache: None,
        }
    }

    pub fn with_cache(mut self, cache: ResponseCache) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn cache(&self) -> Option<&ResponseCache> {
        self.cache.as_ref()
    }

    pub fn resolver(&self) -> &StrategyResolver {
        &self.resolver
    }

    /// Dispatch one request.
    ///
    /// 1. Without a strategy there is nothing to do.
    /// 2. A cacheable request is answered from the cache when possible, with
    ///    no upstream call.
    /// 3. Otherwise candidates are tried strictly in resolved order until one
    ///    succeeds; that response is cached and returned.
    /// 4. If all fail, nothing is cached and the attempts are returned in the
    ///    error.
    ///
    /// Cancelling `options.cancel` aborts the in-flight attempt and skips the
    /// rest.
    pub async fn dispatch(
        &self,
        request: &ChatCompletionRequest,
        strategy: Option<&Strategy>,
        options: &DispatchOptions,
    ) -> Result<DispatchOutcome, DispatchError> {
        let started = Instant::now();
        let strategy = strategy.ok_or(DispatchError::NoStrategy)?;

        if options.cancel.is_cancelled() {
            return Err(DispatchError::Cancelled { attempts: Vec::new() });
        }

        let plan = self.cache_plan(strategy, request);
        let cache_status = match (&plan, options.force_refresh) {
            (None, _) => CacheStatus::Bypass,
            (Some(_), true) => CacheStatus::Refresh,
            (Some(_), false) => CacheStatus::Miss,
        };

        if let (Some(plan), false) = (&plan, options.force_refresh) {
            let hit = tokio::select! {
                biased;
                _ = options.cancel.cancelled() => {
                    return Err(DispatchError::Cancelled { attempts: Vec::new() });
                }
                hit = plan.cache.lookup(&plan.key) => hit,
            };
            if let Some(response) = hit {
                let latency = started.elapsed();
                info!(
                    fingerprint = plan.key.short(),
                    served_by = "cache",
                    cache = "hit",
                    latency_ms = latency.as_millis() as u64,
                    "dispatch served from cache"
                );
                return Ok(DispatchOutcome {
                    response,
                    served_by: ServedBy::Cache,
                    cache_status: CacheStatus::Hit,
                    attempts: Vec::new(),
                    latency,
                });
            }
        }

        let session = SessionKey::derive(strategy, request);
        let resolution = self.resolver.resolve(strategy, session.as_ref());
        debug!(
            mode = strategy.mode_name(),
            candidates = ?resolution.candidates.iter().map(|c| c.index).collect::<Vec<_>>(),
            pinned = resolution.pinned,
            "resolved strategy"
        );

        let mut attempts = Vec::with_capacity(resolution.candidates.len());
        for candidate in &resolution.candidates {
            let attempt_started = Instant::now();
            let result = tokio::select! {
                biased;
                _ = options.cancel.cancelled() => {
                    attempts.push(record(candidate, attempt_started.elapsed(), Some(AttemptError::Cancelled)));
                    if let Some(key) = &session {
                        self.resolver.release(key);
                    }
                    warn!(
                        attempts = attempts.len(),
                        latency_ms = started.elapsed().as_millis() as u64,
                        "dispatch cancelled by client"
                    );
                    return Err(DispatchError::Cancelled { attempts });
                }
                result = self.upstream.send(candidate.target, request, strategy.failure_policy()) => result,
            };

            match result {
                Ok(response) => {
                    attempts.push(record(candidate, attempt_started.elapsed(), None));
                    if let Some(key) = &session {
                        self.resolver.rebind(strategy, key, candidate.index);
                    }
                    if let Some(plan) = &plan {
                        plan.cache.store(&plan.key, &response, plan.ttl).await;
                    }
                    return Ok(self.finish(response, candidate, cache_status, attempts, started, plan.as_ref()));
                }
                Err(e) => {
                    warn!(
                        target_index = candidate.index,
                        provider = %candidate.target.provider(),
                        kind = e.kind(),
                        "attempt failed: {}",
                        e
                    );
                    attempts.push(record(candidate, attempt_started.elapsed(), Some(e)));
                }
            }
        }

        // A binding to a target that just failed would pin the next request to it.
        if let Some(key) = &session {
            self.resolver.release(key);
        }

        error!(
            mode = strategy.mode_name(),
            attempts = attempts.len(),
            latency_ms = started.elapsed().as_millis() as u64,
            "all providers exhausted"
        );
        Err(DispatchError::AllProvidersExhausted { attempts })
    }

    fn cache_plan<'a>(&'a self, strategy: &Strategy, request: &ChatCompletionRequest) -> Option<CachePlan<'a>> {
        let cache = self.cache.as_ref()?;
        let ttl = cache.ttl_for(strategy)?;
        match cache.fingerprint(strategy, request) {
            Ok(key) => Some(CachePlan { cache, key, ttl }),
            Err(e) => {
                warn!("could not fingerprint request, bypassing cache: {}", e);
                None
            }
        }
    }

    fn finish(
        &self,
        response: ChatCompletionResponse,
        candidate: &Candidate<'_>,
        cache_status: CacheStatus,
        attempts: Vec<AttemptRecord>,
        started: Instant,
        plan: Option<&CachePlan<'_>>,
    ) -> DispatchOutcome {
        let latency = started.elapsed();
        let served_by = ServedBy::Target {
            index: candidate.index,
            provider: candidate.target.provider(),
            base_url: candidate.target.endpoint_key(),
        };
        info!(
            fingerprint = plan.map(|p| p.key.short()).unwrap_or("-"),
            served_by = %served_by,
            target_index = candidate.index,
            attempts = attempts.len(),
            cache = cache_status.as_str(),
            latency_ms = latency.as_millis() as u64,
            "dispatch complete"
        );
        DispatchOutcome {
            response,
            served_by,
            cache_status,
            attempts,
            latency,
        }
    }
}

fn record(candidate: &Candidate<'_>, latency: Duration, error: Option<AttemptError>) -> AttemptRecord {
    AttemptRecord {
        target_index: candidate.index,
        provider: candidate.target.provider(),
        base_url: candidate.target.endpoint_key(),
        latency,
        error,
    }
}
