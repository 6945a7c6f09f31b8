//! Sticky session bindings
//!
//! A session key is derived from selected request fields; while its binding is
//! live the resolver sends that session to the bound target only.

use super::strategy::{MAX_STICKY_TTL, Strategy};
use crate::core::types::ChatCompletionRequest;
use dashmap::DashMap;
use sha2::{Digest, Sha256};
use std::fmt;
use std::time::{Duration, Instant};

/// Opaque digest identifying one session under one strategy
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionKey(String);

impl SessionKey {
    /// Derive the key from the strategy's `hash_fields`.
    ///
    /// Returns `None` when the strategy is not sticky or the request carries
    /// none of the configured fields.
    pub fn derive(strategy: &Strategy, request: &ChatCompletionRequest) -> Option<Self> {
        let sticky = strategy.sticky_session()?;

        let mut hasher = Sha256::new();
        hasher.update(strategy.id().as_bytes());

        let mut found = false;
        for field in sticky.hash_fields() {
            if let Some(value) = request.field(field) {
                found = true;
                hasher.update(b"\n");
                hasher.update(field.as_bytes());
                hasher.update(b"=");
                hasher.update(value.to_string().as_bytes());
            }
        }

        found.then(|| SessionKey(hex::encode(hasher.finalize())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0[..12.min(self.0.len())])
    }
}

#[derive(Debug, Clone, Copy)]
struct Binding {
    target_index: usize,
    expires_at: Instant,
}

/// Concurrent session → target map with lazy expiry
#[derive(Debug, Default)]
pub struct StickySessionStore {
    bindings: DashMap<SessionKey, Binding>,
}

impl StickySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bound target index, if the binding is still live
    pub fn get(&self, key: &SessionKey) -> Option<usize> {
        let now = Instant::now();
        if let Some(binding) = self.bindings.get(key) {
            if binding.expires_at > now {
                return Some(binding.target_index);
            }
        }
        self.bindings.remove_if(key, |_, b| b.expires_at <= now);
        None
    }

    /// Bind (or rebind) a session with a fresh TTL. Last writer wins.
    pub fn bind(&self, key: SessionKey, target_index: usize, ttl: Duration) {
        let now = Instant::now();
        let expires_at = now.checked_add(ttl.min(MAX_STICKY_TTL)).unwrap_or(now);
        self.bindings.insert(
            key,
            Binding {
                target_index,
                expires_at,
            },
        );
    }

    pub fn release(&self, key: &SessionKey) {
        self.bindings.remove(key);
    }

    /// Drop every expired binding, returning how many went
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.bindings.len();
        self.bindings.retain(|_, b| b.expires_at > now);
        before.saturating_sub(self.bindings.len())
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
