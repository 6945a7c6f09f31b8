//! Cache entry with expiry metadata

use std::time::{Duration, Instant};

/// A stored value with its creation time and lifetime
#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    /// The cached value
    pub value: T,
    /// When the entry was created
    pub created_at: Instant,
    /// How long the entry lives
    pub ttl: Duration,
}

impl<T> CacheEntry<T> {
    pub fn new(value: T, ttl: Duration) -> Self {
        Self {
            value,
            created_at: Instant::now(),
            ttl,
        }
    }

    /// Expiry instant, or `None` when the TTL runs past what `Instant` can hold
    pub fn expires_at(&self) -> Option<Instant> {
        self.created_at.checked_add(self.ttl)
    }

    /// Check if the entry is expired
    pub fn is_expired(&self) -> bool {
        self.expires_at().is_some_and(|at| Instant::now() >= at)
    }

    /// Time left before expiry
    pub fn remaining(&self) -> Duration {
        match self.expires_at() {
            Some(at) => at.saturating_duration_since(Instant::now()),
            None => self.ttl.saturating_sub(self.created_at.elapsed()),
        }
    }
}
