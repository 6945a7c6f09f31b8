//! Redis cache backend
//!
//! Plain GET / SETEX / SCAN+DEL against a shared redis. The connection is
//! established lazily and re-attempted at most once per `retry_after`, so a
//! missing redis costs one timeout rather than one per request.

use super::backend::CacheBackend;
use super::{CacheError, MAX_CACHE_TTL};
use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

const SCAN_BATCH: usize = 100;

/// Redis-backed cache
pub struct RedisCache {
    client: redis::Client,
    connection: RwLock<Option<ConnectionManager>>,
    last_failure: Mutex<Option<Instant>>,
    timeout: Duration,
    retry_after: Duration,
    display_url: String,
}

impl RedisCache {
    /// Build the backend. No connection is made until first use.
    pub fn new(url: &str, timeout: Duration) -> Result<Self, CacheError> {
        let client = redis::Client::open(url)
            .map_err(|e| CacheError::Unavailable(format!("invalid redis url: {}", e)))?;
        let display_url = sanitize_url(url);
        info!("Redis cache configured at {}", display_url);

        Ok(Self {
            client,
            connection: RwLock::new(None),
            last_failure: Mutex::new(None),
            timeout,
            retry_after: Duration::from_secs(30),
            display_url,
        })
    }

    pub fn with_retry_after(mut self, retry_after: Duration) -> Self {
        self.retry_after = retry_after;
        self
    }

    fn in_backoff(&self) -> bool {
        self.last_failure
            .lock()
            .ok()
            .and_then(|guard| *guard)
            .is_some_and(|at| at.elapsed() < self.retry_after)
    }

    fn record_failure(&self) {
        if let Ok(mut guard) = self.last_failure.lock() {
            *guard = Some(Instant::now());
        }
    }

    async fn connection(&self) -> Result<ConnectionManager, CacheError> {
        if let Some(conn) = self.connection.read().await.as_ref() {
            return Ok(conn.clone());
        }
        if self.in_backoff() {
            return Err(CacheError::Unavailable(format!(
                "redis at {} unreachable, retrying later",
                self.display_url
            )));
        }

        let mut guard = self.connection.write().await;
        if let Some(conn) = guard.as_ref() {
            return Ok(conn.clone());
        }

        debug!("Connecting to redis at {}", self.display_url);
        let connected = tokio::time::timeout(self.timeout, ConnectionManager::new(self.client.clone())).await;
        match connected {
            Ok(Ok(conn)) => {
                info!("Connected to redis at {}", self.display_url);
                *guard = Some(conn.clone());
                Ok(conn)
            }
            Ok(Err(e)) => {
                self.record_failure();
                warn!("Redis connection to {} failed: {}", self.display_url, e);
                Err(CacheError::Unavailable(e.to_string()))
            }
            Err(_) => {
                self.record_failure();
                warn!("Redis connection to {} timed out", self.display_url);
                Err(CacheError::Unavailable("connection timed out".to_string()))
            }
        }
    }

    /// Run one redis operation under the configured timeout
    async fn run<T, F>(&self, op: F) -> Result<T, CacheError>
    where
        F: std::future::Future<Output = redis::RedisResult<T>>,
    {
        match tokio::time::timeout(self.timeout, op).await {
            Ok(result) => result.map_err(|e| CacheError::Unavailable(e.to_string())),
            Err(_) => Err(CacheError::Unavailable("operation timed out".to_string())),
        }
    }
}

#[async_trait]
impl CacheBackend for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut conn = self.connection().await?;
        let value: Option<String> = self.run(conn.get(key)).await?;
        Ok(value)
    }

    async fn put(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError> {
        let mut conn = self.connection().await?;
        let seconds = ttl.min(MAX_CACHE_TTL).as_secs().max(1);
        let _: () = self.run(conn.set_ex(key, value, seconds)).await?;
        Ok(())
    }

    async fn clear(&self, prefix: &str) -> Result<u64, CacheError> {
        let mut conn = self.connection().await?;
        let pattern = format!("{}*", prefix);
        let mut cursor: u64 = 0;
        let mut removed: u64 = 0;

        loop {
            let (next, keys): (u64, Vec<String>) = self
                .run(
                    redis::cmd("SCAN")
                        .arg(cursor)
                        .arg("MATCH")
                        .arg(&pattern)
                        .arg("COUNT")
                        .arg(SCAN_BATCH)
                        .query_async(&mut conn),
                )
                .await?;

            if !keys.is_empty() {
                let deleted: u64 = self.run(conn.del(&keys)).await?;
                removed += deleted;
            }

            if next == 0 {
                break;
            }
            cursor = next;
        }

        info!("Cleared {} cache entries matching {}", removed, pattern);
        Ok(removed)
    }

    fn name(&self) -> &'static str {
        "redis"
    }

    async fn health_check(&self) -> Result<(), CacheError> {
        let mut conn = self.connection().await?;
        let _: String = self.run(redis::cmd("PING").query_async(&mut conn)).await?;
        Ok(())
    }
}

/// Sanitize Redis URL for logging (hide password)
pub(crate) fn sanitize_url(url: &str) -> String {
    if let Ok(parsed) = url::Url::parse(url) {
        let mut sanitized = parsed.clone();
        if sanitized.password().is_some() {
            let _ = sanitized.set_password(Some("***"));
        }
        sanitized.to_string()
    } else {
        "invalid_url".to_string()
    }
}
