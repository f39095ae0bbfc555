// ============================================================================
// Rate Limit Counter
// ============================================================================

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::timeout;
use vitrine_error::{AppError, AppResult};
use vitrine_redis::RedisClient;

/// Storage seam for fixed-window counters.
///
/// The handle is constructed explicitly and passed in (no process-global
/// client), so tests substitute an in-memory store. `incr_with_window` must
/// be atomic: increment, set the expiry on the window's first hit, and
/// report the remaining TTL, all without a racing gap.
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Atomically increment `key`, arming a `window_seconds` expiry on the
    /// first hit; returns `(count, ttl_seconds)`
    async fn incr_with_window(&self, key: &str, window_seconds: i64) -> AppResult<(i64, i64)>;

    /// Drop the counter immediately (administrative reset)
    async fn delete(&self, key: &str) -> AppResult<()>;
}

/// Outcome of one admission check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub limit: u32,
    pub remaining: u32,
    /// Seconds until the current window expires and the quota refills
    pub reset_seconds: i64,
}

/// Fixed-window rate limiter over a shared counter store.
///
/// Windows are discrete, not sliding: a burst straddling a window boundary
/// can momentarily admit up to twice the quota across the two windows. That
/// imprecision is part of the contract; callers and tests depend on the
/// exact fixed-window behavior.
///
/// An unreachable or slow store fails open: the request is admitted
/// uncounted and a warning is logged. An outage in the limiting
/// infrastructure must never block all traffic.
#[derive(Clone)]
pub struct RateLimiter {
    store: Arc<dyn CounterStore>,
    store_timeout: Duration,
}

impl RateLimiter {
    pub fn new(store: Arc<dyn CounterStore>, store_timeout: Duration) -> Self {
        Self {
            store,
            store_timeout,
        }
    }

    /// Count this request against `key` and decide whether it is admitted
    pub async fn increment_and_check(
        &self,
        key: &str,
        max_requests: u32,
        window_seconds: i64,
    ) -> RateLimitDecision {
        let result = timeout(
            self.store_timeout,
            self.store.incr_with_window(key, window_seconds),
        )
        .await;

        let (count, ttl) = match result {
            Ok(Ok(reply)) => reply,
            Ok(Err(err)) => {
                tracing::warn!(error = %err, key = %key, "rate limit store error, failing open");
                return Self::fail_open(max_requests, window_seconds);
            }
            Err(_) => {
                tracing::warn!(
                    key = %key,
                    timeout_ms = self.store_timeout.as_millis() as u64,
                    "rate limit store timed out, failing open"
                );
                return Self::fail_open(max_requests, window_seconds);
            }
        };

        let count = u32::try_from(count).unwrap_or(u32::MAX);
        RateLimitDecision {
            allowed: count <= max_requests,
            limit: max_requests,
            remaining: max_requests.saturating_sub(count),
            // TTL <= 0 means the store reported no expiry on the key;
            // report a full window rather than a nonsense value
            reset_seconds: if ttl > 0 { ttl } else { window_seconds },
        }
    }

    /// Drop the counter for `key` (administrative override / tests)
    pub async fn reset(&self, key: &str) -> AppResult<()> {
        timeout(self.store_timeout, self.store.delete(key))
            .await
            .map_err(|_| AppError::Internal(format!("rate limit reset timed out for {}", key)))?
    }

    fn fail_open(max_requests: u32, window_seconds: i64) -> RateLimitDecision {
        RateLimitDecision {
            allowed: true,
            limit: max_requests,
            remaining: max_requests.saturating_sub(1),
            reset_seconds: window_seconds,
        }
    }
}

// ============================================================================
// Redis store
// ============================================================================

/// Production counter store: one Lua round trip per check, shared by all
/// server instances
#[derive(Clone)]
pub struct RedisCounterStore {
    client: RedisClient,
}

impl RedisCounterStore {
    pub fn new(client: RedisClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CounterStore for RedisCounterStore {
    async fn incr_with_window(&self, key: &str, window_seconds: i64) -> AppResult<(i64, i64)> {
        let mut client = self.client.clone();
        Ok(client.incr_with_window(key, window_seconds).await?)
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        let mut client = self.client.clone();
        client.del(key).await?;
        Ok(())
    }
}

// ============================================================================
// In-memory store
// ============================================================================

/// In-memory counter store for tests and single-process development runs.
///
/// The quota it enforces is per-process, not global; production deployments
/// with more than one instance need the Redis store.
#[derive(Default)]
pub struct MemoryCounterStore {
    entries: Mutex<HashMap<String, (i64, Instant)>>,
}

impl MemoryCounterStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

#[async_trait]
impl CounterStore for MemoryCounterStore {
    async fn incr_with_window(&self, key: &str, window_seconds: i64) -> AppResult<(i64, i64)> {
        let now = Instant::now();
        let mut entries = self.entries.lock().await;

        let entry = entries
            .entry(key.to_string())
            .and_modify(|(count, expires_at)| {
                if *expires_at <= now {
                    // Window elapsed; the key is fresh again
                    *count = 1;
                    *expires_at = now + Duration::from_secs(window_seconds.max(0) as u64);
                } else {
                    *count += 1;
                }
            })
            .or_insert_with(|| (1, now + Duration::from_secs(window_seconds.max(0) as u64)));

        let ttl = entry.1.saturating_duration_since(now).as_secs() as i64;
        Ok((entry.0, ttl.max(1)))
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.entries.lock().await.remove(key);
        Ok(())
    }
}
