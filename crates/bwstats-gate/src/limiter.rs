//! Sliding-window rate limiter backed by the shared key-value store
//!
//! Two adjacent fixed windows are combined into a weighted estimate
//! (`prev * (1 - elapsed/window) + curr`), the standard sliding-window
//! approximation. Counters live in the shared store under
//! `ratelimit:{ip}:{window}`, so every process behind the same backend
//! enforces one quota. Correctness of the counters relies entirely on the
//! backend's atomic INCR; no client-side locking.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use bwstats_kv::KvStore;
use tracing::warn;

/// Default request limit per window per IP
pub const DEFAULT_WINDOW_LIMIT: u32 = 15;

/// Default window length in seconds
pub const DEFAULT_WINDOW_SECS: u64 = 60;

/// Key prefix for enforcement counters
const KEY_PREFIX: &str = "ratelimit";

/// Outcome of one rate-limit check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitDecision {
    /// Whether the request may proceed
    pub allowed: bool,
    /// Configured request limit per window
    pub limit: u32,
    /// Requests remaining in the current window
    pub remaining: u32,
    /// Unix time (seconds) at which the current window resets
    pub reset_unix: u64,
}

impl RateLimitDecision {
    /// Seconds until the window resets, measured from `now_unix`
    pub fn retry_after_secs(&self, now_unix: u64) -> u64 {
        self.reset_unix.saturating_sub(now_unix)
    }
}

/// Sliding-window rate limiter
#[derive(Clone)]
pub struct RateLimiter {
    store: Arc<dyn KvStore>,
    limit: u32,
    window_secs: u64,
}

impl RateLimiter {
    /// Create a limiter with the default 15 requests / 60 seconds quota
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self::with_quota(store, DEFAULT_WINDOW_LIMIT, DEFAULT_WINDOW_SECS)
    }

    /// Create a limiter with a custom quota
    pub fn with_quota(store: Arc<dyn KvStore>, limit: u32, window_secs: u64) -> Self {
        Self {
            store,
            limit,
            window_secs,
        }
    }

    /// Record one request from `ip` and decide whether it may proceed.
    ///
    /// If the counting backend is unavailable the request is allowed:
    /// availability of the protected service takes priority over strict
    /// quota enforcement.
    pub async fn hit(&self, ip: &str) -> RateLimitDecision {
        let now_ms = unix_time_ms();
        match self.try_hit(ip, now_ms).await {
            Ok(decision) => decision,
            Err(e) => {
                warn!("rate limiter backend unavailable, failing open: {e}");
                self.fail_open(now_ms)
            }
        }
    }

    /// Deterministic variant taking an explicit clock reading
    pub(crate) async fn hit_at(&self, ip: &str, now_ms: u64) -> RateLimitDecision {
        match self.try_hit(ip, now_ms).await {
            Ok(decision) => decision,
            Err(e) => {
                warn!("rate limiter backend unavailable, failing open: {e}");
                self.fail_open(now_ms)
            }
        }
    }

    async fn try_hit(&self, ip: &str, now_ms: u64) -> bwstats_kv::Result<RateLimitDecision> {
        let window_ms = self.window_secs * 1000;
        let window = now_ms / window_ms;
        let elapsed = (now_ms % window_ms) as f64 / window_ms as f64;
        let reset_unix = ((window + 1) * window_ms) / 1000;

        let curr_key = format!("{KEY_PREFIX}:{ip}:{window}");
        let prev_key = format!("{KEY_PREFIX}:{ip}:{}", window.wrapping_sub(1));

        let prev = self.read_count(&prev_key).await?;
        let curr = self.read_count(&curr_key).await?;

        let estimated = prev as f64 * (1.0 - elapsed) + curr as f64;
        if estimated + 1.0 > self.limit as f64 {
            // Denied hits do not consume the enforcement window.
            return Ok(RateLimitDecision {
                allowed: false,
                limit: self.limit,
                remaining: 0,
                reset_unix,
            });
        }

        let count = self.store.incr(&curr_key).await?;
        if count == 1 {
            // Keep the previous window around for one more window so the
            // weighted estimate can see it.
            self.store.expire(&curr_key, 2 * self.window_secs).await?;
        }

        let used = (estimated + 1.0).ceil() as u32;
        Ok(RateLimitDecision {
            allowed: true,
            limit: self.limit,
            remaining: self.limit.saturating_sub(used),
            reset_unix,
        })
    }

    async fn read_count(&self, key: &str) -> bwstats_kv::Result<u64> {
        Ok(self
            .store
            .get(key)
            .await?
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(0))
    }

    fn fail_open(&self, now_ms: u64) -> RateLimitDecision {
        let window_ms = self.window_secs * 1000;
        let reset_unix = ((now_ms / window_ms + 1) * window_ms) / 1000;
        RateLimitDecision {
            allowed: true,
            limit: self.limit,
            remaining: 0,
            reset_unix,
        }
    }
}

/// Current unix time in milliseconds
pub(crate) fn unix_time_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
