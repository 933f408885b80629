//! Per-request access decisions
//!
//! The gateway runs before any cache or origin work: crawler allowlist
//! first (no counters touched), then the denylist, then the sliding
//! window. Every decision is logged with ip, path and user-agent; the log
//! is advisory and never blocks a decision.

use std::sync::Arc;

use bwstats_kv::KvStore;
use tracing::{debug, info, warn};

use crate::crawler::is_known_crawler;
use crate::limiter::{RateLimiter, unix_time_ms};
use crate::monitor::AccessMonitor;

/// Outcome of gating one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDecision {
    /// Request may proceed; fields mirror the rate-limit headers the
    /// embedding service exposes
    Allowed {
        /// Requests allowed per window
        limit: u32,
        /// Requests left in the current window
        remaining: u32,
        /// Unix time at which the window resets
        reset_unix: u64,
    },
    /// Known crawler; bypasses counters entirely
    Crawler,
    /// IP is on the denylist
    Blocked,
    /// Sliding-window quota exceeded
    RateLimited {
        /// Requests allowed per window
        limit: u32,
        /// Unix time at which the window resets
        reset_unix: u64,
        /// Seconds until a retry can succeed (at most one window)
        retry_after_secs: u64,
    },
}

impl AccessDecision {
    /// Whether the request should be served
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed { .. } | Self::Crawler)
    }
}

/// Combined denylist + crawler allowlist + rate-limit gate
#[derive(Clone)]
pub struct AccessGateway {
    limiter: RateLimiter,
    monitor: AccessMonitor,
}

impl AccessGateway {
    /// Create a gateway with the default quota over a shared store
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self {
            limiter: RateLimiter::new(Arc::clone(&store)),
            monitor: AccessMonitor::new(store),
        }
    }

    /// Create a gateway from preconfigured parts
    pub fn with_parts(limiter: RateLimiter, monitor: AccessMonitor) -> Self {
        Self { limiter, monitor }
    }

    /// The monitor, for the administrative surface (block/unblock,
    /// analytics, suspicion checks)
    pub fn monitor(&self) -> &AccessMonitor {
        &self.monitor
    }

    /// Decide whether a request may proceed
    pub async fn check(&self, ip: &str, path: &str, user_agent: &str) -> AccessDecision {
        self.check_at(ip, path, user_agent, unix_time_ms()).await
    }

    pub(crate) async fn check_at(
        &self,
        ip: &str,
        path: &str,
        user_agent: &str,
        now_ms: u64,
    ) -> AccessDecision {
        if is_known_crawler(user_agent) {
            debug!("crawler {ip} {path} ua={user_agent:?}");
            return AccessDecision::Crawler;
        }

        if self.monitor.is_blocked(ip).await {
            warn!("blocked {ip} {path} ua={user_agent:?}");
            self.monitor.record_access(ip).await;
            return AccessDecision::Blocked;
        }

        let decision = self.limiter.hit_at(ip, now_ms).await;
        self.monitor.record_access(ip).await;

        if !decision.allowed {
            warn!("rate limited {ip} {path} ua={user_agent:?}");
            return AccessDecision::RateLimited {
                limit: decision.limit,
                reset_unix: decision.reset_unix,
                retry_after_secs: decision.retry_after_secs(now_ms / 1000),
            };
        }

        info!(
            "allowed {ip} {path} remaining={} ua={user_agent:?}",
            decision.remaining
        );
        AccessDecision::Allowed {
            limit: decision.limit,
            remaining: decision.remaining,
            reset_unix: decision.reset_unix,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use bwstats_kv::MemoryKvStore;

    use super::*;
    use crate::testing::FailingStore;

    const NOW_MS: u64 = 1_700_000_010_000;
    const UA: &str = "Mozilla/5.0 (X11; Linux x86_64) Chrome/120.0";
    const CRAWLER_UA: &str = "Mozilla/5.0 (compatible; Googlebot/2.1)";

    #[tokio::test]
    async fn sixteenth_request_is_rate_limited() {
        let gateway = AccessGateway::new(Arc::new(MemoryKvStore::new()));

        for _ in 0..15 {
            let decision = gateway.check_at("1.2.3.4", "/stats/x", UA, NOW_MS).await;
            assert!(decision.is_allowed());
        }

        match gateway.check_at("1.2.3.4", "/stats/x", UA, NOW_MS).await {
            AccessDecision::RateLimited {
                retry_after_secs, ..
            } => assert!(retry_after_secs <= 60),
            other => panic!("expected rate limited, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn crawlers_bypass_all_counters() {
        let gateway = AccessGateway::new(Arc::new(MemoryKvStore::new()));

        for _ in 0..30 {
            let decision = gateway
                .check_at("1.2.3.4", "/stats/x", CRAWLER_UA, NOW_MS)
                .await;
            assert_eq!(decision, AccessDecision::Crawler);
        }

        // Neither the enforcement window nor the daily counter moved.
        assert_eq!(gateway.monitor().daily_count("1.2.3.4", None).await, 0);
        let decision = gateway.check_at("1.2.3.4", "/stats/x", UA, NOW_MS).await;
        match decision {
            AccessDecision::Allowed { remaining, .. } => assert_eq!(remaining, 14),
            other => panic!("expected allowed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn denylist_takes_priority_over_window() {
        let gateway = AccessGateway::new(Arc::new(MemoryKvStore::new()));

        gateway.monitor().block("1.2.3.4", 3_600).await;
        let decision = gateway.check_at("1.2.3.4", "/stats/x", UA, NOW_MS).await;
        assert_eq!(decision, AccessDecision::Blocked);

        // Blocked attempts still feed the analytics counter.
        assert_eq!(gateway.monitor().daily_count("1.2.3.4", None).await, 1);

        gateway.monitor().unblock("1.2.3.4").await;
        let decision = gateway.check_at("1.2.3.4", "/stats/x", UA, NOW_MS).await;
        assert!(decision.is_allowed());
    }

    #[tokio::test]
    async fn allowed_requests_feed_daily_counter() {
        let gateway = AccessGateway::new(Arc::new(MemoryKvStore::new()));

        for _ in 0..3 {
            gateway.check_at("9.9.9.9", "/stats/x", UA, NOW_MS).await;
        }
        assert_eq!(gateway.monitor().daily_count("9.9.9.9", None).await, 3);
    }

    #[tokio::test]
    async fn fails_open_when_backend_is_down() {
        let gateway = AccessGateway::new(Arc::new(FailingStore));
        let decision = gateway.check_at("1.2.3.4", "/stats/x", UA, NOW_MS).await;
        assert!(decision.is_allowed());
    }
}
