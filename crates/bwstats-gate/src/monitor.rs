//! Denylist and access analytics
//!
//! [`AccessMonitor`] owns the per-IP denylist and the 7-day daily request
//! counters. The counters are purely advisory (anomaly spotting for the
//! administrative surface); only the denylist blocks traffic. Every
//! operation fails open: if the backend is down, nothing is blocked and
//! counts read as zero.

use std::sync::Arc;

use bwstats_kv::KvStore;
use chrono::Utc;
use tracing::{info, warn};

/// Default block duration (1 hour)
pub const DEFAULT_BLOCK_SECS: u64 = 3_600;

/// Daily counters are retained for 7 days
const DAILY_RETENTION_SECS: u64 = 7 * 86_400;

/// Requests per day above which an IP is reported as suspicious
pub const SUSPICIOUS_THRESHOLD: u64 = 100;

/// Marker value stored under a blocked IP's key
const BLOCKED_MARKER: &str = "blocked";

/// Advisory report on one IP's daily traffic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuspicionReport {
    /// Whether the daily count exceeds the threshold
    pub suspicious: bool,
    /// Requests seen today
    pub count: u64,
    /// The fixed threshold the count was compared against
    pub threshold: u64,
}

/// Per-day request totals for the analytics rollup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyStats {
    /// Date in `YYYY-MM-DD`
    pub date: String,
    /// Total requests recorded that day
    pub requests: u64,
    /// Distinct IPs seen that day
    pub unique_ips: usize,
}

/// Multi-day analytics rollup
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Analytics {
    /// Requests across all days in the report
    pub total_requests: u64,
    /// Sum of per-day distinct IP counts
    pub unique_ips: usize,
    /// Per-day breakdown, most recent first
    pub daily: Vec<DailyStats>,
}

/// Denylist and daily-counter operations over the shared store
#[derive(Clone)]
pub struct AccessMonitor {
    store: Arc<dyn KvStore>,
}

impl AccessMonitor {
    /// Wrap a shared store
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    fn blocked_key(ip: &str) -> String {
        format!("blocked_ip:{ip}")
    }

    fn daily_key(date: &str, ip: &str) -> String {
        format!("daily_access:{date}:{ip}")
    }

    fn today() -> String {
        Utc::now().format("%Y-%m-%d").to_string()
    }

    /// Block an IP for `duration_secs`; returns whether the write succeeded
    pub async fn block(&self, ip: &str, duration_secs: u64) -> bool {
        match self
            .store
            .set_ex(&Self::blocked_key(ip), BLOCKED_MARKER, duration_secs)
            .await
        {
            Ok(()) => {
                info!("blocked {ip} for {duration_secs}s");
                true
            }
            Err(e) => {
                warn!("failed to block {ip}: {e}");
                false
            }
        }
    }

    /// Remove an IP from the denylist
    pub async fn unblock(&self, ip: &str) -> bool {
        match self.store.del(&Self::blocked_key(ip)).await {
            Ok(()) => {
                info!("unblocked {ip}");
                true
            }
            Err(e) => {
                warn!("failed to unblock {ip}: {e}");
                false
            }
        }
    }

    /// Whether an IP is currently on the denylist; backend errors read as
    /// not blocked
    pub async fn is_blocked(&self, ip: &str) -> bool {
        match self.store.get(&Self::blocked_key(ip)).await {
            Ok(value) => value.as_deref() == Some(BLOCKED_MARKER),
            Err(e) => {
                warn!("failed to check denylist for {ip}: {e}");
                false
            }
        }
    }

    /// Bump today's counter for an IP; advisory, errors are swallowed
    pub async fn record_access(&self, ip: &str) {
        let key = Self::daily_key(&Self::today(), ip);
        let result = async {
            self.store.incr(&key).await?;
            self.store.expire(&key, DAILY_RETENTION_SECS).await
        }
        .await;

        if let Err(e) = result {
            warn!("failed to record access for {ip}: {e}");
        }
    }

    /// Requests recorded for an IP on a given date (today if `None`)
    pub async fn daily_count(&self, ip: &str, date: Option<&str>) -> u64 {
        let date = date.map_or_else(Self::today, str::to_string);
        match self.store.get(&Self::daily_key(&date, ip)).await {
            Ok(value) => value.and_then(|v| v.parse().ok()).unwrap_or(0),
            Err(e) => {
                warn!("failed to read daily count for {ip}: {e}");
                0
            }
        }
    }

    /// Advisory check against the fixed daily threshold; never blocks
    pub async fn is_suspicious(&self, ip: &str) -> SuspicionReport {
        let count = self.daily_count(ip, None).await;
        SuspicionReport {
            suspicious: count > SUSPICIOUS_THRESHOLD,
            count,
            threshold: SUSPICIOUS_THRESHOLD,
        }
    }

    /// Top IPs by request count for a date (today if `None`)
    pub async fn top_ips(&self, date: Option<&str>, limit: usize) -> Vec<(String, u64)> {
        let date = date.map_or_else(Self::today, str::to_string);
        let pattern = Self::daily_key(&date, "*");

        let keys = match self.store.keys(&pattern).await {
            Ok(keys) => keys,
            Err(e) => {
                warn!("failed to enumerate daily counters: {e}");
                return Vec::new();
            }
        };

        let mut counts = Vec::new();
        for key in keys {
            let Some(ip) = key.split(':').nth(2) else {
                continue;
            };
            if let Ok(Some(raw)) = self.store.get(&key).await {
                if let Ok(count) = raw.parse::<u64>() {
                    counts.push((ip.to_string(), count));
                }
            }
        }

        counts.sort_by(|a, b| b.1.cmp(&a.1));
        counts.truncate(limit);
        counts
    }

    /// Roll up the last `days` of daily counters
    pub async fn analytics(&self, days: u32) -> Analytics {
        let mut report = Analytics::default();
        let today = Utc::now().date_naive();

        for offset in 0..i64::from(days) {
            let Some(date) = today.checked_sub_days(chrono::Days::new(offset as u64)) else {
                continue;
            };
            let date = date.format("%Y-%m-%d").to_string();

            let mut requests = 0;
            let mut ips = 0;
            let keys = self
                .store
                .keys(&Self::daily_key(&date, "*"))
                .await
                .unwrap_or_default();
            for key in keys {
                if let Ok(Some(raw)) = self.store.get(&key).await {
                    if let Ok(count) = raw.parse::<u64>() {
                        requests += count;
                        ips += 1;
                    }
                }
            }

            report.total_requests += requests;
            report.unique_ips += ips;
            report.daily.push(DailyStats {
                date,
                requests,
                unique_ips: ips,
            });
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use bwstats_kv::MemoryKvStore;

    use super::*;
    use crate::testing::FailingStore;

    #[tokio::test]
    async fn block_then_unblock() {
        let monitor = AccessMonitor::new(Arc::new(MemoryKvStore::new()));

        assert!(!monitor.is_blocked("1.2.3.4").await);

        assert!(monitor.block("1.2.3.4", 3_600).await);
        assert!(monitor.is_blocked("1.2.3.4").await);

        assert!(monitor.unblock("1.2.3.4").await);
        assert!(!monitor.is_blocked("1.2.3.4").await);
    }

    #[tokio::test(start_paused = true)]
    async fn block_expires_on_its_own() {
        let monitor = AccessMonitor::new(Arc::new(MemoryKvStore::new()));

        monitor.block("1.2.3.4", 2).await;
        assert!(monitor.is_blocked("1.2.3.4").await);

        tokio::time::advance(std::time::Duration::from_secs(3)).await;
        assert!(!monitor.is_blocked("1.2.3.4").await);
    }

    #[tokio::test]
    async fn daily_counter_accumulates() {
        let monitor = AccessMonitor::new(Arc::new(MemoryKvStore::new()));

        for _ in 0..3 {
            monitor.record_access("1.2.3.4").await;
        }

        assert_eq!(monitor.daily_count("1.2.3.4", None).await, 3);
        assert_eq!(monitor.daily_count("5.6.7.8", None).await, 0);
    }

    #[tokio::test]
    async fn suspicion_threshold() {
        let monitor = AccessMonitor::new(Arc::new(MemoryKvStore::new()));

        let report = monitor.is_suspicious("1.2.3.4").await;
        assert!(!report.suspicious);
        assert_eq!(report.threshold, 100);

        for _ in 0..101 {
            monitor.record_access("1.2.3.4").await;
        }
        let report = monitor.is_suspicious("1.2.3.4").await;
        assert!(report.suspicious);
        assert_eq!(report.count, 101);
    }

    #[tokio::test]
    async fn top_ips_sorted_descending() {
        let monitor = AccessMonitor::new(Arc::new(MemoryKvStore::new()));

        for _ in 0..5 {
            monitor.record_access("a").await;
        }
        for _ in 0..2 {
            monitor.record_access("b").await;
        }

        let top = monitor.top_ips(None, 10).await;
        assert_eq!(top[0], ("a".to_string(), 5));
        assert_eq!(top[1], ("b".to_string(), 2));
    }

    #[tokio::test]
    async fn analytics_rolls_up_today() {
        let monitor = AccessMonitor::new(Arc::new(MemoryKvStore::new()));

        monitor.record_access("a").await;
        monitor.record_access("a").await;
        monitor.record_access("b").await;

        let report = monitor.analytics(7).await;
        assert_eq!(report.total_requests, 3);
        assert_eq!(report.unique_ips, 2);
        assert_eq!(report.daily.len(), 7);
        assert_eq!(report.daily[0].requests, 3);
    }

    #[tokio::test]
    async fn backend_failure_reads_as_unblocked() {
        let monitor = AccessMonitor::new(Arc::new(FailingStore));

        assert!(!monitor.is_blocked("1.2.3.4").await);
        assert!(!monitor.block("1.2.3.4", 60).await);
        assert_eq!(monitor.daily_count("1.2.3.4", None).await, 0);
    }
}
