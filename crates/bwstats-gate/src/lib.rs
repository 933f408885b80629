//! Request gatekeeping for the bwstats services
//!
//! Everything that decides whether a request is worth doing expensive work
//! for lives here:
//! - [`RateLimiter`]: sliding-window quota per IP over the shared store
//! - [`AccessMonitor`]: denylist plus advisory daily counters/analytics
//! - [`AccessGateway`]: the per-request decision combining both with a
//!   crawler allowlist
//!
//! The gate fails open throughout: if the counting backend is down the
//! protected service stays available.

mod crawler;
mod gateway;
mod limiter;
mod monitor;

#[cfg(test)]
mod testing;

pub use crawler::is_known_crawler;
pub use gateway::{AccessDecision, AccessGateway};
pub use limiter::{DEFAULT_WINDOW_LIMIT, DEFAULT_WINDOW_SECS, RateLimitDecision, RateLimiter};
pub use monitor::{
    AccessMonitor, Analytics, DailyStats, DEFAULT_BLOCK_SECS, SUSPICIOUS_THRESHOLD,
    SuspicionReport,
};
