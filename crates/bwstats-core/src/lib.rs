//! Aggregated Bedwars statistics services
//!
//! This crate owns the read path from a display name or stable id to an
//! aggregated statistics document: identity resolution, the typed origin
//! API client, the pure aggregator, and the cached player/leaderboard
//! services built on `bwstats-kv`. The embedding process supplies the
//! HTTP surface; this crate supplies the semantics and the
//! [`Error::status`] mapping that surface needs.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use bwstats_core::{
//!     HttpIdentityResolver, MemoryArchive, OriginClient, PlayerStatsService,
//! };
//! use bwstats_kv::{MemoryKvStore, StatsCache};
//!
//! # async fn run() -> bwstats_core::Result<()> {
//! let cache = StatsCache::new(Arc::new(MemoryKvStore::new()));
//! let service = PlayerStatsService::new(
//!     Arc::new(HttpIdentityResolver::new()?),
//!     OriginClient::new("api-key")?,
//!     cache,
//!     Arc::new(MemoryArchive::new()),
//! );
//!
//! let stats = service.get_stats("Technoblade").await?;
//! println!("{} is level {}", stats.identity.username, stats.overall.level);
//! # Ok(())
//! # }
//! ```

pub mod aggregate;
pub mod archive;
pub mod error;
pub mod identity;
pub mod leaderboard;
pub mod mode;
pub mod model;
pub mod origin;
pub mod service;

pub use aggregate::aggregate;
pub use archive::{
    DEFAULT_LEADERBOARD_CAP, DEFAULT_PLAYER_CAP, LeaderboardQueryRecord, MemoryArchive,
    PlayerQueryRecord, QueryArchive,
};
pub use error::{Error, Result};
pub use identity::{HttpIdentityResolver, IdentityResolver};
pub use leaderboard::{
    ENTRIES_PER_CATEGORY, LEADERBOARD_TTL_SECS, LeaderboardService, PREVIEW_ENTRIES,
};
pub use mode::ModeKey;
pub use model::{
    CHALLENGE_CATALOG, LeaderboardCategory, LeaderboardEntry, LeaderboardSnapshot, ModeStats,
    Overall, PlayerIdentity, PlayerStats, challenge_display_name, format_thousands, level_icon,
    ratio,
};
pub use origin::{OriginClient, OriginClientBuilder, PlayerPayload, RawBoard, RawPlayer, RawStats};
pub use service::{PLAYER_TTL_SECS, PlayerStatsService};
