//! Read-through player statistics service
//!
//! The serving path is: resolve identity, try the cache, fall through to
//! the origin, aggregate, return. The cache write and the archive append
//! happen on a spawned task after the response value is ready, so neither
//! can block or fail a request. Errors are never written to the cache.
//!
//! There is no single-flight dedup: concurrent misses for the same player
//! may each reach the origin. The read is idempotent, so the only cost is
//! redundant origin calls within one TTL window.

use std::sync::Arc;

use bwstats_kv::StatsCache;
use chrono::Utc;
use tracing::{debug, info};

use crate::Result;
use crate::aggregate::aggregate;
use crate::archive::{PlayerQueryRecord, QueryArchive};
use crate::identity::IdentityResolver;
use crate::model::{PlayerIdentity, PlayerStats};
use crate::origin::OriginClient;

/// Seconds a cached player document stays fresh
pub const PLAYER_TTL_SECS: u64 = 300;

/// Cache key prefix for player documents
const KEY_PREFIX: &str = "user";

/// Read-through cache over the origin player API
#[derive(Clone)]
pub struct PlayerStatsService {
    resolver: Arc<dyn IdentityResolver>,
    origin: OriginClient,
    cache: StatsCache,
    archive: Arc<dyn QueryArchive>,
}

impl PlayerStatsService {
    /// Assemble the service from its collaborators
    pub fn new(
        resolver: Arc<dyn IdentityResolver>,
        origin: OriginClient,
        cache: StatsCache,
        archive: Arc<dyn QueryArchive>,
    ) -> Self {
        Self {
            resolver,
            origin,
            cache,
            archive,
        }
    }

    /// Fetch aggregated stats for a display name.
    ///
    /// Resolution failures surface as [`crate::Error::PlayerNotFound`].
    pub async fn get_stats(&self, username: &str) -> Result<PlayerStats> {
        let identity = self.resolver.resolve(username).await?;
        debug!("resolved {username} to {}", identity.uuid);
        self.get_stats_by_uuid(&identity).await
    }

    /// Fetch aggregated stats for an already-resolved identity.
    ///
    /// The leaderboard fan-out uses this to share the player cache without
    /// paying for name resolution.
    pub async fn get_stats_by_uuid(&self, identity: &PlayerIdentity) -> Result<PlayerStats> {
        let key = cache_key(&identity.uuid);

        if let Some(mut stats) = self.cache.get_json::<PlayerStats>(&key).await {
            stats.from_cache = true;
            self.spawn_archive(identity, true);
            return Ok(stats);
        }

        let payload = self.origin.player(&identity.uuid).await?;
        let stats = aggregate(&payload, identity, Utc::now())?;
        info!("aggregated fresh stats for {}", identity.username);

        let cache = self.cache.clone();
        let value = stats.clone();
        tokio::spawn(async move {
            cache.set_json(&key, &value, PLAYER_TTL_SECS).await;
        });
        self.spawn_archive(identity, false);

        Ok(stats)
    }

    /// Drop the cached document for a player, forcing the next read to
    /// the origin
    pub async fn invalidate(&self, uuid: &str) -> bool {
        self.cache.del(&cache_key(uuid)).await
    }

    fn spawn_archive(&self, identity: &PlayerIdentity, from_cache: bool) {
        let archive = Arc::clone(&self.archive);
        let record = PlayerQueryRecord {
            uuid: identity.uuid.clone(),
            username: identity.username.clone(),
            served_at: Utc::now(),
            from_cache,
        };
        tokio::spawn(async move {
            archive.record_player(record).await;
        });
    }
}

/// Cache key for a player document; the stable id is case-normalized so
/// mixed-case resolver output cannot split the cache
fn cache_key(uuid: &str) -> String {
    format!("{KEY_PREFIX}:{}", uuid.to_lowercase())
}
