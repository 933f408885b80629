//! Ranked leaderboard assembly
//!
//! The origin only publishes an ordered list of stable ids per board; the
//! per-player rows are hydrated through [`PlayerStatsService`], so the
//! fan-out fills the player cache as a side effect. Hydration failures
//! drop the row rather than failing the board.

use std::collections::BTreeMap;
use std::sync::Arc;

use bwstats_kv::StatsCache;
use chrono::Utc;
use futures::StreamExt;
use tracing::{debug, info, warn};

use crate::Result;
use crate::archive::{LeaderboardQueryRecord, QueryArchive};
use crate::model::{
    LeaderboardCategory, LeaderboardEntry, LeaderboardSnapshot, PlayerIdentity, PlayerStats,
    format_thousands,
};
use crate::origin::OriginClient;
use crate::service::PlayerStatsService;

/// Seconds a cached leaderboard snapshot stays fresh
pub const LEADERBOARD_TTL_SECS: u64 = 14_400;

/// Ranks hydrated per category
pub const ENTRIES_PER_CATEGORY: usize = 20;

/// Entries per category in a [`LeaderboardService::preview`] response
pub const PREVIEW_ENTRIES: usize = 5;

/// Player hydrations in flight at once during the fan-out
const HYDRATE_CONCURRENCY: usize = 4;

/// Cache key for the snapshot
const CACHE_KEY: &str = "leaderboards";

/// Cached, origin-backed leaderboard reads
#[derive(Clone)]
pub struct LeaderboardService {
    origin: OriginClient,
    cache: StatsCache,
    players: PlayerStatsService,
    archive: Arc<dyn QueryArchive>,
}

impl LeaderboardService {
    /// Assemble the service from its collaborators.
    ///
    /// `players` shares its cache with the fan-out, so hydrating a board
    /// also primes individual player lookups.
    pub fn new(
        origin: OriginClient,
        cache: StatsCache,
        players: PlayerStatsService,
        archive: Arc<dyn QueryArchive>,
    ) -> Self {
        Self {
            origin,
            cache,
            players,
            archive,
        }
    }

    /// Fetch the current leaderboard snapshot.
    ///
    /// Categories whose board or players fail to hydrate come back short
    /// or empty; only a full origin failure on a cache miss is an error.
    pub async fn get_leaderboards(&self) -> Result<LeaderboardSnapshot> {
        if let Some(mut snapshot) = self.cache.get_json::<LeaderboardSnapshot>(CACHE_KEY).await {
            snapshot.from_cache = true;
            self.spawn_archive(true);
            return Ok(snapshot);
        }

        let boards = self.origin.leaderboards().await?;

        let mut categories = BTreeMap::new();
        for category in LeaderboardCategory::ALL {
            let leaders = boards
                .iter()
                .find(|b| b.path == category.board_path())
                .map(|b| b.leaders.as_slice())
                .unwrap_or_default();
            if leaders.is_empty() {
                warn!("no board data for category {}", category.as_str());
            }
            let entries = self.hydrate(leaders).await;
            debug!(
                "hydrated {}/{} entries for {}",
                entries.len(),
                leaders.len().min(ENTRIES_PER_CATEGORY),
                category.as_str()
            );
            categories.insert(*category, entries);
        }

        let snapshot = LeaderboardSnapshot {
            fetched_at: Utc::now(),
            from_cache: false,
            categories,
        };
        info!("assembled fresh leaderboard snapshot");

        let cache = self.cache.clone();
        let value = snapshot.clone();
        tokio::spawn(async move {
            cache.set_json(CACHE_KEY, &value, LEADERBOARD_TTL_SECS).await;
        });
        self.spawn_archive(false);

        Ok(snapshot)
    }

    /// Short snapshot for embedding in other responses; degrades to an
    /// empty snapshot instead of failing
    pub async fn preview(&self) -> LeaderboardSnapshot {
        match self.get_leaderboards().await {
            Ok(snapshot) => snapshot.truncated(PREVIEW_ENTRIES),
            Err(e) => {
                warn!("leaderboard preview degraded: {e}");
                LeaderboardSnapshot::empty()
            }
        }
    }

    /// Hydrate the top ids of one board into entries, preserving rank
    /// order and dropping players that fail to load
    async fn hydrate(&self, leaders: &[String]) -> Vec<LeaderboardEntry> {
        let results: Vec<Option<PlayerStats>> = futures::stream::iter(
            leaders
                .iter()
                .take(ENTRIES_PER_CATEGORY)
                .cloned()
                .map(|uuid| {
                    let players = self.players.clone();
                    async move {
                        let identity = PlayerIdentity {
                            uuid: uuid.clone(),
                            username: String::new(),
                        };
                        match players.get_stats_by_uuid(&identity).await {
                            Ok(stats) => Some(stats),
                            Err(e) => {
                                warn!("dropping leaderboard entry {uuid}: {e}");
                                None
                            }
                        }
                    }
                }),
        )
        .buffered(HYDRATE_CONCURRENCY)
        .collect()
        .await;

        results.into_iter().flatten().map(entry_from).collect()
    }

    fn spawn_archive(&self, from_cache: bool) {
        let archive = Arc::clone(&self.archive);
        let record = LeaderboardQueryRecord {
            served_at: Utc::now(),
            from_cache,
        };
        tokio::spawn(async move {
            archive.record_leaderboard(record).await;
        });
    }
}

/// Project a full stats document down to one leaderboard row
fn entry_from(stats: PlayerStats) -> LeaderboardEntry {
    let total = stats.total();
    LeaderboardEntry {
        wins: total.wins,
        final_kills: total.final_kills,
        final_kills_formatted: format_thousands(total.final_kills),
        level: stats.overall.level,
        level_formatted: stats.overall.level_formatted.clone(),
        uuid: stats.identity.uuid,
        username: stats.identity.username,
    }
}
