//! Capped append log of served queries
//!
//! Best-effort analytics only: writes happen off the hot path and are
//! allowed to fail silently, and nothing in the serving path ever reads
//! the log back. Each log keeps the newest N records, oldest evicted
//! first.

use std::collections::VecDeque;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Default cap for the player query log
pub const DEFAULT_PLAYER_CAP: usize = 100;

/// Default cap for the leaderboard query log
pub const DEFAULT_LEADERBOARD_CAP: usize = 30;

/// One served player-stats query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerQueryRecord {
    pub uuid: String,
    pub username: String,
    /// When the query was served
    pub served_at: DateTime<Utc>,
    /// Whether the response came from cache
    pub from_cache: bool,
}

/// One served leaderboard query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardQueryRecord {
    pub served_at: DateTime<Utc>,
    pub from_cache: bool,
}

/// Sink for served-query records
#[async_trait]
pub trait QueryArchive: Send + Sync {
    /// Append a player query record
    async fn record_player(&self, record: PlayerQueryRecord);

    /// Append a leaderboard query record
    async fn record_leaderboard(&self, record: LeaderboardQueryRecord);
}

/// In-memory capped archive
pub struct MemoryArchive {
    players: Mutex<VecDeque<PlayerQueryRecord>>,
    leaderboards: Mutex<VecDeque<LeaderboardQueryRecord>>,
    player_cap: usize,
    leaderboard_cap: usize,
}

impl MemoryArchive {
    /// Create an archive with the default caps
    pub fn new() -> Self {
        Self::with_caps(DEFAULT_PLAYER_CAP, DEFAULT_LEADERBOARD_CAP)
    }

    /// Create an archive with explicit per-log caps
    pub fn with_caps(player_cap: usize, leaderboard_cap: usize) -> Self {
        Self {
            players: Mutex::new(VecDeque::with_capacity(player_cap.min(1024))),
            leaderboards: Mutex::new(VecDeque::with_capacity(leaderboard_cap.min(1024))),
            player_cap,
            leaderboard_cap,
        }
    }

    /// Snapshot of the player log, newest last
    pub fn player_records(&self) -> Vec<PlayerQueryRecord> {
        self.players.lock().iter().cloned().collect()
    }

    /// Snapshot of the leaderboard log, newest last
    pub fn leaderboard_records(&self) -> Vec<LeaderboardQueryRecord> {
        self.leaderboards.lock().iter().cloned().collect()
    }
}

impl Default for MemoryArchive {
    fn default() -> Self {
        Self::new()
    }
}

fn push_capped<T>(log: &Mutex<VecDeque<T>>, cap: usize, record: T) {
    let mut log = log.lock();
    while log.len() >= cap.max(1) {
        log.pop_front();
    }
    log.push_back(record);
}

#[async_trait]
impl QueryArchive for MemoryArchive {
    async fn record_player(&self, record: PlayerQueryRecord) {
        push_capped(&self.players, self.player_cap, record);
    }

    async fn record_leaderboard(&self, record: LeaderboardQueryRecord) {
        push_capped(&self.leaderboards, self.leaderboard_cap, record);
    }
}
