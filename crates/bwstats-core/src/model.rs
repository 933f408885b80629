//! The aggregated statistics data model
//!
//! Everything here is a plain value object: constructed fresh on every
//! origin fetch, never mutated afterwards, superseded by the next fetch.
//! The `from_cache` flags reflect how a value was read, never what is
//! stored; the cache write always carries `from_cache = false`.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::mode::ModeKey;

/// A resolved player identity: stable platform id plus display name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerIdentity {
    /// Stable platform identifier (canonical cache-key component,
    /// case-normalized at the cache boundary)
    pub uuid: String,
    /// Display name as reported by the identity provider
    pub username: String,
}

/// Compute a two-decimal ratio with the zero-denominator rule.
///
/// When the denominator is zero the ratio degrades to the numerator itself
/// (not infinity, not zero). This is the only rounding rule in the system;
/// any consumer deriving a scalar from counters goes through here.
pub fn ratio(numerator: u64, denominator: u64) -> f64 {
    if denominator > 0 {
        round2(numerator as f64 / denominator as f64)
    } else {
        round2(numerator as f64)
    }
}

/// Round to two decimal places (multiply by 100, round, divide)
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Format an integer with en-locale thousands separators
pub fn format_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Decorative star for a Bedwars level
pub fn level_icon(level: u64) -> &'static str {
    if level < 1_000 {
        "✫"
    } else if level < 2_000 {
        "✪"
    } else {
        "✩"
    }
}

/// Per-mode counters and their derived ratios
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ModeStats {
    pub games_played: u64,
    pub kills: u64,
    pub deaths: u64,
    pub final_kills: u64,
    pub final_deaths: u64,
    pub wins: u64,
    pub losses: u64,
    pub winstreak: u64,
    pub items_purchased: u64,
    pub beds_broken: u64,
    pub beds_lost: u64,
    pub iron_collected: u64,
    pub gold_collected: u64,
    pub diamonds_collected: u64,
    pub emeralds_collected: u64,
    /// Aggregate resource counter as reported by the origin
    pub resources_collected: u64,
    /// Kill/death ratio
    pub kdr: f64,
    /// Final kill/death ratio
    pub fkdr: f64,
    /// Win/loss ratio
    pub wlr: f64,
    /// Beds broken/lost ratio
    pub bblr: f64,
    /// Sum of the four per-resource counters; cross-check against
    /// `resources_collected`, not a replacement for it
    pub resources_collected_check: u64,
}

/// Account-wide level and currency with display labels
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Overall {
    pub level: u64,
    pub level_formatted: String,
    pub coins: u64,
    pub coins_formatted: String,
}

impl Overall {
    /// Build from raw level and coin counts
    pub fn new(level: u64, coins: u64) -> Self {
        Self {
            level_formatted: format!("{} {}", format_thousands(level), level_icon(level)),
            coins_formatted: format_thousands(coins),
            level,
            coins,
        }
    }
}

/// Aggregated statistics for one player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerStats {
    pub identity: PlayerIdentity,
    /// When the underlying origin fetch happened
    pub fetched_at: DateTime<Utc>,
    /// True when this value was served from cache; set at read time
    #[serde(default)]
    pub from_cache: bool,
    pub overall: Overall,
    /// Always contains [`ModeKey::Total`]
    pub modes: BTreeMap<ModeKey, ModeStats>,
    /// Completed challenge keys from the fixed catalog
    pub challenges: BTreeSet<String>,
}

impl PlayerStats {
    /// Lifetime totals (the `Total` pseudo-mode)
    pub fn total(&self) -> &ModeStats {
        // The aggregator populates every mode in ModeKey::ALL.
        static EMPTY: ModeStats = ModeStats {
            games_played: 0,
            kills: 0,
            deaths: 0,
            final_kills: 0,
            final_deaths: 0,
            wins: 0,
            losses: 0,
            winstreak: 0,
            items_purchased: 0,
            beds_broken: 0,
            beds_lost: 0,
            iron_collected: 0,
            gold_collected: 0,
            diamonds_collected: 0,
            emeralds_collected: 0,
            resources_collected: 0,
            kdr: 0.0,
            fkdr: 0.0,
            wlr: 0.0,
            bblr: 0.0,
            resources_collected_check: 0,
        };
        self.modes.get(&ModeKey::Total).unwrap_or(&EMPTY)
    }
}

/// The fixed challenge catalog: canonical key and display name
pub const CHALLENGE_CATALOG: &[(&str, &str)] = &[
    ("no_team_upgrades", "Renegade"),
    ("no_utilities", "Warmonger"),
    ("selfish", "Selfish"),
    ("slow_generator", "Minimum Wage"),
    ("assassin", "Assassin"),
    ("reset_armor", "Regular Shopper"),
    ("invisible_shop", "Invisible Shop"),
    ("collector", "Collector"),
];

/// Display name for a challenge key, if it is in the catalog
pub fn challenge_display_name(key: &str) -> Option<&'static str> {
    CHALLENGE_CATALOG
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, name)| *name)
}

/// Ranking categories the leaderboard tracks, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LeaderboardCategory {
    Level,
    Wins,
    FinalKills,
}

impl LeaderboardCategory {
    /// All categories in display order
    pub const ALL: &'static [LeaderboardCategory] = &[
        LeaderboardCategory::Level,
        LeaderboardCategory::Wins,
        LeaderboardCategory::FinalKills,
    ];

    /// Canonical snake-case key
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Level => "level",
            Self::Wins => "wins",
            Self::FinalKills => "final_kills",
        }
    }

    /// Parse a canonical key
    pub fn from_str(key: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.as_str() == key)
    }

    /// The origin's board identifier for this category
    pub fn board_path(self) -> &'static str {
        match self {
            Self::Level => "bedwars_level",
            Self::Wins => "wins_new",
            Self::FinalKills => "final_kills_new",
        }
    }

    /// Human-readable category title
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Level => "BW Level",
            Self::Wins => "Lifetime Wins - All Modes",
            Self::FinalKills => "Lifetime Final Kills - All Modes",
        }
    }
}

impl serde::Serialize for LeaderboardCategory {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> serde::Deserialize<'de> for LeaderboardCategory {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let key = String::deserialize(deserializer)?;
        Self::from_str(&key)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown category: {key}")))
    }
}

/// One rank row: enough of a player's stats to render without re-fetching
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub uuid: String,
    pub username: String,
    pub level: u64,
    pub level_formatted: String,
    pub wins: u64,
    pub final_kills: u64,
    pub final_kills_formatted: String,
}

/// A point-in-time leaderboard, in origin-provided rank order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardSnapshot {
    pub fetched_at: DateTime<Utc>,
    /// True when served from cache; set at read time
    #[serde(default)]
    pub from_cache: bool,
    pub categories: BTreeMap<LeaderboardCategory, Vec<LeaderboardEntry>>,
}

impl LeaderboardSnapshot {
    /// A degraded snapshot with every category present but empty.
    ///
    /// Preview consumers receive this instead of an error.
    pub fn empty() -> Self {
        Self {
            fetched_at: Utc::now(),
            from_cache: false,
            categories: LeaderboardCategory::ALL
                .iter()
                .map(|c| (*c, Vec::new()))
                .collect(),
        }
    }

    /// Copy of this snapshot truncated to `n` entries per category
    pub fn truncated(&self, n: usize) -> Self {
        Self {
            fetched_at: self.fetched_at,
            from_cache: self.from_cache,
            categories: self
                .categories
                .iter()
                .map(|(c, entries)| (*c, entries.iter().take(n).cloned().collect()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn ratio_with_positive_denominator() {
        assert_eq!(ratio(153, 60), 2.55);
        assert_eq!(ratio(10, 5), 2.0);
        assert_eq!(ratio(1, 3), 0.33);
        assert_eq!(ratio(2, 3), 0.67);
    }

    #[test]
    fn ratio_degrades_to_numerator_on_zero_denominator() {
        assert_eq!(ratio(50, 0), 50.0);
        assert_eq!(ratio(0, 0), 0.0);
    }

    #[test]
    fn thousands_formatting() {
        assert_eq!(format_thousands(0), "0");
        assert_eq!(format_thousands(999), "999");
        assert_eq!(format_thousands(1_000), "1,000");
        assert_eq!(format_thousands(12_345), "12,345");
        assert_eq!(format_thousands(1_234_567), "1,234,567");
    }

    #[test]
    fn level_icon_tiers() {
        assert_eq!(level_icon(0), "✫");
        assert_eq!(level_icon(999), "✫");
        assert_eq!(level_icon(1_000), "✪");
        assert_eq!(level_icon(1_999), "✪");
        assert_eq!(level_icon(2_000), "✩");
    }

    #[test]
    fn overall_labels() {
        let overall = Overall::new(1_250, 1_234_567);
        assert_eq!(overall.level_formatted, "1,250 ✪");
        assert_eq!(overall.coins_formatted, "1,234,567");
    }

    #[test]
    fn challenge_catalog_lookup() {
        assert_eq!(challenge_display_name("slow_generator"), Some("Minimum Wage"));
        assert_eq!(challenge_display_name("unheard_of"), None);
    }

    #[test]
    fn empty_snapshot_has_all_categories() {
        let snapshot = LeaderboardSnapshot::empty();
        assert_eq!(snapshot.categories.len(), 3);
        assert!(snapshot.categories.values().all(Vec::is_empty));
    }

    #[test]
    fn category_order_is_level_wins_finals() {
        let snapshot = LeaderboardSnapshot::empty();
        let order: Vec<_> = snapshot.categories.keys().copied().collect();
        assert_eq!(
            order,
            vec![
                LeaderboardCategory::Level,
                LeaderboardCategory::Wins,
                LeaderboardCategory::FinalKills
            ]
        );
    }
}
