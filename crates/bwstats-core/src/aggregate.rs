//! Raw payload to [`PlayerStats`] transformation
//!
//! Pure: no I/O, no clock reads (the fetch timestamp is passed in), so the
//! same payload always aggregates to the same document.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::mode::ModeKey;
use crate::model::{ModeStats, Overall, PlayerIdentity, PlayerStats, ratio};
use crate::origin::PlayerPayload;
use crate::{Error, Result};

/// Raw field suffix for each counter, appended to the mode prefix
mod suffix {
    pub const GAMES_PLAYED: &str = "games_played_bedwars";
    pub const KILLS: &str = "kills_bedwars";
    pub const DEATHS: &str = "deaths_bedwars";
    pub const FINAL_KILLS: &str = "final_kills_bedwars";
    pub const FINAL_DEATHS: &str = "final_deaths_bedwars";
    pub const WINS: &str = "wins_bedwars";
    pub const LOSSES: &str = "losses_bedwars";
    pub const WINSTREAK: &str = "winstreak";
    pub const ITEMS_PURCHASED: &str = "_items_purchased_bedwars";
    pub const BEDS_BROKEN: &str = "beds_broken_bedwars";
    pub const BEDS_LOST: &str = "beds_lost_bedwars";
    pub const IRON: &str = "iron_resources_collected_bedwars";
    pub const GOLD: &str = "gold_resources_collected_bedwars";
    pub const DIAMONDS: &str = "diamond_resources_collected_bedwars";
    pub const EMERALDS: &str = "emerald_resources_collected_bedwars";
    pub const RESOURCES: &str = "resources_collected_bedwars";
}

/// Achievement key carrying the Bedwars level
const LEVEL_KEY: &str = "bedwars_level";

/// Stats key carrying the coin balance
const COINS_KEY: &str = "coins";

/// Raw key prefix marking a completed-challenge flag
const CHALLENGE_PREFIX: &str = "bw_challenge_";

/// Aggregate a validated origin payload into a [`PlayerStats`] document.
///
/// Fails with [`Error::PlayerNotFound`] when the payload has no player
/// record and [`Error::NoGameHistory`] when the player has no Bedwars
/// stats or achievement block. Missing or non-numeric counters read as 0.
pub fn aggregate(
    payload: &PlayerPayload,
    identity: &PlayerIdentity,
    fetched_at: DateTime<Utc>,
) -> Result<PlayerStats> {
    let player = payload.player.as_ref().ok_or(Error::PlayerNotFound)?;

    let bedwars = player
        .stats
        .as_ref()
        .and_then(|s| s.bedwars.as_ref())
        .ok_or(Error::NoGameHistory)?;
    let achievements = player.achievements.as_ref().ok_or(Error::NoGameHistory)?;

    let mut modes = BTreeMap::new();
    for mode in ModeKey::ALL {
        modes.insert(*mode, mode_stats(bedwars, mode.field_prefix()));
    }

    let level = num(achievements.get(LEVEL_KEY));
    let coins = num(bedwars.get(COINS_KEY));

    let challenges: BTreeSet<String> = bedwars
        .iter()
        .filter(|(k, v)| k.starts_with(CHALLENGE_PREFIX) && is_truthy(v))
        .map(|(k, _)| k[CHALLENGE_PREFIX.len()..].to_string())
        .collect();

    // The origin's display name wins over the resolver's when present;
    // leaderboard lookups arrive with only a stable id.
    let identity = PlayerIdentity {
        uuid: identity.uuid.clone(),
        username: player
            .displayname
            .clone()
            .unwrap_or_else(|| identity.username.clone()),
    };

    Ok(PlayerStats {
        identity,
        fetched_at,
        from_cache: false,
        overall: Overall::new(level, coins),
        modes,
        challenges,
    })
}

/// Read and derive one mode's stats from the raw Bedwars block
fn mode_stats(raw: &Map<String, Value>, prefix: &str) -> ModeStats {
    let counter = |suffix: &str| num(raw.get(&format!("{prefix}{suffix}")));

    let kills = counter(suffix::KILLS);
    let deaths = counter(suffix::DEATHS);
    let final_kills = counter(suffix::FINAL_KILLS);
    let final_deaths = counter(suffix::FINAL_DEATHS);
    let wins = counter(suffix::WINS);
    let losses = counter(suffix::LOSSES);
    let beds_broken = counter(suffix::BEDS_BROKEN);
    let beds_lost = counter(suffix::BEDS_LOST);
    let iron_collected = counter(suffix::IRON);
    let gold_collected = counter(suffix::GOLD);
    let diamonds_collected = counter(suffix::DIAMONDS);
    let emeralds_collected = counter(suffix::EMERALDS);

    ModeStats {
        games_played: counter(suffix::GAMES_PLAYED),
        kills,
        deaths,
        final_kills,
        final_deaths,
        wins,
        losses,
        winstreak: counter(suffix::WINSTREAK),
        items_purchased: counter(suffix::ITEMS_PURCHASED),
        beds_broken,
        beds_lost,
        iron_collected,
        gold_collected,
        diamonds_collected,
        emeralds_collected,
        resources_collected: counter(suffix::RESOURCES),
        kdr: ratio(kills, deaths),
        fkdr: ratio(final_kills, final_deaths),
        wlr: ratio(wins, losses),
        bblr: ratio(beds_broken, beds_lost),
        resources_collected_check: iron_collected
            + gold_collected
            + diamonds_collected
            + emeralds_collected,
    }
}

/// Coerce a raw value to a non-negative integer; numeric strings are
/// accepted, anything else reads as 0
fn num(value: Option<&Value>) -> u64 {
    match value {
        Some(Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().map(|f| f.max(0.0) as u64))
            .unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse::<f64>().map(|f| f.max(0.0) as u64).unwrap_or(0),
        _ => 0,
    }
}

/// JS-style truthiness for challenge flags
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
        Value::Null => false,
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn identity() -> PlayerIdentity {
        PlayerIdentity {
            uuid: "abc123".to_string(),
            username: "Techno".to_string(),
        }
    }

    fn fetched_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    fn payload(value: serde_json::Value) -> PlayerPayload {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn aggregates_levels_coins_and_ratios() {
        let payload = payload(json!({
            "player": {
                "achievements": { "bedwars_level": "250" },
                "stats": {
                    "Bedwars": {
                        "coins": 12345,
                        "wins_bedwars": 10,
                        "losses_bedwars": 5,
                        "kills_bedwars": 0,
                        "deaths_bedwars": 0
                    }
                }
            }
        }));

        let stats = aggregate(&payload, &identity(), fetched_at()).unwrap();

        assert_eq!(stats.identity, identity());
        assert_eq!(stats.overall.level, 250);
        assert_eq!(stats.overall.level_formatted, "250 ✫");
        assert_eq!(stats.overall.coins, 12345);
        assert_eq!(stats.overall.coins_formatted, "12,345");

        let total = stats.total();
        assert_eq!(total.wlr, 2.00);
        assert_eq!(total.kdr, 0.00);
        assert!(!stats.from_cache);
    }

    #[test]
    fn origin_display_name_wins_over_resolver_name() {
        let payload = payload(json!({
            "player": {
                "displayname": "Technoblade",
                "achievements": { "bedwars_level": 1 },
                "stats": { "Bedwars": {} }
            }
        }));

        let stats = aggregate(&payload, &identity(), fetched_at()).unwrap();
        assert_eq!(stats.identity.username, "Technoblade");
        assert_eq!(stats.identity.uuid, "abc123");
    }

    #[test]
    fn missing_player_is_not_found() {
        let payload = payload(json!({ "player": null }));
        assert!(matches!(
            aggregate(&payload, &identity(), fetched_at()),
            Err(Error::PlayerNotFound)
        ));
    }

    #[test]
    fn missing_bedwars_block_is_no_history() {
        let payload = payload(json!({
            "player": {
                "achievements": { "bedwars_level": 12 },
                "stats": {}
            }
        }));
        assert!(matches!(
            aggregate(&payload, &identity(), fetched_at()),
            Err(Error::NoGameHistory)
        ));
    }

    #[test]
    fn missing_achievements_block_is_no_history() {
        let payload = payload(json!({
            "player": {
                "stats": { "Bedwars": { "coins": 1 } }
            }
        }));
        assert!(matches!(
            aggregate(&payload, &identity(), fetched_at()),
            Err(Error::NoGameHistory)
        ));
    }

    #[test]
    fn mode_prefixes_route_counters() {
        let payload = payload(json!({
            "player": {
                "achievements": { "bedwars_level": 1 },
                "stats": {
                    "Bedwars": {
                        "kills_bedwars": 100,
                        "eight_one_kills_bedwars": 40,
                        "eight_one_deaths_bedwars": 16,
                        "eight_two_winstreak": 7
                    }
                }
            }
        }));

        let stats = aggregate(&payload, &identity(), fetched_at()).unwrap();

        assert_eq!(stats.total().kills, 100);
        let solo = &stats.modes[&ModeKey::EightOne];
        assert_eq!(solo.kills, 40);
        assert_eq!(solo.deaths, 16);
        assert_eq!(solo.kdr, 2.5);
        assert_eq!(stats.modes[&ModeKey::EightTwo].winstreak, 7);

        // Every mode is present even when the payload never mentions it.
        assert_eq!(stats.modes.len(), ModeKey::ALL.len());
        assert_eq!(stats.modes[&ModeKey::Castle], ModeStats::default());
    }

    #[test]
    fn resource_cross_check_sums_the_four_types() {
        let payload = payload(json!({
            "player": {
                "achievements": { "bedwars_level": 1 },
                "stats": {
                    "Bedwars": {
                        "iron_resources_collected_bedwars": 10,
                        "gold_resources_collected_bedwars": 5,
                        "diamond_resources_collected_bedwars": 3,
                        "emerald_resources_collected_bedwars": 2,
                        "resources_collected_bedwars": 99
                    }
                }
            }
        }));

        let total = aggregate(&payload, &identity(), fetched_at())
            .unwrap()
            .total()
            .clone();
        assert_eq!(total.resources_collected, 99);
        assert_eq!(total.resources_collected_check, 20);
    }

    #[test]
    fn challenges_collect_truthy_flags_only() {
        let payload = payload(json!({
            "player": {
                "achievements": { "bedwars_level": 1 },
                "stats": {
                    "Bedwars": {
                        "bw_challenge_selfish": true,
                        "bw_challenge_assassin": 1,
                        "bw_challenge_collector": 0,
                        "bw_challenge_no_utilities": false,
                        "bw_unrelated_key": true
                    }
                }
            }
        }));

        let stats = aggregate(&payload, &identity(), fetched_at()).unwrap();
        let challenges: Vec<_> = stats.challenges.iter().cloned().collect();
        assert_eq!(challenges, vec!["assassin".to_string(), "selfish".to_string()]);
    }

    #[test]
    fn aggregation_is_idempotent() {
        let payload = payload(json!({
            "player": {
                "achievements": { "bedwars_level": 321 },
                "stats": {
                    "Bedwars": {
                        "coins": 777,
                        "kills_bedwars": 153,
                        "deaths_bedwars": 60
                    }
                }
            }
        }));

        let first = aggregate(&payload, &identity(), fetched_at()).unwrap();
        let second = aggregate(&payload, &identity(), fetched_at()).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.total().kdr, 2.55);
    }

    #[test]
    fn non_numeric_counters_read_as_zero() {
        let payload = payload(json!({
            "player": {
                "achievements": { "bedwars_level": "not a number" },
                "stats": {
                    "Bedwars": {
                        "kills_bedwars": "53",
                        "deaths_bedwars": { "nested": true }
                    }
                }
            }
        }));

        let stats = aggregate(&payload, &identity(), fetched_at()).unwrap();
        assert_eq!(stats.overall.level, 0);
        assert_eq!(stats.total().kills, 53);
        assert_eq!(stats.total().deaths, 0);
        // Zero denominator: the ratio degrades to the numerator.
        assert_eq!(stats.total().kdr, 53.0);
    }
}
