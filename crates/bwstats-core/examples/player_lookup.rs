//! Look up a player's aggregated Bedwars stats from the command line
//!
//! ```bash
//! HYPIXEL_API_KEY=... cargo run --example player_lookup -- Technoblade
//! ```

use std::sync::Arc;

use bwstats_core::{
    HttpIdentityResolver, MemoryArchive, ModeKey, OriginClient, PlayerStatsService,
};
use bwstats_kv::{MemoryKvStore, StatsCache};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let username = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "Technoblade".to_string());
    let api_key = std::env::var("HYPIXEL_API_KEY")?;

    let service = PlayerStatsService::new(
        Arc::new(HttpIdentityResolver::new()?),
        OriginClient::new(api_key)?,
        StatsCache::new(Arc::new(MemoryKvStore::new())),
        Arc::new(MemoryArchive::new()),
    );

    let stats = service.get_stats(&username).await?;
    let total = stats.total();

    println!("{} [{}]", stats.identity.username, stats.overall.level_formatted);
    println!("  coins:  {}", stats.overall.coins_formatted);
    println!("  wins:   {} (wlr {:.2})", total.wins, total.wlr);
    println!("  finals: {} (fkdr {:.2})", total.final_kills, total.fkdr);
    println!("  beds:   {} (bblr {:.2})", total.beds_broken, total.bblr);

    if let Some(solo) = stats.modes.get(&ModeKey::EightOne) {
        println!("  solo:   {} wins, {} finals", solo.wins, solo.final_kills);
    }
    if !stats.challenges.is_empty() {
        println!("  challenges: {}", stats.challenges.len());
    }

    Ok(())
}
