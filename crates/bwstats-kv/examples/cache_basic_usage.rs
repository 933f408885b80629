//! Basic usage of the fail-soft cache over the in-memory store

use std::sync::Arc;

use bwstats_kv::{MemoryKvStore, StatsCache};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cache = StatsCache::new(Arc::new(MemoryKvStore::new()));

    cache
        .set_json("user:example", &serde_json::json!({ "level": 250 }), 300)
        .await;

    match cache.get_json::<serde_json::Value>("user:example").await {
        Some(value) => println!("cached: {value}"),
        None => println!("miss"),
    }
}
