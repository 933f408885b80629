//! Fail-soft typed cache wrapper
//!
//! [`StatsCache`] is the boundary the services talk to. Every backend or
//! decode failure is logged and absorbed: a read error is a miss, a write
//! error is a no-op. A cache outage must never surface to a caller.

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::store::KvStore;

/// Typed JSON cache over a shared [`KvStore`]
#[derive(Clone)]
pub struct StatsCache {
    store: Arc<dyn KvStore>,
}

impl StatsCache {
    /// Wrap a shared store
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    /// The underlying store (for components that need raw commands)
    pub fn store(&self) -> Arc<dyn KvStore> {
        Arc::clone(&self.store)
    }

    /// Get and decode a cached value, treating any failure as a miss
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.store.get(key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!("cache miss {key}");
                return None;
            }
            Err(e) => {
                warn!("cache read failed for {key}: {e}");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => {
                debug!("cache hit {key}");
                Some(value)
            }
            Err(e) => {
                // A corrupt entry behaves like a miss; the next write
                // replaces it.
                warn!("cache entry {key} failed to decode: {e}");
                None
            }
        }
    }

    /// Encode and store a value with a TTL; best-effort
    pub async fn set_json<T: Serialize>(&self, key: &str, value: &T, ttl_secs: u64) -> bool {
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("cache encode failed for {key}: {e}");
                return false;
            }
        };

        match self.store.set_ex(key, &raw, ttl_secs).await {
            Ok(()) => {
                debug!("cache set {key} ttl={ttl_secs}s");
                true
            }
            Err(e) => {
                warn!("cache write failed for {key}: {e}");
                false
            }
        }
    }

    /// Delete a key; best-effort
    pub async fn del(&self, key: &str) -> bool {
        match self.store.del(key).await {
            Ok(()) => true,
            Err(e) => {
                warn!("cache delete failed for {key}: {e}");
                false
            }
        }
    }
}
