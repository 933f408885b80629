//! In-memory key-value store
//!
//! Process-local [`KvStore`] used in tests and when no REST backend is
//! configured. Expiry uses `tokio::time::Instant`, so tests running under a
//! paused clock can advance time deterministically.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::time::{Duration, Instant};

use crate::store::{KvStore, glob_match};
use crate::{Error, Result};

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }
}

/// In-memory key-value store with TTL support
#[derive(Debug, Default)]
pub struct MemoryKvStore {
    entries: Mutex<HashMap<String, Entry>>,
}

impl MemoryKvStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live (unexpired) entries
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .lock()
            .values()
            .filter(|e| !e.is_expired(now))
            .count()
    }

    /// Whether the store holds no live entries
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop expired entries
    fn purge(&self) {
        let now = Instant::now();
        self.entries.lock().retain(|_, e| !e.is_expired(now));
    }
}

#[async_trait]
impl KvStore for MemoryKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let now = Instant::now();
        let entries = self.entries.lock();
        Ok(entries
            .get(key)
            .filter(|e| !e.is_expired(now))
            .map(|e| e.value.clone()))
    }

    async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> Result<()> {
        let entry = Entry {
            value: value.to_string(),
            expires_at: Some(Instant::now() + Duration::from_secs(ttl_secs)),
        };
        self.entries.lock().insert(key.to_string(), entry);
        Ok(())
    }

    async fn del(&self, key: &str) -> Result<()> {
        self.entries.lock().remove(key);
        Ok(())
    }

    async fn incr(&self, key: &str) -> Result<i64> {
        let now = Instant::now();
        let mut entries = self.entries.lock();

        let current = match entries.get(key).filter(|e| !e.is_expired(now)) {
            Some(entry) => entry
                .value
                .parse::<i64>()
                .map_err(|_| Error::backend(format!("INCR on non-integer key {key}")))?,
            None => 0,
        };
        let next = current + 1;

        // A fresh INCR key has no TTL until EXPIRE is called; an existing
        // key keeps its expiry.
        let expires_at = entries
            .get(key)
            .filter(|e| !e.is_expired(now))
            .and_then(|e| e.expires_at);
        entries.insert(
            key.to_string(),
            Entry {
                value: next.to_string(),
                expires_at,
            },
        );

        Ok(next)
    }

    async fn expire(&self, key: &str, ttl_secs: u64) -> Result<()> {
        let now = Instant::now();
        let mut entries = self.entries.lock();
        if let Some(entry) = entries.get_mut(key) {
            if !entry.is_expired(now) {
                entry.expires_at = Some(now + Duration::from_secs(ttl_secs));
            }
        }
        Ok(())
    }

    async fn keys(&self, pattern: &str) -> Result<Vec<String>> {
        self.purge();
        let entries = self.entries.lock();
        Ok(entries
            .keys()
            .filter(|k| glob_match(pattern, k))
            .cloned()
            .collect())
    }
}
