//! The `KvStore` trait shared by all key-value backends

use async_trait::async_trait;

use crate::Result;

/// Remote key-value store with per-key TTL and atomic counters.
///
/// Everything above this trait relies on the backend's per-key atomicity:
/// `incr` is a single atomic read-modify-write and `set_ex` replaces value
/// and expiry together. No client-side locking is layered on top.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Get the value for a key, or `None` if absent or expired
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Set a key with a TTL in seconds
    async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> Result<()>;

    /// Delete a key (deleting an absent key is not an error)
    async fn del(&self, key: &str) -> Result<()>;

    /// Atomically increment an integer key, creating it at 1 if absent
    async fn incr(&self, key: &str) -> Result<i64>;

    /// Set the TTL of an existing key in seconds
    async fn expire(&self, key: &str, ttl_secs: u64) -> Result<()>;

    /// List keys matching a glob pattern (`*` wildcard).
    ///
    /// Administrative enumeration only; never called on the hot path.
    async fn keys(&self, pattern: &str) -> Result<Vec<String>>;
}

/// Match a key against a glob pattern where `*` matches any run of
/// characters. This is the only wildcard the stores support.
pub(crate) fn glob_match(pattern: &str, key: &str) -> bool {
    fn inner(pat: &[u8], text: &[u8]) -> bool {
        match pat.first() {
            None => text.is_empty(),
            Some(b'*') => {
                (0..=text.len()).any(|skip| inner(&pat[1..], &text[skip..]))
            }
            Some(c) => text.first() == Some(c) && inner(&pat[1..], &text[1..]),
        }
    }
    inner(pattern.as_bytes(), key.as_bytes())
}
