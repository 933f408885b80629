//! Test doubles shared by the unit tests

use async_trait::async_trait;
use bwstats_kv::{Error, KvStore, Result};

/// A store whose every operation fails, for fail-open tests
pub(crate) struct FailingStore;

#[async_trait]
impl KvStore for FailingStore {
    async fn get(&self, _key: &str) -> Result<Option<String>> {
        Err(Error::backend("store offline"))
    }

    async fn set_ex(&self, _key: &str, _value: &str, _ttl_secs: u64) -> Result<()> {
        Err(Error::backend("store offline"))
    }

    async fn del(&self, _key: &str) -> Result<()> {
        Err(Error::backend("store offline"))
    }

    async fn incr(&self, _key: &str) -> Result<i64> {
        Err(Error::backend("store offline"))
    }

    async fn expire(&self, _key: &str, _ttl_secs: u64) -> Result<()> {
        Err(Error::backend("store offline"))
    }

    async fn keys(&self, _pattern: &str) -> Result<Vec<String>> {
        Err(Error::backend("store offline"))
    }
}
