//! Key-value cache clients for the bwstats services
//!
//! This crate provides the shared cache plumbing:
//! - [`KvStore`]: the backend trait (get/set-with-TTL/del, atomic counters)
//! - [`RestKvStore`]: client for an Upstash-style Redis REST backend
//! - [`MemoryKvStore`]: process-local store for tests and cache-less runs
//! - [`StatsCache`]: fail-soft typed JSON wrapper used on the hot path

mod cache;
mod memory;
mod rest;
mod store;

pub mod error;

pub use cache::StatsCache;
pub use error::{Error, Result};
pub use memory::MemoryKvStore;
pub use rest::{RestKvStore, RestKvStoreBuilder};
pub use store::KvStore;
