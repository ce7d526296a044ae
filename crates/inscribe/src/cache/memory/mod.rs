//! In-memory cache backend.
//!
//! Provides a thread-safe LRU cache with per-entry TTL for single-instance
//! deployments.

mod store;

pub use store::MemoryCacheStore;
