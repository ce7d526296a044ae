//! In-memory cache implementation with LRU eviction.
//!
//! Entries live in an `LruCache` behind a tokio `RwLock`. A separate
//! concurrent key index mirrors the set of live keys so pattern removal
//! can scan keys without holding the store lock for the whole match.
//! Every path that drops an entry from the store (removal, pattern
//! removal, LRU displacement, TTL expiry) also drops it from the index.

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashSet;
use lru::LruCache;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

use inscribe_core::cache::{CacheStore, KeyPattern, Result};

/// A single cache entry with optional expiration.
#[derive(Debug, Clone)]
struct CacheEntry {
    value: Vec<u8>,
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn new(value: Vec<u8>, ttl: Option<Duration>) -> Self {
        let expires_at = ttl.map(|d| Instant::now() + d);
        Self { value, expires_at }
    }

    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|exp| now >= exp)
    }
}

/// In-memory cache store with LRU eviction and TTL.
///
/// Cloning is cheap and yields a handle to the same store.
#[derive(Debug, Clone)]
pub struct MemoryCacheStore {
    store: Arc<RwLock<LruCache<String, CacheEntry>>>,
    index: Arc<DashSet<String>>,
    default_ttl: Option<Duration>,
}

impl MemoryCacheStore {
    /// Creates a new in-memory cache.
    ///
    /// # Arguments
    ///
    /// * `max_entries` - Maximum number of entries before LRU eviction kicks in.
    /// * `default_ttl` - TTL applied when `set` is called without one.
    ///
    /// # Panics
    ///
    /// Panics if `max_entries` is 0.
    pub fn new(max_entries: usize, default_ttl: Option<Duration>) -> Self {
        let capacity = NonZeroUsize::new(max_entries).expect("max_entries must be > 0");
        Self {
            store: Arc::new(RwLock::new(LruCache::new(capacity))),
            index: Arc::new(DashSet::new()),
            default_ttl,
        }
    }

    /// Drops every expired entry, returning how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut store = self.store.write().await;
        let expired: Vec<String> = store
            .iter()
            .filter(|(_, entry)| entry.is_expired(now))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            store.pop(key);
            self.index.remove(key);
        }
        expired.len()
    }

    /// Spawns a task that calls [`MemoryCacheStore::purge_expired`] on a
    /// fixed interval. A zero interval disables the sweeper.
    pub fn spawn_sweeper(&self, interval: Duration) -> Option<JoinHandle<()>> {
        if interval.is_zero() {
            return None;
        }

        let cache = self.clone();
        Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // The first tick completes immediately.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let removed = cache.purge_expired().await;
                if removed > 0 {
                    tracing::trace!(removed, "Swept expired cache entries");
                }
            }
        }))
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut store = self.store.write().await;

        match store.get(key) {
            Some(entry) if entry.is_expired(Instant::now()) => {
                store.pop(key);
                self.index.remove(key);
                Ok(None)
            }
            Some(entry) => Ok(Some(entry.value.clone())),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> Result<()> {
        let entry = CacheEntry::new(value.to_vec(), ttl.or(self.default_ttl));

        let mut store = self.store.write().await;
        if let Some((displaced, _)) = store.push(key.to_string(), entry) {
            if displaced != key {
                self.index.remove(&displaced);
            }
        }
        self.index.insert(key.to_string());

        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let mut store = self.store.write().await;
        store.pop(key);
        self.index.remove(key);
        Ok(())
    }

    async fn remove_by_pattern(&self, pattern: &str) -> Result<usize> {
        let pattern = KeyPattern::compile(pattern)?;

        let matching: Vec<String> = self
            .index
            .iter()
            .filter(|key| pattern.matches(key.key()))
            .map(|key| key.key().clone())
            .collect();

        if matching.is_empty() {
            return Ok(0);
        }

        let mut store = self.store.write().await;
        let mut removed = 0;
        for key in &matching {
            if store.pop(key).is_some() {
                removed += 1;
            }
            self.index.remove(key);
        }

        Ok(removed)
    }

    async fn clear_all(&self) -> Result<()> {
        let mut store = self.store.write().await;
        store.clear();
        self.index.clear();
        Ok(())
    }

    async fn len(&self) -> Result<usize> {
        Ok(self.index.len())
    }
}
