use std::time::Duration;

use async_trait::async_trait;

use crate::query::Page;

use super::Result;

/// Key/value store behind the read-through cache.
///
/// Values are opaque bytes so an out-of-process backend can stand in for
/// the in-memory one without touching callers.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Gets a live value by key.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Stores a value. `None` uses the store's default TTL.
    async fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> Result<()>;

    /// Removes one key. Removing an absent key is not an error.
    async fn remove(&self, key: &str) -> Result<()>;

    /// Removes every key matching a `*` glob, returning how many were removed.
    async fn remove_by_pattern(&self, pattern: &str) -> Result<usize>;

    /// Removes every key.
    async fn clear_all(&self) -> Result<()>;

    /// Number of keys currently tracked.
    async fn len(&self) -> Result<usize>;
}

/// Decides whether a computed result is worth storing.
///
/// Absent and empty results are never cached, so a later read retries the
/// source instead of serving "nothing" until the TTL runs out.
pub trait Cacheable {
    fn is_cacheable(&self) -> bool;
}

impl<T> Cacheable for Option<T> {
    fn is_cacheable(&self) -> bool {
        self.is_some()
    }
}

impl<T> Cacheable for Vec<T> {
    fn is_cacheable(&self) -> bool {
        !self.is_empty()
    }
}

impl<T> Cacheable for Page<T> {
    fn is_cacheable(&self) -> bool {
        !self.items.is_empty()
    }
}
