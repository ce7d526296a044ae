//! Read-through access to a [`CacheStore`].

use std::future::Future;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;

use inscribe_core::cache::{deserialize_value, serialize_value, CacheError, CacheStore, Cacheable};

/// How a value returned by [`get_or_create`] was obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheStatus {
    /// Served from the store; the factory was not called.
    Hit,
    /// Computed by the factory (and stored if cacheable).
    Miss,
    /// The store failed; the value was computed and not cached.
    Unavailable(CacheError),
}

/// A value together with the way it was obtained.
#[derive(Debug, Clone, PartialEq)]
pub struct Cached<T> {
    pub value: T,
    pub status: CacheStatus,
}

impl<T> Cached<T> {
    fn new(value: T, status: CacheStatus) -> Self {
        Self { value, status }
    }
}

/// Returns the cached value for `key`, or computes it with `factory`.
///
/// Store faults on the get or set path are logged and reported through
/// [`CacheStatus::Unavailable`]; the caller still receives the computed
/// value. Errors from `factory` propagate unchanged. Results for which
/// [`Cacheable::is_cacheable`] is false are returned but never stored. A
/// payload that no longer deserializes is treated as a miss and replaced.
pub async fn get_or_create<C, T, E, F, Fut>(
    store: &C,
    key: &str,
    ttl: Option<Duration>,
    factory: F,
) -> Result<Cached<T>, E>
where
    C: CacheStore + ?Sized,
    T: Serialize + DeserializeOwned + Cacheable,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    match store.get(key).await {
        Ok(Some(bytes)) => match deserialize_value::<T>(&bytes) {
            Ok(value) => {
                tracing::trace!(key, "Cache hit");
                return Ok(Cached::new(value, CacheStatus::Hit));
            }
            Err(err) => {
                tracing::warn!(key, error = %err, "Cached payload is unreadable, recomputing");
            }
        },
        Ok(None) => tracing::trace!(key, "Cache miss"),
        Err(err) => {
            tracing::warn!(key, error = %err, "Cache read failed, serving uncached");
            let value = factory().await?;
            return Ok(Cached::new(value, CacheStatus::Unavailable(err)));
        }
    }

    let value = factory().await?;
    if !value.is_cacheable() {
        return Ok(Cached::new(value, CacheStatus::Miss));
    }

    let bytes = match serialize_value(&value) {
        Ok(bytes) => bytes,
        Err(err) => {
            tracing::warn!(key, error = %err, "Failed to serialize value for caching");
            return Ok(Cached::new(value, CacheStatus::Miss));
        }
    };

    if let Err(err) = store.set(key, &bytes, ttl).await {
        tracing::warn!(key, error = %err, "Cache write failed");
        return Ok(Cached::new(value, CacheStatus::Unavailable(err)));
    }

    Ok(Cached::new(value, CacheStatus::Miss))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use async_trait::async_trait;
    use tokio::sync::RwLock;

    use inscribe_core::cache::{pattern_matches, Result as CacheResult};

    use crate::cache::MemoryCacheStore;

    /// Cache whose reads and writes can be made to fail independently.
    #[derive(Default)]
    struct MockCache {
        store: RwLock<HashMap<String, Vec<u8>>>,
        fail_get: AtomicBool,
        fail_set: AtomicBool,
    }

    #[async_trait]
    impl CacheStore for MockCache {
        async fn get(&self, key: &str) -> CacheResult<Option<Vec<u8>>> {
            if self.fail_get.load(Ordering::SeqCst) {
                return Err(CacheError::ConnectionFailed("refused".into()));
            }
            Ok(self.store.read().await.get(key).cloned())
        }

        async fn set(&self, key: &str, value: &[u8], _ttl: Option<Duration>) -> CacheResult<()> {
            if self.fail_set.load(Ordering::SeqCst) {
                return Err(CacheError::OperationFailed("out of memory".into()));
            }
            self.store
                .write()
                .await
                .insert(key.to_string(), value.to_vec());
            Ok(())
        }

        async fn remove(&self, key: &str) -> CacheResult<()> {
            self.store.write().await.remove(key);
            Ok(())
        }

        async fn remove_by_pattern(&self, pattern: &str) -> CacheResult<usize> {
            let mut store = self.store.write().await;
            let before = store.len();
            store.retain(|k, _| !pattern_matches(pattern, k));
            Ok(before - store.len())
        }

        async fn clear_all(&self) -> CacheResult<()> {
            self.store.write().await.clear();
            Ok(())
        }

        async fn len(&self) -> CacheResult<usize> {
            Ok(self.store.read().await.len())
        }
    }

    #[derive(Debug, PartialEq)]
    struct SourceDown;

    async fn counted<T>(calls: &AtomicUsize, value: T) -> Result<T, SourceDown> {
        calls.fetch_add(1, Ordering::SeqCst);
        Ok(value)
    }

    #[tokio::test]
    async fn test_second_call_within_ttl_is_a_hit() {
        let cache = MockCache::default();
        let calls = AtomicUsize::new(0);

        let first = get_or_create(&cache, "k", None, || counted(&calls, vec![1, 2]))
            .await
            .unwrap();
        let second = get_or_create(&cache, "k", None, || counted(&calls, vec![9]))
            .await
            .unwrap();

        assert_eq!(first.status, CacheStatus::Miss);
        assert_eq!(second.status, CacheStatus::Hit);
        assert_eq!(second.value, vec![1, 2]);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_recomputes_after_ttl() {
        let cache = MemoryCacheStore::new(100, None);
        let calls = AtomicUsize::new(0);
        let ttl = Some(Duration::from_millis(40));

        get_or_create(&cache, "k", ttl, || counted(&calls, Some(1)))
            .await
            .unwrap();
        get_or_create(&cache, "k", ttl, || counted(&calls, Some(1)))
            .await
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        tokio::time::sleep(Duration::from_millis(80)).await;

        let third = get_or_create(&cache, "k", ttl, || counted(&calls, Some(1)))
            .await
            .unwrap();
        assert_eq!(third.status, CacheStatus::Miss);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_absent_and_empty_results_are_not_stored() {
        let cache = MockCache::default();
        let calls = AtomicUsize::new(0);

        get_or_create(&cache, "none", None, || counted(&calls, None::<i32>))
            .await
            .unwrap();
        get_or_create(&cache, "empty", None, || counted(&calls, Vec::<i32>::new()))
            .await
            .unwrap();
        assert_eq!(cache.len().await.unwrap(), 0);

        // The next read tries the source again and caches a real value.
        let found = get_or_create(&cache, "none", None, || counted(&calls, Some(5)))
            .await
            .unwrap();
        assert_eq!(found.value, Some(5));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(cache.len().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_read_fault_serves_uncached() {
        let cache = MockCache::default();
        cache.fail_get.store(true, Ordering::SeqCst);
        let calls = AtomicUsize::new(0);

        let result = get_or_create(&cache, "k", None, || counted(&calls, vec![1]))
            .await
            .unwrap();

        assert_eq!(result.value, vec![1]);
        assert!(matches!(
            result.status,
            CacheStatus::Unavailable(CacheError::ConnectionFailed(_))
        ));
        assert_eq!(cache.store.read().await.len(), 0);
    }

    #[tokio::test]
    async fn test_write_fault_still_returns_value() {
        let cache = MockCache::default();
        cache.fail_set.store(true, Ordering::SeqCst);
        let calls = AtomicUsize::new(0);

        let result = get_or_create(&cache, "k", None, || counted(&calls, vec![1]))
            .await
            .unwrap();

        assert_eq!(result.value, vec![1]);
        assert!(matches!(
            result.status,
            CacheStatus::Unavailable(CacheError::OperationFailed(_))
        ));
    }

    #[tokio::test]
    async fn test_factory_error_propagates() {
        let cache = MockCache::default();

        let result = get_or_create(&cache, "k", None, || async {
            Err::<Vec<i32>, _>(SourceDown)
        })
        .await;

        assert_eq!(result, Err(SourceDown));
        assert_eq!(cache.len().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_unreadable_payload_is_replaced() {
        let cache = MockCache::default();
        cache.set("k", b"not json", None).await.unwrap();
        let calls = AtomicUsize::new(0);

        let result = get_or_create(&cache, "k", None, || counted(&calls, vec![3]))
            .await
            .unwrap();

        assert_eq!(result.status, CacheStatus::Miss);
        assert_eq!(cache.get("k").await.unwrap(), Some(b"[3]".to_vec()));
    }
}
