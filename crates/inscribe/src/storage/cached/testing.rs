//! Test doubles shared by the cached storage tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;

use inscribe_core::cache::{pattern_matches, CacheError, CacheStore, Result as CacheResult};
use inscribe_core::query::{FilterMap, Page, PageSpec, SortSpec};
use inscribe_core::storage::{Entity, Repository, RepositoryError, Result};

use crate::storage::inmemory::InMemoryRepository;

/// Cache that records calls and can be switched into a failing mode.
#[derive(Default)]
pub struct MockCache {
    pub store: RwLock<HashMap<String, Vec<u8>>>,
    pub failing: AtomicBool,
    pub gets: AtomicUsize,
    /// Every `remove_by_pattern` call, failed ones included.
    pub pattern_calls: AtomicUsize,
    pub patterns: RwLock<Vec<String>>,
    purge_delay_ms: AtomicU64,
}

impl MockCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn gets(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    pub fn pattern_calls(&self) -> usize {
        self.pattern_calls.load(Ordering::SeqCst)
    }

    /// Makes `remove_by_pattern` stall before removing anything.
    pub fn slow_purge(&self, delay: Duration) {
        self.purge_delay_ms
            .store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    pub async fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.store.read().await.keys().cloned().collect();
        keys.sort();
        keys
    }

    fn check(&self) -> CacheResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            Err(CacheError::ConnectionFailed("connection reset".into()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl CacheStore for MockCache {
    async fn get(&self, key: &str) -> CacheResult<Option<Vec<u8>>> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        Ok(self.store.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &[u8], _ttl: Option<Duration>) -> CacheResult<()> {
        self.check()?;
        self.store
            .write()
            .await
            .insert(key.to_string(), value.to_vec());
        Ok(())
    }

    async fn remove(&self, key: &str) -> CacheResult<()> {
        self.check()?;
        self.store.write().await.remove(key);
        Ok(())
    }

    async fn remove_by_pattern(&self, pattern: &str) -> CacheResult<usize> {
        self.pattern_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        let delay = self.purge_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
        self.patterns.write().await.push(pattern.to_string());
        let mut store = self.store.write().await;
        let before = store.len();
        store.retain(|k, _| !pattern_matches(pattern, k));
        Ok(before - store.len())
    }

    async fn clear_all(&self) -> CacheResult<()> {
        self.check()?;
        self.store.write().await.clear();
        Ok(())
    }

    async fn len(&self) -> CacheResult<usize> {
        self.check()?;
        Ok(self.store.read().await.len())
    }
}

/// Repository that counts reads and can be made to fail or stall.
pub struct CountingRepository<E: Entity> {
    pub inner: InMemoryRepository<E>,
    pub reads: AtomicUsize,
    pub failing: AtomicBool,
    pub delay: Option<Duration>,
}

impl<E: Entity> CountingRepository<E> {
    pub async fn with(records: Vec<E>) -> Self {
        let inner = InMemoryRepository::new();
        inner.seed(records).await;
        Self {
            inner,
            reads: AtomicUsize::new(0),
            failing: AtomicBool::new(false),
            delay: None,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    async fn read(&self) -> Result<()> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(RepositoryError::ConnectionFailed("database offline".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl<E: Entity> Repository<E> for CountingRepository<E> {
    async fn get_by_id(&self, id: E::Id) -> Result<Option<E>> {
        self.read().await?;
        self.inner.get_by_id(id).await
    }

    async fn get_all(&self) -> Result<Vec<E>> {
        self.read().await?;
        self.inner.get_all().await
    }

    async fn get_all_by(
        &self,
        filter: &FilterMap,
        sort: &SortSpec,
        page: Option<PageSpec>,
    ) -> Result<Vec<E>> {
        self.read().await?;
        self.inner.get_all_by(filter, sort, page).await
    }

    async fn get_first_or_default(&self, filter: &FilterMap) -> Result<Option<E>> {
        self.read().await?;
        self.inner.get_first_or_default(filter).await
    }

    async fn get_all_with_pagination(
        &self,
        filter: &FilterMap,
        sort: &SortSpec,
        page: PageSpec,
    ) -> Result<Page<E>> {
        self.read().await?;
        self.inner.get_all_with_pagination(filter, sort, page).await
    }

    async fn add(&self, entity: &E) -> Result<()> {
        self.inner.add(entity).await
    }

    async fn add_range(&self, entities: &[E]) -> Result<()> {
        self.inner.add_range(entities).await
    }

    async fn update(&self, entity: &E) -> Result<()> {
        self.inner.update(entity).await
    }

    async fn update_partial(&self, entity: &E, changed_fields: &[&str]) -> Result<()> {
        self.inner.update_partial(entity, changed_fields).await
    }

    async fn delete(&self, entity: &E) -> Result<()> {
        self.inner.delete(entity).await
    }
}
