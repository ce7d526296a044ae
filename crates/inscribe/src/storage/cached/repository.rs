//! Read-through caching decorator for any [`Repository`].

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

use inscribe_core::cache::{
    all_key, by_id_key, entity_pattern, first_key, list_pattern, paged_key, query_key, CacheError,
    CacheStore, Cacheable,
};
use inscribe_core::query::{build_predicate, FilterMap, Page, PageSpec, SortSpec};
use inscribe_core::storage::{Entity, Repository, Result};

use super::health::{CacheHealth, HealthCheck, HealthState};
use crate::cache::{get_or_create, CacheStatus};

/// Cached repository decorator.
///
/// Implements the cache-aside pattern:
/// - **Reads**: derive a key from the call's arguments, serve from the cache
///   or fetch from the repository and populate the cache
/// - **Writes**: persist to the repository, then invalidate affected keys
///
/// Cache faults never reach the caller. The first fault puts the decorator
/// into a degraded state for its cooldown window, during which every read
/// goes straight to the repository. When the window ends the decorator
/// purges every key of its entity type before trusting the cache again.
///
/// # Type Parameters
///
/// * `E` - The entity type served by the repository
/// * `C` - The cache implementation
pub struct CachedRepository<E, C>
where
    E: Entity,
    C: CacheStore + ?Sized,
{
    repository: Arc<dyn Repository<E>>,
    cache: Arc<C>,
    ttl: Duration,
    health: CacheHealth,
}

impl<E, C> CachedRepository<E, C>
where
    E: Entity,
    C: CacheStore + ?Sized,
{
    /// Creates a new cached repository.
    ///
    /// # Arguments
    ///
    /// * `repository` - The underlying repository to cache
    /// * `cache` - The cache implementation
    /// * `ttl` - Time-to-live for cached results
    pub fn new(repository: Arc<dyn Repository<E>>, cache: Arc<C>, ttl: Duration) -> Self {
        Self {
            repository,
            cache,
            ttl,
            health: CacheHealth::default(),
        }
    }

    /// Sets how long the cache is bypassed after a fault.
    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.health = CacheHealth::new(cooldown);
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn health(&self) -> HealthState {
        self.health.state()
    }

    /// Runs a read through the cache, or directly while degraded.
    async fn execute_with_fallback<T, F, Fut>(&self, key: String, fetch: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned + Cacheable + Send,
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = Result<T>> + Send,
    {
        if !self.cache_available().await {
            tracing::trace!(entity = E::NAME, key = %key, "Cache bypassed while degraded");
            return fetch().await;
        }

        let cached = get_or_create(&*self.cache, &key, Some(self.ttl), fetch).await?;
        if let CacheStatus::Unavailable(err) = &cached.status {
            self.mark_degraded("read", err);
        }
        Ok(cached.value)
    }

    /// Returns false while degraded or recovering. The caller that ends the
    /// cooldown purges this entity's keys before anyone reads them again,
    /// since writes during the degraded window may have failed to
    /// invalidate them.
    async fn cache_available(&self) -> bool {
        match self.health.check(Instant::now()) {
            HealthCheck::Healthy => true,
            HealthCheck::Degraded => false,
            HealthCheck::Recovered => {
                match self.cache.remove_by_pattern(&entity_pattern::<E>()).await {
                    Ok(removed) => {
                        let resumed = self.health.recovered();
                        tracing::info!(
                            entity = E::NAME,
                            removed,
                            resumed,
                            "Cache cooldown elapsed, purged stale entries"
                        );
                        resumed
                    }
                    Err(err) => {
                        self.mark_degraded("recover", &err);
                        false
                    }
                }
            }
        }
    }

    fn mark_degraded(&self, operation: &'static str, err: &CacheError) {
        self.health.degrade(Instant::now());
        tracing::warn!(
            entity = E::NAME,
            operation,
            error = %err,
            cooldown_secs = self.health.cooldown().as_secs(),
            "Cache unavailable, bypassing it until the cooldown elapses"
        );
    }

    /// Invalidates every list-shaped result of this entity type.
    async fn invalidate_lists(&self, operation: &'static str) {
        match self.cache.remove_by_pattern(&list_pattern::<E>()).await {
            Ok(removed) => {
                tracing::debug!(entity = E::NAME, operation, removed, "Invalidated cached lists");
            }
            Err(err) => self.mark_degraded(operation, &err),
        }
    }

    /// Invalidates one entity and every list-shaped result of its type.
    ///
    /// When the point removal fails the lists are left alone: the decorator
    /// is degraded by then and recovery purges every key of the type.
    async fn invalidate_entity(&self, operation: &'static str, id: E::Id) {
        if let Err(err) = self.cache.remove(&by_id_key::<E>(id)).await {
            self.mark_degraded(operation, &err);
            return;
        }
        self.invalidate_lists(operation).await;
    }
}

#[async_trait]
impl<E, C> Repository<E> for CachedRepository<E, C>
where
    E: Entity,
    C: CacheStore + ?Sized + 'static,
{
    async fn get_by_id(&self, id: E::Id) -> Result<Option<E>> {
        self.execute_with_fallback(by_id_key::<E>(id), || self.repository.get_by_id(id))
            .await
    }

    async fn get_all(&self) -> Result<Vec<E>> {
        self.execute_with_fallback(all_key::<E>(), || self.repository.get_all())
            .await
    }

    async fn get_all_by(
        &self,
        filter: &FilterMap,
        sort: &SortSpec,
        page: Option<PageSpec>,
    ) -> Result<Vec<E>> {
        let schema = E::schema();
        let predicate = build_predicate(filter, schema);
        let key = query_key(predicate.as_ref(), &sort.resolve(schema), page);

        self.execute_with_fallback(key, || self.repository.get_all_by(filter, sort, page))
            .await
    }

    async fn get_first_or_default(&self, filter: &FilterMap) -> Result<Option<E>> {
        let predicate = build_predicate(filter, E::schema());
        let key = first_key(predicate.as_ref());

        self.execute_with_fallback(key, || self.repository.get_first_or_default(filter))
            .await
    }

    async fn get_all_with_pagination(
        &self,
        filter: &FilterMap,
        sort: &SortSpec,
        page: PageSpec,
    ) -> Result<Page<E>> {
        let schema = E::schema();
        let predicate = build_predicate(filter, schema);
        let key = paged_key(predicate.as_ref(), &sort.resolve(schema), page);

        self.execute_with_fallback(key, || {
            self.repository.get_all_with_pagination(filter, sort, page)
        })
        .await
    }

    async fn add(&self, entity: &E) -> Result<()> {
        // 1. Persist to storage
        let result = self.repository.add(entity).await;

        // 2. Invalidate cached lists, whatever the outcome
        self.invalidate_lists("add").await;

        tracing::debug!(entity = E::NAME, id = %entity.id(), ok = result.is_ok(), "Added");
        result
    }

    async fn add_range(&self, entities: &[E]) -> Result<()> {
        let result = self.repository.add_range(entities).await;
        self.invalidate_lists("add_range").await;

        tracing::debug!(
            entity = E::NAME,
            count = entities.len(),
            ok = result.is_ok(),
            "Added range"
        );
        result
    }

    async fn update(&self, entity: &E) -> Result<()> {
        let result = self.repository.update(entity).await;
        self.invalidate_entity("update", entity.id()).await;

        tracing::debug!(entity = E::NAME, id = %entity.id(), ok = result.is_ok(), "Updated");
        result
    }

    async fn update_partial(&self, entity: &E, changed_fields: &[&str]) -> Result<()> {
        let result = self.repository.update_partial(entity, changed_fields).await;
        self.invalidate_entity("update_partial", entity.id()).await;

        tracing::debug!(
            entity = E::NAME,
            id = %entity.id(),
            fields = ?changed_fields,
            ok = result.is_ok(),
            "Partially updated"
        );
        result
    }

    async fn delete(&self, entity: &E) -> Result<()> {
        let result = self.repository.delete(entity).await;
        self.invalidate_entity("delete", entity.id()).await;

        tracing::debug!(entity = E::NAME, id = %entity.id(), ok = result.is_ok(), "Deleted");
        result
    }
}
