//! Per-entity-type cache policy.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use inscribe_core::cache::CacheStore;
use inscribe_core::storage::{Entity, Repository};

use super::health::DEFAULT_COOLDOWN;
use super::repository::CachedRepository;
use crate::models::{Career, DocumentType, InscriptionStatus};

/// Which entity types are cached, and for how long.
///
/// Only read-heavy, low-churn lookup data belongs here. Transactional
/// entities churn too much for their cached lists to survive.
#[derive(Debug, Clone, Default)]
pub struct CachePolicy {
    ttls: HashMap<&'static str, Duration>,
}

impl CachePolicy {
    /// An empty policy: nothing is cached.
    pub fn new() -> Self {
        Self::default()
    }

    /// Caches `E` with the given TTL.
    pub fn with<E: Entity>(mut self, ttl: Duration) -> Self {
        self.ttls.insert(E::NAME, ttl);
        self
    }

    /// The reference-data table used by the application.
    pub fn reference_data() -> Self {
        Self::new()
            .with::<InscriptionStatus>(Duration::from_secs(60 * 60))
            .with::<DocumentType>(Duration::from_secs(60 * 60))
            .with::<Career>(Duration::from_secs(30 * 60))
    }

    pub fn ttl_for(&self, entity: &str) -> Option<Duration> {
        self.ttls.get(entity).copied()
    }

    /// Policy entries sorted by entity name.
    pub fn entries(&self) -> Vec<(&'static str, Duration)> {
        let mut entries: Vec<_> = self.ttls.iter().map(|(k, v)| (*k, *v)).collect();
        entries.sort_by_key(|(name, _)| *name);
        entries
    }
}

/// Decorates repositories according to a [`CachePolicy`].
pub struct RepositoryCacheFactory<C: CacheStore + ?Sized + 'static> {
    cache: Arc<C>,
    policy: CachePolicy,
    cooldown: Duration,
}

impl<C: CacheStore + ?Sized + 'static> RepositoryCacheFactory<C> {
    pub fn new(cache: Arc<C>, policy: CachePolicy) -> Self {
        Self {
            cache,
            policy,
            cooldown: DEFAULT_COOLDOWN,
        }
    }

    /// Sets the cooldown handed to every decorated repository.
    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }

    pub fn policy(&self) -> &CachePolicy {
        &self.policy
    }

    /// Wraps `raw` in a [`CachedRepository`] when `E` is in the policy,
    /// otherwise returns `raw` itself.
    pub fn get_repository<E: Entity>(
        &self,
        raw: Arc<dyn Repository<E>>,
    ) -> Arc<dyn Repository<E>> {
        match self.policy.ttl_for(E::NAME) {
            Some(ttl) => {
                tracing::debug!(entity = E::NAME, ttl_secs = ttl.as_secs(), "Caching repository");
                Arc::new(
                    CachedRepository::new(raw, Arc::clone(&self.cache), ttl)
                        .with_cooldown(self.cooldown),
                )
            }
            None => {
                tracing::debug!(entity = E::NAME, "Repository not cached");
                raw
            }
        }
    }
}
