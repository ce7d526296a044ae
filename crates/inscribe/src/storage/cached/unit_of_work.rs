//! Unit of work that hands out cache-aware repositories.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;

use inscribe_core::cache::CacheStore;
use inscribe_core::storage::{Entity, Repository, Result, UnitOfWork};

use super::factory::RepositoryCacheFactory;

/// Wraps a unit of work so that every repository it returns has already
/// been through the [`RepositoryCacheFactory`].
///
/// Decorated repositories are memoized per entity type, so each type keeps
/// one health state for the lifetime of the unit of work. `commit` is
/// passed through untouched.
pub struct CachingUnitOfWork<U, C>
where
    U: UnitOfWork,
    C: CacheStore + ?Sized + 'static,
{
    inner: U,
    factory: RepositoryCacheFactory<C>,
    repositories: Mutex<HashMap<TypeId, Arc<dyn Any + Send + Sync>>>,
}

impl<U, C> CachingUnitOfWork<U, C>
where
    U: UnitOfWork,
    C: CacheStore + ?Sized + 'static,
{
    pub fn new(inner: U, factory: RepositoryCacheFactory<C>) -> Self {
        Self {
            inner,
            factory,
            repositories: Mutex::new(HashMap::new()),
        }
    }

    /// The wrapped unit of work.
    pub fn inner(&self) -> &U {
        &self.inner
    }

    pub fn factory(&self) -> &RepositoryCacheFactory<C> {
        &self.factory
    }
}

#[async_trait]
impl<U, C> UnitOfWork for CachingUnitOfWork<U, C>
where
    U: UnitOfWork,
    C: CacheStore + ?Sized + 'static,
{
    fn repository<E: Entity>(&self) -> Arc<dyn Repository<E>> {
        let mut repositories = self
            .repositories
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let existing = repositories
            .get(&TypeId::of::<E>())
            .and_then(|repo| repo.downcast_ref::<Arc<dyn Repository<E>>>())
            .cloned();
        if let Some(repo) = existing {
            return repo;
        }

        let repo = self.factory.get_repository(self.inner.repository::<E>());
        repositories.insert(TypeId::of::<E>(), Arc::new(Arc::clone(&repo)));
        repo
    }

    async fn commit(&self) -> Result<usize> {
        self.inner.commit().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    use inscribe_core::query::{FilterMap, SortSpec};

    use crate::models::{Career, Inscription, InscriptionStatus};
    use crate::storage::cached::testing::MockCache;
    use crate::storage::cached::CachePolicy;
    use crate::storage::inmemory::InMemoryUnitOfWork;

    async fn setup() -> (Arc<MockCache>, CachingUnitOfWork<InMemoryUnitOfWork, MockCache>) {
        let inner = InMemoryUnitOfWork::new();
        inner
            .seed(vec![
                InscriptionStatus::new(1, "PEN", "Pending"),
                InscriptionStatus::new(2, "APR", "Approved"),
            ])
            .await;
        inner
            .seed(vec![Inscription::new(
                1,
                10,
                3,
                1,
                NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            )])
            .await;

        let cache = Arc::new(MockCache::new());
        let factory = RepositoryCacheFactory::new(cache.clone(), CachePolicy::reference_data());
        (cache, CachingUnitOfWork::new(inner, factory))
    }

    #[tokio::test]
    async fn test_same_repository_per_entity_type() {
        let (_cache, uow) = setup().await;

        let a = uow.repository::<InscriptionStatus>();
        let b = uow.repository::<InscriptionStatus>();
        let c = uow.repository::<Inscription>();
        let d = uow.repository::<Inscription>();

        assert!(Arc::ptr_eq(&a, &b));
        assert!(Arc::ptr_eq(&c, &d));
    }

    #[tokio::test]
    async fn test_reference_data_reads_are_cached() {
        let (cache, uow) = setup().await;
        let statuses = uow.repository::<InscriptionStatus>();

        statuses.get_all().await.unwrap();
        statuses.get_all().await.unwrap();

        assert_eq!(cache.gets(), 2);
        assert_eq!(cache.keys().await.len(), 1);
    }

    #[tokio::test]
    async fn test_transactional_reads_skip_the_cache() {
        let (cache, uow) = setup().await;
        let inscriptions = uow.repository::<Inscription>();

        let filter = FilterMap::new().with("StatusId", "1");
        for _ in 0..3 {
            let found = inscriptions
                .get_all_by(&filter, &SortSpec::default(), None)
                .await
                .unwrap();
            assert_eq!(found.len(), 1);
        }

        assert_eq!(cache.gets(), 0);
        assert!(cache.keys().await.is_empty());
    }

    #[tokio::test]
    async fn test_writes_through_decorator_are_visible() {
        let (_cache, uow) = setup().await;
        let careers = uow.repository::<Career>();

        assert!(careers.get_all().await.unwrap().is_empty());
        careers
            .add(&Career::new(1, "MED", "Medicine", "Health Sciences"))
            .await
            .unwrap();

        assert_eq!(careers.get_all().await.unwrap().len(), 1);
        assert_eq!(uow.inner().in_memory::<Career>().len().await, 1);
    }

    #[tokio::test]
    async fn test_commit_passes_through() {
        let (_cache, uow) = setup().await;

        uow.repository::<InscriptionStatus>()
            .add(&InscriptionStatus::new(3, "REJ", "Rejected"))
            .await
            .unwrap();
        uow.repository::<InscriptionStatus>()
            .update(&InscriptionStatus::new(1, "PEN", "Waiting"))
            .await
            .unwrap();

        assert_eq!(uow.commit().await.unwrap(), 2);
        assert_eq!(uow.commit().await.unwrap(), 0);
    }
}
