//! In-memory unit of work.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;

use inscribe_core::storage::{Entity, Repository, Result, UnitOfWork};

use super::InMemoryRepository;

type AnyRepository = Arc<dyn Any + Send + Sync>;

/// Hands out one [`InMemoryRepository`] per entity type.
///
/// Repositories are created on first use and live as long as the unit of
/// work. Writes apply immediately; `commit` reports how many writes were
/// made since the previous commit.
#[derive(Default)]
pub struct InMemoryUnitOfWork {
    repositories: Mutex<HashMap<TypeId, AnyRepository>>,
    pending_writes: Arc<AtomicUsize>,
}

impl InMemoryUnitOfWork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets the concrete repository for an entity type.
    pub fn in_memory<E: Entity>(&self) -> InMemoryRepository<E> {
        let mut repositories = self
            .repositories
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let existing = repositories
            .get(&TypeId::of::<E>())
            .and_then(|repo| repo.downcast_ref::<InMemoryRepository<E>>())
            .cloned();
        if let Some(repo) = existing {
            return repo;
        }

        let repo =
            InMemoryRepository::<E>::new().with_write_counter(Arc::clone(&self.pending_writes));
        repositories.insert(TypeId::of::<E>(), Arc::new(repo.clone()));
        repo
    }

    /// Loads records for an entity type without counting them as writes.
    pub async fn seed<E: Entity>(&self, records: impl IntoIterator<Item = E>) {
        self.in_memory::<E>().seed(records).await;
    }

    /// Writes made since the last commit.
    pub fn pending_writes(&self) -> usize {
        self.pending_writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UnitOfWork for InMemoryUnitOfWork {
    fn repository<E: Entity>(&self) -> Arc<dyn Repository<E>> {
        Arc::new(self.in_memory::<E>())
    }

    async fn commit(&self) -> Result<usize> {
        let committed = self.pending_writes.swap(0, Ordering::SeqCst);
        tracing::debug!(committed, "Unit of work committed");
        Ok(committed)
    }
}
