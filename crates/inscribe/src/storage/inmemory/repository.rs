//! In-memory repository implementation.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use inscribe_core::query::{
    build_predicate, matches_predicate, order_by, paginate, FilterMap, Page, PageSpec, SortSpec,
};
use inscribe_core::storage::{Entity, Repository, RepositoryError, Result};

/// In-memory storage for one entity type.
///
/// Records are kept in a `BTreeMap` keyed by identifier, so unsorted reads
/// come back in identifier order. Queries run through the predicate
/// builder and the query shaper exactly as a relational backend would
/// translate them. Data is not persisted and will be lost when the last
/// handle is dropped.
pub struct InMemoryRepository<E: Entity> {
    records: Arc<RwLock<BTreeMap<E::Id, E>>>,
    pending_writes: Option<Arc<AtomicUsize>>,
}

impl<E: Entity> Clone for InMemoryRepository<E> {
    fn clone(&self) -> Self {
        Self {
            records: Arc::clone(&self.records),
            pending_writes: self.pending_writes.clone(),
        }
    }
}

impl<E: Entity> Default for InMemoryRepository<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Entity> InMemoryRepository<E> {
    /// Creates a new empty in-memory repository.
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(BTreeMap::new())),
            pending_writes: None,
        }
    }

    /// Counts successful writes into `counter`.
    pub fn with_write_counter(mut self, counter: Arc<AtomicUsize>) -> Self {
        self.pending_writes = Some(counter);
        self
    }

    /// Loads records without counting them as pending writes.
    ///
    /// Existing records with the same identifier are replaced.
    pub async fn seed(&self, records: impl IntoIterator<Item = E>) {
        let mut map = self.records.write().await;
        for record in records {
            map.insert(record.id(), record);
        }
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    fn record_writes(&self, count: usize) {
        if let Some(counter) = &self.pending_writes {
            counter.fetch_add(count, Ordering::SeqCst);
        }
    }

    /// Returns the records matching `filter`, ordered by `sort`.
    async fn select(&self, filter: &FilterMap, sort: &SortSpec) -> Vec<E> {
        let schema = E::schema();
        let predicate = build_predicate(filter, schema);
        let matched: Vec<E> = self
            .records
            .read()
            .await
            .values()
            .filter(|record| matches_predicate(predicate.as_ref(), record))
            .cloned()
            .collect();
        order_by(matched, schema, &sort.resolve(schema))
    }
}

fn not_found<E: Entity>(id: E::Id) -> RepositoryError {
    RepositoryError::NotFound {
        entity_type: E::NAME,
        id: id.to_string(),
    }
}

fn already_exists<E: Entity>(id: E::Id) -> RepositoryError {
    RepositoryError::AlreadyExists {
        entity_type: E::NAME,
        id: id.to_string(),
    }
}

#[async_trait]
impl<E: Entity> Repository<E> for InMemoryRepository<E> {
    async fn get_by_id(&self, id: E::Id) -> Result<Option<E>> {
        let records = self.records.read().await;
        Ok(records.get(&id).cloned())
    }

    async fn get_all(&self) -> Result<Vec<E>> {
        let records = self.records.read().await;
        Ok(records.values().cloned().collect())
    }

    async fn get_all_by(
        &self,
        filter: &FilterMap,
        sort: &SortSpec,
        page: Option<PageSpec>,
    ) -> Result<Vec<E>> {
        let ordered = self.select(filter, sort).await;
        Ok(match page {
            Some(page) => paginate(ordered, page),
            None => ordered,
        })
    }

    async fn get_first_or_default(&self, filter: &FilterMap) -> Result<Option<E>> {
        let predicate = build_predicate(filter, E::schema());
        let records = self.records.read().await;
        Ok(records
            .values()
            .find(|record| matches_predicate(predicate.as_ref(), record))
            .cloned())
    }

    async fn get_all_with_pagination(
        &self,
        filter: &FilterMap,
        sort: &SortSpec,
        page: PageSpec,
    ) -> Result<Page<E>> {
        let ordered = self.select(filter, sort).await;
        let total = ordered.len();
        Ok(Page::new(paginate(ordered, page), total, page))
    }

    async fn add(&self, entity: &E) -> Result<()> {
        let mut records = self.records.write().await;
        if records.contains_key(&entity.id()) {
            return Err(already_exists::<E>(entity.id()));
        }
        records.insert(entity.id(), entity.clone());
        self.record_writes(1);
        Ok(())
    }

    async fn add_range(&self, entities: &[E]) -> Result<()> {
        let mut records = self.records.write().await;

        // All or nothing: reject the batch before inserting anything.
        let mut seen = BTreeSet::new();
        for entity in entities {
            if records.contains_key(&entity.id()) || !seen.insert(entity.id()) {
                return Err(already_exists::<E>(entity.id()));
            }
        }

        for entity in entities {
            records.insert(entity.id(), entity.clone());
        }
        self.record_writes(entities.len());
        Ok(())
    }

    async fn update(&self, entity: &E) -> Result<()> {
        let mut records = self.records.write().await;
        let Some(existing) = records.get_mut(&entity.id()) else {
            return Err(not_found::<E>(entity.id()));
        };
        *existing = entity.clone();
        self.record_writes(1);
        Ok(())
    }

    async fn update_partial(&self, entity: &E, changed_fields: &[&str]) -> Result<()> {
        let mut records = self.records.write().await;
        let Some(existing) = records.get_mut(&entity.id()) else {
            return Err(not_found::<E>(entity.id()));
        };

        let mut updated = existing.clone();
        for field in changed_fields {
            if !updated.copy_field(entity, field) {
                return Err(RepositoryError::InvalidData(format!(
                    "{} has no writable field '{}'",
                    E::NAME,
                    field
                )));
            }
        }
        *existing = updated;
        self.record_writes(1);
        Ok(())
    }

    async fn delete(&self, entity: &E) -> Result<()> {
        let mut records = self.records.write().await;
        if records.remove(&entity.id()).is_none() {
            return Err(not_found::<E>(entity.id()));
        }
        self.record_writes(1);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    use crate::models::{Career, Inscription, InscriptionStatus};

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn statuses() -> Vec<InscriptionStatus> {
        vec![
            InscriptionStatus::new(1, "PEN", "Pending"),
            InscriptionStatus::new(2, "REV", "In review"),
            InscriptionStatus::new(3, "APR", "Approved").final_state(),
            InscriptionStatus::new(4, "REJ", "Rejected").final_state(),
        ]
    }

    async fn seeded() -> InMemoryRepository<InscriptionStatus> {
        let repo = InMemoryRepository::new();
        repo.seed(statuses()).await;
        repo
    }

    fn ids(items: &[InscriptionStatus]) -> Vec<i64> {
        items.iter().map(|s| s.id).collect()
    }

    // ==================== CRUD Tests ====================

    #[tokio::test]
    async fn test_add_and_get() {
        let repo = InMemoryRepository::new();
        let status = InscriptionStatus::new(1, "PEN", "Pending");

        repo.add(&status).await.unwrap();

        assert_eq!(repo.get_by_id(1).await.unwrap(), Some(status));
    }

    #[tokio::test]
    async fn test_get_nonexistent() {
        let repo = seeded().await;
        assert!(repo.get_by_id(99).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_add_duplicate() {
        let repo = seeded().await;
        let result = repo.add(&InscriptionStatus::new(1, "DUP", "Duplicate")).await;
        assert!(matches!(result, Err(RepositoryError::AlreadyExists { .. })));
    }

    #[tokio::test]
    async fn test_add_range_is_all_or_nothing() {
        let repo = seeded().await;
        let batch = vec![
            InscriptionStatus::new(5, "WIT", "Withdrawn"),
            InscriptionStatus::new(2, "DUP", "Duplicate"),
        ];

        assert!(repo.add_range(&batch).await.is_err());
        assert!(repo.get_by_id(5).await.unwrap().is_none());

        let batch = vec![
            InscriptionStatus::new(5, "WIT", "Withdrawn"),
            InscriptionStatus::new(5, "WIT", "Withdrawn again"),
        ];
        assert!(repo.add_range(&batch).await.is_err());
        assert_eq!(repo.len().await, 4);
    }

    #[tokio::test]
    async fn test_update() {
        let repo = seeded().await;
        let mut status = repo.get_by_id(2).await.unwrap().unwrap();
        status.name = "Under review".into();

        repo.update(&status).await.unwrap();

        assert_eq!(repo.get_by_id(2).await.unwrap().unwrap().name, "Under review");
    }

    #[tokio::test]
    async fn test_update_nonexistent() {
        let repo = seeded().await;
        let result = repo.update(&InscriptionStatus::new(42, "X", "X")).await;
        assert!(matches!(result, Err(RepositoryError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_update_partial_copies_named_fields_only() {
        let repo = seeded().await;
        let changes = InscriptionStatus::new(1, "CHANGED", "Awaiting documents")
            .with_description("Missing paperwork");

        repo.update_partial(&changes, &["Name", "description"])
            .await
            .unwrap();

        let stored = repo.get_by_id(1).await.unwrap().unwrap();
        assert_eq!(stored.code, "PEN");
        assert_eq!(stored.name, "Awaiting documents");
        assert_eq!(stored.description.as_deref(), Some("Missing paperwork"));
    }

    #[tokio::test]
    async fn test_update_partial_unknown_field_changes_nothing() {
        let repo = seeded().await;
        let changes = InscriptionStatus::new(1, "CHANGED", "Changed");

        let result = repo.update_partial(&changes, &["Name", "Bogus"]).await;

        assert!(matches!(result, Err(RepositoryError::InvalidData(_))));
        assert_eq!(repo.get_by_id(1).await.unwrap().unwrap().name, "Pending");
    }

    #[tokio::test]
    async fn test_delete() {
        let repo = seeded().await;
        let status = repo.get_by_id(4).await.unwrap().unwrap();

        repo.delete(&status).await.unwrap();

        assert!(repo.get_by_id(4).await.unwrap().is_none());
        assert!(matches!(
            repo.delete(&status).await,
            Err(RepositoryError::NotFound { .. })
        ));
    }

    // ==================== Query Tests ====================

    #[tokio::test]
    async fn test_get_all_in_id_order() {
        let repo = InMemoryRepository::new();
        repo.seed(statuses().into_iter().rev()).await;
        assert_eq!(ids(&repo.get_all().await.unwrap()), vec![1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_get_all_by_filters_sorts_and_pages() {
        let repo = seeded().await;
        let filter = FilterMap::new().with("IsFinal", "false");

        let all = repo
            .get_all_by(&filter, &SortSpec::new("Name", true), None)
            .await
            .unwrap();
        assert_eq!(ids(&all), vec![1, 2]);

        let paged = repo
            .get_all_by(&FilterMap::new(), &SortSpec::default(), Some(PageSpec::new(2, 3)))
            .await
            .unwrap();
        assert_eq!(ids(&paged), vec![4]);
    }

    #[tokio::test]
    async fn test_invalid_entries_are_ignored() {
        let repo = seeded().await;
        let filter = FilterMap::new()
            .with("Bogus@eq", "x")
            .with("Id@gt", "not a number")
            .with("Code@like", "R");

        let result = repo
            .get_all_by(&filter, &SortSpec::default(), None)
            .await
            .unwrap();
        assert_eq!(ids(&result), vec![2, 3, 4]);
    }

    #[tokio::test]
    async fn test_get_first_or_default() {
        let repo = seeded().await;

        let first = repo
            .get_first_or_default(&FilterMap::new().with("IsFinal", "true"))
            .await
            .unwrap();
        assert_eq!(first.map(|s| s.id), Some(3));

        let none = repo
            .get_first_or_default(&FilterMap::new().with("Code", "NOPE"))
            .await
            .unwrap();
        assert!(none.is_none());
    }

    #[tokio::test]
    async fn test_get_all_with_pagination() {
        let repo = seeded().await;

        let page = repo
            .get_all_with_pagination(&FilterMap::new(), &SortSpec::by_id(true), PageSpec::new(1, 3))
            .await
            .unwrap();

        assert_eq!(ids(&page.items), vec![4, 3, 2]);
        assert_eq!(page.total_count, 4);
        assert_eq!(page.total_pages, 2);
        assert!(page.has_next());
    }

    #[tokio::test]
    async fn test_sort_by_navigation_field() {
        let repo = InMemoryRepository::new();
        let law = Career::new(1, "LAW", "Law", "Social Sciences");
        let arts = Career::new(2, "ART", "Arts", "Humanities");
        repo.seed(vec![
            Inscription::new(1, 10, 0, 1, date(2024, 2, 1)).with_career(law),
            Inscription::new(2, 11, 0, 1, date(2024, 2, 2)).with_career(arts),
            Inscription::new(3, 12, 0, 1, date(2024, 2, 3)),
        ])
        .await;

        let sorted = repo
            .get_all_by(&FilterMap::new(), &SortSpec::new("Career.Name", false), None)
            .await
            .unwrap();

        let order: Vec<i64> = sorted.iter().map(|i| i.id).collect();
        assert_eq!(order, vec![3, 2, 1]);
    }

    #[tokio::test]
    async fn test_write_counter() {
        let counter = Arc::new(AtomicUsize::new(0));
        let repo = InMemoryRepository::new().with_write_counter(Arc::clone(&counter));
        repo.seed(statuses()).await;
        assert_eq!(counter.load(Ordering::SeqCst), 0);

        repo.add_range(&[
            InscriptionStatus::new(5, "WIT", "Withdrawn"),
            InscriptionStatus::new(6, "CAN", "Cancelled"),
        ])
        .await
        .unwrap();
        repo.delete(&InscriptionStatus::new(1, "PEN", "Pending"))
            .await
            .unwrap();
        let _ = repo.delete(&InscriptionStatus::new(1, "PEN", "Pending")).await;

        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }
}
