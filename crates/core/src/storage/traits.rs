use std::fmt::{Debug, Display};
use std::hash::Hash;
use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::query::{FilterMap, Page, PageSpec, SortSpec};
use crate::schema::Schema;

use super::Result;

/// A persisted record type with a unique scalar identifier.
pub trait Entity: Clone + Debug + Send + Sync + Serialize + DeserializeOwned + 'static {
    type Id: Copy + Ord + Hash + Display + Debug + Send + Sync + 'static;

    /// Stable type name, used in cache keys and cache policy lookups.
    const NAME: &'static str;

    fn id(&self) -> Self::Id;

    /// Field registry for this type, built once.
    fn schema() -> &'static Schema<Self>;

    /// Copies one named field from `source` into `self`.
    ///
    /// Returns false when the field is unknown or not writable.
    fn copy_field(&mut self, source: &Self, field: &str) -> bool;
}

/// Data-access contract for one entity type.
#[async_trait]
pub trait Repository<E: Entity>: Send + Sync {
    /// Gets an entity by its identifier.
    async fn get_by_id(&self, id: E::Id) -> Result<Option<E>>;

    /// Gets every entity, ordered by identifier.
    async fn get_all(&self) -> Result<Vec<E>>;

    /// Gets the entities matching `filter`, ordered by `sort`, optionally paged.
    async fn get_all_by(
        &self,
        filter: &FilterMap,
        sort: &SortSpec,
        page: Option<PageSpec>,
    ) -> Result<Vec<E>>;

    /// Gets the first entity (by identifier) matching `filter`.
    async fn get_first_or_default(&self, filter: &FilterMap) -> Result<Option<E>>;

    /// Gets one page of the entities matching `filter`, with totals.
    async fn get_all_with_pagination(
        &self,
        filter: &FilterMap,
        sort: &SortSpec,
        page: PageSpec,
    ) -> Result<Page<E>>;

    /// Adds a new entity.
    async fn add(&self, entity: &E) -> Result<()>;

    /// Adds several entities.
    async fn add_range(&self, entities: &[E]) -> Result<()>;

    /// Replaces an existing entity.
    async fn update(&self, entity: &E) -> Result<()>;

    /// Updates only `changed_fields` of an existing entity.
    async fn update_partial(&self, entity: &E, changed_fields: &[&str]) -> Result<()>;

    /// Deletes an existing entity.
    async fn delete(&self, entity: &E) -> Result<()>;
}

/// Transaction boundary handing out repositories.
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    /// Gets the repository for an entity type.
    fn repository<E: Entity>(&self) -> Arc<dyn Repository<E>>;

    /// Commits pending changes, returning how many were committed.
    async fn commit(&self) -> Result<usize>;
}
