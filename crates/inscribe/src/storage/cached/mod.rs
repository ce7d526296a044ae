//! Cached repository decorators.
//!
//! Wraps repositories with a read-through cache:
//!
//! - **Reads**: Check cache first, on miss fetch from repository and populate cache
//! - **Writes**: Persist to repository, then invalidate affected keys
//!
//! [`RepositoryCacheFactory`] decides per entity type whether to decorate,
//! and [`CachingUnitOfWork`] applies the factory to every repository a unit
//! of work hands out.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//!
//! let cache = Arc::new(MemoryCacheStore::new(10_000, None));
//! let factory = RepositoryCacheFactory::new(cache, CachePolicy::reference_data());
//! let uow = CachingUnitOfWork::new(InMemoryUnitOfWork::new(), factory);
//!
//! // Decorated: careers are reference data.
//! let careers = uow.repository::<Career>();
//! ```

mod factory;
mod health;
mod repository;
mod unit_of_work;

#[cfg(test)]
mod testing;

pub use factory::{CachePolicy, RepositoryCacheFactory};
pub use health::{CacheHealth, HealthCheck, HealthState, DEFAULT_COOLDOWN};
pub use repository::CachedRepository;
pub use unit_of_work::CachingUnitOfWork;
