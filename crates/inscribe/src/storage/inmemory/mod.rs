//! In-memory storage backend.
//!
//! Stores every entity type in its own `BTreeMap` behind a tokio `RwLock`.
//! Useful for tests, demos and development where persistence is not
//! required.
//!
//! # Example
//!
//! ```rust,ignore
//! use inscribe::storage::inmemory::InMemoryUnitOfWork;
//!
//! let uow = InMemoryUnitOfWork::new();
//! let careers = uow.repository::<Career>();
//! ```

mod repository;
mod unit_of_work;

pub use repository::InMemoryRepository;
pub use unit_of_work::InMemoryUnitOfWork;
