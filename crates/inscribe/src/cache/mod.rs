//! Cache backends and the read-through helper.
//!
//! The store contract lives in `inscribe_core::cache::CacheStore`; this
//! module provides the in-process backend and [`get_or_create`], which
//! every cached read goes through.

pub mod memory;
mod read_through;

pub use memory::MemoryCacheStore;
pub use read_through::{get_or_create, CacheStatus, Cached};
