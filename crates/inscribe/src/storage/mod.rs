//! Storage backends and cache decorators.
//!
//! Concrete implementations of the repository traits defined in
//! `inscribe_core::storage`:
//!
//! - [`inmemory`]: `BTreeMap`-backed repositories and unit of work
//! - [`cached`]: read-through cache decorators that wrap any repository

pub mod cached;
pub mod inmemory;
