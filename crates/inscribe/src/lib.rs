//! Read-through caching repositories for academic inscriptions.

pub mod cache;
pub mod config;
pub mod mock_data;
pub mod models;
pub mod storage;
