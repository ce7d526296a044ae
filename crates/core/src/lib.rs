pub mod cache;
pub mod query;
pub mod schema;
pub mod storage;
