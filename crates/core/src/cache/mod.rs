//! Cache seam: the store contract, key derivation and key patterns.

mod error;
mod keys;
mod patterns;
mod serialization;
mod traits;

pub use error::{CacheError, Result};
pub use keys::{
    all_key, by_id_key, entity_pattern, first_key, list_pattern, paged_key, query_key,
    OperationKind,
};
pub use patterns::{pattern_matches, KeyPattern};
pub use serialization::{deserialize_value, serialize_value, SerializationError};
pub use traits::{CacheStore, Cacheable};
