//! Cache key derivation.
//!
//! Keys have the shape `{Entity}|{kind}|{params}`:
//!
//! - `kind` is `id` for point lookups and `list:*` for every list-shaped
//!   result (`list:all`, `list:query`, `list:first`, `list:paged`), so one
//!   pattern reaches all of them.
//! - `params` is compact JSON of everything that affects the result: the
//!   surviving filter clauses with their literal values, the resolved sort
//!   and the page. Clauses are sorted and de-duplicated, so filters with the
//!   same meaning share a key while any difference in field, operator or
//!   value produces a different key.

use serde_json::{Map, Value as Json};

use crate::query::{PageSpec, Predicate, ResolvedSort};
use crate::storage::Entity;

/// The kind of read a cache key belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    ById,
    All,
    Query,
    First,
    Paged,
}

impl OperationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            OperationKind::ById => "id",
            OperationKind::All => "list:all",
            OperationKind::Query => "list:query",
            OperationKind::First => "list:first",
            OperationKind::Paged => "list:paged",
        }
    }

    /// Returns true for results that any insert may change.
    pub fn is_list(self) -> bool {
        !matches!(self, OperationKind::ById)
    }
}

/// Returns the cache key for a single entity.
pub fn by_id_key<E: Entity>(id: E::Id) -> String {
    format!("{}|{}|{}", E::NAME, OperationKind::ById.as_str(), id)
}

/// Returns the cache key for the unconstrained list.
pub fn all_key<E: Entity>() -> String {
    derive_key(E::NAME, OperationKind::All, Map::new())
}

/// Returns the cache key for a filtered, sorted and optionally paged list.
pub fn query_key<E: Entity>(
    predicate: Option<&Predicate<E>>,
    sort: &ResolvedSort,
    page: Option<PageSpec>,
) -> String {
    let mut params = filter_params(predicate);
    params.insert("sort".into(), sort_json(sort));
    if let Some(page) = page {
        params.insert("page".into(), page_json(page));
    }
    derive_key(E::NAME, OperationKind::Query, params)
}

/// Returns the cache key for a first-match lookup.
pub fn first_key<E: Entity>(predicate: Option<&Predicate<E>>) -> String {
    derive_key(E::NAME, OperationKind::First, filter_params(predicate))
}

/// Returns the cache key for one page of a paginated list.
pub fn paged_key<E: Entity>(
    predicate: Option<&Predicate<E>>,
    sort: &ResolvedSort,
    page: PageSpec,
) -> String {
    let mut params = filter_params(predicate);
    params.insert("sort".into(), sort_json(sort));
    params.insert("page".into(), page_json(page));
    derive_key(E::NAME, OperationKind::Paged, params)
}

/// Returns the pattern matching every list-shaped key of an entity type.
pub fn list_pattern<E: Entity>() -> String {
    format!("{}|list:*", E::NAME)
}

/// Returns the pattern matching every key of an entity type.
pub fn entity_pattern<E: Entity>() -> String {
    format!("{}|*", E::NAME)
}

fn derive_key(entity: &str, kind: OperationKind, params: Map<String, Json>) -> String {
    format!("{}|{}|{}", entity, kind.as_str(), Json::Object(params))
}

fn filter_params<E>(predicate: Option<&Predicate<E>>) -> Map<String, Json> {
    let mut params = Map::new();
    let Some(predicate) = predicate else {
        return params;
    };

    let mut clauses: Vec<(String, Json)> = predicate
        .clauses()
        .iter()
        .map(|c| {
            let json = Json::Array(vec![
                Json::String(c.field.clone()),
                Json::String(c.op.as_str().to_string()),
                c.value.to_json(),
            ]);
            (json.to_string(), json)
        })
        .collect();
    clauses.sort_by(|a, b| a.0.cmp(&b.0));
    clauses.dedup_by(|a, b| a.0 == b.0);

    params.insert(
        "filter".into(),
        Json::Array(clauses.into_iter().map(|(_, json)| json).collect()),
    );
    params
}

fn sort_json(sort: &ResolvedSort) -> Json {
    let mut obj = Map::new();
    match sort {
        ResolvedSort::Id { descending } => {
            obj.insert("by".into(), Json::String("id".into()));
            obj.insert("desc".into(), Json::Bool(*descending));
        }
        ResolvedSort::Field { name, descending } => {
            obj.insert("by".into(), Json::String(name.clone()));
            obj.insert("desc".into(), Json::Bool(*descending));
        }
        ResolvedSort::Unsorted => {
            obj.insert("by".into(), Json::Null);
        }
    }
    Json::Object(obj)
}

fn page_json(page: PageSpec) -> Json {
    Json::Array(vec![Json::from(page.number), Json::from(page.size)])
}
