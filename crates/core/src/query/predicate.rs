use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use crate::schema::{FieldDef, Schema, Value};

use super::{split_filter_key, FilterMap, FilterOp};

/// One typed condition: `field op literal`.
#[derive(Debug, Clone, PartialEq)]
pub struct Clause {
    /// Canonical (schema-registered) field name.
    pub field: String,
    pub op: FilterOp,
    pub value: Value,
}

impl Clause {
    /// Evaluates this clause against a field value.
    pub fn test(&self, field_value: &Value) -> bool {
        evaluate(self.op, field_value, &self.value)
    }
}

type Test<E> = Arc<dyn Fn(&E) -> bool + Send + Sync>;

/// AND-combination of typed clauses, compiled to plain closures.
pub struct Predicate<E> {
    clauses: Vec<Clause>,
    tests: Vec<Test<E>>,
}

impl<E> Predicate<E> {
    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    /// Returns true when every clause holds for `entity`.
    pub fn matches(&self, entity: &E) -> bool {
        self.tests.iter().all(|test| test(entity))
    }
}

impl<E> Clone for Predicate<E> {
    fn clone(&self) -> Self {
        Self {
            clauses: self.clauses.clone(),
            tests: self.tests.clone(),
        }
    }
}

impl<E> fmt::Debug for Predicate<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Predicate")
            .field("clauses", &self.clauses)
            .finish_non_exhaustive()
    }
}

/// Matches `entity` against an optional predicate; `None` matches everything.
pub fn matches_predicate<E>(predicate: Option<&Predicate<E>>, entity: &E) -> bool {
    predicate.is_none_or(|p| p.matches(entity))
}

/// Builds a predicate from a filter map.
///
/// Fields resolve like sort fields, so `navigation.field` filters on the
/// related record and reads `Null` when it is absent. Entries naming an
/// unknown field, carrying a value that does not convert
/// to the field's declared type, or applying a text operator to a non-text
/// field are dropped. Surviving clauses are AND-ed in map order. Returns
/// `None` when nothing survived, meaning "match everything".
///
/// # Examples
///
/// ```
/// use inscribe_core::query::{build_predicate, FilterMap};
/// use inscribe_core::schema::{FieldType, Schema};
///
/// struct Person {
///     id: i64,
///     age: i64,
/// }
///
/// let schema = Schema::builder("Person", "Id", FieldType::Integer, |p: &Person| p.id.into())
///     .field("Age", FieldType::Integer, |p: &Person| p.age.into())
///     .build();
///
/// let filter = FilterMap::new().with("Age@gt", "18").with("Bogus", "x");
/// let predicate = build_predicate(&filter, &schema).unwrap();
///
/// assert_eq!(predicate.clauses().len(), 1);
/// assert!(predicate.matches(&Person { id: 1, age: 30 }));
/// assert!(!predicate.matches(&Person { id: 2, age: 18 }));
/// ```
pub fn build_predicate<E: 'static>(filter: &FilterMap, schema: &Schema<E>) -> Option<Predicate<E>> {
    let mut clauses = Vec::new();
    let mut tests: Vec<Test<E>> = Vec::new();

    for (key, raw) in filter.iter() {
        let Some((clause, def)) = parse_clause(key, raw, schema) else {
            continue;
        };
        tests.push(compile(&clause, def));
        clauses.push(clause);
    }

    if clauses.is_empty() {
        None
    } else {
        Some(Predicate { clauses, tests })
    }
}

/// Resolves one filter entry against the schema, or `None` if it is dropped.
pub fn parse_clause<'s, E>(
    key: &str,
    raw: &str,
    schema: &'s Schema<E>,
) -> Option<(Clause, &'s FieldDef<E>)> {
    let (name, op) = split_filter_key(key);
    let def = schema.field(name)?;

    if op.is_text() && !def.field_type().is_string() {
        return None;
    }

    let value = if def.is_nullable() && raw.trim().eq_ignore_ascii_case("null") {
        if !matches!(op, FilterOp::Eq | FilterOp::Ne) {
            return None;
        }
        Value::Null
    } else {
        def.field_type().parse(raw)?
    };

    Some((
        Clause {
            field: def.name().to_string(),
            op,
            value,
        },
        def,
    ))
}

fn compile<E: 'static>(clause: &Clause, def: &FieldDef<E>) -> Test<E> {
    let accessor = def.accessor();
    let op = clause.op;
    let literal = clause.value.clone();
    Arc::new(move |entity: &E| evaluate(op, &accessor(entity), &literal))
}

fn evaluate(op: FilterOp, actual: &Value, literal: &Value) -> bool {
    let ordering = actual.compare(literal);
    match op {
        FilterOp::Eq => is_equal(actual, literal, ordering),
        FilterOp::Ne => !is_equal(actual, literal, ordering),
        FilterOp::Gt => ordering == Some(Ordering::Greater),
        FilterOp::Gte => matches!(ordering, Some(Ordering::Greater | Ordering::Equal)),
        FilterOp::Lt => ordering == Some(Ordering::Less),
        FilterOp::Lte => matches!(ordering, Some(Ordering::Less | Ordering::Equal)),
        FilterOp::Contains => text_op(actual, literal, |a, b| a.contains(b)),
        FilterOp::StartsWith => text_op(actual, literal, |a, b| a.starts_with(b)),
        FilterOp::EndsWith => text_op(actual, literal, |a, b| a.ends_with(b)),
    }
}

fn is_equal(actual: &Value, literal: &Value, ordering: Option<Ordering>) -> bool {
    (actual.is_null() && literal.is_null()) || ordering == Some(Ordering::Equal)
}

fn text_op(actual: &Value, literal: &Value, f: impl Fn(&str, &str) -> bool) -> bool {
    match (actual.as_str(), literal.as_str()) {
        (Some(a), Some(b)) => f(a, b),
        _ => false,
    }
}
