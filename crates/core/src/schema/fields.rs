use std::fmt;
use std::sync::Arc;

use super::{FieldType, Value};

/// Reads one field of an entity as a typed [`Value`].
pub type Accessor<E> = Arc<dyn Fn(&E) -> Value + Send + Sync>;

/// A single registered field: its name, declared type and accessor.
pub struct FieldDef<E> {
    name: String,
    field_type: FieldType,
    nullable: bool,
    navigation: bool,
    accessor: Accessor<E>,
}

impl<E> FieldDef<E> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn field_type(&self) -> FieldType {
        self.field_type
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    /// Returns true for fields reached through a navigation (`career.name`).
    pub fn is_navigation(&self) -> bool {
        self.navigation
    }

    /// Reads this field from an entity.
    pub fn value(&self, entity: &E) -> Value {
        (self.accessor)(entity)
    }

    pub fn accessor(&self) -> Accessor<E> {
        Arc::clone(&self.accessor)
    }
}

impl<E> Clone for FieldDef<E> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            field_type: self.field_type,
            nullable: self.nullable,
            navigation: self.navigation,
            accessor: Arc::clone(&self.accessor),
        }
    }
}

impl<E> fmt::Debug for FieldDef<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDef")
            .field("name", &self.name)
            .field("field_type", &self.field_type)
            .field("nullable", &self.nullable)
            .field("navigation", &self.navigation)
            .finish_non_exhaustive()
    }
}

/// Field registry for one entity type.
///
/// Built once per type (typically behind a `LazyLock`) and shared by the
/// predicate builder, the query shaper and the cache key deriver. The
/// identifier field is always the first registered field.
///
/// # Examples
///
/// ```
/// use inscribe_core::schema::{FieldType, Schema, Value};
///
/// struct Course {
///     id: i64,
///     title: String,
/// }
///
/// let schema = Schema::builder("Course", "Id", FieldType::Integer, |c: &Course| c.id.into())
///     .field("Title", FieldType::String, |c: &Course| (&c.title).into())
///     .build();
///
/// let course = Course { id: 7, title: "Algebra".into() };
/// assert_eq!(schema.field("title").unwrap().value(&course), Value::from("Algebra"));
/// assert_eq!(schema.id_field().value(&course), Value::Integer(7));
/// ```
pub struct Schema<E> {
    entity: &'static str,
    fields: Vec<FieldDef<E>>,
}

impl<E: 'static> Schema<E> {
    /// Starts a schema whose identifier field is `id_name`.
    pub fn builder<F>(
        entity: &'static str,
        id_name: &str,
        id_type: FieldType,
        id_accessor: F,
    ) -> SchemaBuilder<E>
    where
        F: Fn(&E) -> Value + Send + Sync + 'static,
    {
        SchemaBuilder {
            schema: Schema {
                entity,
                fields: Vec::new(),
            },
        }
        .push(id_name, id_type, false, false, Arc::new(id_accessor))
    }
}

impl<E> Schema<E> {
    pub fn entity_name(&self) -> &'static str {
        self.entity
    }

    pub fn id_field(&self) -> &FieldDef<E> {
        &self.fields[0]
    }

    /// Looks up a direct or navigation field.
    ///
    /// Exact names win; otherwise the first ASCII-case-insensitive match.
    pub fn field(&self, name: &str) -> Option<&FieldDef<E>> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .or_else(|| self.fields.iter().find(|f| f.name.eq_ignore_ascii_case(name)))
    }

    /// Looks up a field declared on the entity itself.
    pub fn direct_field(&self, name: &str) -> Option<&FieldDef<E>> {
        self.field(name).filter(|f| !f.navigation)
    }

    pub fn fields(&self) -> impl Iterator<Item = &FieldDef<E>> {
        self.fields.iter()
    }
}

impl<E> fmt::Debug for Schema<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("entity", &self.entity)
            .field("fields", &self.fields)
            .finish()
    }
}

/// Builder for [`Schema`].
pub struct SchemaBuilder<E> {
    schema: Schema<E>,
}

impl<E: 'static> SchemaBuilder<E> {
    fn push(
        mut self,
        name: &str,
        field_type: FieldType,
        nullable: bool,
        navigation: bool,
        accessor: Accessor<E>,
    ) -> Self {
        // Later registrations never shadow earlier ones.
        if self.schema.fields.iter().all(|f| f.name != name) {
            self.schema.fields.push(FieldDef {
                name: name.to_string(),
                field_type,
                nullable,
                navigation,
                accessor,
            });
        }
        self
    }

    /// Registers a non-nullable field.
    pub fn field<F>(self, name: &str, field_type: FieldType, accessor: F) -> Self
    where
        F: Fn(&E) -> Value + Send + Sync + 'static,
    {
        self.push(name, field_type, false, false, Arc::new(accessor))
    }

    /// Registers a nullable field; the accessor returns `Value::Null` when absent.
    pub fn nullable<F>(self, name: &str, field_type: FieldType, accessor: F) -> Self
    where
        F: Fn(&E) -> Value + Send + Sync + 'static,
    {
        self.push(name, field_type, true, false, Arc::new(accessor))
    }

    /// Exposes the direct fields of a related entity as `name.field`.
    ///
    /// Only one level is flattened: navigations declared on `related` are
    /// not reachable. Every navigation field reads `Null` when `getter`
    /// returns `None`.
    pub fn navigation<R, G>(mut self, name: &str, related: &Schema<R>, getter: G) -> Self
    where
        R: 'static,
        G: for<'a> Fn(&'a E) -> Option<&'a R> + Send + Sync + 'static,
    {
        let getter = Arc::new(getter);
        for def in related.fields().filter(|f| !f.navigation) {
            let getter = Arc::clone(&getter);
            let inner = def.accessor();
            let accessor: Accessor<E> =
                Arc::new(move |entity: &E| getter(entity).map_or(Value::Null, |r| inner(r)));
            self = self.push(
                &format!("{}.{}", name, def.name),
                def.field_type,
                true,
                true,
                accessor,
            );
        }
        self
    }

    pub fn build(self) -> Schema<E> {
        self.schema
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Career {
        id: i64,
        name: String,
    }

    struct Student {
        id: i64,
        name: String,
        nickname: Option<String>,
        career: Option<Career>,
    }

    fn career_schema() -> Schema<Career> {
        Schema::builder("Career", "Id", FieldType::Integer, |c: &Career| {
            c.id.into()
        })
        .field("Name", FieldType::String, |c: &Career| (&c.name).into())
        .build()
    }

    fn student_schema() -> Schema<Student> {
        Schema::builder("Student", "Id", FieldType::Integer, |s: &Student| {
            s.id.into()
        })
        .field("Name", FieldType::String, |s: &Student| (&s.name).into())
        .nullable("Nickname", FieldType::String, |s: &Student| {
            s.nickname.as_ref().into()
        })
        .navigation("Career", &career_schema(), |s: &Student| s.career.as_ref())
        .build()
    }

    fn student(career: Option<Career>) -> Student {
        Student {
            id: 1,
            name: "Ana".into(),
            nickname: None,
            career,
        }
    }

    #[test]
    fn test_id_field_is_first() {
        let schema = student_schema();
        assert_eq!(schema.id_field().name(), "Id");
        assert_eq!(schema.entity_name(), "Student");
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let schema = student_schema();
        assert_eq!(schema.field("name").map(|f| f.name()), Some("Name"));
        assert_eq!(schema.field("NAME").map(|f| f.name()), Some("Name"));
        assert!(schema.field("Bogus").is_none());
    }

    #[test]
    fn test_nullable_field_reads_null() {
        let schema = student_schema();
        let field = schema.field("Nickname").unwrap();
        assert!(field.is_nullable());
        assert_eq!(field.value(&student(None)), Value::Null);
    }

    #[test]
    fn test_navigation_flattens_one_level() {
        let schema = student_schema();
        let field = schema.field("career.name").unwrap();
        assert!(field.is_navigation());
        assert_eq!(field.name(), "Career.Name");

        let with_career = student(Some(Career {
            id: 3,
            name: "Law".into(),
        }));
        assert_eq!(field.value(&with_career), Value::from("Law"));
        assert_eq!(field.value(&student(None)), Value::Null);
    }

    #[test]
    fn test_direct_field_excludes_navigation() {
        let schema = student_schema();
        assert!(schema.direct_field("Career.Name").is_none());
        assert!(schema.direct_field("Name").is_some());
    }

    #[test]
    fn test_duplicate_registration_keeps_first() {
        let schema = Schema::builder("Career", "Id", FieldType::Integer, |c: &Career| {
            c.id.into()
        })
        .field("Id", FieldType::String, |c: &Career| (&c.name).into())
        .build();

        assert_eq!(schema.fields().count(), 1);
        assert_eq!(schema.id_field().field_type(), FieldType::Integer);
    }
}
