use std::sync::LazyLock;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use inscribe_core::schema::{FieldType, Schema};
use inscribe_core::storage::Entity;

use super::audit::{audit_fields, Audit};

/// A degree program students inscribe into.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Career {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub faculty: String,
    pub duration_semesters: i32,
    pub tuition: Decimal,
    pub audit: Audit,
}

impl Career {
    pub fn new(
        id: i64,
        code: impl Into<String>,
        name: impl Into<String>,
        faculty: impl Into<String>,
    ) -> Self {
        Self {
            id,
            code: code.into(),
            name: name.into(),
            faculty: faculty.into(),
            duration_semesters: 10,
            tuition: Decimal::ZERO,
            audit: Audit::default(),
        }
    }

    pub fn with_duration(mut self, semesters: i32) -> Self {
        self.duration_semesters = semesters;
        self
    }

    pub fn with_tuition(mut self, tuition: Decimal) -> Self {
        self.tuition = tuition;
        self
    }
}

static SCHEMA: LazyLock<Schema<Career>> = LazyLock::new(|| {
    let builder = Schema::builder("Career", "Id", FieldType::Integer, |c: &Career| c.id.into())
        .field("Code", FieldType::String, |c: &Career| (&c.code).into())
        .field("Name", FieldType::String, |c: &Career| (&c.name).into())
        .field("Faculty", FieldType::String, |c: &Career| {
            (&c.faculty).into()
        })
        .field("DurationSemesters", FieldType::Integer, |c: &Career| {
            c.duration_semesters.into()
        })
        .field("Tuition", FieldType::Decimal, |c: &Career| c.tuition.into());
    audit_fields(builder, |c| &c.audit).build()
});

impl Entity for Career {
    type Id = i64;
    const NAME: &'static str = "Career";

    fn id(&self) -> i64 {
        self.id
    }

    fn schema() -> &'static Schema<Self> {
        &SCHEMA
    }

    fn copy_field(&mut self, source: &Self, field: &str) -> bool {
        let Some(def) = Self::schema().direct_field(field) else {
            return false;
        };
        match def.name() {
            "Code" => self.code.clone_from(&source.code),
            "Name" => self.name.clone_from(&source.name),
            "Faculty" => self.faculty.clone_from(&source.faculty),
            "DurationSemesters" => self.duration_semesters = source.duration_semesters,
            "Tuition" => self.tuition = source.tuition,
            other => return self.audit.copy_field(&source.audit, other),
        }
        true
    }
}
