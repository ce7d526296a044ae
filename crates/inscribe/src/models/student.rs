use std::sync::LazyLock;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use inscribe_core::schema::{FieldType, Schema};
use inscribe_core::storage::Entity;

use super::audit::{audit_fields, Audit};

/// A person applying to or enrolled in a career.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub id: i64,
    /// Identifier used by external admission systems.
    pub external_ref: Uuid,
    pub document_type_id: i64,
    pub document_number: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub birth_date: NaiveDate,
    pub audit: Audit,
}

impl Student {
    pub fn new(
        id: i64,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        birth_date: NaiveDate,
    ) -> Self {
        let first_name = first_name.into();
        let last_name = last_name.into();
        let email = format!(
            "{}.{}@students.example.edu",
            first_name.to_lowercase(),
            last_name.to_lowercase()
        );
        Self {
            id,
            external_ref: Uuid::new_v4(),
            document_type_id: 1,
            document_number: format!("{:08}", id),
            first_name,
            last_name,
            email,
            birth_date,
            audit: Audit::default(),
        }
    }

    pub fn with_document(mut self, document_type_id: i64, number: impl Into<String>) -> Self {
        self.document_type_id = document_type_id;
        self.document_number = number.into();
        self
    }

    pub fn with_external_ref(mut self, external_ref: Uuid) -> Self {
        self.external_ref = external_ref;
        self
    }
}

static SCHEMA: LazyLock<Schema<Student>> = LazyLock::new(|| {
    let builder = Schema::builder("Student", "Id", FieldType::Integer, |s: &Student| {
        s.id.into()
    })
    .field("ExternalRef", FieldType::Uuid, |s: &Student| {
        s.external_ref.into()
    })
    .field("DocumentTypeId", FieldType::Integer, |s: &Student| {
        s.document_type_id.into()
    })
    .field("DocumentNumber", FieldType::String, |s: &Student| {
        (&s.document_number).into()
    })
    .field("FirstName", FieldType::String, |s: &Student| {
        (&s.first_name).into()
    })
    .field("LastName", FieldType::String, |s: &Student| {
        (&s.last_name).into()
    })
    .field("Email", FieldType::String, |s: &Student| (&s.email).into())
    .field("BirthDate", FieldType::Date, |s: &Student| {
        s.birth_date.into()
    });
    audit_fields(builder, |s| &s.audit).build()
});

impl Entity for Student {
    type Id = i64;
    const NAME: &'static str = "Student";

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
            "ExternalRef" => self.external_ref = source.external_ref,
            "DocumentTypeId" => self.document_type_id = source.document_type_id,
            "DocumentNumber" => self.document_number.clone_from(&source.document_number),
            "FirstName" => self.first_name.clone_from(&source.first_name),
            "LastName" => self.last_name.clone_from(&source.last_name),
            "Email" => self.email.clone_from(&source.email),
            "BirthDate" => self.birth_date = source.birth_date,
            other => return self.audit.copy_field(&source.audit, other),
        }
        true
    }
}
