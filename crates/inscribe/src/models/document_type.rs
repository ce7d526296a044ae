use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

use inscribe_core::schema::{FieldType, Schema};
use inscribe_core::storage::Entity;

use super::audit::{audit_fields, Audit};

/// Kind of identity document a student registers with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentType {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub requires_expiry: bool,
    pub audit: Audit,
}

impl DocumentType {
    pub fn new(id: i64, code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id,
            code: code.into(),
            name: name.into(),
            requires_expiry: false,
            audit: Audit::default(),
        }
    }

    pub fn with_expiry(mut self) -> Self {
        self.requires_expiry = true;
        self
    }
}

static SCHEMA: LazyLock<Schema<DocumentType>> = LazyLock::new(|| {
    let builder = Schema::builder("DocumentType", "Id", FieldType::Integer, |d: &DocumentType| {
        d.id.into()
    })
    .field("Code", FieldType::String, |d: &DocumentType| (&d.code).into())
    .field("Name", FieldType::String, |d: &DocumentType| (&d.name).into())
    .field("RequiresExpiry", FieldType::Boolean, |d: &DocumentType| {
        d.requires_expiry.into()
    });
    audit_fields(builder, |d| &d.audit).build()
});

impl Entity for DocumentType {
    type Id = i64;
    const NAME: &'static str = "DocumentType";

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
            "RequiresExpiry" => self.requires_expiry = source.requires_expiry,
            other => return self.audit.copy_field(&source.audit, other),
        }
        true
    }
}
