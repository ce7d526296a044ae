use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

use inscribe_core::schema::{FieldType, Schema};
use inscribe_core::storage::Entity;

use super::audit::{audit_fields, Audit};

/// Lifecycle state of an inscription (pending, approved, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InscriptionStatus {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    /// Whether inscriptions in this state are closed.
    pub is_final: bool,
    pub audit: Audit,
}

impl InscriptionStatus {
    pub fn new(id: i64, code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id,
            code: code.into(),
            name: name.into(),
            description: None,
            is_final: false,
            audit: Audit::default(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn final_state(mut self) -> Self {
        self.is_final = true;
        self
    }
}

static SCHEMA: LazyLock<Schema<InscriptionStatus>> = LazyLock::new(|| {
    let builder = Schema::builder(
        "InscriptionStatus",
        "Id",
        FieldType::Integer,
        |s: &InscriptionStatus| s.id.into(),
    )
    .field("Code", FieldType::String, |s: &InscriptionStatus| {
        (&s.code).into()
    })
    .field("Name", FieldType::String, |s: &InscriptionStatus| {
        (&s.name).into()
    })
    .nullable("Description", FieldType::String, |s: &InscriptionStatus| {
        s.description.as_ref().into()
    })
    .field("IsFinal", FieldType::Boolean, |s: &InscriptionStatus| {
        s.is_final.into()
    });
    audit_fields(builder, |s| &s.audit).build()
});

impl Entity for InscriptionStatus {
    type Id = i64;
    const NAME: &'static str = "InscriptionStatus";

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
            "Description" => self.description.clone_from(&source.description),
            "IsFinal" => self.is_final = source.is_final,
            other => return self.audit.copy_field(&source.audit, other),
        }
        true
    }
}
