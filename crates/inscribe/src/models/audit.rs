use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use inscribe_core::schema::{FieldType, SchemaBuilder};

/// Standard audit fields carried by every record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Audit {
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_by: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
    /// Logical-delete flag.
    pub active: bool,
}

impl Audit {
    pub fn new(created_by: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            created_by: created_by.into(),
            created_at,
            updated_by: None,
            updated_at: None,
            active: true,
        }
    }

    /// Copies one audit field by its schema name.
    pub fn copy_field(&mut self, source: &Audit, field: &str) -> bool {
        match field {
            "CreatedBy" => self.created_by.clone_from(&source.created_by),
            "CreatedAt" => self.created_at = source.created_at,
            "UpdatedBy" => self.updated_by.clone_from(&source.updated_by),
            "UpdatedAt" => self.updated_at = source.updated_at,
            "Active" => self.active = source.active,
            _ => return false,
        }
        true
    }
}

impl Default for Audit {
    fn default() -> Self {
        Self::new("system", DateTime::<Utc>::default())
    }
}

/// Registers the audit fields on a schema.
pub(crate) fn audit_fields<E: 'static>(
    builder: SchemaBuilder<E>,
    audit: fn(&E) -> &Audit,
) -> SchemaBuilder<E> {
    builder
        .field("CreatedBy", FieldType::String, move |e: &E| {
            (&audit(e).created_by).into()
        })
        .field("CreatedAt", FieldType::DateTime, move |e: &E| {
            audit(e).created_at.into()
        })
        .nullable("UpdatedBy", FieldType::String, move |e: &E| {
            audit(e).updated_by.as_ref().into()
        })
        .nullable("UpdatedAt", FieldType::DateTime, move |e: &E| {
            audit(e).updated_at.into()
        })
        .field("Active", FieldType::Boolean, move |e: &E| audit(e).active.into())
}
