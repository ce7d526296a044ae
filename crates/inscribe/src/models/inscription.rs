use std::sync::LazyLock;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use inscribe_core::schema::{FieldType, Schema};
use inscribe_core::storage::Entity;

use super::audit::{audit_fields, Audit};
use super::Career;

/// A student's inscription into a career for one academic period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Inscription {
    pub id: i64,
    pub student_id: i64,
    pub career_id: i64,
    pub status_id: i64,
    /// Academic period, e.g. `2024-1`.
    pub period: String,
    pub inscribed_on: NaiveDate,
    pub fee: Decimal,
    /// Admission exam score, once graded.
    pub score: Option<f64>,
    /// Loaded career, when the store resolves the relation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub career: Option<Career>,
    pub audit: Audit,
}

impl Inscription {
    pub fn new(
        id: i64,
        student_id: i64,
        career_id: i64,
        status_id: i64,
        inscribed_on: NaiveDate,
    ) -> Self {
        Self {
            id,
            student_id,
            career_id,
            status_id,
            period: String::new(),
            inscribed_on,
            fee: Decimal::ZERO,
            score: None,
            career: None,
            audit: Audit::default(),
        }
    }

    pub fn with_period(mut self, period: impl Into<String>) -> Self {
        self.period = period.into();
        self
    }

    pub fn with_fee(mut self, fee: Decimal) -> Self {
        self.fee = fee;
        self
    }

    pub fn with_score(mut self, score: f64) -> Self {
        self.score = Some(score);
        self
    }

    pub fn with_career(mut self, career: Career) -> Self {
        self.career_id = career.id;
        self.career = Some(career);
        self
    }
}

static SCHEMA: LazyLock<Schema<Inscription>> = LazyLock::new(|| {
    let builder = Schema::builder("Inscription", "Id", FieldType::Integer, |i: &Inscription| {
        i.id.into()
    })
    .field("StudentId", FieldType::Integer, |i: &Inscription| {
        i.student_id.into()
    })
    .field("CareerId", FieldType::Integer, |i: &Inscription| {
        i.career_id.into()
    })
    .field("StatusId", FieldType::Integer, |i: &Inscription| {
        i.status_id.into()
    })
    .field("Period", FieldType::String, |i: &Inscription| {
        (&i.period).into()
    })
    .field("InscribedOn", FieldType::Date, |i: &Inscription| {
        i.inscribed_on.into()
    })
    .field("Fee", FieldType::Decimal, |i: &Inscription| i.fee.into())
    .nullable("Score", FieldType::Float, |i: &Inscription| i.score.into());
    audit_fields(builder, |i| &i.audit)
        .navigation("Career", Career::schema(), |i: &Inscription| {
            i.career.as_ref()
        })
        .build()
});

impl Entity for Inscription {
    type Id = i64;
    const NAME: &'static str = "Inscription";

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
            "StudentId" => self.student_id = source.student_id,
            "CareerId" => self.career_id = source.career_id,
            "StatusId" => self.status_id = source.status_id,
            "Period" => self.period.clone_from(&source.period),
            "InscribedOn" => self.inscribed_on = source.inscribed_on,
            "Fee" => self.fee = source.fee,
            "Score" => self.score = source.score,
            other => return self.audit.copy_field(&source.audit, other),
        }
        true
    }
}
