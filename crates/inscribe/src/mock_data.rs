//! Demo records for the in-memory store.
//!
//! Identifiers and external references are fixed so repeated runs produce
//! the same cache keys.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::models::{Career, DocumentType, Inscription, InscriptionStatus, Student};
use crate::storage::inmemory::InMemoryUnitOfWork;

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}

pub fn statuses() -> Vec<InscriptionStatus> {
    vec![
        InscriptionStatus::new(1, "PEN", "Pending").with_description("Awaiting document review"),
        InscriptionStatus::new(2, "REV", "In review"),
        InscriptionStatus::new(3, "APR", "Approved").final_state(),
        InscriptionStatus::new(4, "REJ", "Rejected")
            .with_description("Requirements not met")
            .final_state(),
        InscriptionStatus::new(5, "WIT", "Withdrawn").final_state(),
    ]
}

pub fn document_types() -> Vec<DocumentType> {
    vec![
        DocumentType::new(1, "DNI", "National identity card"),
        DocumentType::new(2, "PAS", "Passport").with_expiry(),
        DocumentType::new(3, "RES", "Residence permit").with_expiry(),
    ]
}

pub fn careers() -> Vec<Career> {
    vec![
        Career::new(1, "LAW", "Law", "Social Sciences")
            .with_duration(10)
            .with_tuition(Decimal::new(125_000, 2)),
        Career::new(2, "MED", "Medicine", "Health Sciences")
            .with_duration(12)
            .with_tuition(Decimal::new(210_050, 2)),
        Career::new(3, "CSE", "Computer Engineering", "Engineering")
            .with_duration(10)
            .with_tuition(Decimal::new(148_000, 2)),
        Career::new(4, "ARC", "Architecture", "Engineering")
            .with_duration(11)
            .with_tuition(Decimal::new(139_990, 2)),
    ]
}

pub fn students() -> Vec<Student> {
    [
        (1, "Ana", "Pereira", date(2004, 5, 12), 1),
        (2, "Bruno", "Silva", date(2003, 11, 2), 1),
        (3, "Carla", "Méndez", date(2005, 1, 27), 2),
        (4, "Diego", "Rossi", date(2002, 8, 14), 3),
        (5, "Elena", "Costa", date(2004, 2, 29), 1),
        (6, "Facundo", "Álvarez", date(2001, 9, 30), 2),
    ]
    .into_iter()
    .map(|(id, first, last, born, document_type)| {
        Student::new(id, first, last, born)
            .with_document(document_type, format!("{:08}", 40_000_000 + id))
            .with_external_ref(Uuid::from_u128(0x1000 + id as u128))
    })
    .collect()
}

pub fn inscriptions() -> Vec<Inscription> {
    let careers = careers();
    let career = |id: i64| careers.iter().find(|c| c.id == id).cloned();

    [
        (1, 1, 1, 3, date(2024, 2, 5), Some(8.5)),
        (2, 2, 3, 1, date(2024, 2, 6), None),
        (3, 3, 2, 2, date(2024, 2, 7), None),
        (4, 4, 3, 3, date(2024, 2, 9), Some(7.0)),
        (5, 5, 4, 4, date(2024, 2, 12), None),
        (6, 6, 1, 1, date(2024, 2, 13), None),
        (7, 1, 3, 5, date(2023, 8, 1), Some(6.25)),
        (8, 2, 2, 2, date(2024, 2, 14), None),
    ]
    .into_iter()
    .map(|(id, student, career_id, status, on, score)| {
        let mut inscription = Inscription::new(id, student, career_id, status, on)
            .with_period(format!("{}-{}", on.year(), if on.month() >= 7 { 2 } else { 1 }))
            .with_fee(Decimal::new(15_000, 2));
        if let Some(career) = career(career_id) {
            inscription = inscription.with_career(career);
        }
        if let Some(score) = score {
            inscription = inscription.with_score(score);
        }
        inscription
    })
    .collect()
}

/// Loads every demo table into the unit of work.
pub async fn seed(uow: &InMemoryUnitOfWork) {
    uow.seed(statuses()).await;
    uow.seed(document_types()).await;
    uow.seed(careers()).await;
    uow.seed(students()).await;
    uow.seed(inscriptions()).await;
}
