//! Academic-inscription records and their field schemas.
//!
//! `InscriptionStatus`, `DocumentType` and `Career` are low-churn
//! reference data; `Student` and `Inscription` are transactional.

mod audit;
mod career;
mod document_type;
mod inscription;
mod status;
mod student;

pub use audit::Audit;
pub use career::Career;
pub use document_type::DocumentType;
pub use inscription::Inscription;
pub use status::InscriptionStatus;
pub use student::Student;
