//! FHIR-aligned wire support for the patient registry.
//!
//! This crate provides the **wire model** and **translation helpers** for the on-disk
//! patient resource (`patient.yaml`):
//! - FHIR semantic alignment (without FHIR JSON/REST transport)
//! - strict serialisation/deserialisation
//! - translation between domain primitives and wire structs

pub mod patient;

pub use patient::{AdministrativeGender, Patient, PatientData};

/// Errors returned by the `fhir` boundary crate.
#[derive(Debug, thiserror::Error)]
pub enum FhirError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("translation error: {0}")]
    Translation(String),
}

/// Type alias for Results that can fail with a [`FhirError`].
pub type FhirResult<T> = Result<T, FhirError>;
