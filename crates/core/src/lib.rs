//! # Registry Core
//!
//! Duplicate-aware intake for the patient registry.
//!
//! This crate contains the pure intake pipeline and its file-backed storage:
//! - [`DuplicateMatcher`]: exact comparison of normalised name and date of birth
//! - [`IntakeService`]: validate, check for duplicates, persist, notify
//! - [`DemographicsRepository`]: sharded YAML storage under `PATIENT_DATA_DIR`
//!
//! **No API concerns**: HTTP routing, CLI parsing and caches of the patient list belong
//! in `api-rest` and `cli`, which plug into the traits in [`collaborators`].

pub mod collaborators;
pub mod config;
pub mod constants;
pub mod error;
pub mod intake;
pub mod matcher;
mod normalize;
pub mod outcome;
pub mod patient;
mod report;
pub mod repositories;
pub mod validation;

pub use collaborators::{CandidateLookup, FieldValidator, NoopNotifier, PatientStore, SaveNotifier};
pub use config::{max_candidates_from_env_value, CoreConfig};
pub use error::{IntakeError, IntakeResult, PatientError, PatientResult};
pub use intake::IntakeService;
pub use matcher::DuplicateMatcher;
pub use outcome::{DuplicateConflict, DuplicateMatch, FieldErrors, ValidationOutcome};
pub use patient::{PatientId, PatientRecord, Sex};
pub use repositories::demographics::DemographicsRepository;
pub use validation::StandardFieldValidator;

pub use registry_uuid::ShardableUuid;
