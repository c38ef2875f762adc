//! Seams between the intake pipeline and the rest of the application.
//!
//! The orchestrator owns no storage, no search index and no cache. It talks to them
//! through these traits so that tests can substitute recording fakes and deployments
//! can plug in a different backend.

use crate::error::PatientResult;
use crate::outcome::FieldErrors;
use crate::patient::PatientRecord;
use async_trait::async_trait;

/// Generic per-field validation (required fields, formats).
pub trait FieldValidator: Send + Sync {
    /// Returns an empty map when `record` is valid.
    fn validate(&self, record: &PatientRecord) -> FieldErrors;
}

/// Name-based search returning the bounded set of records worth comparing.
#[async_trait]
pub trait CandidateLookup: Send + Sync {
    /// Returns every existing record whose name plausibly overlaps `full_name`.
    ///
    /// No ordering is relied upon.
    async fn search(&self, full_name: &str) -> PatientResult<Vec<PatientRecord>>;
}

/// Persistence for patient records.
#[async_trait]
pub trait PatientStore: Send + Sync {
    /// Persists `record`, issuing an id if it has none, and returns the stored record.
    async fn save(&self, record: PatientRecord) -> PatientResult<PatientRecord>;
}

/// Post-save hook used to refresh views that depend on the patient list.
#[async_trait]
pub trait SaveNotifier: Send + Sync {
    /// Called once per successful save, after the store has returned.
    async fn patient_saved(&self, record: &PatientRecord);
}

/// Notifier that does nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopNotifier;

#[async_trait]
impl SaveNotifier for NoopNotifier {
    async fn patient_saved(&self, _record: &PatientRecord) {}
}
