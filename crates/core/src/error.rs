/// Errors raised by storage, lookup and configuration code.
#[derive(Debug, thiserror::Error)]
pub enum PatientError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("failed to create storage directory: {0}")]
    StorageDirCreation(std::io::Error),
    #[error("failed to create patient directory: {0}")]
    PatientDirCreation(std::io::Error),
    #[error("failed to write patient file: {0}")]
    FileWrite(std::io::Error),
    #[error("failed to read patient file: {0}")]
    FileRead(std::io::Error),
    #[error("failed to read storage directory: {0}")]
    StorageRead(std::io::Error),
    #[error("patient record not found: {0}")]
    NotFound(String),

    #[error("FHIR error: {0}")]
    Fhir(#[from] fhir::FhirError),
    #[error("invalid patient identifier: {0}")]
    Uuid(#[from] registry_uuid::UuidError),
    #[error("blocking storage task failed: {0}")]
    BlockingTask(#[from] tokio::task::JoinError),

    /// Failure reported by a store or lookup implementation outside this crate.
    #[error("backend error: {0}")]
    Backend(Box<dyn std::error::Error + Send + Sync>),
}

pub type PatientResult<T> = std::result::Result<T, PatientError>;

/// Failures of a single intake submission that are not user-correctable.
///
/// Field errors and duplicate conflicts are *outcomes*, reported through
/// [`ValidationOutcome`](crate::ValidationOutcome). Anything here means the attempt
/// itself failed and the caller decides whether to retry.
#[derive(Debug, thiserror::Error)]
pub enum IntakeError {
    #[error("candidate lookup failed: {0}")]
    Lookup(#[source] PatientError),
    #[error("failed to persist patient: {0}")]
    Persistence(#[source] PatientError),
    #[error("persistence task did not run to completion: {0}")]
    PersistenceInterrupted(#[source] tokio::task::JoinError),
}

pub type IntakeResult<T> = std::result::Result<T, IntakeError>;
