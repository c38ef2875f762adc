//! Constants used throughout the registry core crate.

/// Default directory for patient data storage when no explicit directory is configured.
pub const DEFAULT_PATIENT_DATA_DIR: &str = "patient_data";

/// Directory name for demographics records storage.
pub const DEMOGRAPHICS_DIR_NAME: &str = "demographics";

/// Filename of the FHIR-aligned patient resource inside each record directory.
pub const PATIENT_FILE_NAME: &str = "patient.yaml";

/// Upper bound on candidates compared per duplicate check when none is configured.
pub const DEFAULT_MAX_CANDIDATES: usize = 50;

/// Attempts made to allocate a fresh sharded directory before giving up.
pub const MAX_DIR_ALLOCATION_ATTEMPTS: usize = 5;
