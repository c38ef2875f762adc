//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and passed into core services as an
//! `Arc<CoreConfig>`. Nothing in this crate reads process-wide environment variables while
//! handling a submission.

use crate::constants::{DEFAULT_MAX_CANDIDATES, DEMOGRAPHICS_DIR_NAME};
use crate::{PatientError, PatientResult};
use std::path::{Path, PathBuf};

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    patient_data_dir: PathBuf,
    max_candidates: usize,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// # Errors
    ///
    /// Returns [`PatientError::InvalidInput`] if `max_candidates` is zero: a zero bound
    /// would make every duplicate check vacuously pass.
    pub fn new(patient_data_dir: PathBuf, max_candidates: usize) -> PatientResult<Self> {
        if max_candidates == 0 {
            return Err(PatientError::InvalidInput(
                "max_candidates must be at least 1".into(),
            ));
        }

        Ok(Self {
            patient_data_dir,
            max_candidates,
        })
    }

    pub fn patient_data_dir(&self) -> &Path {
        &self.patient_data_dir
    }

    pub fn demographics_dir(&self) -> PathBuf {
        self.patient_data_dir.join(DEMOGRAPHICS_DIR_NAME)
    }

    /// Maximum number of lookup results compared against a candidate.
    pub fn max_candidates(&self) -> usize {
        self.max_candidates
    }
}

/// Parse the candidate bound from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns [`DEFAULT_MAX_CANDIDATES`].
///
/// # Errors
///
/// Returns [`PatientError::InvalidInput`] if the value is not a positive integer.
pub fn max_candidates_from_env_value(value: Option<String>) -> PatientResult<usize> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());

    let Some(value) = value else {
        return Ok(DEFAULT_MAX_CANDIDATES);
    };

    match value.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(PatientError::InvalidInput(format!(
            "REGISTRY_MAX_CANDIDATES must be a positive integer, got '{value}'"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_candidates_defaults_when_unset_or_blank() {
        assert_eq!(
            max_candidates_from_env_value(None).unwrap(),
            DEFAULT_MAX_CANDIDATES
        );
        assert_eq!(
            max_candidates_from_env_value(Some("  ".into())).unwrap(),
            DEFAULT_MAX_CANDIDATES
        );
    }

    #[test]
    fn test_max_candidates_parses_positive_values() {
        assert_eq!(max_candidates_from_env_value(Some(" 12 ".into())).unwrap(), 12);
    }

    #[test]
    fn test_max_candidates_rejects_zero_and_garbage() {
        for bad in ["0", "-3", "ten"] {
            let err = max_candidates_from_env_value(Some(bad.into()))
                .expect_err("value should be rejected");
            assert!(matches!(err, PatientError::InvalidInput(_)));
        }
    }

    #[test]
    fn test_core_config_rejects_zero_bound() {
        let err = CoreConfig::new(PathBuf::from("/tmp/registry"), 0)
            .expect_err("zero bound should be rejected");
        assert!(matches!(err, PatientError::InvalidInput(_)));
    }

    #[test]
    fn test_demographics_dir_is_under_data_dir() {
        let cfg = CoreConfig::new(PathBuf::from("/data"), 5).unwrap();
        assert_eq!(cfg.demographics_dir(), PathBuf::from("/data/demographics"));
        assert_eq!(cfg.max_candidates(), 5);
    }
}
