//! Maps the terminal states of an intake run onto the caller-facing result.
//!
//! Structural only: every decision has already been made by the time a [`Terminal`]
//! exists. This is also the single place where terminal states are logged.

use crate::error::{IntakeError, IntakeResult, PatientError};
use crate::outcome::{DuplicateConflict, FieldErrors, ValidationOutcome};
use crate::patient::PatientRecord;

/// Terminal states of the intake state machine.
#[derive(Debug)]
pub(crate) enum Terminal {
    Invalid(FieldErrors),
    ConflictFound(DuplicateConflict),
    Saved(PatientRecord),
    LookupFailed(PatientError),
    PersistFailed(PatientError),
    PersistInterrupted(tokio::task::JoinError),
}

pub(crate) fn report(terminal: Terminal) -> IntakeResult<ValidationOutcome> {
    match terminal {
        Terminal::Invalid(errors) => {
            tracing::info!(
                fields = ?errors.keys().collect::<Vec<_>>(),
                "patient rejected: field validation failed"
            );
            Ok(ValidationOutcome::FieldInvalid(errors))
        }
        Terminal::ConflictFound(conflict) => {
            tracing::info!(
                count = conflict.count(),
                "patient held: possible duplicates found"
            );
            Ok(ValidationOutcome::DuplicateFound(conflict))
        }
        Terminal::Saved(record) => {
            tracing::info!(
                id = record.id.as_ref().map(|id| id.as_str()).unwrap_or("<none>"),
                "patient saved"
            );
            Ok(ValidationOutcome::Saved(record))
        }
        Terminal::LookupFailed(e) => {
            tracing::error!(error = %e, "duplicate check lookup failed");
            Err(IntakeError::Lookup(e))
        }
        Terminal::PersistFailed(e) => {
            tracing::error!(error = %e, "patient save failed");
            Err(IntakeError::Persistence(e))
        }
        Terminal::PersistInterrupted(e) => {
            tracing::error!(error = %e, "patient save task did not complete");
            Err(IntakeError::PersistenceInterrupted(e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::DuplicateMatch;
    use crate::patient::PatientId;

    #[test]
    fn test_report_preserves_full_match_list() {
        let a = PatientRecord::new("John", "Smith").with_id(PatientId::new("A1"));
        let b = PatientRecord::new("John", "Smith").with_id(PatientId::new("B2"));
        let conflict = DuplicateConflict::from_matches([
            DuplicateMatch {
                is_duplicate: true,
                existing: &a,
            },
            DuplicateMatch {
                is_duplicate: true,
                existing: &b,
            },
        ]);

        let outcome = report(Terminal::ConflictFound(conflict)).expect("conflict is an outcome");
        let conflict = outcome.duplicates().expect("should be DuplicateFound");
        assert_eq!(conflict.count(), 2);
        assert_eq!(conflict.matched(), &[a, b]);
    }

    #[test]
    fn test_report_maps_failures_to_distinct_errors() {
        let err = report(Terminal::LookupFailed(PatientError::InvalidInput("x".into())))
            .expect_err("lookup failure is an error");
        assert!(matches!(err, IntakeError::Lookup(_)));

        let err = report(Terminal::PersistFailed(PatientError::InvalidInput("x".into())))
            .expect_err("persist failure is an error");
        assert!(matches!(err, IntakeError::Persistence(_)));
    }

    #[test]
    fn test_report_maps_invalid_and_saved() {
        let mut errors = FieldErrors::new();
        errors.insert("givenName".into(), "Given name is required".into());
        let outcome = report(Terminal::Invalid(errors.clone())).unwrap();
        assert_eq!(outcome, ValidationOutcome::FieldInvalid(errors));

        let saved = PatientRecord::new("John", "Smith").with_id(PatientId::new("A1"));
        let outcome = report(Terminal::Saved(saved.clone())).unwrap();
        assert_eq!(outcome, ValidationOutcome::Saved(saved));
    }
}
