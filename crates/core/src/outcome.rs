//! Result contract of an intake submission.
//!
//! Callers branch on [`ValidationOutcome`] rather than on error types: a field problem
//! and a possible duplicate are both expected, recoverable results of a submission.

use crate::patient::PatientRecord;
use serde::ser::SerializeStruct;
use serde::Serialize;
use std::collections::BTreeMap;

/// Per-field validation messages, keyed by field name. Empty means valid.
pub type FieldErrors = BTreeMap<String, String>;

/// Outcome of comparing a candidate against one existing record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DuplicateMatch<'a> {
    pub is_duplicate: bool,
    pub existing: &'a PatientRecord,
}

/// Existing records judged possible duplicates of a candidate.
///
/// The count is derived from the matched list, so the two cannot disagree.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DuplicateConflict {
    matched: Vec<PatientRecord>,
}

impl DuplicateConflict {
    /// Collects the records of every positive match, preserving order.
    pub fn from_matches<'a, I>(matches: I) -> Self
    where
        I: IntoIterator<Item = DuplicateMatch<'a>>,
    {
        Self {
            matched: matches
                .into_iter()
                .filter(|m| m.is_duplicate)
                .map(|m| m.existing.clone())
                .collect(),
        }
    }

    pub fn matched(&self) -> &[PatientRecord] {
        &self.matched
    }

    pub fn into_matched(self) -> Vec<PatientRecord> {
        self.matched
    }

    pub fn count(&self) -> usize {
        self.matched.len()
    }

    /// A conflict with no matches means "no duplicates found".
    pub fn is_empty(&self) -> bool {
        self.matched.is_empty()
    }
}

impl Serialize for DuplicateConflict {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("DuplicateConflict", 2)?;
        state.serialize_field("count", &self.count())?;
        state.serialize_field("matched", &self.matched)?;
        state.end()
    }
}

/// Result of one add-patient attempt. Exactly one variant applies.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "detail", rename_all = "snake_case")]
pub enum ValidationOutcome {
    /// The record was persisted; carries the stored record with its new id.
    Saved(PatientRecord),
    /// One or more fields failed validation. Nothing was looked up or saved.
    FieldInvalid(FieldErrors),
    /// Possible duplicates exist. Nothing was saved.
    DuplicateFound(DuplicateConflict),
}

impl ValidationOutcome {
    pub fn is_saved(&self) -> bool {
        matches!(self, ValidationOutcome::Saved(_))
    }

    pub fn saved(&self) -> Option<&PatientRecord> {
        match self {
            ValidationOutcome::Saved(record) => Some(record),
            _ => None,
        }
    }

    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            ValidationOutcome::FieldInvalid(errors) => Some(errors),
            _ => None,
        }
    }

    pub fn duplicates(&self) -> Option<&DuplicateConflict> {
        match self {
            ValidationOutcome::DuplicateFound(conflict) => Some(conflict),
            _ => None,
        }
    }

    /// Short label for logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            ValidationOutcome::Saved(_) => "saved",
            ValidationOutcome::FieldInvalid(_) => "field_invalid",
            ValidationOutcome::DuplicateFound(_) => "duplicate_found",
        }
    }
}
