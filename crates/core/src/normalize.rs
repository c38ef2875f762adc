//! Comparison-ready projection of a patient record.
//!
//! Normalisation is total: any record, however incomplete, produces a
//! [`NormalizedPatient`]. Missing name parts become empty strings and a missing date of
//! birth stays `None`, so downstream comparisons can tell "absent" from "present".

use crate::patient::PatientRecord;
use chrono::NaiveDate;

/// Name parts case-folded and whitespace-collapsed, plus the canonical date of birth.
///
/// Exists only for the duration of a comparison and never leaves this crate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct NormalizedPatient {
    pub given_name: String,
    pub family_name: String,
    /// Normalised `given_name + " " + family_name`, recomputed from the parts.
    pub full_name: String,
    pub date_of_birth: Option<NaiveDate>,
}

impl NormalizedPatient {
    pub fn from_record(record: &PatientRecord) -> Self {
        let given_name = normalize_text(&record.given_name);
        let family_name = normalize_text(&record.family_name);
        let full_name = normalize_text(&format!("{given_name} {family_name}"));

        Self {
            given_name,
            family_name,
            full_name,
            date_of_birth: record.date_of_birth,
        }
    }
}

/// Lowercases `input` and collapses every run of whitespace to one ASCII space.
pub(crate) fn normalize_text(input: &str) -> String {
    input
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}
