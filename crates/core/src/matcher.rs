//! Possible-duplicate predicate.
//!
//! Two records are a possible duplicate when their normalised full names are equal
//! **and** both carry the same date of birth. The rule is exact rather than fuzzy: no
//! edit distance, no phonetic keys. Sex never rules a match out.
//!
//! An absent date of birth on either side never matches, even when the names agree.

use crate::normalize::{normalize_text, NormalizedPatient};
use crate::outcome::DuplicateMatch;
use crate::patient::PatientRecord;

/// Duplicate-matching operations.
///
/// Zero-sized namespace; all methods are associated functions.
pub struct DuplicateMatcher;

impl DuplicateMatcher {
    /// Returns true if `existing` is a possible duplicate of `candidate`.
    pub fn is_possible_duplicate(candidate: &PatientRecord, existing: &PatientRecord) -> bool {
        Self::matches_normalized(
            &NormalizedPatient::from_record(candidate),
            &NormalizedPatient::from_record(existing),
        )
    }

    /// Compares `candidate` against one existing record, keeping a reference to it.
    pub fn compare<'a>(
        candidate: &PatientRecord,
        existing: &'a PatientRecord,
    ) -> DuplicateMatch<'a> {
        DuplicateMatch {
            is_duplicate: Self::is_possible_duplicate(candidate, existing),
            existing,
        }
    }

    /// Returns every record in `existing` that matches `candidate`, in input order.
    ///
    /// The candidate is normalised once for the whole scan.
    pub fn find_matches<'a>(
        candidate: &PatientRecord,
        existing: &'a [PatientRecord],
    ) -> Vec<&'a PatientRecord> {
        let normalized = NormalizedPatient::from_record(candidate);
        existing
            .iter()
            .filter(|other| {
                Self::matches_normalized(&normalized, &NormalizedPatient::from_record(other))
            })
            .collect()
    }

    /// Cuts `records` down to `limit` entries without losing any that could match.
    ///
    /// Records whose normalised full name equals `full_name` are all kept, in input
    /// order, even when there are more of them than `limit`. Remaining slots go to the
    /// other records in input order.
    pub(crate) fn bound_candidates(
        full_name: &str,
        records: Vec<PatientRecord>,
        limit: usize,
    ) -> Vec<PatientRecord> {
        let wanted = normalize_text(full_name);
        let (mut kept, others): (Vec<_>, Vec<_>) = records
            .into_iter()
            .partition(|record| normalize_text(&record.full_name()) == wanted);

        let room = limit.saturating_sub(kept.len());
        kept.extend(others.into_iter().take(room));
        kept
    }

    pub(crate) fn matches_normalized(a: &NormalizedPatient, b: &NormalizedPatient) -> bool {
        let (Some(a_dob), Some(b_dob)) = (a.date_of_birth, b.date_of_birth) else {
            return false;
        };

        a_dob == b_dob && a.full_name == b.full_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patient::{PatientId, Sex};
    use chrono::NaiveDate;

    fn dob(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn john_smith() -> PatientRecord {
        PatientRecord::new("John", "Smith").with_date_of_birth(dob(2020, 1, 1))
    }

    #[test]
    fn test_record_matches_itself() {
        let record = john_smith();
        assert!(DuplicateMatcher::is_possible_duplicate(&record, &record));
    }

    #[test]
    fn test_match_ignores_case_and_spacing() {
        let existing = PatientRecord::new(" JOHN", "smith  ").with_date_of_birth(dob(2020, 1, 1));
        assert!(DuplicateMatcher::is_possible_duplicate(
            &john_smith(),
            &existing
        ));
    }

    #[test]
    fn test_different_date_of_birth_does_not_match() {
        let existing = PatientRecord::new("John", "Smith").with_date_of_birth(dob(2020, 1, 2));
        assert!(!DuplicateMatcher::is_possible_duplicate(
            &john_smith(),
            &existing
        ));
    }

    #[test]
    fn test_different_name_does_not_match() {
        let existing = PatientRecord::new("Jon", "Smith").with_date_of_birth(dob(2020, 1, 1));
        assert!(!DuplicateMatcher::is_possible_duplicate(
            &john_smith(),
            &existing
        ));
    }

    #[test]
    fn test_absent_date_of_birth_never_matches() {
        let without_dob = PatientRecord::new("John", "Smith");

        assert!(!DuplicateMatcher::is_possible_duplicate(
            &without_dob,
            &john_smith()
        ));
        assert!(!DuplicateMatcher::is_possible_duplicate(
            &john_smith(),
            &without_dob
        ));
        assert!(!DuplicateMatcher::is_possible_duplicate(
            &without_dob,
            &without_dob
        ));
    }

    #[test]
    fn test_sex_does_not_rule_out_a_match() {
        let candidate = john_smith().with_sex(Sex::Male);
        let existing = john_smith().with_sex(Sex::Female);
        assert!(DuplicateMatcher::is_possible_duplicate(
            &candidate, &existing
        ));
    }

    #[test]
    fn test_compare_keeps_reference_to_existing() {
        let existing = john_smith().with_id(PatientId::new("A1"));
        let result = DuplicateMatcher::compare(&john_smith(), &existing);

        assert!(result.is_duplicate);
        assert_eq!(result.existing.id, Some(PatientId::new("A1")));
    }

    #[test]
    fn test_find_matches_returns_exact_subset_in_order() {
        let existing = vec![
            john_smith().with_id(PatientId::new("A1")),
            PatientRecord::new("John", "Smithson")
                .with_date_of_birth(dob(2020, 1, 1))
                .with_id(PatientId::new("B2")),
            PatientRecord::new("john", "SMITH")
                .with_date_of_birth(dob(2020, 1, 1))
                .with_id(PatientId::new("C3")),
            PatientRecord::new("John", "Smith").with_id(PatientId::new("D4")),
        ];

        let matches = DuplicateMatcher::find_matches(&john_smith(), &existing);
        let ids: Vec<_> = matches
            .iter()
            .filter_map(|r| r.id.as_ref().map(PatientId::as_str))
            .collect();

        assert_eq!(ids, vec!["A1", "C3"]);
    }

    fn ids(records: &[PatientRecord]) -> Vec<&str> {
        records
            .iter()
            .filter_map(|r| r.id.as_ref().map(PatientId::as_str))
            .collect()
    }

    #[test]
    fn test_bound_candidates_puts_exact_names_first() {
        let records = vec![
            PatientRecord::new("Ann John", "Smith").with_id(PatientId::new("A1")),
            PatientRecord::new("Bea John", "Smith").with_id(PatientId::new("B2")),
            PatientRecord::new("JOHN", " smith").with_id(PatientId::new("C3")),
        ];

        let bounded = DuplicateMatcher::bound_candidates("John Smith", records, 2);
        assert_eq!(ids(&bounded), vec!["C3", "A1"]);
    }

    #[test]
    fn test_bound_candidates_keeps_every_exact_name_past_the_limit() {
        let records = vec![
            PatientRecord::new("John", "Smithers").with_id(PatientId::new("A1")),
            john_smith().with_id(PatientId::new("B2")),
            john_smith().with_id(PatientId::new("C3")),
            john_smith().with_id(PatientId::new("D4")),
        ];

        let bounded = DuplicateMatcher::bound_candidates("John Smith", records, 2);
        assert_eq!(ids(&bounded), vec!["B2", "C3", "D4"]);
    }
}
