//! Default field validation for intake.
//!
//! [`StandardFieldValidator`] applies the registry's basic rules before any duplicate
//! check runs. Messages are plain English; field keys use the caller-facing camelCase
//! names (`givenName`, `familyName`, `dateOfBirth`).

use crate::collaborators::FieldValidator;
use crate::outcome::FieldErrors;
use crate::patient::PatientRecord;
use chrono::{NaiveDate, Utc};
use registry_types::{NamePart, TextError};

pub const GIVEN_NAME_FIELD: &str = "givenName";
pub const FAMILY_NAME_FIELD: &str = "familyName";
pub const DATE_OF_BIRTH_FIELD: &str = "dateOfBirth";

/// Field validator enforcing:
/// - `givenName` is present and contains no digits,
/// - `familyName`, when given, contains no digits,
/// - `dateOfBirth`, when given, is not after today.
#[derive(Clone, Debug, Default)]
pub struct StandardFieldValidator {
    today: Option<NaiveDate>,
}

impl StandardFieldValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pins "today" for the future-date rule instead of reading the UTC clock.
    pub fn with_today(today: NaiveDate) -> Self {
        Self { today: Some(today) }
    }

    fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Utc::now().date_naive())
    }
}

impl FieldValidator for StandardFieldValidator {
    fn validate(&self, record: &PatientRecord) -> FieldErrors {
        let mut errors = FieldErrors::new();

        match NamePart::parse(&record.given_name) {
            Ok(_) => {}
            Err(TextError::Empty) => {
                errors.insert(GIVEN_NAME_FIELD.into(), "Given name is required".into());
            }
            Err(TextError::ContainsDigit) => {
                errors.insert(
                    GIVEN_NAME_FIELD.into(),
                    "Given name cannot contain numbers".into(),
                );
            }
        }

        if let Err(TextError::ContainsDigit) = NamePart::parse(&record.family_name) {
            errors.insert(
                FAMILY_NAME_FIELD.into(),
                "Family name cannot contain numbers".into(),
            );
        }

        if let Some(dob) = record.date_of_birth {
            if dob > self.today() {
                errors.insert(
                    DATE_OF_BIRTH_FIELD.into(),
                    "Date of birth cannot be in the future".into(),
                );
            }
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator() -> StandardFieldValidator {
        StandardFieldValidator::with_today(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap())
    }

    #[test]
    fn test_valid_record_has_no_errors() {
        let record = PatientRecord::new("John", "Smith")
            .with_date_of_birth(NaiveDate::from_ymd_opt(2020, 1, 1).unwrap());
        assert!(validator().validate(&record).is_empty());
    }

    #[test]
    fn test_empty_given_name_is_required() {
        let errors = validator().validate(&PatientRecord::new("", "Smith"));
        assert_eq!(
            errors.get(GIVEN_NAME_FIELD).map(String::as_str),
            Some("Given name is required")
        );
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_family_name_is_optional() {
        assert!(validator().validate(&PatientRecord::new("John", "")).is_empty());
    }

    #[test]
    fn test_digits_in_names_are_rejected() {
        let errors = validator().validate(&PatientRecord::new("J0hn", "Sm1th"));
        assert!(errors.contains_key(GIVEN_NAME_FIELD));
        assert!(errors.contains_key(FAMILY_NAME_FIELD));
    }

    #[test]
    fn test_future_date_of_birth_is_rejected() {
        let record = PatientRecord::new("John", "Smith")
            .with_date_of_birth(NaiveDate::from_ymd_opt(2024, 6, 2).unwrap());
        let errors = validator().validate(&record);
        assert!(errors.contains_key(DATE_OF_BIRTH_FIELD));
    }

    #[test]
    fn test_date_of_birth_today_is_accepted() {
        let record = PatientRecord::new("John", "Smith")
            .with_date_of_birth(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
        assert!(validator().validate(&record).is_empty());
    }
}
