//! Patient record types.
//!
//! [`PatientRecord`] is the single entity the intake pipeline handles: a candidate
//! before it is saved, and an existing record once a store has issued it an id.

use chrono::NaiveDate;
use registry_uuid::ShardableUuid;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Opaque identifier issued by a store on first save.
///
/// The file-backed repository issues canonical 32-hex UUIDs, but nothing in the
/// matching or orchestration code depends on that shape.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PatientId(String);

impl PatientId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PatientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<ShardableUuid> for PatientId {
    fn from(value: ShardableUuid) -> Self {
        Self(value.to_string())
    }
}

impl From<&ShardableUuid> for PatientId {
    fn from(value: &ShardableUuid) -> Self {
        Self(value.to_string())
    }
}

/// Administrative sex as recorded at intake.
///
/// Informational only for duplicate detection; see [`crate::matcher`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
    Other,
    Unknown,
}

impl Sex {
    pub fn as_str(self) -> &'static str {
        match self {
            Sex::Male => "male",
            Sex::Female => "female",
            Sex::Other => "other",
            Sex::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sex {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "male" => Ok(Sex::Male),
            "female" => Ok(Sex::Female),
            "other" => Ok(Sex::Other),
            "unknown" => Ok(Sex::Unknown),
            other => Err(format!(
                "unknown sex '{other}' (expected male, female, other or unknown)"
            )),
        }
    }
}

impl From<Sex> for fhir::AdministrativeGender {
    fn from(value: Sex) -> Self {
        match value {
            Sex::Male => fhir::AdministrativeGender::Male,
            Sex::Female => fhir::AdministrativeGender::Female,
            Sex::Other => fhir::AdministrativeGender::Other,
            Sex::Unknown => fhir::AdministrativeGender::Unknown,
        }
    }
}

impl From<fhir::AdministrativeGender> for Sex {
    fn from(value: fhir::AdministrativeGender) -> Self {
        match value {
            fhir::AdministrativeGender::Male => Sex::Male,
            fhir::AdministrativeGender::Female => Sex::Female,
            fhir::AdministrativeGender::Other => Sex::Other,
            fhir::AdministrativeGender::Unknown => Sex::Unknown,
        }
    }
}

/// Identity and demographic attributes of one patient.
///
/// Fields may be partially filled before a save; validation decides whether the record
/// is acceptable. There is deliberately no stored full name: see [`PatientRecord::full_name`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientRecord {
    /// Present only after persistence.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<PatientId>,
    #[serde(default)]
    pub given_name: String,
    #[serde(default)]
    pub family_name: String,
    #[serde(default)]
    pub sex: Option<Sex>,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
}

impl PatientRecord {
    /// Builds an unsaved record from its name parts.
    pub fn new(given_name: impl Into<String>, family_name: impl Into<String>) -> Self {
        Self {
            given_name: given_name.into(),
            family_name: family_name.into(),
            ..Self::default()
        }
    }

    pub fn with_sex(mut self, sex: Sex) -> Self {
        self.sex = Some(sex);
        self
    }

    pub fn with_date_of_birth(mut self, date_of_birth: NaiveDate) -> Self {
        self.date_of_birth = Some(date_of_birth);
        self
    }

    pub fn with_id(mut self, id: PatientId) -> Self {
        self.id = Some(id);
        self
    }

    /// Given name and family name joined by a single space.
    ///
    /// Computed from the current name parts on every call. Each part is trimmed, and a
    /// missing part does not leave a dangling separator.
    pub fn full_name(&self) -> String {
        let given = self.given_name.trim();
        let family = self.family_name.trim();
        format!("{given} {family}").trim().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_name_joins_parts() {
        let record = PatientRecord::new("John", "Smith");
        assert_eq!(record.full_name(), "John Smith");
    }

    #[test]
    fn test_full_name_tracks_field_changes() {
        let mut record = PatientRecord::new("John", "Smith");
        record.family_name = "Jones".into();
        assert_eq!(record.full_name(), "John Jones");
    }

    #[test]
    fn test_full_name_with_missing_part() {
        assert_eq!(PatientRecord::new("", "Smith").full_name(), "Smith");
        assert_eq!(PatientRecord::new("  John ", "").full_name(), "John");
        assert_eq!(PatientRecord::default().full_name(), "");
    }

    #[test]
    fn test_sex_parses_case_insensitively() {
        assert_eq!("Female".parse::<Sex>(), Ok(Sex::Female));
        assert_eq!(" male ".parse::<Sex>(), Ok(Sex::Male));
        assert!("m".parse::<Sex>().is_err());
    }

    #[test]
    fn test_record_deserialises_with_missing_fields() {
        let record: PatientRecord =
            serde_json::from_str(r#"{"given_name":"John","date_of_birth":"2020-01-01"}"#)
                .expect("partial record should deserialise");

        assert_eq!(record.given_name, "John");
        assert_eq!(record.family_name, "");
        assert_eq!(record.sex, None);
        assert_eq!(record.date_of_birth, NaiveDate::from_ymd_opt(2020, 1, 1));
        assert!(record.id.is_none());
    }

    #[test]
    fn test_patient_id_from_shardable_uuid() {
        let uuid = ShardableUuid::parse("550e8400e29b41d4a716446655440000").unwrap();
        let id = PatientId::from(&uuid);
        assert_eq!(id.as_str(), "550e8400e29b41d4a716446655440000");
    }
}
