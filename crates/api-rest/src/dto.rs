//! JSON request and response bodies.
//!
//! These mirror the core types but keep the wire format independent of them: dates and
//! sex travel as plain strings and are parsed at the edge.

use chrono::NaiveDate;
use registry_core::{PatientId, PatientRecord, Sex};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::{IntoParams, ToSchema};

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

/// A patient as returned by the API.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PatientDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub given_name: String,
    pub family_name: String,
    /// Given and family name joined; always derived from the two parts.
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub sex: Option<String>,
    /// `YYYY-MM-DD`
    #[serde(default)]
    pub date_of_birth: Option<String>,
}

impl From<&PatientRecord> for PatientDto {
    fn from(record: &PatientRecord) -> Self {
        Self {
            id: record.id.as_ref().map(PatientId::to_string),
            given_name: record.given_name.clone(),
            family_name: record.family_name.clone(),
            full_name: record.full_name(),
            sex: record.sex.map(|s| s.as_str().to_string()),
            date_of_birth: record
                .date_of_birth
                .map(|d| d.format(DATE_FORMAT).to_string()),
        }
    }
}

fn default_flag_duplicates() -> bool {
    true
}

/// Body of `POST /patients`.
#[derive(Clone, Debug, Deserialize, ToSchema)]
pub struct CreatePatientReq {
    #[serde(default)]
    pub given_name: String,
    #[serde(default)]
    pub family_name: String,
    /// One of `male`, `female`, `other`, `unknown`.
    #[serde(default)]
    pub sex: Option<String>,
    /// `YYYY-MM-DD`
    #[serde(default)]
    pub date_of_birth: Option<String>,
    /// Hold the save when a possible duplicate exists. Defaults to `true`.
    #[serde(default = "default_flag_duplicates")]
    pub flag_duplicates: bool,
}

impl CreatePatientReq {
    /// Converts the body into a candidate record.
    ///
    /// Blank `sex` and `date_of_birth` values are treated as absent.
    ///
    /// # Errors
    ///
    /// Returns a message naming the field if `sex` or `date_of_birth` cannot be parsed.
    pub fn into_record(self) -> Result<PatientRecord, String> {
        let mut record = PatientRecord::new(self.given_name, self.family_name);

        if let Some(sex) = self.sex.filter(|s| !s.trim().is_empty()) {
            record = record.with_sex(sex.parse::<Sex>()?);
        }

        if let Some(dob) = self.date_of_birth.filter(|d| !d.trim().is_empty()) {
            let date = NaiveDate::parse_from_str(dob.trim(), DATE_FORMAT)
                .map_err(|e| format!("date_of_birth must be YYYY-MM-DD: {e}"))?;
            record = record.with_date_of_birth(date);
        }

        Ok(record)
    }

    /// Whether this request asks for the duplicate check.
    pub fn flag_duplicates(&self) -> bool {
        self.flag_duplicates
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct CreatePatientRes {
    pub patient: PatientDto,
}

/// `422` body: per-field validation messages.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct FieldErrorsRes {
    pub field_errors: BTreeMap<String, String>,
}

/// `409` body: every existing record judged a possible duplicate.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct DuplicatePatientsRes {
    pub count: usize,
    pub matches: Vec<PatientDto>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ListPatientsRes {
    pub patients: Vec<PatientDto>,
}

impl From<&[PatientRecord]> for ListPatientsRes {
    fn from(records: &[PatientRecord]) -> Self {
        Self {
            patients: records.iter().map(PatientDto::from).collect(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorRes {
    pub error: String,
}

#[derive(Clone, Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchParams {
    /// Substring of the full name; case and spacing are ignored.
    #[serde(default)]
    pub name: String,
}
