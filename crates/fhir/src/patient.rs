//! FHIR-aligned patient wire model and translation helpers.
//!
//! Responsibilities:
//! - Define the domain-level [`PatientData`] carrier used by storage code
//! - Define a strict wire model for YAML serialisation/deserialisation
//! - Translate between the two, rejecting malformed dates and gender codes
//!
//! The wire format allows several names per resource. The registry only ever writes one
//! (`use: official`) and reads back the first.

use crate::{FhirError, FhirResult};
use chrono::{DateTime, NaiveDate, Utc};
use registry_uuid::ShardableUuid;
use serde::{Deserialize, Serialize};

/// Wire date format for `birthDate`.
const BIRTH_DATE_FORMAT: &str = "%Y-%m-%d";

// ============================================================================
// Public domain-level types
// ============================================================================

/// FHIR `AdministrativeGender`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AdministrativeGender {
    Male,
    Female,
    Other,
    Unknown,
}

impl AdministrativeGender {
    fn to_wire(self) -> &'static str {
        match self {
            AdministrativeGender::Male => "male",
            AdministrativeGender::Female => "female",
            AdministrativeGender::Other => "other",
            AdministrativeGender::Unknown => "unknown",
        }
    }

    fn from_wire(s: &str) -> FhirResult<Self> {
        match s {
            "male" => Ok(AdministrativeGender::Male),
            "female" => Ok(AdministrativeGender::Female),
            "other" => Ok(AdministrativeGender::Other),
            "unknown" => Ok(AdministrativeGender::Unknown),
            other => Err(FhirError::Translation(format!(
                "Unsupported gender code '{other}'"
            ))),
        }
    }
}

/// Domain-level carrier for a stored patient resource (flat structure).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PatientData {
    /// Storage identifier for this patient record.
    pub id: ShardableUuid,

    /// Family name (surname).
    pub family: Option<String>,

    /// Given names, in order.
    pub given: Vec<String>,

    pub gender: Option<AdministrativeGender>,

    pub birth_date: Option<NaiveDate>,

    /// Last updated timestamp.
    pub last_updated: Option<DateTime<Utc>>,
}

// ============================================================================
// Public Patient operations
// ============================================================================

/// Patient resource operations.
///
/// Zero-sized namespace for the parse/render pair.
pub struct Patient;

impl Patient {
    /// Parse a patient resource from YAML text.
    ///
    /// Uses `serde_path_to_error` so schema mismatches report the failing path
    /// (for example `name.0.given`).
    ///
    /// # Errors
    ///
    /// Returns [`FhirError`] if:
    /// - the YAML does not match the wire schema (including unknown keys),
    /// - `resourceType` is not `Patient`,
    /// - the id, `birthDate` or `gender` values are malformed.
    pub fn parse(yaml_text: &str) -> FhirResult<PatientData> {
        let deserializer = serde_yaml::Deserializer::from_str(yaml_text);

        let wire = match serde_path_to_error::deserialize::<_, PatientWire>(deserializer) {
            Ok(parsed) => parsed,
            Err(err) => {
                let path = err.path().to_string();
                let source = err.into_inner();
                let path = if path.is_empty() {
                    "<root>"
                } else {
                    path.as_str()
                };
                return Err(FhirError::Translation(format!(
                    "Patient schema mismatch at {path}: {source}"
                )));
            }
        };

        if wire.resource_type != "Patient" {
            return Err(FhirError::InvalidInput(format!(
                "Expected resourceType 'Patient', got '{}'",
                wire.resource_type
            )));
        }

        wire_to_domain(wire)
    }

    /// Render a patient resource as YAML text.
    ///
    /// # Errors
    ///
    /// Returns [`FhirError::Translation`] if serialisation fails.
    pub fn render(data: &PatientData) -> FhirResult<String> {
        let wire = domain_to_wire(data);
        serde_yaml::to_string(&wire)
            .map_err(|e| FhirError::Translation(format!("Failed to serialise patient: {e}")))
    }
}

// ============================================================================
// Wire types (internal)
// ============================================================================

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
struct PatientWire {
    #[serde(rename = "resourceType")]
    resource_type: String,

    id: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    name: Vec<HumanNameWire>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    gender: Option<String>,

    #[serde(
        rename = "birthDate",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    birth_date: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    meta: Option<PatientMetaWire>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
struct HumanNameWire {
    #[serde(rename = "use", default, skip_serializing_if = "Option::is_none")]
    use_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    family: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    given: Vec<String>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
struct PatientMetaWire {
    #[serde(
        rename = "lastUpdated",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    last_updated: Option<String>,
}

// ============================================================================
// Translation helpers (internal)
// ============================================================================

fn wire_to_domain(wire: PatientWire) -> FhirResult<PatientData> {
    let id = ShardableUuid::parse(&wire.id)
        .map_err(|e| FhirError::Translation(format!("Invalid patient ID: {e}")))?;

    let gender = wire
        .gender
        .as_deref()
        .map(AdministrativeGender::from_wire)
        .transpose()?;

    let birth_date = wire
        .birth_date
        .as_deref()
        .map(|s| {
            NaiveDate::parse_from_str(s.trim(), BIRTH_DATE_FORMAT)
                .map_err(|e| FhirError::Translation(format!("Invalid birthDate '{s}': {e}")))
        })
        .transpose()?;

    let last_updated = wire
        .meta
        .and_then(|m| m.last_updated)
        .map(|s| {
            s.parse::<DateTime<Utc>>()
                .map_err(|e| FhirError::Translation(format!("Invalid lastUpdated '{s}': {e}")))
        })
        .transpose()?;

    let (family, given) = match wire.name.into_iter().next() {
        Some(name) => (name.family, name.given),
        None => (None, Vec::new()),
    };

    Ok(PatientData {
        id,
        family,
        given,
        gender,
        birth_date,
        last_updated,
    })
}

fn domain_to_wire(data: &PatientData) -> PatientWire {
    let name = if data.family.is_some() || !data.given.is_empty() {
        vec![HumanNameWire {
            use_type: Some("official".to_string()),
            family: data.family.clone(),
            given: data.given.clone(),
        }]
    } else {
        vec![]
    };

    PatientWire {
        resource_type: "Patient".to_string(),
        id: data.id.to_string(),
        name,
        gender: data.gender.map(|g| g.to_wire().to_string()),
        birth_date: data
            .birth_date
            .map(|d| d.format(BIRTH_DATE_FORMAT).to_string()),
        meta: data.last_updated.map(|lu| PatientMetaWire {
            last_updated: Some(lu.to_rfc3339()),
        }),
    }
}
