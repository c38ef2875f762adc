//! File-backed patient demographics.
//!
//! [`DemographicsRepository`] is the default [`PatientStore`] and [`CandidateLookup`]
//! for the registry. Each record is one YAML file:
//!
//! ```text
//! demographics/
//!   <s1>/
//!     <s2>/
//!       <uuid>/
//!         patient.yaml    # FHIR-aligned patient resource
//! ```
//!
//! where `s1` and `s2` are the first four hex characters of the UUID.
//!
//! The synchronous methods do blocking filesystem I/O. The trait implementations move
//! that work onto tokio's blocking pool.

use crate::collaborators::{CandidateLookup, PatientStore};
use crate::config::CoreConfig;
use crate::constants::PATIENT_FILE_NAME;
use crate::error::{PatientError, PatientResult};
use crate::matcher::DuplicateMatcher;
use crate::normalize::normalize_text;
use crate::patient::{PatientId, PatientRecord};
use crate::repositories::helpers::{create_unique_shared_dir, sharded_patient_files};
use async_trait::async_trait;
use chrono::Utc;
use fhir::{Patient, PatientData};
use registry_uuid::ShardableUuid;
use std::fs;
use std::path::Path;
use std::sync::Arc;

// ============================================================================
// RECORD <-> RESOURCE TRANSLATION
// ============================================================================

fn record_to_resource(id: ShardableUuid, record: &PatientRecord) -> PatientData {
    let given = record.given_name.trim();
    let family = record.family_name.trim();

    PatientData {
        id,
        family: (!family.is_empty()).then(|| family.to_string()),
        given: if given.is_empty() {
            vec![]
        } else {
            vec![given.to_string()]
        },
        gender: record.sex.map(Into::into),
        birth_date: record.date_of_birth,
        last_updated: Some(Utc::now()),
    }
}

fn resource_to_record(data: PatientData) -> PatientRecord {
    PatientRecord {
        id: Some(PatientId::from(&data.id)),
        given_name: data.given.into_iter().next().unwrap_or_default(),
        family_name: data.family.unwrap_or_default(),
        sex: data.gender.map(Into::into),
        date_of_birth: data.birth_date,
    }
}

fn read_record(path: &Path) -> PatientResult<PatientRecord> {
    let contents = fs::read_to_string(path).map_err(PatientError::FileRead)?;
    let data = Patient::parse(&contents)?;
    Ok(resource_to_record(data))
}

fn sort_by_name(records: &mut [PatientRecord]) {
    records.sort_by(|a, b| {
        a.full_name()
            .to_lowercase()
            .cmp(&b.full_name().to_lowercase())
            .then_with(|| a.id.cmp(&b.id))
    });
}

// ============================================================================
// DEMOGRAPHICS REPOSITORY
// ============================================================================

/// Sharded YAML storage for patient demographics.
#[derive(Clone, Debug)]
pub struct DemographicsRepository {
    cfg: Arc<CoreConfig>,
}

impl DemographicsRepository {
    pub fn new(cfg: Arc<CoreConfig>) -> Self {
        Self { cfg }
    }

    /// Writes `record` to disk.
    ///
    /// A record without an id gets a freshly allocated directory and identifier. A
    /// record with an id replaces the stored resource for that id.
    ///
    /// # Returns
    ///
    /// The stored record, carrying its id.
    ///
    /// # Errors
    ///
    /// Returns `PatientError` if:
    /// - the demographics directory or the record directory cannot be created,
    /// - an existing id is malformed ([`PatientError::Uuid`]) or unknown ([`PatientError::NotFound`]),
    /// - rendering or writing `patient.yaml` fails.
    ///
    /// A newly allocated directory is removed again if its file cannot be written.
    pub fn write(&self, record: PatientRecord) -> PatientResult<PatientRecord> {
        let demographics_dir = self.cfg.demographics_dir();

        match record.id.as_ref() {
            None => {
                fs::create_dir_all(&demographics_dir).map_err(PatientError::StorageDirCreation)?;
                let (uuid, patient_dir) =
                    create_unique_shared_dir(&demographics_dir, ShardableUuid::new)?;

                let resource = record_to_resource(uuid.clone(), &record);
                if let Err(e) = write_resource(&patient_dir, &resource) {
                    if let Err(cleanup) = fs::remove_dir_all(&patient_dir) {
                        tracing::warn!(
                            "failed to remove partially created record {}: {}",
                            patient_dir.display(),
                            cleanup
                        );
                    }
                    return Err(e);
                }

                tracing::debug!(id = %uuid, "patient record created");
                Ok(record.with_id(PatientId::from(uuid)))
            }
            Some(id) => {
                let uuid = ShardableUuid::parse(id.as_str())?;
                let patient_dir = uuid.sharded_dir(&demographics_dir);
                if !patient_dir.join(PATIENT_FILE_NAME).is_file() {
                    return Err(PatientError::NotFound(id.to_string()));
                }

                write_resource(&patient_dir, &record_to_resource(uuid, &record))?;
                tracing::debug!(id = %id, "patient record replaced");
                Ok(record)
            }
        }
    }

    /// Reads one record by id.
    ///
    /// # Errors
    ///
    /// Returns [`PatientError::Uuid`] for a malformed id, [`PatientError::NotFound`] if no
    /// record exists, or a read/parse error.
    pub fn load(&self, id: &str) -> PatientResult<PatientRecord> {
        let uuid = ShardableUuid::parse(id)?;
        let path = uuid
            .sharded_dir(&self.cfg.demographics_dir())
            .join(PATIENT_FILE_NAME);
        if !path.is_file() {
            return Err(PatientError::NotFound(id.to_string()));
        }
        read_record(&path)
    }

    /// Lists every stored record, ordered by full name then id.
    ///
    /// Files that cannot be read or parsed are logged and skipped. If the storage
    /// directory itself cannot be traversed the failure is logged and the list is empty.
    pub fn list_patients(&self) -> Vec<PatientRecord> {
        let demographics_dir = self.cfg.demographics_dir();
        let files = match sharded_patient_files(&demographics_dir) {
            Ok(files) => files,
            Err(e) => {
                tracing::warn!("failed to traverse {}: {}", demographics_dir.display(), e);
                return Vec::new();
            }
        };

        let mut patients: Vec<PatientRecord> = files
            .into_iter()
            .filter_map(|path| match read_record(&path) {
                Ok(record) => Some(record),
                Err(e) => {
                    tracing::warn!("failed to load {}: {}", path.display(), e);
                    None
                }
            })
            .collect();

        sort_by_name(&mut patients);
        patients
    }

    /// Returns records whose full name contains `query`.
    ///
    /// Matching ignores case and collapses runs of whitespace. A blank query matches
    /// nothing. Records whose full name equals the query come first, then the others
    /// ordered by full name. Exact-name records are never cut; the remaining hits fill
    /// up to `max_candidates`.
    ///
    /// # Errors
    ///
    /// Unlike [`list_patients`](Self::list_patients), any record that cannot be read
    /// ([`PatientError::FileRead`]) or parsed ([`PatientError::Fhir`]) fails the whole
    /// search, as does a storage directory that cannot be traversed
    /// ([`PatientError::StorageRead`]). A partial candidate set could hide a duplicate.
    pub fn search_by_name(&self, query: &str) -> PatientResult<Vec<PatientRecord>> {
        let needle = normalize_text(query);
        if needle.is_empty() {
            return Ok(Vec::new());
        }

        let files = sharded_patient_files(&self.cfg.demographics_dir())
            .map_err(PatientError::StorageRead)?;

        let mut found = Vec::new();
        for path in files {
            let record = read_record(&path)?;
            if normalize_text(&record.full_name()).contains(&needle) {
                found.push(record);
            }
        }

        sort_by_name(&mut found);
        Ok(DuplicateMatcher::bound_candidates(
            query,
            found,
            self.cfg.max_candidates(),
        ))
    }
}

fn write_resource(patient_dir: &Path, resource: &PatientData) -> PatientResult<()> {
    let yaml = Patient::render(resource)?;
    fs::write(patient_dir.join(PATIENT_FILE_NAME), yaml).map_err(PatientError::FileWrite)
}

#[async_trait]
impl PatientStore for DemographicsRepository {
    async fn save(&self, record: PatientRecord) -> PatientResult<PatientRecord> {
        let repo = self.clone();
        tokio::task::spawn_blocking(move || repo.write(record)).await?
    }
}

#[async_trait]
impl CandidateLookup for DemographicsRepository {
    async fn search(&self, full_name: &str) -> PatientResult<Vec<PatientRecord>> {
        let repo = self.clone();
        let query = full_name.to_string();
        tokio::task::spawn_blocking(move || repo.search_by_name(&query)).await?
    }
}
