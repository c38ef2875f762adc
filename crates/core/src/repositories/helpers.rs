//! Repository-related utilities.
//!
//! Directory allocation and traversal of the sharded record layout.

use crate::constants::{MAX_DIR_ALLOCATION_ATTEMPTS, PATIENT_FILE_NAME};
use crate::{PatientError, PatientResult};
use registry_uuid::ShardableUuid;
use std::{
    fs,
    io::{self, ErrorKind},
    path::{Path, PathBuf},
};

/// Creates a unique sharded directory within `base_dir`.
///
/// Identifiers are drawn from `uuid_source` until one maps to a directory that does not
/// yet exist. Collisions (or directories left behind by external interference) are
/// retried up to [`MAX_DIR_ALLOCATION_ATTEMPTS`] times.
///
/// # Returns
///
/// The allocated identifier and the path of the created directory.
///
/// # Errors
///
/// Returns `PatientError::PatientDirCreation` if:
/// - no free directory was found within the attempt limit,
/// - a parent directory could not be created.
pub(crate) fn create_unique_shared_dir(
    base_dir: &Path,
    mut uuid_source: impl FnMut() -> ShardableUuid,
) -> PatientResult<(ShardableUuid, PathBuf)> {
    for _attempt in 0..MAX_DIR_ALLOCATION_ATTEMPTS {
        let uuid = uuid_source();
        let candidate = uuid.sharded_dir(base_dir);

        if candidate.exists() {
            continue;
        }

        if let Some(parent) = candidate.parent() {
            fs::create_dir_all(parent).map_err(PatientError::PatientDirCreation)?;
        }

        match fs::create_dir(&candidate) {
            Ok(()) => return Ok((uuid, candidate)),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(PatientError::PatientDirCreation(e)),
        }
    }

    Err(PatientError::PatientDirCreation(io::Error::new(
        ErrorKind::AlreadyExists,
        format!(
            "failed to allocate a unique patient directory after {MAX_DIR_ALLOCATION_ATTEMPTS} attempts"
        ),
    )))
}

/// Collects every `<s1>/<s2>/<uuid>/patient.yaml` path below `base_dir`.
///
/// A missing `base_dir` yields an empty list. Plain files at the shard levels are
/// ignored, as are record directories without a `patient.yaml`.
///
/// # Errors
///
/// Returns the first I/O error raised while reading a directory or one of its entries.
pub(crate) fn sharded_patient_files(base_dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    let s1_iter = match fs::read_dir(base_dir) {
        Ok(it) => it,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(files),
        Err(e) => return Err(e),
    };

    for s1 in s1_iter {
        let s1_path = s1?.path();
        if !s1_path.is_dir() {
            continue;
        }

        for s2 in fs::read_dir(&s1_path)? {
            let s2_path = s2?.path();
            if !s2_path.is_dir() {
                continue;
            }

            for id_ent in fs::read_dir(&s2_path)? {
                let patient_path = id_ent?.path().join(PATIENT_FILE_NAME);
                if patient_path.is_file() {
                    files.push(patient_path);
                }
            }
        }
    }

    Ok(files)
}
