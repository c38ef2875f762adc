//! Canonical identifiers and sharded-path utilities.
//!
//! The registry stores each patient under a directory derived from a UUID. To keep path
//! derivation deterministic, storage identifiers use one canonical form:
//! **32 lowercase hexadecimal characters**, no hyphens.
//!
//! ## Sharded directory layout
//! For a canonical UUID `u`, records live under:
//! `parent_dir/<u[0..2]>/<u[2..4]>/<u>/`
//!
//! Example:
//! `patient_data/demographics/55/0e/550e8400e29b41d4a716446655440000/`

mod shard;

pub use shard::{ShardableUuid, Uuid};

/// Error type for UUID operations.
#[derive(Debug, thiserror::Error)]
pub enum UuidError {
    /// Invalid input provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for UUID operations.
pub type UuidResult<T> = Result<T, UuidError>;
