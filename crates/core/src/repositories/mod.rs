//! Storage backends for patient records.

pub mod demographics;
pub(crate) mod helpers;
