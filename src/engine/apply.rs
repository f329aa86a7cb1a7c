//! Idempotent single-item mutations.
//!
//! Each helper inspects the destination first and resolves an existing entry
//! according to a [`ConflictPolicy`], so re-running a batch never duplicates
//! work that already happened.

use crate::error::DistributionError;
use crate::fs_port::FileSystemPort;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Policy for handling an existing destination
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictPolicy {
    /// Return an error for this item
    #[default]
    Fail,
    /// Leave the destination alone and record a skip
    Skip,
    /// Replace the destination
    Overwrite,
}

/// Outcome of a single mutation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// Mutation performed
    Completed,
    /// Nothing to do (includes reason)
    Skipped(String),
}

/// Create a directory unless it already exists
pub fn apply_create_dir(
    fs: &dyn FileSystemPort,
    path: &Path,
) -> Result<ApplyOutcome, DistributionError> {
    if fs.exists(path) {
        if fs.is_dir(path) {
            return Ok(ApplyOutcome::Skipped("already exists".to_string()));
        }
        return Err(DistributionError::io(
            path,
            "a file with this name already exists",
        ));
    }

    fs.create_dir(path)?;
    Ok(ApplyOutcome::Completed)
}

/// Copy `source` to `destination`, preserving timestamps
pub fn apply_copy(
    fs: &dyn FileSystemPort,
    source: &Path,
    destination: &Path,
    policy: ConflictPolicy,
) -> Result<ApplyOutcome, DistributionError> {
    if !fs.exists(source) {
        return Err(DistributionError::NotFound(source.to_path_buf()));
    }

    if fs.exists(destination) {
        match policy {
            ConflictPolicy::Skip => {
                return Ok(ApplyOutcome::Skipped("already exists".to_string()));
            }
            ConflictPolicy::Fail => {
                return Err(DistributionError::io(
                    destination,
                    "destination already exists",
                ));
            }
            ConflictPolicy::Overwrite => {
                if fs.is_dir(destination) {
                    return Err(DistributionError::io(
                        destination,
                        "a directory with this name already exists",
                    ));
                }
            }
        }
    }

    fs.copy(source, destination, true)?;
    Ok(ApplyOutcome::Completed)
}

/// Rename `source` to `destination` within the same folder
pub fn apply_rename(
    fs: &dyn FileSystemPort,
    source: &Path,
    destination: &Path,
    policy: ConflictPolicy,
) -> Result<ApplyOutcome, DistributionError> {
    if source == destination {
        return Ok(ApplyOutcome::Skipped("already named".to_string()));
    }

    if !fs.exists(source) {
        return Err(DistributionError::NotFound(source.to_path_buf()));
    }

    if fs.exists(destination) {
        match policy {
            ConflictPolicy::Skip => {
                return Ok(ApplyOutcome::Skipped(format!(
                    "target exists: {}",
                    destination.display()
                )));
            }
            ConflictPolicy::Fail => {
                return Err(DistributionError::io(
                    destination,
                    "target already exists",
                ));
            }
            ConflictPolicy::Overwrite => {}
        }
    }

    fs.rename(source, destination)?;
    Ok(ApplyOutcome::Completed)
}
