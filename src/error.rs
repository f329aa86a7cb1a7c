//! Error taxonomy shared by every pipeline.
//!
//! Validation errors abort an operation before anything on disk is touched.
//! `Io` errors raised while executing are caught per item and turned into
//! failed result lines; they only escape an operation when no item has been
//! attempted yet (e.g. the output root cannot be created).

use std::path::PathBuf;

/// Errors surfaced by the distribution core and its collaborators
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DistributionError {
    /// Input table is missing a required column
    #[error("roster has {found} column(s) but {required} are required: {detail}")]
    Schema {
        required: usize,
        found: usize,
        detail: String,
    },

    /// Nothing to process
    #[error("nothing to process: {0}")]
    EmptyInput(String),

    /// No roster row matched the requested course
    #[error("no roster rows match course \"{course}\"")]
    NoMatch { course: String },

    /// Target root has no subfolders to distribute into
    #[error("no subfolders found in {}", .0.display())]
    NoTargets(PathBuf),

    /// Path does not exist
    #[error("path does not exist: {}", .0.display())]
    NotFound(PathBuf),

    /// Path exists but is not a regular file
    #[error("not a file: {}", .0.display())]
    NotAFile(PathBuf),

    /// Path exists but is not a directory
    #[error("not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    /// Caller supplied an unusable parameter
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A single filesystem call failed
    #[error("I/O error at {}: {message}", path.display())]
    Io { path: PathBuf, message: String },

    /// Roster file could not be read or decoded
    #[error("failed to read roster {}: {message}", path.display())]
    Roster { path: PathBuf, message: String },

    /// Audit trail could not be written
    #[error("audit trail error: {0}")]
    Audit(String),
}

impl DistributionError {
    /// Build an `Io` error carrying the offending path
    pub fn io(path: impl Into<PathBuf>, err: impl std::fmt::Display) -> Self {
        DistributionError::Io {
            path: path.into(),
            message: err.to_string(),
        }
    }

    /// Stable code for callers that render errors
    pub fn code(&self) -> &'static str {
        match self {
            DistributionError::Schema { .. } => "SCHEMA_ERROR",
            DistributionError::EmptyInput(_) => "EMPTY_INPUT",
            DistributionError::NoMatch { .. } => "NO_MATCH",
            DistributionError::NoTargets(_) => "NO_TARGETS",
            DistributionError::NotFound(_) => "NOT_FOUND",
            DistributionError::NotAFile(_) => "NOT_A_FILE",
            DistributionError::NotADirectory(_) => "NOT_A_DIRECTORY",
            DistributionError::InvalidArgument(_) => "INVALID_ARGUMENT",
            DistributionError::Io { .. } => "IO_ERROR",
            DistributionError::Roster { .. } => "ROSTER_ERROR",
            DistributionError::Audit(_) => "AUDIT_ERROR",
        }
    }

    /// Whether this error belongs to the validation phase (no side effects)
    pub fn is_validation(&self) -> bool {
        !matches!(
            self,
            DistributionError::Io { .. } | DistributionError::Audit(_)
        )
    }
}

impl From<DistributionError> for String {
    fn from(err: DistributionError) -> Self {
        err.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_names_path() {
        let err = DistributionError::io("/tmp/a/b.pdf", "permission denied");
        let text = err.to_string();
        assert!(text.contains("/tmp/a/b.pdf"));
        assert!(text.contains("permission denied"));
        assert_eq!(err.code(), "IO_ERROR");
        assert!(!err.is_validation());
    }

    #[test]
    fn test_schema_error_is_validation() {
        let err = DistributionError::Schema {
            required: 5,
            found: 2,
            detail: "account identifier column".to_string(),
        };
        assert!(err.is_validation());
        assert_eq!(err.code(), "SCHEMA_ERROR");
        assert!(err.to_string().contains("2 column(s)"));
    }
}
