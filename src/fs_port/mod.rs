//! Filesystem access used by the distribution engine.
//!
//! The engine only ever talks to a [`FileSystemPort`]; the local-disk
//! implementation lives in [`local`]. Listings are one level deep and come
//! back in a stable order so reports are reproducible.

pub mod local;

pub use local::LocalFileSystem;

use crate::error::DistributionError;
use serde::{Deserialize, Serialize};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// Kind of a listed entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    File,
    Directory,
}

/// A discovered file or directory; identity is its path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileSystemEntry {
    pub path: PathBuf,
    pub kind: EntryKind,
}

impl FileSystemEntry {
    pub fn new(path: impl Into<PathBuf>, kind: EntryKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }

    /// Final path component as stored on disk; join destinations with this
    pub fn file_name(&self) -> &OsStr {
        self.path
            .file_name()
            .unwrap_or_else(|| self.path.as_os_str())
    }

    /// Final path component for display and key derivation (lossy)
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.path.to_string_lossy().to_string())
    }

    pub fn parent(&self) -> Option<&Path> {
        self.path.parent()
    }

    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }
}

/// Filesystem operations the engine needs.
///
/// Mutating calls fail with [`DistributionError::Io`] carrying the
/// offending path.
pub trait FileSystemPort {
    /// Regular files directly inside `dir`
    fn list_files(&self, dir: &Path) -> Result<Vec<FileSystemEntry>, DistributionError>;

    /// Directories directly inside `dir`
    fn list_dirs(&self, dir: &Path) -> Result<Vec<FileSystemEntry>, DistributionError>;

    fn exists(&self, path: &Path) -> bool;

    fn is_file(&self, path: &Path) -> bool;

    fn is_dir(&self, path: &Path) -> bool;

    /// Create `path` and any missing parents
    fn create_dir(&self, path: &Path) -> Result<(), DistributionError>;

    /// Copy a file, replacing `dst` if present; optionally keep timestamps
    fn copy(&self, src: &Path, dst: &Path, preserve_metadata: bool)
        -> Result<(), DistributionError>;

    fn rename(&self, src: &Path, dst: &Path) -> Result<(), DistributionError>;
}

/// Precondition check shared by the pipelines
pub fn require_dir(fs: &dyn FileSystemPort, path: &Path) -> Result<(), DistributionError> {
    if !fs.exists(path) {
        return Err(DistributionError::NotFound(path.to_path_buf()));
    }
    if !fs.is_dir(path) {
        return Err(DistributionError::NotADirectory(path.to_path_buf()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_name_and_parent() {
        let entry = FileSystemEntry::new("/srv/roster/tanaka01.pdf", EntryKind::File);
        assert_eq!(entry.name(), "tanaka01.pdf");
        assert_eq!(entry.file_name(), OsStr::new("tanaka01.pdf"));
        assert_eq!(entry.parent(), Some(Path::new("/srv/roster")));
        assert!(entry.is_file());
        assert!(!entry.is_dir());
    }
}
