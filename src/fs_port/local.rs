//! Local-disk [`FileSystemPort`].

use super::{EntryKind, FileSystemEntry, FileSystemPort};
use crate::error::DistributionError;
use filetime::FileTime;
use same_file::is_same_file;
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

/// Filesystem port backed by `std::fs`.
///
/// Listings follow symlinks and are sorted by file name.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFileSystem;

impl LocalFileSystem {
    pub fn new() -> Self {
        Self
    }

    fn list_entries(
        &self,
        dir: &Path,
        kind: EntryKind,
    ) -> Result<Vec<FileSystemEntry>, DistributionError> {
        let mut entries = Vec::new();

        let walker = WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name();

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                // Failure to open the directory itself is fatal
                Err(e) if e.depth() == 0 => return Err(DistributionError::io(dir, e)),
                Err(e) => {
                    tracing::warn!(dir = %dir.display(), error = %e, "Skipping unreadable entry");
                    continue;
                }
            };

            let file_type = entry.file_type();
            let entry_kind = if file_type.is_dir() {
                EntryKind::Directory
            } else if file_type.is_file() {
                EntryKind::File
            } else {
                continue;
            };

            if entry_kind == kind {
                entries.push(FileSystemEntry::new(entry.into_path(), kind));
            }
        }

        Ok(entries)
    }
}

/// Apply the source's access/modification times to `dst`.
///
/// The data is already in place, so a failure only loses timestamps and is
/// logged rather than failing the copy.
fn preserve_times(source: &fs::Metadata, dst: &Path) -> bool {
    let atime = FileTime::from_last_access_time(source);
    let mtime = FileTime::from_last_modification_time(source);
    match filetime::set_file_times(dst, atime, mtime) {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(path = %dst.display(), error = %e, "Copied without preserving timestamps");
            false
        }
    }
}

impl FileSystemPort for LocalFileSystem {
    fn list_files(&self, dir: &Path) -> Result<Vec<FileSystemEntry>, DistributionError> {
        self.list_entries(dir, EntryKind::File)
    }

    fn list_dirs(&self, dir: &Path) -> Result<Vec<FileSystemEntry>, DistributionError> {
        self.list_entries(dir, EntryKind::Directory)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn create_dir(&self, path: &Path) -> Result<(), DistributionError> {
        fs::create_dir_all(path).map_err(|e| DistributionError::io(path, e))
    }

    fn copy(
        &self,
        src: &Path,
        dst: &Path,
        preserve_metadata: bool,
    ) -> Result<(), DistributionError> {
        // Copying a file onto itself truncates it
        if dst.exists() && is_same_file(src, dst).map_err(|e| DistributionError::io(dst, e))? {
            return Err(DistributionError::io(
                dst,
                "source and destination are the same file",
            ));
        }

        let metadata = fs::metadata(src).map_err(|e| DistributionError::io(src, e))?;
        fs::copy(src, dst).map_err(|e| DistributionError::io(dst, e))?;

        if preserve_metadata {
            preserve_times(&metadata, dst);
        }

        Ok(())
    }

    fn rename(&self, src: &Path, dst: &Path) -> Result<(), DistributionError> {
        fs::rename(src, dst).map_err(|e| DistributionError::io(src, e))
    }
}
