//! OrganizeFiles: route each source file into the target subfolder whose
//! name shares its prefix key.

use super::apply::{apply_copy, ApplyOutcome, ConflictPolicy};
use super::{log_progress, CancelReason, DistributionEngine, Preview, RunOutcome};
use crate::error::DistributionError;
use crate::fs_port::{require_dir, FileSystemEntry};
use crate::keys::{full_prefix_key, prefix_key};
use crate::matching::{find_collisions, match_first, KeyedItem};
use crate::report::{OperationKind, ReportBuilder};
use std::path::Path;

const PROGRESS_EVERY: usize = 10;

fn keyed_files(
    files: Vec<FileSystemEntry>,
    length: usize,
) -> Result<Vec<KeyedItem<FileSystemEntry>>, DistributionError> {
    files
        .into_iter()
        .map(|entry| {
            let key = prefix_key(&entry.name(), length)?.to_string();
            Ok(KeyedItem::new(entry, Some(key)))
        })
        .collect()
}

fn keyed_folders(
    folders: Vec<FileSystemEntry>,
    length: usize,
) -> Result<Vec<KeyedItem<FileSystemEntry>>, DistributionError> {
    folders
        .into_iter()
        .map(|entry| {
            let key = full_prefix_key(&entry.name(), length)?.map(str::to_string);
            Ok(KeyedItem::new(entry, key))
        })
        .collect()
}

impl<'a> DistributionEngine<'a> {
    /// Copy every file in `source` into the first subfolder of `target` whose
    /// first `match_length` characters equal the file's. Files already present
    /// in the destination are skipped, never overwritten.
    pub fn organize_files(
        &self,
        source: &Path,
        target: &Path,
        match_length: usize,
    ) -> Result<RunOutcome, DistributionError> {
        let operation = OperationKind::OrganizeFiles;

        if match_length < 1 {
            return Err(DistributionError::InvalidArgument(format!(
                "match length must be at least 1, got {}",
                match_length
            )));
        }

        require_dir(self.fs, source)?;
        require_dir(self.fs, target)?;

        let files = self.fs.list_files(source)?;
        if files.is_empty() {
            return Err(DistributionError::EmptyInput(format!(
                "no files in {}",
                source.display()
            )));
        }

        let folders = self.fs.list_dirs(target)?;
        if folders.is_empty() {
            return Err(DistributionError::NoTargets(target.to_path_buf()));
        }

        let files = keyed_files(files, match_length)?;
        let folders = keyed_folders(folders, match_length)?;
        let matches = match_first(&files, &folders);
        let collisions = find_collisions(&files, &folders);

        for collision in &collisions {
            tracing::warn!(
                file = %files[collision.source].item.name(),
                key = %collision.key,
                candidates = collision.targets.len(),
                "Prefix key matches several folders, using the first"
            );
        }

        let matched = matches.iter().filter(|m| m.is_matched()).count();
        tracing::info!(
            files = files.len(),
            folders = folders.len(),
            matched,
            match_length,
            "Validated organize inputs"
        );

        let preview = Preview::new(operation, files.len(), target.display().to_string())
            .with_detail("Source", source.display())
            .with_detail("Target folders", folders.len())
            .with_detail("Match length", match_length);
        if !self.confirm_preview(&preview) {
            return Ok(RunOutcome::cancelled(operation, CancelReason::Declined));
        }

        let mut report = ReportBuilder::new(operation, target);
        let total = files.len();

        for (idx, (file, result)) in files.iter().zip(matches.iter()).enumerate() {
            let name = file.item.name();

            match result.resolve(&folders) {
                Some(folder) => {
                    let folder_name = folder.item.name();
                    let destination = folder.item.path.join(file.item.file_name());
                    let subject = format!("{} → {}", name, folder_name);

                    match apply_copy(self.fs, &file.item.path, &destination, ConflictPolicy::Skip) {
                        Ok(ApplyOutcome::Completed) => {
                            tracing::info!(file = %name, folder = %folder_name, "Copied file");
                            report.success(subject);
                        }
                        Ok(ApplyOutcome::Skipped(reason)) => {
                            tracing::info!(file = %name, folder = %folder_name, "File exists, skipped");
                            report.skipped(subject, reason);
                        }
                        Err(err) => {
                            tracing::warn!(file = %name, folder = %folder_name, error = %err, "Failed to copy file");
                            report.failed(subject, err);
                        }
                    }
                }
                None => {
                    let key = file.key.as_deref().unwrap_or_default();
                    tracing::warn!(file = %name, prefix = %key, "No matching folder");
                    report.unmatched(name, format!("prefix: {}", key));
                }
            }

            log_progress(operation, idx + 1, total, PROGRESS_EVERY);
        }

        report.collisions(collisions);
        let report = report.finish();
        tracing::info!(
            copied = report.succeeded(),
            skipped = report.skipped(),
            unmatched = report.unmatched(),
            failed = report.failed(),
            "File organizing complete"
        );
        Ok(RunOutcome::Completed { report })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_support::{FailingFs, ScriptedConfirm};
    use crate::fs_port::LocalFileSystem;
    use crate::report::ReportCounts;
    use std::fs;
    use tempfile::{tempdir, TempDir};

    struct Tree {
        _dir: TempDir,
        source: std::path::PathBuf,
        target: std::path::PathBuf,
    }

    fn tree(files: &[&str], folders: &[&str]) -> Tree {
        let dir = tempdir().unwrap();
        let source = dir.path().join("source");
        let target = dir.path().join("target");
        fs::create_dir_all(&source).unwrap();
        fs::create_dir_all(&target).unwrap();
        for file in files {
            fs::write(source.join(file), format!("content of {}", file)).unwrap();
        }
        for folder in folders {
            fs::create_dir_all(target.join(folder)).unwrap();
        }
        Tree {
            _dir: dir,
            source,
            target,
        }
    }

    #[test]
    fn test_routes_by_prefix_and_counts_unmatched() {
        let t = tree(&["tanaka01.pdf", "suzuki02.pdf"], &["tanaka01@school", "nomatch"]);
        let fs_port = LocalFileSystem::new();
        let confirm = ScriptedConfirm::approving();
        let engine = DistributionEngine::new(&fs_port, &confirm);

        let report = engine
            .organize_files(&t.source, &t.target, 8)
            .unwrap()
            .into_report()
            .unwrap();

        assert_eq!(
            report.counts(),
            ReportCounts {
                succeeded: 1,
                skipped: 0,
                failed: 0,
                unmatched: 1
            }
        );
        assert!(t.target.join("tanaka01@school/tanaka01.pdf").is_file());
        assert!(!t.target.join("nomatch/suzuki02.pdf").exists());
        // source untouched
        assert!(t.source.join("tanaka01.pdf").is_file());
    }

    #[test]
    fn test_second_run_skips_everything_already_copied() {
        let t = tree(&["tanaka01.pdf", "tanaka01_extra.pdf"], &["tanaka01@school"]);
        let fs_port = LocalFileSystem::new();
        let confirm = ScriptedConfirm::approving();
        let engine = DistributionEngine::new(&fs_port, &confirm);

        let first = engine
            .organize_files(&t.source, &t.target, 8)
            .unwrap()
            .into_report()
            .unwrap();
        assert_eq!(first.succeeded(), 2);

        let second = engine
            .organize_files(&t.source, &t.target, 8)
            .unwrap()
            .into_report()
            .unwrap();
        assert_eq!(second.succeeded(), 0);
        assert_eq!(second.skipped(), 2);
    }

    #[test]
    fn test_existing_file_is_never_overwritten() {
        let t = tree(&["tanaka01.pdf"], &["tanaka01@school"]);
        fs::write(t.target.join("tanaka01@school/tanaka01.pdf"), "edited by hand").unwrap();
        let fs_port = LocalFileSystem::new();
        let confirm = ScriptedConfirm::approving();
        let engine = DistributionEngine::new(&fs_port, &confirm);

        let report = engine
            .organize_files(&t.source, &t.target, 8)
            .unwrap()
            .into_report()
            .unwrap();

        assert_eq!(report.skipped(), 1);
        assert_eq!(
            fs::read_to_string(t.target.join("tanaka01@school/tanaka01.pdf")).unwrap(),
            "edited by hand"
        );
    }

    #[test]
    fn test_collision_routes_to_first_and_is_reported() {
        let t = tree(&["tanaka01.pdf"], &["tanaka01@a.jp", "tanaka01@b.jp"]);
        let fs_port = LocalFileSystem::new();
        let confirm = ScriptedConfirm::approving();
        let engine = DistributionEngine::new(&fs_port, &confirm);

        let report = engine
            .organize_files(&t.source, &t.target, 8)
            .unwrap()
            .into_report()
            .unwrap();

        assert_eq!(report.succeeded(), 1);
        assert!(t.target.join("tanaka01@a.jp/tanaka01.pdf").is_file());
        assert!(!t.target.join("tanaka01@b.jp/tanaka01.pdf").exists());
        assert_eq!(report.collisions().len(), 1);
        assert_eq!(report.collisions()[0].key, "tanaka01");
        assert_eq!(report.collisions()[0].targets, vec![0, 1]);
    }

    #[test]
    fn test_short_folder_names_never_match() {
        let t = tree(&["abc.pdf"], &["abc"]);
        let fs_port = LocalFileSystem::new();
        let confirm = ScriptedConfirm::approving();
        let engine = DistributionEngine::new(&fs_port, &confirm);

        let report = engine
            .organize_files(&t.source, &t.target, 8)
            .unwrap()
            .into_report()
            .unwrap();
        assert_eq!(report.unmatched(), 1);
    }

    #[test]
    fn test_custom_match_length() {
        let t = tree(&["s1234-report.pdf"], &["s1234@school"]);
        let fs_port = LocalFileSystem::new();
        let confirm = ScriptedConfirm::approving();
        let engine = DistributionEngine::new(&fs_port, &confirm);

        let report = engine
            .organize_files(&t.source, &t.target, 5)
            .unwrap()
            .into_report()
            .unwrap();
        assert_eq!(report.succeeded(), 1);
        assert!(t.target.join("s1234@school/s1234-report.pdf").is_file());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_non_utf8_name_is_copied_verbatim() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let t = tree(&[], &["tanaka01@school"]);
        let raw = OsStr::from_bytes(b"tanaka01_\xff.pdf");
        fs::write(t.source.join(raw), "scan").unwrap();
        let fs_port = LocalFileSystem::new();
        let confirm = ScriptedConfirm::approving();
        let engine = DistributionEngine::new(&fs_port, &confirm);

        let first = engine
            .organize_files(&t.source, &t.target, 8)
            .unwrap()
            .into_report()
            .unwrap();
        assert_eq!(first.succeeded(), 1);
        assert!(t.target.join("tanaka01@school").join(raw).is_file());
        assert_eq!(fs::read_dir(t.target.join("tanaka01@school")).unwrap().count(), 1);

        let second = engine
            .organize_files(&t.source, &t.target, 8)
            .unwrap()
            .into_report()
            .unwrap();
        assert_eq!(second.skipped(), 1);
    }

    #[test]
    fn test_validation_errors() {
        let t = tree(&[], &[]);
        let fs_port = LocalFileSystem::new();
        let confirm = ScriptedConfirm::approving();
        let engine = DistributionEngine::new(&fs_port, &confirm);

        assert!(matches!(
            engine.organize_files(&t.source, &t.target, 0),
            Err(DistributionError::InvalidArgument(_))
        ));
        assert!(matches!(
            engine.organize_files(&t.source.join("missing"), &t.target, 8),
            Err(DistributionError::NotFound(_))
        ));
        assert!(matches!(
            engine.organize_files(&t.source, &t.target, 8),
            Err(DistributionError::EmptyInput(_))
        ));

        fs::write(t.source.join("tanaka01.pdf"), "x").unwrap();
        assert!(matches!(
            engine.organize_files(&t.source, &t.target, 8),
            Err(DistributionError::NoTargets(_))
        ));
        assert_eq!(confirm.asked_count(), 0);
    }

    #[test]
    fn test_declined_copies_nothing() {
        let t = tree(&["tanaka01.pdf"], &["tanaka01@school"]);
        let fs_port = LocalFileSystem::new();
        let confirm = ScriptedConfirm::with_answers(&[false]);
        let engine = DistributionEngine::new(&fs_port, &confirm);

        let outcome = engine.organize_files(&t.source, &t.target, 8).unwrap();
        assert!(outcome.is_cancelled());
        assert!(!t.target.join("tanaka01@school/tanaka01.pdf").exists());
    }

    #[test]
    fn test_copy_failure_is_isolated() {
        let t = tree(&["aaaaaaaa1.pdf", "bbbbbbbb1.pdf"], &["aaaaaaaa@x", "bbbbbbbb@x"]);
        let fs_port = FailingFs::failing_in(vec![t.target.join("aaaaaaaa@x")]);
        let confirm = ScriptedConfirm::approving();
        let engine = DistributionEngine::new(&fs_port, &confirm);

        let report = engine
            .organize_files(&t.source, &t.target, 8)
            .unwrap()
            .into_report()
            .unwrap();
        assert_eq!(report.failed(), 1);
        assert_eq!(report.succeeded(), 1);
        assert!(t.target.join("bbbbbbbb@x/bbbbbbbb1.pdf").is_file());
    }
}
