//! RenameFiles: positional renaming of a folder's files for one course.
//!
//! Files are paired with roster rows by position, not by key. When the
//! counts differ the caller is warned and only `min(files, rows)` pairs are
//! processed.

use super::apply::{apply_rename, ApplyOutcome, ConflictPolicy};
use super::{log_progress, CancelReason, DistributionEngine, Preview, RunOutcome};
use crate::error::DistributionError;
use crate::fs_port::require_dir;
use crate::keys::account_key;
use crate::report::{OperationKind, ReportBuilder};
use crate::roster::RosterTable;
use crate::sanitize::sanitize_name;
use std::path::Path;

/// Column holding course names (column A)
pub const COURSE_COLUMN: usize = 0;

/// Column holding account identifiers (column B)
pub const RENAME_IDENTIFIER_COLUMN: usize = 1;

const PROGRESS_EVERY: usize = 10;

/// `<accountKey>_<course>_<category>_<seq><ext>`, sanitized.
///
/// The extension (with its dot) is taken from `original_name`; names
/// without one get none.
pub fn compose_renamed_file_name(
    identifier: &str,
    course: &str,
    category: &str,
    seq: usize,
    original_name: &str,
) -> String {
    let extension = Path::new(original_name)
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default();

    sanitize_name(&format!(
        "{}_{}_{}_{}{}",
        account_key(identifier),
        course,
        category,
        seq,
        extension
    ))
}

impl<'a> DistributionEngine<'a> {
    /// Rename the files in `folder` after the roster rows whose course column
    /// equals `course` exactly.
    pub fn rename_files(
        &self,
        roster: &RosterTable,
        course: &str,
        folder: &Path,
        category: &str,
    ) -> Result<RunOutcome, DistributionError> {
        let operation = OperationKind::RenameFiles;

        if roster.width() <= RENAME_IDENTIFIER_COLUMN {
            return Err(DistributionError::Schema {
                required: RENAME_IDENTIFIER_COLUMN + 1,
                found: roster.width(),
                detail: "column A must hold course names and column B account identifiers"
                    .to_string(),
            });
        }

        require_dir(self.fs, folder)?;

        let identifiers: Vec<&str> = roster
            .rows()
            .iter()
            .filter(|row| row.get(COURSE_COLUMN) == course)
            .map(|row| row.get(RENAME_IDENTIFIER_COLUMN))
            .collect();

        if identifiers.is_empty() {
            return Err(DistributionError::NoMatch {
                course: course.to_string(),
            });
        }

        let mut files = self.fs.list_files(folder)?;
        files.sort_by_key(|entry| entry.name());

        tracing::info!(
            course,
            students = identifiers.len(),
            files = files.len(),
            folder = %folder.display(),
            "Validated rename inputs"
        );

        if files.len() != identifiers.len() {
            tracing::warn!(
                files = files.len(),
                students = identifiers.len(),
                "File count does not match roster count"
            );
            let warning = format!(
                "File count and roster count differ.\n\nFiles: {}\nStudents: {}\n\n\
                 Only {} file(s) will be renamed. Continue?",
                files.len(),
                identifiers.len(),
                files.len().min(identifiers.len())
            );
            if !self.confirmation.confirm(&warning) {
                return Ok(RunOutcome::cancelled(operation, CancelReason::CountMismatch));
            }
        }

        let total = files.len().min(identifiers.len());

        let preview = Preview::new(operation, total, folder.display().to_string())
            .with_detail("Course", course)
            .with_detail("Category", category);
        if !self.confirm_preview(&preview) {
            return Ok(RunOutcome::cancelled(operation, CancelReason::Declined));
        }

        let mut report = ReportBuilder::new(operation, folder);

        for (idx, (file, identifier)) in files.iter().zip(identifiers.iter()).enumerate() {
            let seq = idx + 1;
            let original = file.name();
            let renamed = compose_renamed_file_name(identifier, course, category, seq, &original);
            let destination = folder.join(&renamed);
            let subject = format!("{} → {}", original, renamed);

            match apply_rename(self.fs, &file.path, &destination, ConflictPolicy::Fail) {
                Ok(ApplyOutcome::Completed) => {
                    tracing::info!(seq, total, from = %original, to = %renamed, "Renamed file");
                    report.success(subject);
                }
                Ok(ApplyOutcome::Skipped(reason)) => {
                    tracing::debug!(seq, file = %original, %reason, "Rename skipped");
                    report.skipped(subject, reason);
                }
                Err(err) => {
                    tracing::warn!(file = %original, error = %err, "Failed to rename file");
                    report.failed(subject, err);
                }
            }

            log_progress(operation, seq, total, PROGRESS_EVERY);
        }

        let report = report.finish();
        tracing::info!(
            renamed = report.succeeded(),
            attempted = total,
            course,
            category,
            "File renaming complete"
        );
        Ok(RunOutcome::Completed { report })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_support::{FailingFs, ScriptedConfirm};
    use crate::fs_port::LocalFileSystem;
    use std::fs;
    use tempfile::tempdir;

    fn course_roster() -> RosterTable {
        RosterTable::new(
            ["講座名", "メールアドレス"],
            vec![
                vec!["数学Ⅰイ①", "tanaka01@school.example.jp"],
                vec!["英語", "sato03@school.example.jp"],
                vec!["数学Ⅰイ①", "suzuki02@school.example.jp"],
            ],
        )
    }

    fn write_files(dir: &Path, names: &[&str]) {
        for name in names {
            fs::write(dir.join(name), name).unwrap();
        }
    }

    fn names_in(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_compose_name_keeps_extension() {
        assert_eq!(
            compose_renamed_file_name("tanaka01@school.jp", "数学", "課題", 3, "scan 001.PDF"),
            "tanaka01_数学_課題_3.PDF"
        );
        assert_eq!(
            compose_renamed_file_name("a@x", "art", "hw", 1, "README"),
            "a_art_hw_1"
        );
    }

    #[test]
    fn test_compose_name_is_sanitized() {
        assert_eq!(
            compose_renamed_file_name("a@x", "A/B", "c:d", 2, "f.pdf"),
            "a_A_B_c_d_2.pdf"
        );
    }

    #[test]
    fn test_renames_positionally_in_sorted_order() {
        let dir = tempdir().unwrap();
        write_files(dir.path(), &["b.pdf", "a.pdf"]);
        let fs_port = LocalFileSystem::new();
        let confirm = ScriptedConfirm::approving();
        let engine = DistributionEngine::new(&fs_port, &confirm);

        let report = engine
            .rename_files(&course_roster(), "数学Ⅰイ①", dir.path(), "課題")
            .unwrap()
            .into_report()
            .unwrap();

        assert_eq!(report.succeeded(), 2);
        assert_eq!(confirm.asked_count(), 1);
        assert_eq!(
            fs::read_to_string(dir.path().join("tanaka01_数学Ⅰイ①_課題_1.pdf")).unwrap(),
            "a.pdf"
        );
        assert_eq!(
            fs::read_to_string(dir.path().join("suzuki02_数学Ⅰイ①_課題_2.pdf")).unwrap(),
            "b.pdf"
        );
    }

    #[test]
    fn test_count_mismatch_warns_and_processes_min() {
        let dir = tempdir().unwrap();
        write_files(dir.path(), &["1.pdf", "2.pdf", "3.pdf"]);
        let fs_port = LocalFileSystem::new();
        let confirm = ScriptedConfirm::approving();
        let engine = DistributionEngine::new(&fs_port, &confirm);

        let report = engine
            .rename_files(&course_roster(), "数学Ⅰイ①", dir.path(), "hw")
            .unwrap()
            .into_report()
            .unwrap();

        assert_eq!(confirm.asked_count(), 2);
        assert!(confirm.asked.borrow()[0].contains("Files: 3"));
        assert_eq!(report.succeeded(), 2);
        assert_eq!(
            names_in(dir.path()),
            vec![
                "3.pdf".to_string(),
                "suzuki02_数学Ⅰイ①_hw_2.pdf".to_string(),
                "tanaka01_数学Ⅰイ①_hw_1.pdf".to_string(),
            ]
        );
    }

    #[test]
    fn test_declined_mismatch_cancels() {
        let dir = tempdir().unwrap();
        write_files(dir.path(), &["only.pdf"]);
        let fs_port = LocalFileSystem::new();
        let confirm = ScriptedConfirm::with_answers(&[false]);
        let engine = DistributionEngine::new(&fs_port, &confirm);

        let outcome = engine
            .rename_files(&course_roster(), "数学Ⅰイ①", dir.path(), "hw")
            .unwrap();

        assert_eq!(
            outcome,
            RunOutcome::Cancelled {
                operation: OperationKind::RenameFiles,
                reason: CancelReason::CountMismatch
            }
        );
        assert_eq!(names_in(dir.path()), vec!["only.pdf".to_string()]);
    }

    #[test]
    fn test_course_match_is_exact() {
        let dir = tempdir().unwrap();
        let fs_port = LocalFileSystem::new();
        let confirm = ScriptedConfirm::approving();
        let engine = DistributionEngine::new(&fs_port, &confirm);

        let result = engine.rename_files(&course_roster(), "数学", dir.path(), "hw");
        assert!(matches!(result, Err(DistributionError::NoMatch { .. })));
        assert_eq!(confirm.asked_count(), 0);
    }

    #[test]
    fn test_single_column_is_schema_error() {
        let dir = tempdir().unwrap();
        let fs_port = LocalFileSystem::new();
        let confirm = ScriptedConfirm::approving();
        let engine = DistributionEngine::new(&fs_port, &confirm);

        let roster = RosterTable::new(["講座名"], vec![vec!["英語"]]);
        let result = engine.rename_files(&roster, "英語", dir.path(), "hw");
        assert!(matches!(result, Err(DistributionError::Schema { required: 2, .. })));
    }

    #[test]
    fn test_missing_folder_is_not_found() {
        let dir = tempdir().unwrap();
        let fs_port = LocalFileSystem::new();
        let confirm = ScriptedConfirm::approving();
        let engine = DistributionEngine::new(&fs_port, &confirm);

        let result =
            engine.rename_files(&course_roster(), "英語", &dir.path().join("missing"), "hw");
        assert!(matches!(result, Err(DistributionError::NotFound(_))));
    }

    #[test]
    fn test_existing_destination_fails_item_only() {
        let dir = tempdir().unwrap();
        // "a.pdf" sorts first and pairs with tanaka01; its destination is taken
        write_files(dir.path(), &["a.pdf", "b.pdf", "tanaka01_数学Ⅰイ①_hw_1.pdf"]);
        let fs_port = LocalFileSystem::new();
        let confirm = ScriptedConfirm::approving();
        let engine = DistributionEngine::new(&fs_port, &confirm);

        let report = engine
            .rename_files(&course_roster(), "数学Ⅰイ①", dir.path(), "hw")
            .unwrap()
            .into_report()
            .unwrap();

        assert_eq!(report.failed(), 1);
        assert_eq!(report.succeeded(), 1);
        assert!(dir.path().join("a.pdf").exists());
        assert_eq!(
            fs::read_to_string(dir.path().join("suzuki02_数学Ⅰイ①_hw_2.pdf")).unwrap(),
            "b.pdf"
        );
    }

    #[test]
    fn test_injected_failure_is_isolated() {
        let dir = tempdir().unwrap();
        write_files(dir.path(), &["a.pdf", "b.pdf"]);
        let fs_port =
            FailingFs::failing_in(vec![dir.path().join("tanaka01_数学Ⅰイ①_hw_1.pdf")]);
        let confirm = ScriptedConfirm::approving();
        let engine = DistributionEngine::new(&fs_port, &confirm);

        let report = engine
            .rename_files(&course_roster(), "数学Ⅰイ①", dir.path(), "hw")
            .unwrap()
            .into_report()
            .unwrap();

        assert_eq!(report.failed(), 1);
        assert_eq!(report.succeeded(), 1);
        assert_eq!(fs_port.attempts.borrow().len(), 2);
    }
}
