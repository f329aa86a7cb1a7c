//! BroadcastCopy: one shared file into every immediate subfolder.

use super::apply::{apply_copy, ConflictPolicy};
use super::{log_progress, CancelReason, DistributionEngine, Preview, RunOutcome};
use crate::error::DistributionError;
use crate::fs_port::require_dir;
use crate::report::{OperationKind, ReportBuilder};
use std::path::Path;

const PROGRESS_EVERY: usize = 10;

impl<'a> DistributionEngine<'a> {
    /// Copy `source_file` into each subfolder of `target_root` under its own
    /// name. Existing copies are overwritten.
    pub fn broadcast_copy(
        &self,
        source_file: &Path,
        target_root: &Path,
    ) -> Result<RunOutcome, DistributionError> {
        let operation = OperationKind::BroadcastCopy;

        if !self.fs.exists(source_file) {
            return Err(DistributionError::NotFound(source_file.to_path_buf()));
        }
        if !self.fs.is_file(source_file) {
            return Err(DistributionError::NotAFile(source_file.to_path_buf()));
        }
        require_dir(self.fs, target_root)?;

        let os_name = source_file
            .file_name()
            .ok_or_else(|| DistributionError::NotAFile(source_file.to_path_buf()))?;
        let file_name = os_name.to_string_lossy().to_string();

        let folders = self.fs.list_dirs(target_root)?;
        if folders.is_empty() {
            return Err(DistributionError::EmptyInput(format!(
                "no subfolders in {}",
                target_root.display()
            )));
        }

        tracing::info!(
            file = %source_file.display(),
            folders = folders.len(),
            target = %target_root.display(),
            "Validated broadcast inputs"
        );

        let preview = Preview::new(operation, folders.len(), target_root.display().to_string())
            .with_detail("File", &file_name);
        if !self.confirm_preview(&preview) {
            return Ok(RunOutcome::cancelled(operation, CancelReason::Declined));
        }

        let mut report = ReportBuilder::new(operation, target_root);
        let total = folders.len();

        for (idx, folder) in folders.iter().enumerate() {
            let destination = folder.path.join(os_name);
            let subject = format!("{}/{}", folder.name(), file_name);

            match apply_copy(self.fs, source_file, &destination, ConflictPolicy::Overwrite) {
                Ok(_) => {
                    tracing::info!(seq = idx + 1, total, path = %destination.display(), "Copied file");
                    report.success(subject);
                }
                Err(err) => {
                    tracing::warn!(seq = idx + 1, total, path = %destination.display(), error = %err, "Copy failed");
                    report.failed(subject, err);
                }
            }

            log_progress(operation, idx + 1, total, PROGRESS_EVERY);
        }

        let report = report.finish();
        tracing::info!(
            copied = report.succeeded(),
            failed = report.failed(),
            "Broadcast copy complete"
        );
        Ok(RunOutcome::Completed { report })
    }
}
