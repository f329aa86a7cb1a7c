//! CreateFolders: one folder per account identifier in the roster.

use super::apply::{apply_create_dir, ApplyOutcome};
use super::{log_progress, DistributionEngine, Preview, RunOutcome, CancelReason};
use crate::error::DistributionError;
use crate::report::{OperationKind, ReportBuilder};
use crate::roster::RosterTable;
use crate::sanitize::sanitize_name;
use chrono::{DateTime, TimeZone};
use std::path::{Path, PathBuf};

/// Column holding account identifiers (column E)
pub const IDENTIFIER_COLUMN: usize = 4;

/// Name prefix of generated output roots
pub const OUTPUT_ROOT_PREFIX: &str = "CSVFolders_";

const PROGRESS_EVERY: usize = 100;

/// `base/CSVFolders_YYYYMMDD_HHMMSS`, so repeated runs never collide
pub fn timestamped_root<Tz: TimeZone>(base: &Path, now: &DateTime<Tz>) -> PathBuf
where
    Tz::Offset: std::fmt::Display,
{
    base.join(format!(
        "{}{}",
        OUTPUT_ROOT_PREFIX,
        now.format("%Y%m%d_%H%M%S")
    ))
}

impl<'a> DistributionEngine<'a> {
    /// Create `output_root/<sanitized identifier>` for every non-empty
    /// identifier in column E. Existing folders are counted, not recreated.
    pub fn create_folders(
        &self,
        roster: &RosterTable,
        output_root: &Path,
    ) -> Result<RunOutcome, DistributionError> {
        let operation = OperationKind::CreateFolders;

        if roster.width() <= IDENTIFIER_COLUMN {
            return Err(DistributionError::Schema {
                required: IDENTIFIER_COLUMN + 1,
                found: roster.width(),
                detail: "column E must hold account identifiers".to_string(),
            });
        }

        let identifiers: Vec<&str> = roster
            .column(IDENTIFIER_COLUMN)
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .collect();

        if identifiers.is_empty() {
            return Err(DistributionError::EmptyInput(
                "roster has no account identifiers".to_string(),
            ));
        }

        tracing::info!(
            folders = identifiers.len(),
            output = %output_root.display(),
            "Validated folder roster"
        );

        let preview = Preview::new(operation, identifiers.len(), output_root.display().to_string());
        if !self.confirm_preview(&preview) {
            return Ok(RunOutcome::cancelled(operation, CancelReason::Declined));
        }

        self.fs.create_dir(output_root)?;

        let mut report = ReportBuilder::new(operation, output_root);
        let total = identifiers.len();

        for (idx, identifier) in identifiers.iter().enumerate() {
            let name = sanitize_name(identifier);
            let folder = output_root.join(&name);

            match apply_create_dir(self.fs, &folder) {
                Ok(ApplyOutcome::Completed) => {
                    tracing::info!(seq = idx + 1, total, folder = %name, "Created folder");
                    report.success(name);
                }
                Ok(ApplyOutcome::Skipped(reason)) => {
                    tracing::info!(seq = idx + 1, total, folder = %name, "Folder exists");
                    report.skipped(name, reason);
                }
                Err(err) => {
                    tracing::warn!(folder = %name, error = %err, "Failed to create folder");
                    report.failed(name, err);
                }
            }

            log_progress(operation, idx + 1, total, PROGRESS_EVERY);
        }

        let report = report.finish();
        tracing::info!(
            created = report.succeeded(),
            existing = report.skipped(),
            failed = report.failed(),
            "Folder creation complete"
        );
        Ok(RunOutcome::Completed { report })
    }
}
