//! GenerateLicenses: one license document per roster row.
//!
//! Runs without a confirmation step; it only writes new files into the
//! chosen output folder.

use super::{log_progress, DistributionEngine, RunOutcome};
use crate::error::DistributionError;
use crate::fs_port::require_dir;
use crate::license::{slice_license_groups, LicenseDocument, LicenseRenderer};
use crate::report::{OperationKind, ReportBuilder};
use crate::roster::RosterTable;
use chrono::NaiveDate;
use std::path::Path;

const PROGRESS_EVERY: usize = 10;

impl<'a> DistributionEngine<'a> {
    pub fn generate_licenses(
        &self,
        roster: &RosterTable,
        output_dir: &Path,
        issue_date: NaiveDate,
        label: &str,
        renderer: &dyn LicenseRenderer,
    ) -> Result<RunOutcome, DistributionError> {
        let operation = OperationKind::GenerateLicenses;

        if roster.is_empty() {
            return Err(DistributionError::EmptyInput(
                "license roster has no rows".to_string(),
            ));
        }
        require_dir(self.fs, output_dir)?;

        tracing::info!(
            students = roster.len(),
            output = %output_dir.display(),
            "Generating license documents"
        );

        let mut report = ReportBuilder::new(operation, output_dir);
        let total = roster.len();

        for (idx, row) in roster.rows().iter().enumerate() {
            let identifier = row.get(0).trim();
            let line_no = row.index() + 1;

            if identifier.is_empty() {
                tracing::warn!(row = line_no, "Skipping row without identifier");
                report.skipped(format!("row {}", line_no), "identifier is empty");
            } else {
                let groups = slice_license_groups(row);
                if groups.is_empty() {
                    tracing::warn!(identifier, "Skipping row without textbook data");
                    report.skipped(identifier, "no textbook data");
                } else {
                    let count = groups.len();
                    let document = LicenseDocument::new(identifier, groups, issue_date, label);
                    let path = document.output_path(output_dir, renderer.file_extension());

                    match renderer.render(&document, &path) {
                        Ok(()) => {
                            tracing::info!(identifier, textbooks = count, path = %path.display(), "Generated license");
                            report.success_with(identifier, format!("{} textbook(s)", count));
                        }
                        Err(err) => {
                            tracing::warn!(identifier, error = %err, "Failed to render license");
                            report.failed(identifier, err);
                        }
                    }
                }
            }

            log_progress(operation, idx + 1, total, PROGRESS_EVERY);
        }

        let report = report.finish();
        tracing::info!(
            generated = report.succeeded(),
            skipped = report.skipped(),
            failed = report.failed(),
            "License generation complete"
        );
        Ok(RunOutcome::Completed { report })
    }
}
