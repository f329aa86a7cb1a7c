//! Distribution Engine
//!
//! Runs the roster-driven batch operations. Every operation walks the same
//! stages:
//!
//! 1. enumerate and validate inputs (errors here abort with no side effects)
//! 2. build a [`Preview`] and ask the caller to confirm it
//! 3. apply filesystem mutations one item at a time, in enumeration order
//! 4. return an immutable [`OperationReport`]
//!
//! Per-item I/O failures during step 3 are recorded as failed lines and the
//! batch carries on. Nothing already done is rolled back.

pub mod apply;
mod broadcast_copy;
mod create_folders;
mod licenses;
mod organize_files;
mod rename_files;

#[cfg(test)]
pub(crate) mod test_support;

pub use apply::{ApplyOutcome, ConflictPolicy};
pub use create_folders::{timestamped_root, IDENTIFIER_COLUMN, OUTPUT_ROOT_PREFIX};
pub use rename_files::{compose_renamed_file_name, COURSE_COLUMN, RENAME_IDENTIFIER_COLUMN};

use crate::fs_port::FileSystemPort;
use crate::ports::ConfirmationPort;
use crate::report::{OperationKind, OperationReport};
use serde::{Deserialize, Serialize};

/// Why a run stopped before executing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CancelReason {
    /// Caller declined the preview
    Declined,
    /// Caller declined to continue after a file/roster count mismatch
    CountMismatch,
    /// Caller withdrew a required input
    InputWithdrawn,
}

/// Result of a run that passed validation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunOutcome {
    Completed { report: OperationReport },
    Cancelled {
        operation: OperationKind,
        reason: CancelReason,
    },
}

impl RunOutcome {
    pub fn cancelled(operation: OperationKind, reason: CancelReason) -> Self {
        tracing::info!(%operation, ?reason, "Run cancelled");
        RunOutcome::Cancelled { operation, reason }
    }

    pub fn operation(&self) -> OperationKind {
        match self {
            RunOutcome::Completed { report } => report.operation(),
            RunOutcome::Cancelled { operation, .. } => *operation,
        }
    }

    pub fn report(&self) -> Option<&OperationReport> {
        match self {
            RunOutcome::Completed { report } => Some(report),
            RunOutcome::Cancelled { .. } => None,
        }
    }

    pub fn into_report(self) -> Option<OperationReport> {
        match self {
            RunOutcome::Completed { report } => Some(report),
            RunOutcome::Cancelled { .. } => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, RunOutcome::Cancelled { .. })
    }
}

/// What a run is about to do, shown to the caller before executing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preview {
    pub operation: OperationKind,
    pub item_count: usize,
    pub target: String,
    /// Extra `label: value` lines (course name, match length, ...)
    pub details: Vec<(String, String)>,
}

impl Preview {
    pub fn new(operation: OperationKind, item_count: usize, target: impl Into<String>) -> Self {
        Self {
            operation,
            item_count,
            target: target.into(),
            details: Vec::new(),
        }
    }

    pub fn with_detail(mut self, label: impl Into<String>, value: impl ToString) -> Self {
        self.details.push((label.into(), value.to_string()));
        self
    }

    /// Confirmation text handed to the caller
    pub fn render(&self) -> String {
        let mut text = format!("{}\n\n", self.operation);
        for (label, value) in &self.details {
            text.push_str(&format!("{}: {}\n", label, value));
        }
        text.push_str(&format!("Items: {}\n", self.item_count));
        text.push_str(&format!("Target: {}\n\n", self.target));
        text.push_str("Proceed?");
        text
    }
}

/// Executes the batch operations against injected ports
pub struct DistributionEngine<'a> {
    fs: &'a dyn FileSystemPort,
    confirmation: &'a dyn ConfirmationPort,
}

impl<'a> DistributionEngine<'a> {
    pub fn new(fs: &'a dyn FileSystemPort, confirmation: &'a dyn ConfirmationPort) -> Self {
        Self { fs, confirmation }
    }

    /// Ask the caller to approve a preview
    fn confirm_preview(&self, preview: &Preview) -> bool {
        tracing::debug!(
            operation = %preview.operation,
            items = preview.item_count,
            target = %preview.target,
            "Requesting confirmation"
        );
        self.confirmation.confirm(&preview.render())
    }
}

/// Periodic progress line during execution
pub(crate) fn log_progress(operation: OperationKind, done: usize, total: usize, every: usize) {
    if every > 0 && done % every == 0 {
        tracing::info!(
            %operation,
            done,
            total,
            percent = done * 100 / total.max(1),
            "Progress"
        );
    }
}
