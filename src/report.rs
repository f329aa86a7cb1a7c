//! Operation reports.
//!
//! Each pipeline accumulates into a [`ReportBuilder`] and hands back an
//! immutable [`OperationReport`]. Counts are derived from the result lines,
//! so the two can never disagree.

use crate::matching::KeyCollision;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// The operation a report belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    CreateFolders,
    RenameFiles,
    OrganizeFiles,
    BroadcastCopy,
    GenerateLicenses,
}

impl OperationKind {
    pub fn label(&self) -> &'static str {
        match self {
            OperationKind::CreateFolders => "Create folders",
            OperationKind::RenameFiles => "Rename files",
            OperationKind::OrganizeFiles => "Organize files",
            OperationKind::BroadcastCopy => "Broadcast copy",
            OperationKind::GenerateLicenses => "Generate licenses",
        }
    }

    /// Per-operation wording for the succeeded and skipped counts
    fn count_labels(&self) -> (&'static str, &'static str) {
        match self {
            OperationKind::CreateFolders => ("created", "existing"),
            OperationKind::RenameFiles => ("renamed", "skipped"),
            OperationKind::OrganizeFiles => ("copied", "skipped"),
            OperationKind::BroadcastCopy => ("copied", "skipped"),
            OperationKind::GenerateLicenses => ("generated", "skipped"),
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Outcome tag of a single processed item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    Success,
    Skipped,
    Failed,
    Unmatched,
}

/// One human-readable line per processed item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultLine {
    pub status: ItemStatus,
    /// What was processed, e.g. `tanaka01@school/handout.pdf`
    pub subject: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl fmt::Display for ResultLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = match self.status {
            ItemStatus::Success => "✓",
            ItemStatus::Skipped => "-",
            ItemStatus::Failed => "✗",
            ItemStatus::Unmatched => "?",
        };
        match &self.detail {
            Some(detail) => write!(f, "{} {} - {}", marker, self.subject, detail),
            None => write!(f, "{} {}", marker, self.subject),
        }
    }
}

/// Tallies by item status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportCounts {
    pub succeeded: usize,
    pub skipped: usize,
    pub failed: usize,
    pub unmatched: usize,
}

impl ReportCounts {
    pub fn total(&self) -> usize {
        self.succeeded + self.skipped + self.failed + self.unmatched
    }
}

/// Immutable outcome of one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationReport {
    run_id: Uuid,
    operation: OperationKind,
    target: PathBuf,
    started_at: DateTime<Utc>,
    finished_at: DateTime<Utc>,
    counts: ReportCounts,
    lines: Vec<ResultLine>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    collisions: Vec<KeyCollision>,
}

impl OperationReport {
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn operation(&self) -> OperationKind {
        self.operation
    }

    /// Folder the run wrote into
    pub fn target(&self) -> &Path {
        &self.target
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn finished_at(&self) -> DateTime<Utc> {
        self.finished_at
    }

    pub fn counts(&self) -> ReportCounts {
        self.counts
    }

    pub fn lines(&self) -> &[ResultLine] {
        &self.lines
    }

    /// Sources that matched more than one target (first one was used)
    pub fn collisions(&self) -> &[KeyCollision] {
        &self.collisions
    }

    pub fn succeeded(&self) -> usize {
        self.counts.succeeded
    }

    pub fn skipped(&self) -> usize {
        self.counts.skipped
    }

    pub fn failed(&self) -> usize {
        self.counts.failed
    }

    pub fn unmatched(&self) -> usize {
        self.counts.unmatched
    }

    /// Lines with the given status, in processing order
    pub fn lines_with(&self, status: ItemStatus) -> impl Iterator<Item = &ResultLine> {
        self.lines.iter().filter(move |line| line.status == status)
    }

    /// Whether no item failed
    pub fn is_clean(&self) -> bool {
        self.counts.failed == 0
    }

    /// One-line summary using the operation's own wording
    pub fn summary(&self) -> String {
        let (done, skipped) = self.operation.count_labels();
        let mut parts = vec![format!("{}: {}", done, self.counts.succeeded)];
        if self.counts.skipped > 0 || self.operation == OperationKind::CreateFolders {
            parts.push(format!("{}: {}", skipped, self.counts.skipped));
        }
        if self.counts.unmatched > 0 || self.operation == OperationKind::OrganizeFiles {
            parts.push(format!("unmatched: {}", self.counts.unmatched));
        }
        if self.counts.failed > 0 || self.operation == OperationKind::BroadcastCopy {
            parts.push(format!("failed: {}", self.counts.failed));
        }
        if !self.collisions.is_empty() {
            parts.push(format!("key collisions: {}", self.collisions.len()));
        }
        format!("{} complete ({})", self.operation, parts.join(", "))
    }
}

impl fmt::Display for OperationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.summary())?;
        writeln!(f, "target: {}", self.target.display())?;
        for line in &self.lines {
            writeln!(f, "  {}", line)?;
        }
        Ok(())
    }
}

/// Local accumulator for a single run
#[derive(Debug)]
pub struct ReportBuilder {
    run_id: Uuid,
    operation: OperationKind,
    target: PathBuf,
    started_at: DateTime<Utc>,
    lines: Vec<ResultLine>,
    collisions: Vec<KeyCollision>,
}

impl ReportBuilder {
    pub fn new(operation: OperationKind, target: impl Into<PathBuf>) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            operation,
            target: target.into(),
            started_at: Utc::now(),
            lines: Vec::new(),
            collisions: Vec::new(),
        }
    }

    fn push(&mut self, status: ItemStatus, subject: impl Into<String>, detail: Option<String>) {
        self.lines.push(ResultLine {
            status,
            subject: subject.into(),
            detail,
        });
    }

    pub fn success(&mut self, subject: impl Into<String>) {
        self.push(ItemStatus::Success, subject, None);
    }

    pub fn success_with(&mut self, subject: impl Into<String>, detail: impl Into<String>) {
        self.push(ItemStatus::Success, subject, Some(detail.into()));
    }

    pub fn skipped(&mut self, subject: impl Into<String>, reason: impl Into<String>) {
        self.push(ItemStatus::Skipped, subject, Some(reason.into()));
    }

    pub fn failed(&mut self, subject: impl Into<String>, error: impl fmt::Display) {
        self.push(ItemStatus::Failed, subject, Some(error.to_string()));
    }

    pub fn unmatched(&mut self, subject: impl Into<String>, detail: impl Into<String>) {
        self.push(ItemStatus::Unmatched, subject, Some(detail.into()));
    }

    pub fn collisions(&mut self, collisions: Vec<KeyCollision>) {
        self.collisions = collisions;
    }

    pub fn finish(self) -> OperationReport {
        let mut counts = ReportCounts::default();
        for line in &self.lines {
            match line.status {
                ItemStatus::Success => counts.succeeded += 1,
                ItemStatus::Skipped => counts.skipped += 1,
                ItemStatus::Failed => counts.failed += 1,
                ItemStatus::Unmatched => counts.unmatched += 1,
            }
        }

        OperationReport {
            run_id: self.run_id,
            operation: self.operation,
            target: self.target,
            started_at: self.started_at,
            finished_at: Utc::now(),
            counts,
            lines: self.lines,
            collisions: self.collisions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_follow_lines() {
        let mut builder = ReportBuilder::new(OperationKind::OrganizeFiles, "/srv/target");
        builder.success("a.pdf → a0000001");
        builder.skipped("b.pdf → b0000001", "already exists");
        builder.unmatched("c.pdf", "prefix: c.pdf");
        builder.failed("d.pdf → d0000001", "disk full");

        let report = builder.finish();
        assert_eq!(
            report.counts(),
            ReportCounts {
                succeeded: 1,
                skipped: 1,
                failed: 1,
                unmatched: 1
            }
        );
        assert_eq!(report.counts().total(), 4);
        assert!(!report.is_clean());
        assert_eq!(report.lines_with(ItemStatus::Failed).count(), 1);
    }

    #[test]
    fn test_line_rendering() {
        let ok = ResultLine {
            status: ItemStatus::Success,
            subject: "class-a/notice.pdf".to_string(),
            detail: None,
        };
        let failed = ResultLine {
            status: ItemStatus::Failed,
            subject: "class-b/notice.pdf".to_string(),
            detail: Some("permission denied".to_string()),
        };
        assert_eq!(ok.to_string(), "✓ class-a/notice.pdf");
        assert_eq!(failed.to_string(), "✗ class-b/notice.pdf - permission denied");
    }

    #[test]
    fn test_summary_uses_operation_wording() {
        let mut builder = ReportBuilder::new(OperationKind::CreateFolders, "/out");
        builder.success("a@x.com");
        builder.success("b@x.com");
        builder.skipped("a@x.com", "already exists");
        let report = builder.finish();

        assert_eq!(
            report.summary(),
            "Create folders complete (created: 2, existing: 1)"
        );
    }

    #[test]
    fn test_report_serializes() {
        let mut builder = ReportBuilder::new(OperationKind::BroadcastCopy, "/root");
        builder.success("a/file.pdf");
        let report = builder.finish();

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["operation"], "broadcast_copy");
        assert_eq!(json["counts"]["succeeded"], 1);
        assert!(json.get("collisions").is_none());
    }
}
