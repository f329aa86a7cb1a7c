//! Audit trail.
//!
//! Every finished or cancelled run is appended as one JSON line to
//! `<dir>/audit_YYYYMMDD.jsonl` (local date). Appends take an exclusive
//! `fs2` lock on the day file so concurrent processes never interleave
//! lines. Day files older than the retention window are removed on open.

use crate::engine::RunOutcome;
use crate::error::DistributionError;
use crate::ports::ReportSink;
use chrono::{DateTime, Days, Local, NaiveDate};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

const FILE_PREFIX: &str = "audit_";
const FILE_SUFFIX: &str = ".jsonl";

/// One stored line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditRecord {
    pub recorded_at: DateTime<Local>,
    /// Report summary, absent for cancelled runs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    pub outcome: RunOutcome,
}

/// Day-rotated JSON-lines store
#[derive(Debug, Clone)]
pub struct AuditLog {
    dir: PathBuf,
    retention_days: u32,
}

impl AuditLog {
    /// Create the directory if needed and prune expired day files.
    ///
    /// `retention_days == 0` keeps everything.
    pub fn open(dir: impl Into<PathBuf>, retention_days: u32) -> Result<Self, DistributionError> {
        let log = Self {
            dir: dir.into(),
            retention_days,
        };
        fs::create_dir_all(&log.dir)
            .map_err(|e| DistributionError::Audit(format!("{}: {}", log.dir.display(), e)))?;

        // A window reaching past the earliest representable date keeps everything
        let cutoff = Local::now()
            .date_naive()
            .checked_sub_days(Days::new(u64::from(retention_days)));
        if let Some(cutoff) = cutoff.filter(|_| retention_days > 0) {
            let removed = log.prune_before(cutoff)?;
            if removed > 0 {
                tracing::info!(removed, retention_days, "Pruned old audit files");
            }
        }

        Ok(log)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn retention_days(&self) -> u32 {
        self.retention_days
    }

    /// Day file for `date`
    pub fn path_for(&self, date: NaiveDate) -> PathBuf {
        self.dir
            .join(format!("{}{}{}", FILE_PREFIX, date.format("%Y%m%d"), FILE_SUFFIX))
    }

    /// Append a run, stamped with `now`
    pub fn append_at(
        &self,
        outcome: &RunOutcome,
        now: DateTime<Local>,
    ) -> Result<PathBuf, DistributionError> {
        let record = AuditRecord {
            recorded_at: now,
            summary: outcome.report().map(|r| r.summary()),
            outcome: outcome.clone(),
        };
        let mut line = serde_json::to_string(&record)
            .map_err(|e| DistributionError::Audit(format!("failed to serialize record: {}", e)))?;
        line.push('\n');

        let path = self.path_for(now.date_naive());
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| DistributionError::Audit(format!("{}: {}", path.display(), e)))?;

        // Block until no other writer holds the day file
        file.lock_exclusive()
            .map_err(|e| DistributionError::Audit(format!("failed to lock {}: {}", path.display(), e)))?;

        let written = file
            .write_all(line.as_bytes())
            .and_then(|_| file.flush())
            .map_err(|e| DistributionError::Audit(format!("{}: {}", path.display(), e)));

        if let Err(e) = FileExt::unlock(&file) {
            tracing::warn!(path = %path.display(), error = %e, "Failed to release audit lock");
        }
        written?;

        tracing::debug!(path = %path.display(), operation = %outcome.operation(), "Audit record written");
        Ok(path)
    }

    /// Records stored for one day, oldest first. Unparseable lines are skipped.
    pub fn read_day(&self, date: NaiveDate) -> Result<Vec<AuditRecord>, DistributionError> {
        let path = self.path_for(date);
        if !path.exists() {
            return Ok(Vec::new());
        }

        let text = fs::read_to_string(&path)
            .map_err(|e| DistributionError::Audit(format!("{}: {}", path.display(), e)))?;

        Ok(text
            .lines()
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| match serde_json::from_str(line) {
                Ok(record) => Some(record),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Skipping malformed audit line");
                    None
                }
            })
            .collect())
    }

    /// Delete day files dated strictly before `cutoff`; returns how many
    pub fn prune_before(&self, cutoff: NaiveDate) -> Result<usize, DistributionError> {
        let entries = fs::read_dir(&self.dir)
            .map_err(|e| DistributionError::Audit(format!("{}: {}", self.dir.display(), e)))?;

        let mut removed = 0;
        for entry in entries.flatten() {
            let name = entry.file_name().to_string_lossy().to_string();
            let Some(date) = day_of(&name) else {
                continue;
            };
            if date >= cutoff {
                continue;
            }
            match fs::remove_file(entry.path()) {
                Ok(()) => removed += 1,
                Err(e) => {
                    tracing::warn!(file = %name, error = %e, "Failed to remove old audit file");
                }
            }
        }
        Ok(removed)
    }
}

impl ReportSink for AuditLog {
    fn record(&self, outcome: &RunOutcome) -> Result<(), DistributionError> {
        self.append_at(outcome, Local::now()).map(|_| ())
    }
}

/// Date encoded in an audit file name, if it is one
fn day_of(file_name: &str) -> Option<NaiveDate> {
    let stamp = file_name
        .strip_prefix(FILE_PREFIX)?
        .strip_suffix(FILE_SUFFIX)?;
    NaiveDate::parse_from_str(stamp, "%Y%m%d").ok()
}
