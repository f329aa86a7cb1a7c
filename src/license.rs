//! License documents.
//!
//! A license roster row holds an account identifier in column A followed by
//! repeating four-column groups (textbook name, ID, password, serial code).
//! Each row becomes one [`LicenseDocument`], which a [`LicenseRenderer`]
//! turns into a file. Layout (PDF or otherwise) belongs to the renderer.

use crate::error::DistributionError;
use crate::keys::account_key;
use crate::roster::RosterRow;
use crate::sanitize::sanitize_name;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// First column of the first license group (column B)
pub const FIRST_GROUP_COLUMN: usize = 1;

/// Columns per license group
pub const GROUP_WIDTH: usize = 4;

/// Default title and file-name suffix
pub const DEFAULT_LICENSE_LABEL: &str = "ライセンス情報";

/// One textbook's credentials
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextbookLicenseGroup {
    pub name: String,
    pub id: String,
    pub password: String,
    pub serial: String,
}

/// Slice a row into license groups.
///
/// Windows start at column B and advance four columns at a time while a full
/// window fits. Values are trimmed; groups without a textbook name are
/// dropped.
pub fn slice_license_groups(row: &RosterRow) -> Vec<TextbookLicenseGroup> {
    let mut groups = Vec::new();
    let mut col = FIRST_GROUP_COLUMN;

    while col + GROUP_WIDTH <= row.len() {
        let name = row.get(col).trim();
        if !name.is_empty() {
            groups.push(TextbookLicenseGroup {
                name: name.to_string(),
                id: row.get(col + 1).trim().to_string(),
                password: row.get(col + 2).trim().to_string(),
                serial: row.get(col + 3).trim().to_string(),
            });
        }
        col += GROUP_WIDTH;
    }

    groups
}

/// Everything a renderer needs for one account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LicenseDocument {
    pub title: String,
    pub identifier: String,
    pub account_key: String,
    /// `YYYY.MM.DD`
    pub issue_date: String,
    pub groups: Vec<TextbookLicenseGroup>,
    /// Output file name without extension
    pub file_stem: String,
}

impl LicenseDocument {
    pub fn new(
        identifier: &str,
        groups: Vec<TextbookLicenseGroup>,
        issue_date: NaiveDate,
        label: &str,
    ) -> Self {
        let key = account_key(identifier);
        Self {
            title: label.to_string(),
            identifier: identifier.to_string(),
            account_key: key.to_string(),
            issue_date: issue_date.format("%Y.%m.%d").to_string(),
            groups,
            file_stem: sanitize_name(&format!("{}_{}", key, label)),
        }
    }

    /// `dir/<file_stem>.<extension>`
    pub fn output_path(&self, dir: &Path, extension: &str) -> PathBuf {
        dir.join(format!("{}.{}", self.file_stem, extension))
    }
}

/// Turns a document into a file on disk
pub trait LicenseRenderer {
    /// Extension of produced files, without the dot
    fn file_extension(&self) -> &str;

    fn render(&self, document: &LicenseDocument, path: &Path) -> Result<(), DistributionError>;
}

/// Writes the structured document as pretty JSON
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonLicenseRenderer;

impl LicenseRenderer for JsonLicenseRenderer {
    fn file_extension(&self) -> &str {
        "json"
    }

    fn render(&self, document: &LicenseDocument, path: &Path) -> Result<(), DistributionError> {
        // Write to a temp file, then rename over the target
        let temp_path = path.with_extension("tmp");

        let file = File::create(&temp_path).map_err(|e| DistributionError::io(&temp_path, e))?;
        let mut writer = BufWriter::new(file);

        serde_json::to_writer_pretty(&mut writer, document)
            .map_err(|e| DistributionError::io(&temp_path, format!("failed to serialize: {}", e)))?;
        writer
            .flush()
            .map_err(|e| DistributionError::io(&temp_path, e))?;
        writer
            .get_ref()
            .sync_all()
            .map_err(|e| DistributionError::io(&temp_path, e))?;

        fs::rename(&temp_path, path).map_err(|e| DistributionError::io(path, e))?;
        Ok(())
    }
}
