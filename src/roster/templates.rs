//! Header-only CSV templates for the three roster layouts.
//!
//! Written as UTF-8 with a BOM so spreadsheet software on Windows opens the
//! Japanese headers correctly.

use crate::error::DistributionError;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Number of textbook column groups in the license roster
pub const LICENSE_TEMPLATE_GROUPS: usize = 15;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Roster layout a template is generated for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateKind {
    /// {course name, account identifier}
    RenameFiles,
    /// {student id, attendance number, full name, reading, account identifier}
    CreateFolders,
    /// {account identifier, then 15 x (textbook, id, password, serial code)}
    Licenses,
}

impl TemplateKind {
    pub fn headers(&self) -> Vec<String> {
        match self {
            TemplateKind::RenameFiles => vec!["講座名".to_string(), "メールアドレス".to_string()],
            TemplateKind::CreateFolders => ["生徒番号", "出席番号", "氏名", "ふりがな", "メールアドレス"]
                .iter()
                .map(|h| h.to_string())
                .collect(),
            TemplateKind::Licenses => {
                let mut headers = vec!["メールアドレス".to_string()];
                for i in 1..=LICENSE_TEMPLATE_GROUPS {
                    headers.push(format!("教科書名{}", i));
                    headers.push(format!("ID{}", i));
                    headers.push(format!("PASSWORD{}", i));
                    headers.push(format!("SERIAL CODE{}", i));
                }
                headers
            }
        }
    }

    /// Suggested file name when the caller does not pick one
    pub fn default_file_name(&self) -> &'static str {
        match self {
            TemplateKind::RenameFiles => "step1_file_rename.csv",
            TemplateKind::CreateFolders => "step2_folder_create.csv",
            TemplateKind::Licenses => "step3_license_pdf.csv",
        }
    }
}

/// Write the header row for `kind` to `path`, replacing any existing file
pub fn write_template(kind: TemplateKind, path: &Path) -> Result<(), DistributionError> {
    let mut file = File::create(path).map_err(|e| DistributionError::io(path, e))?;
    file.write_all(UTF8_BOM)
        .map_err(|e| DistributionError::io(path, e))?;

    let mut writer = csv::Writer::from_writer(file);
    writer
        .write_record(kind.headers())
        .map_err(|e| DistributionError::io(path, e))?;
    writer.flush().map_err(|e| DistributionError::io(path, e))?;

    tracing::info!(?kind, path = %path.display(), "Wrote roster template");
    Ok(())
}
