//! CSV roster loading.
//!
//! Rosters come out of school administration systems either as UTF-8 (often
//! with a BOM) or as Shift_JIS. UTF-8 is tried first.

use super::RosterTable;
use crate::error::DistributionError;
use encoding_rs::SHIFT_JIS;
use std::borrow::Cow;
use std::fs;
use std::path::Path;

const UTF8_BOM: char = '\u{feff}';

/// Which encoding a roster was decoded with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RosterEncoding {
    Utf8,
    ShiftJis,
}

/// Read and parse a roster CSV file (first row is the header)
pub fn load_csv(path: &Path) -> Result<RosterTable, DistributionError> {
    let bytes = fs::read(path).map_err(|e| DistributionError::Roster {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let (text, encoding) = decode_roster_bytes(&bytes).map_err(|message| {
        DistributionError::Roster {
            path: path.to_path_buf(),
            message,
        }
    })?;

    let table = parse_csv_text(&text).map_err(|message| DistributionError::Roster {
        path: path.to_path_buf(),
        message,
    })?;

    tracing::info!(
        path = %path.display(),
        ?encoding,
        rows = table.len(),
        columns = table.width(),
        "Loaded roster"
    );

    Ok(table)
}

/// Decode raw roster bytes, falling back to Shift_JIS when not valid UTF-8
pub fn decode_roster_bytes(bytes: &[u8]) -> Result<(Cow<'_, str>, RosterEncoding), String> {
    if let Ok(text) = std::str::from_utf8(bytes) {
        let text = text.strip_prefix(UTF8_BOM).unwrap_or(text);
        return Ok((Cow::Borrowed(text), RosterEncoding::Utf8));
    }

    let (text, had_errors) = SHIFT_JIS.decode_without_bom_handling(bytes);
    if had_errors {
        return Err("file is neither valid UTF-8 nor Shift_JIS".to_string());
    }

    Ok((text, RosterEncoding::ShiftJis))
}

/// Parse CSV text into a roster table.
///
/// Rows may be ragged; the table is padded to the widest row.
pub fn parse_csv_text(text: &str) -> Result<RosterTable, String> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| format!("Failed to read header row: {}", e))?
        .iter()
        .map(str::to_string)
        .collect();

    let mut rows = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let record = record.map_err(|e| format!("Failed to read row {}: {}", idx + 2, e))?;
        rows.push(record.iter().map(str::to_string).collect::<Vec<_>>());
    }

    Ok(RosterTable::new(headers, rows))
}
