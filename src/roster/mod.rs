//! Roster tables.
//!
//! A roster is a rectangular table of text cells. Cells that are missing in
//! the source are filled with `""`, so column access never fails and callers
//! never special-case an absent cell.

pub mod loader;
pub mod templates;

pub use loader::{decode_roster_bytes, load_csv, parse_csv_text};
pub use templates::{write_template, TemplateKind};

use serde::{Deserialize, Serialize};

/// One data row; identity is its position in the source table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterRow {
    index: usize,
    cells: Vec<String>,
}

impl RosterRow {
    /// Zero-based position among data rows (the header is not counted)
    pub fn index(&self) -> usize {
        self.index
    }

    /// Cell text, `""` past the end of the row
    pub fn get(&self, column: usize) -> &str {
        self.cells.get(column).map(String::as_str).unwrap_or("")
    }

    pub fn cells(&self) -> &[String] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Parsed roster with a header row
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterTable {
    headers: Vec<String>,
    rows: Vec<RosterRow>,
    width: usize,
}

impl RosterTable {
    /// Build a table, padding every row (and the header) to the widest row
    pub fn new<H, R, C>(headers: H, rows: R) -> Self
    where
        H: IntoIterator,
        H::Item: Into<String>,
        R: IntoIterator<Item = C>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        let mut headers: Vec<String> = headers.into_iter().map(Into::into).collect();
        let raw_rows: Vec<Vec<String>> = rows
            .into_iter()
            .map(|row| row.into_iter().map(Into::into).collect())
            .collect();

        let width = raw_rows
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(headers.len()))
            .max()
            .unwrap_or(0);

        headers.resize(width, String::new());
        let rows = raw_rows
            .into_iter()
            .enumerate()
            .map(|(index, mut cells)| {
                cells.resize(width, String::new());
                RosterRow { index, cells }
            })
            .collect();

        Self {
            headers,
            rows,
            width,
        }
    }

    /// Number of columns
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of data rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[RosterRow] {
        &self.rows
    }

    /// All values of one column, in row order
    pub fn column(&self, column: usize) -> impl Iterator<Item = &str> + '_ {
        self.rows.iter().map(move |row| row.get(column))
    }
}
