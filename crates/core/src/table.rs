//! Persisted table model.
//!
//! The store surface deals in raw string cells, mirroring spreadsheet
//! semantics: an empty string is a missing cell, never a zero. The first two
//! columns of every data row are the interval identity (`week-start`,
//! `week-end`) as canonical `YYYY-MM-DD` strings; the store boundary is
//! responsible for normalizing whatever the backing medium round-trips.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A single data row: raw string cells, positionally aligned to the header.
pub type RawRow = Vec<String>;

/// Full contents of a persisted table: header plus data rows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableData {
    pub header: Vec<String>,
    pub rows: Vec<RawRow>,
}

impl TableData {
    pub fn new(header: Vec<String>) -> Self {
        Self {
            header,
            rows: Vec::new(),
        }
    }

    /// Sort data rows ascending by interval start identity. Stable, header
    /// excluded by construction.
    pub fn sort_by_key(&mut self) {
        self.rows
            .sort_by(|a, b| row_key(a).cmp(row_key(b)));
    }
}

fn row_key(row: &RawRow) -> &str {
    row.first().map(String::as_str).unwrap_or("")
}

/// Whether a raw cell counts as missing.
pub fn cell_is_missing(cell: &str) -> bool {
    cell.trim().is_empty()
}

/// Parse an interval-identity cell into a date, rejecting anything that is
/// not canonical `YYYY-MM-DD`.
pub fn parse_date_cell(cell: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(cell, "%Y-%m-%d")
        .map_err(|_| Error::schema(format!("malformed date cell: {:?}", cell)))
}
