//! Header schema derivation and migration.
//!
//! The header is a pure function of the tracked keyword list:
//! `[week-start, week-end, k1_created, k1_pushed, k2_created, ...]`.
//! When the keyword set changes, `reconcile` remaps persisted rows onto the
//! new header by column name, preserving collected data for surviving
//! columns and leaving gaps (to be filled later) for new ones.

use crate::table::RawRow;

/// Leading key columns present in every header.
pub const KEY_COLUMNS: [&str; 2] = ["week-start", "week-end"];

/// Which repository date a metric counts against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricKind {
    Created,
    Pushed,
}

impl MetricKind {
    /// All kinds, in the order cells are fetched and columns are laid out.
    pub const ALL: [MetricKind; 2] = [MetricKind::Created, MetricKind::Pushed];

    /// GitHub search qualifier name; doubles as the column-name suffix.
    pub fn qualifier(&self) -> &'static str {
        match self {
            MetricKind::Created => "created",
            MetricKind::Pushed => "pushed",
        }
    }
}

impl std::fmt::Display for MetricKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.qualifier())
    }
}

/// Column name for a (keyword, kind) metric cell.
pub fn column_name(keyword: &str, kind: MetricKind) -> String {
    format!("{}_{}", keyword, kind.qualifier())
}

/// Derive the logical header from the current keyword list.
pub fn logical_header(keywords: &[String]) -> Vec<String> {
    let mut header: Vec<String> = KEY_COLUMNS.iter().map(|c| c.to_string()).collect();
    for keyword in keywords {
        for kind in MetricKind::ALL {
            header.push(column_name(keyword, kind));
        }
    }
    header
}

/// Result of reconciling a persisted header against the logical one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Migration {
    pub header: Vec<String>,
    pub rows: Vec<RawRow>,
    /// Persisted columns with no counterpart in the new header. Their data
    /// is dropped; named here so the loss shows up in the logs.
    pub dropped_columns: Vec<String>,
}

/// Remap persisted rows onto the logical header.
///
/// Returns `None` when the headers already match (order-sensitive). Values
/// move with their column name; a column new to the header yields an empty
/// cell on every old row. Idempotent: reconciling the output against the
/// same logical header is a no-op.
pub fn reconcile(
    persisted_header: &[String],
    logical_header: &[String],
    rows: &[RawRow],
) -> Option<Migration> {
    if persisted_header == logical_header {
        return None;
    }

    let remapped = rows
        .iter()
        .map(|row| {
            logical_header
                .iter()
                .map(|column| {
                    persisted_header
                        .iter()
                        .position(|c| c == column)
                        .and_then(|idx| row.get(idx).cloned())
                        .unwrap_or_default()
                })
                .collect()
        })
        .collect();

    let dropped_columns = persisted_header
        .iter()
        .filter(|c| !logical_header.contains(c))
        .cloned()
        .collect();

    Some(Migration {
        header: logical_header.to_vec(),
        rows: remapped,
        dropped_columns,
    })
}
