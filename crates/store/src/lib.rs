//! Persisted table store for repo-pulse.
//!
//! The store is an external collaborator: a named 2-D table keyed by row
//! (interval identity) and column (metric name). This crate defines the
//! operation surface and a JSON-file-backed implementation.

pub mod json_file;
pub mod normalize;

use async_trait::async_trait;
use pulse_core::{RawRow, Result, TableData};

pub use json_file::JsonFileStore;

/// Operation surface of the persisted table.
#[async_trait]
pub trait TableStore: Send + Sync {
    /// Read the full table (header + data rows), or `None` if it does not
    /// exist yet. Implementations must hand the core canonical `YYYY-MM-DD`
    /// strings for the two leading date columns.
    async fn read_all(&self, table: &str) -> Result<Option<TableData>>;

    /// Overwrite the header row, creating the table if needed. Data rows are
    /// untouched.
    async fn write_header(&self, table: &str, header: &[String]) -> Result<()>;

    /// Overwrite a contiguous block of data rows starting at `first_row`
    /// (0-based, header excluded).
    async fn overwrite_rows(&self, table: &str, first_row: usize, rows: &[RawRow]) -> Result<()>;

    /// Append data rows after the last existing row.
    async fn append_rows(&self, table: &str, rows: &[RawRow]) -> Result<()>;

    /// Stable ascending sort of data rows by the first column. Header
    /// excluded.
    async fn sort_rows(&self, table: &str) -> Result<()>;
}
