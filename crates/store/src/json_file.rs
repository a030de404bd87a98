//! JSON-file-backed table store.
//!
//! One file per table: `{dir}/{table}.json` holding the serialized
//! [`TableData`]. Every mutation is a read-modify-write of the whole file;
//! tables here are a few hundred rows at most, and the single-writer
//! assumption holds (one scheduled invocation at a time).

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use pulse_core::{Error, RawRow, Result, TableData};
use tracing::{debug, info};

use crate::normalize::normalize_date_cell;
use crate::TableStore;

/// How many leading columns hold interval-identity dates.
const DATE_COLUMNS: usize = 2;

pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn table_path(&self, table: &str) -> PathBuf {
        self.dir.join(format!("{}.json", table))
    }

    async fn load(&self, path: &Path) -> Result<Option<TableData>> {
        match tokio::fs::read(path).await {
            Ok(bytes) => {
                let mut table: TableData = serde_json::from_slice(&bytes)?;
                for row in &mut table.rows {
                    for cell in row.iter_mut().take(DATE_COLUMNS) {
                        *cell = normalize_date_cell(cell);
                    }
                }
                Ok(Some(table))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::store_unavailable(format!(
                "failed to read {}: {}",
                path.display(),
                e
            ))),
        }
    }

    async fn save(&self, path: &Path, table: &TableData) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir).await.map_err(|e| {
            Error::store_unavailable(format!("failed to create {}: {}", self.dir.display(), e))
        })?;
        let bytes = serde_json::to_vec_pretty(table)?;
        tokio::fs::write(path, bytes).await.map_err(|e| {
            Error::store_unavailable(format!("failed to write {}: {}", path.display(), e))
        })
    }

    /// Load for mutation, failing if the table is missing.
    async fn load_required(&self, table: &str) -> Result<(PathBuf, TableData)> {
        let path = self.table_path(table);
        let data = self
            .load(&path)
            .await?
            .ok_or_else(|| Error::store_unavailable(format!("no such table: {}", table)))?;
        Ok((path, data))
    }
}

#[async_trait]
impl TableStore for JsonFileStore {
    async fn read_all(&self, table: &str) -> Result<Option<TableData>> {
        let path = self.table_path(table);
        let data = self.load(&path).await?;
        debug!(
            table = table,
            rows = data.as_ref().map(|t| t.rows.len()).unwrap_or(0),
            exists = data.is_some(),
            "Read table"
        );
        Ok(data)
    }

    async fn write_header(&self, table: &str, header: &[String]) -> Result<()> {
        let path = self.table_path(table);
        let mut data = self
            .load(&path)
            .await?
            .unwrap_or_else(|| TableData::new(header.to_vec()));
        data.header = header.to_vec();
        info!(table = table, columns = header.len(), "Wrote header");
        self.save(&path, &data).await
    }

    async fn overwrite_rows(&self, table: &str, first_row: usize, rows: &[RawRow]) -> Result<()> {
        let (path, mut data) = self.load_required(table).await?;
        let end = first_row + rows.len();
        if end > data.rows.len() {
            return Err(Error::store_unavailable(format!(
                "range write {}..{} out of bounds for {} rows",
                first_row,
                end,
                data.rows.len()
            )));
        }
        data.rows[first_row..end].clone_from_slice(rows);
        self.save(&path, &data).await
    }

    async fn append_rows(&self, table: &str, rows: &[RawRow]) -> Result<()> {
        let (path, mut data) = self.load_required(table).await?;
        data.rows.extend_from_slice(rows);
        self.save(&path, &data).await
    }

    async fn sort_rows(&self, table: &str) -> Result<()> {
        let (path, mut data) = self.load_required(table).await?;
        data.sort_by_key();
        self.save(&path, &data).await
    }
}
