//! Interval-backfill engine.
//!
//! Computes the cross-product of weekly intervals × tracked keywords, diffs
//! it against the persisted table, and fetches only the missing cells:
//! header migration first, then gap-filling of existing rows, then wholly
//! new rows. Gap-filling runs before appending so that rows persisted before
//! a keyword was added never lag behind new ones.
//!
//! Every step is independently resumable. A row is persisted only once all
//! of its cells have resolved; a fetch failure aborts the run and leaves the
//! table at its state after the most recently completed row. A failed fetch
//! is never written as 0.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use github_client::RepoCounter;
use pulse_core::{
    cell_is_missing, logical_header, parse_date_cell, reconcile, weekly_intervals, Error,
    MetricKind, RawRow, Result,
};
use table_store::TableStore;
use tracing::{debug, info, warn};

/// Backfill engine configuration.
#[derive(Debug, Clone)]
pub struct BackfillConfig {
    /// Target table name.
    pub table: String,
    /// Fixed start date; snapped forward to a Sunday if it is not one.
    pub anchor: NaiveDate,
    /// Tracked keywords, in column order.
    pub keywords: Vec<String>,
}

/// Result of one backfill run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackfillSummary {
    /// Cells filled on already-persisted rows.
    pub cells_filled: u64,
    /// Wholly new rows appended.
    pub rows_appended: u64,
    /// Remote calls issued by this run, retries included.
    pub calls_issued: u64,
}

/// Engine orchestrating migration, gap-filling, and appending.
#[derive(Debug)]
pub struct BackfillEngine<C: ?Sized, S: ?Sized> {
    counter: Arc<C>,
    store: Arc<S>,
    config: BackfillConfig,
}

impl<C, S> BackfillEngine<C, S>
where
    C: RepoCounter + ?Sized,
    S: TableStore + ?Sized,
{
    pub fn new(counter: Arc<C>, store: Arc<S>, config: BackfillConfig) -> Result<Self> {
        if config.keywords.is_empty() {
            return Err(Error::invalid_config("keyword list is empty"));
        }
        Ok(Self {
            counter,
            store,
            config,
        })
    }

    /// Run one backfill pass relative to `today`.
    pub async fn run(&self, today: NaiveDate) -> Result<BackfillSummary> {
        let table = &self.config.table;
        let header = logical_header(&self.config.keywords);

        info!(table = %table, keywords = self.config.keywords.len(), "Starting backfill");

        // The counter total is client-lifetime; the summary reports this
        // run's share of it.
        let calls_before = self.counter.calls_issued();

        let mut rows = self.load_and_migrate(&header).await?;
        let cells_filled = self.fill_gaps(&header, &mut rows).await?;
        let rows_appended = self.append_missing(&rows, today).await?;

        if rows_appended > 0 {
            self.store.sort_rows(table).await?;
        }

        let summary = BackfillSummary {
            cells_filled,
            rows_appended,
            calls_issued: self.counter.calls_issued().saturating_sub(calls_before),
        };
        info!(
            cells_filled = summary.cells_filled,
            rows_appended = summary.rows_appended,
            calls_issued = summary.calls_issued,
            "Backfill complete"
        );
        Ok(summary)
    }

    /// Step 1: load the table, creating it or migrating its header as needed.
    async fn load_and_migrate(&self, header: &[String]) -> Result<Vec<RawRow>> {
        let table = &self.config.table;

        let persisted = match self.store.read_all(table).await? {
            Some(data) => data,
            None => {
                info!(table = %table, "Table does not exist, creating");
                self.store.write_header(table, header).await?;
                return Ok(Vec::new());
            }
        };

        match reconcile(&persisted.header, header, &persisted.rows) {
            None => Ok(persisted.rows),
            Some(migration) => {
                if !migration.dropped_columns.is_empty() {
                    warn!(
                        dropped = ?migration.dropped_columns,
                        "Header migration drops columns; their data is lost"
                    );
                }
                info!(
                    table = %table,
                    old_columns = persisted.header.len(),
                    new_columns = migration.header.len(),
                    "Migrating header"
                );
                self.store.write_header(table, &migration.header).await?;
                if !migration.rows.is_empty() {
                    self.store.overwrite_rows(table, 0, &migration.rows).await?;
                }
                Ok(migration.rows)
            }
        }
    }

    /// Step 2: fill missing cells on persisted rows, persisting each row once
    /// fully healed.
    async fn fill_gaps(&self, header: &[String], rows: &mut [RawRow]) -> Result<u64> {
        let table = &self.config.table;
        let mut cells_filled = 0u64;

        for (index, row) in rows.iter_mut().enumerate() {
            if row.len() < header.len() {
                row.resize(header.len(), String::new());
            }

            let mut changed = false;
            let start = parse_date_cell(&row[0])?;
            if cell_is_missing(&row[1]) {
                row[1] = (start + Duration::days(6)).format("%Y-%m-%d").to_string();
                changed = true;
            }
            let end = parse_date_cell(&row[1])?;

            for (slot, keyword) in self.config.keywords.iter().enumerate() {
                for (offset, kind) in MetricKind::ALL.into_iter().enumerate() {
                    let column = 2 + slot * 2 + offset;
                    if !cell_is_missing(&row[column]) {
                        continue;
                    }
                    debug!(
                        week = %row[0],
                        column = %header[column],
                        "Filling missing cell"
                    );
                    let count = self.counter.count(keyword, kind, start, end).await?;
                    row[column] = count.to_string();
                    cells_filled += 1;
                    changed = true;
                }
            }

            if changed {
                self.store
                    .overwrite_rows(table, index, std::slice::from_ref(row))
                    .await?;
            }
        }

        if cells_filled > 0 {
            info!(cells_filled, "Gap-fill pass complete");
        }
        Ok(cells_filled)
    }

    /// Step 3: append one fully-populated row per missing interval.
    async fn append_missing(&self, rows: &[RawRow], today: NaiveDate) -> Result<u64> {
        let table = &self.config.table;

        let existing: HashSet<String> = rows
            .iter()
            .filter_map(|row| row.first())
            .filter(|key| !key.is_empty())
            .cloned()
            .collect();

        let missing: Vec<_> = weekly_intervals(self.config.anchor, today)
            .into_iter()
            .filter(|interval| !existing.contains(&interval.key()))
            .collect();

        if missing.is_empty() {
            info!("No missing intervals, nothing to append");
            return Ok(0);
        }

        let planned = missing.len() * self.config.keywords.len() * MetricKind::ALL.len();
        info!(
            intervals = missing.len(),
            planned_calls = planned,
            "Appending missing intervals"
        );

        let mut appended = 0u64;
        for interval in missing {
            let mut row: RawRow = vec![interval.key(), interval.end_key()];
            for keyword in &self.config.keywords {
                for kind in MetricKind::ALL {
                    let count = self
                        .counter
                        .count(keyword, kind, interval.start, interval.end)
                        .await?;
                    row.push(count.to_string());
                }
            }
            // The row is complete; only now does it touch the store.
            self.store
                .append_rows(table, std::slice::from_ref(&row))
                .await?;
            appended += 1;
            debug!(week = %interval.key(), "Appended row");
        }

        Ok(appended)
    }
}
