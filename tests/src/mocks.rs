//! Mock implementations for testing.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use github_client::{RepoCounter, RepoRef};
use parking_lot::Mutex;
use pulse_core::{Error, MetricKind, RawRow, Result, TableData};
use table_store::TableStore;

/// Scripted counting service.
///
/// Implements the same `RepoCounter` trait as the real `GitHubClient`, so
/// the backfill engine and digest worker exercise identical code paths
/// without touching the network. Counts are keyed by
/// `"{query}|{kind}|{start}"`; unkeyed lookups return a default.
#[derive(Debug)]
pub struct MockCounter {
    counts: Mutex<HashMap<String, u64>>,
    default_count: u64,
    repos: Mutex<Vec<RepoRef>>,
    calls: Mutex<Vec<String>>,
    /// Fail every call from this call number on (1-based), if set.
    fail_from_call: Mutex<Option<u64>>,
}

impl MockCounter {
    pub fn new() -> Self {
        Self::with_default(0)
    }

    pub fn with_default(default_count: u64) -> Self {
        Self {
            counts: Mutex::new(HashMap::new()),
            default_count,
            repos: Mutex::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
            fail_from_call: Mutex::new(None),
        }
    }

    fn key(query: &str, kind: MetricKind, start: NaiveDate) -> String {
        format!("{}|{}|{}", query, kind, start.format("%Y-%m-%d"))
    }

    /// Script a specific count for one (query, kind, interval-start) cell.
    pub fn set_count(&self, query: &str, kind: MetricKind, start: NaiveDate, count: u64) {
        self.counts.lock().insert(Self::key(query, kind, start), count);
    }

    /// Script the repository list returned by `top_repos`.
    pub fn set_repos(&self, repos: Vec<RepoRef>) {
        *self.repos.lock() = repos;
    }

    /// Make the Nth call (1-based) and every later call fail.
    pub fn fail_from_call(&self, call: u64) {
        *self.fail_from_call.lock() = Some(call);
    }

    /// Ordered log of every call issued, as scripted keys.
    pub fn call_log(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    fn record_call(&self, key: String) -> Result<()> {
        let mut calls = self.calls.lock();
        calls.push(key.clone());
        if let Some(fail_from) = *self.fail_from_call.lock() {
            if calls.len() as u64 >= fail_from {
                return Err(Error::fetch_exhausted(key, 3));
            }
        }
        Ok(())
    }
}

impl Default for MockCounter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RepoCounter for MockCounter {
    async fn count(
        &self,
        query: &str,
        field: MetricKind,
        start: NaiveDate,
        _end: NaiveDate,
    ) -> Result<u64> {
        let key = Self::key(query, field, start);
        self.record_call(key.clone())?;
        Ok(self
            .counts
            .lock()
            .get(&key)
            .copied()
            .unwrap_or(self.default_count))
    }

    async fn top_repos(
        &self,
        query: &str,
        field: MetricKind,
        start: NaiveDate,
        _end: NaiveDate,
        per_page: u32,
    ) -> Result<Vec<RepoRef>> {
        self.record_call(Self::key(query, field, start))?;
        let repos = self.repos.lock();
        Ok(repos.iter().take(per_page as usize).cloned().collect())
    }

    fn calls_issued(&self) -> u64 {
        self.calls.lock().len() as u64
    }
}

/// In-memory table store with the same semantics as `JsonFileStore`.
#[derive(Debug)]
pub struct InMemoryStore {
    tables: Mutex<HashMap<String, TableData>>,
    fail: Mutex<bool>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            tables: Mutex::new(HashMap::new()),
            fail: Mutex::new(false),
        }
    }

    /// Pre-populate a table, as if left behind by a previous run.
    pub fn seed(&self, table: &str, data: TableData) {
        self.tables.lock().insert(table.to_string(), data);
    }

    /// Current table contents, for assertions.
    pub fn snapshot(&self, table: &str) -> Option<TableData> {
        self.tables.lock().get(table).cloned()
    }

    /// Make every store operation fail, simulating an unreachable backend.
    pub fn set_fail(&self, fail: bool) {
        *self.fail.lock() = fail;
    }

    fn check_available(&self) -> Result<()> {
        if *self.fail.lock() {
            return Err(Error::store_unavailable("mock store failure"));
        }
        Ok(())
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TableStore for InMemoryStore {
    async fn read_all(&self, table: &str) -> Result<Option<TableData>> {
        self.check_available()?;
        Ok(self.tables.lock().get(table).cloned())
    }

    async fn write_header(&self, table: &str, header: &[String]) -> Result<()> {
        self.check_available()?;
        let mut tables = self.tables.lock();
        tables
            .entry(table.to_string())
            .or_insert_with(|| TableData::new(header.to_vec()))
            .header = header.to_vec();
        Ok(())
    }

    async fn overwrite_rows(&self, table: &str, first_row: usize, rows: &[RawRow]) -> Result<()> {
        self.check_available()?;
        let mut tables = self.tables.lock();
        let data = tables
            .get_mut(table)
            .ok_or_else(|| Error::store_unavailable(format!("no such table: {}", table)))?;
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
        Ok(())
    }

    async fn append_rows(&self, table: &str, rows: &[RawRow]) -> Result<()> {
        self.check_available()?;
        let mut tables = self.tables.lock();
        let data = tables
            .get_mut(table)
            .ok_or_else(|| Error::store_unavailable(format!("no such table: {}", table)))?;
        data.rows.extend_from_slice(rows);
        Ok(())
    }

    async fn sort_rows(&self, table: &str) -> Result<()> {
        self.check_available()?;
        let mut tables = self.tables.lock();
        let data = tables
            .get_mut(table)
            .ok_or_else(|| Error::store_unavailable(format!("no such table: {}", table)))?;
        data.sort_by_key();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn test_mock_counter_scripted_and_default() {
        let mock = MockCounter::with_default(7);
        mock.set_count("a", MetricKind::Created, date(2024, 1, 7), 42);

        let scripted = mock
            .count("a", MetricKind::Created, date(2024, 1, 7), date(2024, 1, 13))
            .await
            .unwrap();
        assert_eq!(scripted, 42);

        let fallback = mock
            .count("a", MetricKind::Pushed, date(2024, 1, 7), date(2024, 1, 13))
            .await
            .unwrap();
        assert_eq!(fallback, 7);
        assert_eq!(mock.calls_issued(), 2);
    }

    #[tokio::test]
    async fn test_mock_counter_failure_mode() {
        let mock = MockCounter::new();
        mock.fail_from_call(2);

        assert!(mock
            .count("a", MetricKind::Created, date(2024, 1, 7), date(2024, 1, 13))
            .await
            .is_ok());
        assert!(mock
            .count("a", MetricKind::Pushed, date(2024, 1, 7), date(2024, 1, 13))
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_in_memory_store_failure_mode() {
        let store = InMemoryStore::new();
        store.set_fail(true);
        assert!(store.read_all("weekly").await.is_err());
    }
}
