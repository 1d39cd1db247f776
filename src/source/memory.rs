//! In-memory source for offline runs and tests

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use super::error::{SourceError, SourceResult};
use super::record::RecordSet;
use super::Source;

/// Serves fixed result sets keyed by source table name.
///
/// A query is answered by the fixture whose table name follows `FROM`, and
/// projected onto the query's select list the way SQL Server would: an
/// unknown column name fails the query.
#[derive(Debug, Default)]
pub struct MemorySource {
    tables: BTreeMap<String, RecordSet>,
    failures: BTreeMap<String, String>,
    disconnects: BTreeMap<String, String>,
    unreachable: Option<String>,
    queries: Arc<Mutex<Vec<String>>>,
    closed: bool,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `records` for queries against `table` (e.g. `Sales.Orders`)
    pub fn with_table(mut self, table: impl Into<String>, records: RecordSet) -> Self {
        self.tables.insert(table.into(), records);
        self
    }

    /// Fail queries against `table` with a query error
    pub fn fail_on(mut self, table: impl Into<String>, message: impl Into<String>) -> Self {
        self.failures.insert(table.into(), message.into());
        self
    }

    /// Fail queries against `table` with a connection error
    pub fn disconnect_on(mut self, table: impl Into<String>, message: impl Into<String>) -> Self {
        self.disconnects.insert(table.into(), message.into());
        self
    }

    /// Fail every query with a connection error
    pub fn unreachable(mut self, message: impl Into<String>) -> Self {
        self.unreachable = Some(message.into());
        self
    }

    /// Shared log of every query received, in order
    pub fn query_log(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.queries)
    }

    fn record_query(&self, query: &str) {
        if let Ok(mut queries) = self.queries.lock() {
            queries.push(query.to_string());
        }
    }

    fn target_table(&self, query: &str) -> Option<&str> {
        let upper = query.to_ascii_uppercase();
        let from = upper.find(" FROM ")? + " FROM ".len();
        let target = query[from..].split_whitespace().next()?;
        self.tables
            .keys()
            .chain(self.failures.keys())
            .chain(self.disconnects.keys())
            .find(|name| name.eq_ignore_ascii_case(target))
            .map(String::as_str)
    }
}

/// Column names between `SELECT` and `FROM`; `None` for `SELECT *`
fn select_list(query: &str) -> Option<Vec<String>> {
    let upper = query.to_ascii_uppercase();
    let start = upper.find("SELECT")? + "SELECT".len();
    let end = upper.find(" FROM ")?;
    let list = query.get(start..end)?.trim();
    if list == "*" {
        return None;
    }
    Some(
        list.split(',')
            .map(|c| c.trim().trim_matches(|ch| ch == '[' || ch == ']').to_string())
            .filter(|c| !c.is_empty())
            .collect(),
    )
}

fn project(records: &RecordSet, names: &[String]) -> SourceResult<RecordSet> {
    let mut indices = Vec::with_capacity(names.len());
    for name in names {
        let index = records
            .column_index(name)
            .ok_or_else(|| SourceError::Query(format!("Invalid column name '{}'.", name)))?;
        indices.push(index);
    }

    let mut projected = RecordSet::new(indices.iter().map(|&i| records.columns[i].clone()).collect());
    for row in &records.rows {
        projected.push_row(indices.iter().map(|&i| row[i].clone()).collect());
    }
    Ok(projected)
}

#[async_trait]
impl Source for MemorySource {
    fn describe(&self) -> String {
        format!("memory://{} table(s)", self.tables.len())
    }

    async fn fetch(&mut self, query: &str) -> SourceResult<RecordSet> {
        self.record_query(query);
        let query = query.split_whitespace().collect::<Vec<_>>().join(" ");
        let query = query.as_str();

        if self.closed {
            return Err(SourceError::Closed);
        }
        if let Some(message) = &self.unreachable {
            return Err(SourceError::Connection {
                address: "memory".to_string(),
                message: message.clone(),
            });
        }

        let table = self
            .target_table(query)
            .ok_or_else(|| SourceError::Query("Invalid object name.".to_string()))?
            .to_string();
        if let Some(message) = self.disconnects.get(&table) {
            return Err(SourceError::Connection {
                address: "memory".to_string(),
                message: message.clone(),
            });
        }
        if let Some(message) = self.failures.get(&table) {
            return Err(SourceError::Query(message.clone()));
        }
        let records = self
            .tables
            .get(&table)
            .ok_or_else(|| SourceError::Query(format!("Invalid object name '{}'.", table)))?;

        match select_list(query) {
            Some(names) => project(records, &names),
            None => Ok(records.clone()),
        }
    }

    async fn close(&mut self) -> SourceResult<()> {
        self.closed = true;
        Ok(())
    }
}
