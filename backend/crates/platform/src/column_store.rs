//! In-process wide-column store
//!
//! Tables hold rows addressed by a string row key, each row a sorted map of
//! column name to value. Rows are kept in key order so that prefix scans
//! return them sorted, forward or reverse.
//!
//! Composite row keys are built with [`RowKey`], which pads integers so that
//! lexicographic order equals numeric order.

use std::collections::BTreeMap;
use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use thiserror::Error;

pub type Columns = BTreeMap<String, String>;
type Table = BTreeMap<String, Columns>;

const SEPARATOR: char = ':';
const INT_WIDTH: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColumnStoreError {
    #[error("table `{0}` already exists")]
    TableExists(String),
    #[error("table `{0}` does not exist")]
    TableNotFound(String),
}

// ============================================================================
// Row keys
// ============================================================================

/// Composite row key: fields joined by `:`.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct RowKey(String);

impl RowKey {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(mut self, field: &str) -> Self {
        if !self.0.is_empty() {
            self.0.push(SEPARATOR);
        }
        self.0.push_str(field);
        self
    }

    pub fn field(self, value: impl AsRef<str>) -> Self {
        self.push(value.as_ref())
    }

    /// Zero-padded to 20 digits (`u64::MAX` has 20).
    pub fn int(self, value: u64) -> Self {
        self.push(&format!("{:0width$}", value, width = INT_WIDTH))
    }

    /// Prefix matching every key that starts with these fields.
    pub fn prefix(&self) -> String {
        format!("{}{}", self.0, SEPARATOR)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for RowKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Store
// ============================================================================

/// Cheap to clone; clones share the same tables.
#[derive(Debug, Clone, Default)]
pub struct ColumnStore {
    tables: Arc<DashMap<String, Table>>,
}

impl ColumnStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_table(&self, name: &str) -> Result<(), ColumnStoreError> {
        match self.tables.entry(name.to_string()) {
            Entry::Occupied(_) => Err(ColumnStoreError::TableExists(name.to_string())),
            Entry::Vacant(vacant) => {
                vacant.insert(Table::new());
                tracing::debug!(table = %name, "Column table created");
                Ok(())
            }
        }
    }

    pub fn drop_table(&self, name: &str) -> Result<(), ColumnStoreError> {
        self.tables
            .remove(name)
            .map(|_| tracing::debug!(table = %name, "Column table dropped"))
            .ok_or_else(|| ColumnStoreError::TableNotFound(name.to_string()))
    }

    pub fn has_table(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    /// Merge `columns` into the row, creating it if needed.
    pub fn put(&self, table: &str, row_key: &str, columns: Columns) -> Result<(), ColumnStoreError> {
        let mut rows = self
            .tables
            .get_mut(table)
            .ok_or_else(|| ColumnStoreError::TableNotFound(table.to_string()))?;
        rows.entry(row_key.to_string()).or_default().extend(columns);
        Ok(())
    }

    /// Check-and-put: write `columns` at `row_key` unless a row under `prefix`
    /// already matches `exists`, in which case that row is returned and nothing
    /// is written. The check and the write hold the same table lock.
    pub fn put_unless(
        &self,
        table: &str,
        prefix: &str,
        exists: impl Fn(&Columns) -> bool,
        row_key: &str,
        columns: Columns,
    ) -> Result<Option<Columns>, ColumnStoreError> {
        let mut rows = self
            .tables
            .get_mut(table)
            .ok_or_else(|| ColumnStoreError::TableNotFound(table.to_string()))?;

        let found = rows
            .range::<str, _>((std::ops::Bound::Included(prefix), std::ops::Bound::Unbounded))
            .take_while(|(key, _)| key.starts_with(prefix))
            .find(|(_, row)| exists(row))
            .map(|(_, row)| row.clone());
        if found.is_none() {
            rows.entry(row_key.to_string()).or_default().extend(columns);
        }
        Ok(found)
    }

    pub fn get(&self, table: &str, row_key: &str) -> Result<Option<Columns>, ColumnStoreError> {
        let rows = self
            .tables
            .get(table)
            .ok_or_else(|| ColumnStoreError::TableNotFound(table.to_string()))?;
        Ok(rows.get(row_key).cloned())
    }

    pub fn delete(&self, table: &str, row_key: &str) -> Result<bool, ColumnStoreError> {
        let mut rows = self
            .tables
            .get_mut(table)
            .ok_or_else(|| ColumnStoreError::TableNotFound(table.to_string()))?;
        Ok(rows.remove(row_key).is_some())
    }

    /// Rows whose key starts with `prefix`, in key order (or reversed), at
    /// most `limit` of them when given.
    pub fn scan(
        &self,
        table: &str,
        prefix: &str,
        limit: Option<usize>,
        reverse: bool,
    ) -> Result<Vec<(String, Columns)>, ColumnStoreError> {
        let rows = self
            .tables
            .get(table)
            .ok_or_else(|| ColumnStoreError::TableNotFound(table.to_string()))?;

        let matching = rows
            .range::<str, _>((std::ops::Bound::Included(prefix), std::ops::Bound::Unbounded))
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(key, columns)| (key.clone(), columns.clone()));

        let limit = limit.unwrap_or(usize::MAX);
        let result = if reverse {
            let mut all: Vec<_> = matching.collect();
            all.reverse();
            all.truncate(limit);
            all
        } else {
            matching.take(limit).collect()
        };
        Ok(result)
    }
}

/// Build a [`Columns`] map from pairs.
pub fn columns<const N: usize>(pairs: [(&str, String); N]) -> Columns {
    pairs
        .into_iter()
        .map(|(name, value)| (name.to_string(), value))
        .collect()
}
