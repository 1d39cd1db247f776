//! DuckDB-backed warehouse
//!
//! The warehouse is one in-memory DuckDB session. Each catalog is a DuckDB
//! database attached to it: `<root>/<catalog>.duckdb` for a file-backed
//! warehouse, or an in-memory database when no root is given. Schemas and
//! tables live inside the attached catalog.
//!
//! ## Example
//!
//! ```rust,ignore
//! use bronze_ingest::warehouse::{Namespace, Warehouse, WriteOptions};
//!
//! let mut warehouse = Warehouse::open("warehouse")?;
//! let ns = Namespace::new("don_datalab_catalog", "bronze")?;
//! warehouse.ensure_namespace(&ns)?;
//! let summary = warehouse.overwrite_table(&ns.table("orders")?, &records, &WriteOptions::default())?;
//! ```

use duckdb::ToSql;
use duckdb::types::{ToSqlOutput, Value as DuckValue};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub mod error;
pub mod namespace;
pub mod plan;

pub use error::{WarehouseError, WarehouseResult};
pub use namespace::{Namespace, TableRef};
pub use plan::{ExistingColumn, PlannedColumn, WritePlan, plan_write};

use crate::source::{RecordSet, Value};
use crate::validation::{quote_identifier, quote_literal};

/// How a table is replaced
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteOptions {
    /// Keep existing columns that the incoming data lacks
    pub merge_schema: bool,
    /// Insert rows ordered by this column
    pub cluster_by: Option<String>,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            merge_schema: true,
            cluster_by: None,
        }
    }
}

impl WriteOptions {
    pub fn with_merge_schema(mut self, merge_schema: bool) -> Self {
        self.merge_schema = merge_schema;
        self
    }

    pub fn with_cluster_by(mut self, column: Option<&str>) -> Self {
        self.cluster_by = column.map(str::to_string);
        self
    }
}

/// Result of a table replacement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteSummary {
    pub table: String,
    pub rows_written: usize,
    pub columns: Vec<String>,
    pub carried_columns: Vec<String>,
    /// Whether a previous version of the table existed
    pub replaced: bool,
}

impl ToSql for Value {
    fn to_sql(&self) -> duckdb::Result<ToSqlOutput<'_>> {
        let value = match self {
            Value::Null => DuckValue::Null,
            Value::Bool(b) => DuckValue::Boolean(*b),
            Value::Int(n) => DuckValue::BigInt(*n),
            Value::Float(f) => DuckValue::Double(*f),
            Value::Bytes(b) => DuckValue::Blob(b.clone()),
            Value::Text(s) => DuckValue::Text(s.clone()),
            // Exact and temporal values travel as text and are cast by the
            // INSERT statement
            Value::Decimal(_) | Value::Date(_) | Value::Time(_) | Value::Timestamp(_) => {
                DuckValue::Text(self.to_string())
            }
        };
        Ok(ToSqlOutput::Owned(value))
    }
}

/// Embedded DuckDB warehouse
pub struct Warehouse {
    conn: duckdb::Connection,
    root: Option<PathBuf>,
    read_only: bool,
}

impl Warehouse {
    /// Open a file-backed warehouse rooted at `root`, creating the directory
    pub fn open(root: impl AsRef<Path>) -> WarehouseResult<Self> {
        let root = root.as_ref();
        std::fs::create_dir_all(root)?;
        let conn = duckdb::Connection::open_in_memory()?;
        Ok(Self {
            conn,
            root: Some(root.to_path_buf()),
            read_only: false,
        })
    }

    /// Open a file-backed warehouse whose catalogs are attached read-only.
    ///
    /// Namespaces are never created; selecting a catalog or schema that does
    /// not exist yet is an error.
    pub fn open_read_only(root: impl AsRef<Path>) -> WarehouseResult<Self> {
        let conn = duckdb::Connection::open_in_memory()?;
        Ok(Self {
            conn,
            root: Some(root.as_ref().to_path_buf()),
            read_only: true,
        })
    }

    /// Open an in-memory warehouse (for testing)
    pub fn memory() -> WarehouseResult<Self> {
        let conn = duckdb::Connection::open_in_memory()?;
        Ok(Self {
            conn,
            root: None,
            read_only: false,
        })
    }

    /// Warehouse root directory (if not in-memory)
    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    /// Whether catalogs are attached read-only
    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Underlying DuckDB session
    pub fn connection(&self) -> &duckdb::Connection {
        &self.conn
    }

    /// File holding `catalog`, `None` for an in-memory warehouse
    pub fn catalog_path(&self, catalog: &str) -> Option<PathBuf> {
        self.root
            .as_ref()
            .map(|root| root.join(format!("{}.duckdb", catalog)))
    }

    /// Create the catalog and schema if absent, then select them.
    ///
    /// Idempotent; a partially created namespace is completed by the next
    /// call.
    pub fn ensure_namespace(&self, namespace: &Namespace) -> WarehouseResult<()> {
        let location = match self.catalog_path(namespace.catalog()) {
            Some(path) => path.display().to_string(),
            None => ":memory:".to_string(),
        };
        let catalog = quote_identifier(namespace.catalog());

        let read_only = self.read_only && self.root.is_some();

        debug!(catalog = namespace.catalog(), location = %location, read_only, "Attaching catalog");
        self.conn.execute_batch(&format!(
            "ATTACH IF NOT EXISTS {} AS {}{};",
            quote_literal(&location),
            catalog,
            if read_only { " (READ_ONLY)" } else { "" }
        ))?;
        self.conn.execute_batch(&format!("USE {};", catalog))?;
        if !read_only {
            self.conn.execute_batch(&format!(
                "CREATE SCHEMA IF NOT EXISTS {};",
                namespace.qualified()
            ))?;
        }
        self.conn
            .execute_batch(&format!("USE {};", namespace.qualified()))?;

        info!("Using catalog: {}", namespace.catalog());
        info!("Using schema: {}", namespace.schema());
        Ok(())
    }

    /// Columns of an existing table, empty when the table does not exist
    pub fn table_columns(&self, table: &TableRef) -> WarehouseResult<Vec<ExistingColumn>> {
        read_columns(&self.conn, table)
    }

    /// Whether the table exists
    pub fn table_exists(&self, table: &TableRef) -> WarehouseResult<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM information_schema.tables \
             WHERE table_catalog = ? AND table_schema = ? AND table_name = ?",
            duckdb::params![
                table.namespace().catalog(),
                table.namespace().schema(),
                table.name()
            ],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Replace a table with `records` in a single transaction.
    ///
    /// On any error the transaction rolls back and the previous table is
    /// left as it was.
    pub fn overwrite_table(
        &mut self,
        table: &TableRef,
        records: &RecordSet,
        options: &WriteOptions,
    ) -> WarehouseResult<WriteSummary> {
        let tx = self.conn.transaction()?;

        let existing = read_columns(&tx, table)?;
        let plan = plan_write(&table.to_string(), &records.columns, &existing, options.merge_schema)?;
        let carried = plan.carried_columns();
        if !carried.is_empty() {
            info!(
                table = %table,
                columns = %carried.join(", "),
                "Keeping existing columns missing from incoming data"
            );
        }

        let definitions: Vec<String> = plan
            .columns
            .iter()
            .map(|c| format!("{} {}", quote_identifier(&c.name), c.data_type))
            .collect();
        tx.execute_batch(&format!(
            "CREATE OR REPLACE TABLE {} ({});",
            table.qualified(),
            definitions.join(", ")
        ))?;

        let order: Vec<usize> = match &options.cluster_by {
            Some(column) => match records.column_index(column) {
                Some(index) => records.order_by(index),
                None => {
                    warn!(table = %table, column = %column, "Clustering column not found, writing in source order");
                    (0..records.len()).collect()
                }
            },
            None => (0..records.len()).collect(),
        };

        if !records.columns.is_empty() {
            let insert_columns: Vec<&PlannedColumn> = plan.insert_columns().collect();
            let names: Vec<String> = insert_columns
                .iter()
                .map(|c| quote_identifier(&c.name))
                .collect();
            let placeholders: Vec<String> = insert_columns
                .iter()
                .map(|c| format!("CAST(? AS {})", c.data_type))
                .collect();
            let sql = format!(
                "INSERT INTO {} ({}) VALUES ({})",
                table.qualified(),
                names.join(", "),
                placeholders.join(", ")
            );

            let mut stmt = tx.prepare(&sql)?;
            for &index in &order {
                let params: Vec<&dyn ToSql> =
                    records.rows[index].iter().map(|v| v as &dyn ToSql).collect();
                stmt.execute(params.as_slice())?;
            }
        }

        tx.commit()?;

        Ok(WriteSummary {
            table: table.to_string(),
            rows_written: order.len(),
            columns: plan.columns.iter().map(|c| c.name.clone()).collect(),
            carried_columns: carried,
            replaced: !existing.is_empty(),
        })
    }

    /// Number of rows in a table
    pub fn row_count(&self, table: &TableRef) -> WarehouseResult<u64> {
        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", table.qualified()),
            [],
            |row| row.get(0),
        )?;
        Ok(count.max(0) as u64)
    }

    /// Run a query and return results as JSON objects
    pub fn query(&self, sql: &str) -> WarehouseResult<Vec<serde_json::Value>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query([])?;

        // Column names are only known once the statement has executed
        let column_count = rows.as_ref().map(|r| r.column_count()).unwrap_or(0);
        let column_names: Vec<String> = (0..column_count)
            .map(|i| {
                rows.as_ref()
                    .and_then(|r| r.column_name(i).ok())
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| format!("col{}", i))
            })
            .collect();

        let mut results = Vec::new();
        while let Some(row) = rows.next()? {
            let mut obj = serde_json::Map::new();
            for (i, name) in column_names.iter().enumerate() {
                let value: DuckValue = row.get(i)?;
                obj.insert(name.clone(), json_value(value));
            }
            results.push(serde_json::Value::Object(obj));
        }

        Ok(results)
    }
}

fn read_columns(conn: &duckdb::Connection, table: &TableRef) -> WarehouseResult<Vec<ExistingColumn>> {
    let mut stmt = conn.prepare(
        "SELECT column_name, data_type FROM information_schema.columns \
         WHERE table_catalog = ? AND table_schema = ? AND table_name = ? \
         ORDER BY ordinal_position",
    )?;
    let rows = stmt.query_map(
        duckdb::params![
            table.namespace().catalog(),
            table.namespace().schema(),
            table.name()
        ],
        |row| {
            Ok(ExistingColumn {
                name: row.get(0)?,
                data_type: row.get(1)?,
            })
        },
    )?;

    let mut columns = Vec::new();
    for column in rows {
        columns.push(column?);
    }
    Ok(columns)
}

fn json_value(value: DuckValue) -> serde_json::Value {
    match value {
        DuckValue::Null => serde_json::Value::Null,
        DuckValue::Boolean(b) => serde_json::Value::Bool(b),
        DuckValue::TinyInt(n) => serde_json::Value::Number(n.into()),
        DuckValue::SmallInt(n) => serde_json::Value::Number(n.into()),
        DuckValue::Int(n) => serde_json::Value::Number(n.into()),
        DuckValue::BigInt(n) => serde_json::Value::Number(n.into()),
        DuckValue::UTinyInt(n) => serde_json::Value::Number(n.into()),
        DuckValue::USmallInt(n) => serde_json::Value::Number(n.into()),
        DuckValue::UInt(n) => serde_json::Value::Number(n.into()),
        DuckValue::UBigInt(n) => serde_json::Value::Number(n.into()),
        DuckValue::HugeInt(n) => i64::try_from(n)
            .map(|n| serde_json::Value::Number(n.into()))
            .unwrap_or_else(|_| serde_json::Value::String(n.to_string())),
        DuckValue::Float(f) => serde_json::Number::from_f64(f as f64)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        DuckValue::Double(f) => serde_json::Number::from_f64(f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        DuckValue::Decimal(d) => serde_json::Value::String(d.to_string()),
        DuckValue::Text(s) => serde_json::Value::String(s),
        other => serde_json::Value::String(format!("{:?}", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{Column, ColumnType, Decimal};

    fn namespace() -> Namespace {
        Namespace::new("test_catalog", "bronze").unwrap()
    }

    fn holdings(rows: &[(i64, Option<i64>)]) -> RecordSet {
        let mut records = RecordSet::new(vec![
            Column::new("StockItemID", ColumnType::Integer),
            Column::new("QuantityOnHand", ColumnType::Integer),
            Column::new("LastCostPrice", ColumnType::Decimal { scale: 2 }),
        ]);
        for (id, qty) in rows {
            records.push_row(vec![
                Value::Int(*id),
                qty.map(Value::Int).unwrap_or(Value::Null),
                Value::Decimal(Decimal::new(1050, 2)),
            ]);
        }
        records
    }

    #[test]
    fn test_ensure_namespace_is_idempotent() {
        let warehouse = Warehouse::memory().expect("Failed to create warehouse");
        warehouse.ensure_namespace(&namespace()).unwrap();
        warehouse.ensure_namespace(&namespace()).unwrap();

        let rows = warehouse
            .query("SELECT current_database() AS db, current_schema() AS sch")
            .unwrap();
        assert_eq!(rows[0]["db"], "test_catalog");
        assert_eq!(rows[0]["sch"], "bronze");
    }

    #[test]
    fn test_overwrite_creates_and_replaces() {
        let mut warehouse = Warehouse::memory().expect("Failed to create warehouse");
        let ns = namespace();
        warehouse.ensure_namespace(&ns).unwrap();
        let table = ns.table("stock_item_holdings").unwrap();

        let first = warehouse
            .overwrite_table(&table, &holdings(&[(1, Some(5)), (2, None)]), &WriteOptions::default())
            .unwrap();
        assert_eq!(first.rows_written, 2);
        assert!(!first.replaced);

        let second = warehouse
            .overwrite_table(&table, &holdings(&[(3, Some(1))]), &WriteOptions::default())
            .unwrap();
        assert!(second.replaced);
        assert_eq!(warehouse.row_count(&table).unwrap(), 1);

        let rows = warehouse
            .query("SELECT CAST(LastCostPrice AS DOUBLE) AS price FROM stock_item_holdings")
            .unwrap();
        assert_eq!(rows[0]["price"], 10.5);

        let columns = warehouse.table_columns(&table).unwrap();
        assert_eq!(columns[2].data_type, "DECIMAL(38,2)");
    }

    #[test]
    fn test_overwrite_with_cluster_column() {
        let mut warehouse = Warehouse::memory().expect("Failed to create warehouse");
        let ns = namespace();
        warehouse.ensure_namespace(&ns).unwrap();
        let table = ns.table("holdings").unwrap();

        let options = WriteOptions::default().with_cluster_by(Some("QuantityOnHand"));
        warehouse
            .overwrite_table(&table, &holdings(&[(1, Some(9)), (2, None), (3, Some(4))]), &options)
            .unwrap();

        let rows = warehouse
            .query("SELECT StockItemID FROM holdings WHERE rowid = 0")
            .unwrap();
        assert_eq!(rows[0]["StockItemID"], 2);
    }

    #[test]
    fn test_failed_insert_keeps_previous_table() {
        let mut warehouse = Warehouse::memory().expect("Failed to create warehouse");
        let ns = namespace();
        warehouse.ensure_namespace(&ns).unwrap();
        let table = ns.table("stock_item_holdings").unwrap();

        warehouse
            .overwrite_table(
                &table,
                &holdings(&[(1, Some(5)), (2, Some(6)), (3, None)]),
                &WriteOptions::default(),
            )
            .unwrap();

        // Second row cannot be cast to the INTEGER column after the table was recreated
        let mut broken = holdings(&[(4, Some(1))]);
        broken.push_row(vec![
            Value::Int(5),
            Value::Text("not a number".to_string()),
            Value::Decimal(Decimal::new(1050, 2)),
        ]);

        let err = warehouse
            .overwrite_table(&table, &broken, &WriteOptions::default())
            .unwrap_err();
        assert!(matches!(err, WarehouseError::Database(_)));

        assert_eq!(warehouse.row_count(&table).unwrap(), 3);
        let rows = warehouse
            .query("SELECT MAX(StockItemID) AS max_id FROM stock_item_holdings")
            .unwrap();
        assert_eq!(rows[0]["max_id"], 3);
    }

    #[test]
    fn test_empty_record_set_creates_table() {
        let mut warehouse = Warehouse::memory().expect("Failed to create warehouse");
        let ns = namespace();
        warehouse.ensure_namespace(&ns).unwrap();
        let table = ns.table("stock_groups").unwrap();

        let summary = warehouse
            .overwrite_table(&table, &holdings(&[]), &WriteOptions::default())
            .unwrap();
        assert_eq!(summary.rows_written, 0);
        assert!(warehouse.table_exists(&table).unwrap());
        assert_eq!(warehouse.row_count(&table).unwrap(), 0);
    }
}
