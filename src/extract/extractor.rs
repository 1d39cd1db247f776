//! Per-table extraction: query, tag, check, write

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{Instrument, error, info, info_span};

use super::error::{ExtractError, ExtractResult};
use super::lineage::Lineage;
use super::quality::{self, CheckOutcome};
use super::stats::{self, StatisticOutcome};
use super::tables::TableSpec;
use crate::source::Source;
use crate::warehouse::{Namespace, Warehouse, WriteOptions};

/// Result of extracting one table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableOutcome {
    pub entity: String,
    /// Fully qualified destination table
    pub table: String,
    pub batch_id: String,
    pub extracted_at: DateTime<Utc>,
    pub rows_extracted: usize,
    pub rows_written: usize,
    pub carried_columns: Vec<String>,
    pub checks: Vec<CheckOutcome>,
    pub statistics: Vec<StatisticOutcome>,
    pub duration_ms: u64,
}

impl TableOutcome {
    /// Checks that raised a warning or notice
    pub fn flagged_checks(&self) -> impl Iterator<Item = &CheckOutcome> {
        self.checks.iter().filter(|c| c.is_flagged())
    }
}

/// Extracts one table into the warehouse
pub struct TableExtractor<'a> {
    spec: &'a TableSpec,
    namespace: &'a Namespace,
    source_system: &'a str,
    merge_schema: bool,
}

impl<'a> TableExtractor<'a> {
    pub fn new(spec: &'a TableSpec, namespace: &'a Namespace, source_system: &'a str) -> Self {
        Self {
            spec,
            namespace,
            source_system,
            merge_schema: true,
        }
    }

    /// Keep or reject existing columns missing from the incoming data
    pub fn with_merge_schema(mut self, merge_schema: bool) -> Self {
        self.merge_schema = merge_schema;
        self
    }

    /// Run the extraction. Quality checks and statistics are logged and never
    /// fail; source and write errors abort.
    pub async fn run<S: Source + ?Sized>(
        &self,
        source: &mut S,
        warehouse: &mut Warehouse,
    ) -> ExtractResult<TableOutcome> {
        let span = info_span!("extract_table", table = self.spec.table_name);
        self.extract(source, warehouse).instrument(span).await
    }

    async fn extract<S: Source + ?Sized>(
        &self,
        source: &mut S,
        warehouse: &mut Warehouse,
    ) -> ExtractResult<TableOutcome> {
        let spec = self.spec;
        let start = Instant::now();
        let table = self.namespace.table(spec.table_name)?;

        info!("Starting {} extraction...", spec.entity);
        let lineage = Lineage::now(spec.table_name, self.source_system);

        let mut records = source.fetch(&spec.query()).await.map_err(|e| {
            error!("❌ Error extracting {} data: {}", spec.entity, e);
            ExtractError::Source {
                entity: spec.entity.to_string(),
                source: e,
            }
        })?;
        let rows_extracted = records.len();
        lineage.apply(&mut records);
        info!("{} extracted: {} records", spec.entity, rows_extracted);

        let checks: Vec<CheckOutcome> = spec
            .checks
            .iter()
            .map(|check| {
                let outcome = quality::evaluate(check, &records);
                quality::log_outcome(&outcome);
                outcome
            })
            .collect();

        let statistics: Vec<StatisticOutcome> = spec
            .statistics
            .iter()
            .map(|statistic| {
                let outcome = stats::compute(statistic, &records);
                stats::log_outcome(&outcome);
                outcome
            })
            .collect();

        info!("Writing to table: {}", table);
        let options = WriteOptions::default()
            .with_merge_schema(self.merge_schema)
            .with_cluster_by(spec.cluster_by);
        let summary = warehouse
            .overwrite_table(&table, &records, &options)
            .map_err(|e| {
                error!("❌ Error extracting {} data: {}", spec.entity, e);
                ExtractError::Write {
                    entity: spec.entity.to_string(),
                    table: table.to_string(),
                    source: e,
                }
            })?;
        info!("✅ {} data successfully written to {}", spec.entity, table);

        Ok(TableOutcome {
            entity: spec.entity.to_string(),
            table: table.to_string(),
            batch_id: lineage.batch_id,
            extracted_at: lineage.extracted_at,
            rows_extracted,
            rows_written: summary.rows_written,
            carried_columns: summary.carried_columns,
            checks,
            statistics,
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::tables::STOCK_GROUPS;
    use crate::source::{Column, ColumnType, MemorySource, RecordSet, Value};

    fn stock_groups() -> RecordSet {
        let mut records = RecordSet::new(vec![
            Column::new("StockGroupID", ColumnType::Integer),
            Column::new("StockGroupName", ColumnType::Text),
            Column::new("LastEditedBy", ColumnType::Integer),
            Column::new("ValidFrom", ColumnType::Timestamp),
            Column::new("ValidTo", ColumnType::Timestamp),
        ]);
        for (id, name) in [(1, "Novelty Items"), (2, "Clothing"), (3, "Mugs")] {
            records.push_row(vec![
                Value::Int(id),
                Value::Text(name.to_string()),
                Value::Int(1),
                Value::Null,
                Value::Null,
            ]);
        }
        records
    }

    #[tokio::test]
    async fn test_extract_writes_rows_with_lineage() {
        let mut warehouse = Warehouse::memory().expect("Failed to create warehouse");
        let ns = Namespace::new("cat", "bronze").unwrap();
        warehouse.ensure_namespace(&ns).unwrap();
        let mut source = MemorySource::new().with_table("Warehouse.StockGroups", stock_groups());

        let outcome = TableExtractor::new(&STOCK_GROUPS, &ns, "WorldWideImporters_SQL")
            .run(&mut source, &mut warehouse)
            .await
            .expect("Failed to extract stock groups");

        assert_eq!(outcome.rows_extracted, 3);
        assert_eq!(outcome.rows_written, 3);
        assert_eq!(outcome.table, "cat.bronze.stock_groups");
        assert!(outcome.batch_id.starts_with("stock_groups_"));
        assert_eq!(outcome.statistics[0].rendered, "Clothing, Mugs, Novelty Items");

        let rows = warehouse
            .query("SELECT COUNT(*) AS n FROM stock_groups WHERE _batch_id IS NOT NULL AND _source_system = 'WorldWideImporters_SQL' AND _extract_timestamp IS NOT NULL")
            .unwrap();
        assert_eq!(rows[0]["n"], 3);
    }

    #[tokio::test]
    async fn test_source_error_leaves_table_untouched() {
        let mut warehouse = Warehouse::memory().expect("Failed to create warehouse");
        let ns = Namespace::new("cat", "bronze").unwrap();
        warehouse.ensure_namespace(&ns).unwrap();

        let mut source = MemorySource::new().with_table("Warehouse.StockGroups", stock_groups());
        TableExtractor::new(&STOCK_GROUPS, &ns, "WorldWideImporters_SQL")
            .run(&mut source, &mut warehouse)
            .await
            .unwrap();

        let mut failing = MemorySource::new().unreachable("connection reset");
        let err = TableExtractor::new(&STOCK_GROUPS, &ns, "WorldWideImporters_SQL")
            .run(&mut failing, &mut warehouse)
            .await
            .unwrap_err();
        assert!(err.is_source_failure());

        let table = ns.table("stock_groups").unwrap();
        assert_eq!(warehouse.row_count(&table).unwrap(), 3);
    }
}
