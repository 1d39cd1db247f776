//! Lineage columns appended to every extracted row

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use crate::source::{ColumnType, RecordSet, Value};

/// Extraction instant column
pub const EXTRACT_TIMESTAMP_COLUMN: &str = "_extract_timestamp";
/// Source system label column
pub const SOURCE_SYSTEM_COLUMN: &str = "_source_system";
/// Batch identifier column
pub const BATCH_ID_COLUMN: &str = "_batch_id";

/// All lineage column names, in the order they are appended
pub const LINEAGE_COLUMNS: [&str; 3] = [
    EXTRACT_TIMESTAMP_COLUMN,
    SOURCE_SYSTEM_COLUMN,
    BATCH_ID_COLUMN,
];

/// Lineage values for one table extraction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lineage {
    pub extracted_at: DateTime<Utc>,
    pub source_system: String,
    pub batch_id: String,
}

impl Lineage {
    /// Lineage for `table` extracted at `extracted_at`.
    ///
    /// The batch id is `<table>_<YYYYMMDD>_<HHMMSS>` in UTC.
    pub fn new(table: &str, source_system: &str, extracted_at: DateTime<Utc>) -> Self {
        let extracted_at = extracted_at.trunc_subsecs(6);
        Self {
            batch_id: format!("{}_{}", table, extracted_at.format("%Y%m%d_%H%M%S")),
            extracted_at,
            source_system: source_system.to_string(),
        }
    }

    /// Lineage stamped with the current instant
    pub fn now(table: &str, source_system: &str) -> Self {
        Self::new(table, source_system, Utc::now())
    }

    /// Set the lineage columns on every row, replacing same-named columns
    pub fn apply(&self, records: &mut RecordSet) {
        records.set_constant_column(
            EXTRACT_TIMESTAMP_COLUMN,
            ColumnType::Timestamp,
            Value::Timestamp(self.extracted_at.naive_utc()),
        );
        records.set_constant_column(
            SOURCE_SYSTEM_COLUMN,
            ColumnType::Text,
            Value::Text(self.source_system.clone()),
        );
        records.set_constant_column(
            BATCH_ID_COLUMN,
            ColumnType::Text,
            Value::Text(self.batch_id.clone()),
        );
    }
}
