//! Table extraction
//!
//! Each table goes through the same steps:
//!
//! 1. run the fixed projection query against the source
//! 2. append lineage columns (`_extract_timestamp`, `_source_system`, `_batch_id`)
//! 3. count and log data-quality anomalies
//! 4. compute and log informational statistics
//! 5. replace the destination table, keeping existing extra columns
//!
//! Steps 3 and 4 never fail the extraction.

pub mod error;
pub mod extractor;
pub mod lineage;
pub mod quality;
pub mod stats;
pub mod tables;

pub use error::{ExtractError, ExtractResult};
pub use extractor::{TableExtractor, TableOutcome};
pub use lineage::{
    BATCH_ID_COLUMN, EXTRACT_TIMESTAMP_COLUMN, LINEAGE_COLUMNS, Lineage, SOURCE_SYSTEM_COLUMN,
};
pub use quality::{CheckOutcome, Predicate, QualityCheck, Severity};
pub use stats::{Aggregate, Rendering, StatValue, Statistic, StatisticOutcome};
pub use tables::{
    ALL_TABLES, ORDER_LINES, ORDERS, STOCK_GROUPS, STOCK_ITEM_HOLDINGS, STOCK_ITEM_STOCK_GROUPS,
    STOCK_ITEMS, TableSpec, table_spec,
};
