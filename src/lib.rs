//! Bronze Ingest - WideWorldImporters bronze-layer ingestion
//!
//! Copies fixed projections of six SQL Server tables into DuckDB catalogs:
//! - Run parameters and the TOML run configuration (`config`)
//! - Source connections and in-memory result sets (`source`)
//! - Destination namespaces and atomic overwrite-with-merge writes (`warehouse`)
//! - Per-table extraction with lineage, quality checks and statistics (`extract`)
//! - Flow orchestration, summary reports and credential scrubbing (`flow`)

pub mod config;
pub mod extract;
pub mod flow;
pub mod source;
pub mod validation;
pub mod warehouse;

#[cfg(feature = "cli")]
pub mod cli;

// Re-export commonly used types
pub use config::{ConfigError, ExtractParams, RunConfig, Secret, resolve_parameters};
pub use extract::{ExtractError, TableExtractor, TableOutcome, TableSpec};
pub use flow::{
    Flow, FlowConfig, FlowError, FlowExecutor, FlowReport, FlowStatus, SummaryReport, run_flow,
};
pub use source::{
    ConnectionDescriptor, MemorySource, RecordSet, Source, SourceError, SqlServerSource, Value,
};
pub use validation::ValidationError;
pub use warehouse::{Namespace, TableRef, Warehouse, WarehouseError, WriteOptions};
