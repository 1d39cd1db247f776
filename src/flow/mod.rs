//! Flow orchestration
//!
//! A flow extracts one source domain into the bronze namespace:
//!
//! 1. **Namespace**: create and select the destination catalog and schema
//! 2. **Extract**: run the table extractor for each table in order
//! 3. **Report**: summarise the written tables (failures become warnings)
//! 4. **Scrub**: discard credentials and close the source connection
//!
//! The first namespace or extraction error fails the flow and skips the
//! remaining tables. Scrubbing runs in both cases.
//!
//! # Example
//!
//! ```rust,ignore
//! use bronze_ingest::config::ExtractParams;
//! use bronze_ingest::flow::{Flow, FlowConfig, run_flow};
//! use bronze_ingest::warehouse::Warehouse;
//!
//! let mut warehouse = Warehouse::open("./warehouse")?;
//! let config = FlowConfig::new(ExtractParams::default());
//! let report = run_flow(Flow::Orders, config, &mut warehouse).await?;
//! report.print_summary();
//! ```

pub mod config;
pub mod error;
pub mod executor;
pub mod report;
pub mod run;

pub use config::{Flow, FlowConfig, FlowStage};
pub use error::{FlowError, FlowResult};
pub use executor::{FlowExecutor, FlowReport, run_flow};
pub use report::{
    ReportOutcome, SummaryBody, SummaryReport, format_number, format_percent, run_reporter,
    summarize,
};
pub use run::{FlowRun, FlowStatus};
