//! Source database abstraction
//!
//! Defines the Source trait and implementations:
//! - SqlServerSource: SQL Server over TDS (production)
//! - MemorySource: fixed result sets (offline runs and tests)

use async_trait::async_trait;

pub mod descriptor;
pub mod error;
pub mod memory;
pub mod record;
pub mod sqlserver;

pub use descriptor::{ConnectionDescriptor, ConnectionOptions, DRIVER_NAME, SQL_SERVER_PORT};
pub use error::{SourceError, SourceResult};
pub use memory::MemorySource;
pub use record::{Column, ColumnType, Decimal, RecordSet, Value};
pub use sqlserver::SqlServerSource;

/// Trait for sources a flow can extract from
///
/// A source runs one fixed projection query per table and returns the whole
/// result in memory.
#[async_trait]
pub trait Source: Send {
    /// Short description for log lines, never including credentials
    fn describe(&self) -> String;

    /// Run a query and collect its first result set
    async fn fetch(&mut self, query: &str) -> SourceResult<RecordSet>;

    /// Release the connection and any credentials held
    async fn close(&mut self) -> SourceResult<()> {
        Ok(())
    }
}
