//! Error types for warehouse operations

use thiserror::Error;

use crate::validation::ValidationError;

/// Errors that can occur while writing to or reading from the warehouse
#[derive(Error, Debug)]
pub enum WarehouseError {
    /// Database error
    #[error("Database error: {0}")]
    Database(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Catalog, schema or table name rejected
    #[error("Invalid name: {0}")]
    InvalidName(#[from] ValidationError),

    /// Incoming columns differ from the existing table and merging is off
    #[error(
        "Schema mismatch for {table}: missing [{}], added [{}]",
        missing.join(", "),
        added.join(", ")
    )]
    SchemaMismatch {
        table: String,
        missing: Vec<String>,
        added: Vec<String>,
    },
}

impl From<duckdb::Error> for WarehouseError {
    fn from(err: duckdb::Error) -> Self {
        WarehouseError::Database(err.to_string())
    }
}

impl WarehouseError {
    /// Get a user-friendly error message with suggestions
    pub fn user_message(&self) -> String {
        match self {
            WarehouseError::Database(_) => {
                format!(
                    "{}\n\nHint: Check that no other process holds the catalog file open for writing.",
                    self
                )
            }
            WarehouseError::Io(_) => {
                format!(
                    "{}\n\nHint: Check that the warehouse directory is writable.",
                    self
                )
            }
            WarehouseError::InvalidName(_) => {
                format!(
                    "{}\n\nHint: Names must start with a letter or underscore and contain only letters, digits, underscores and hyphens.",
                    self
                )
            }
            WarehouseError::SchemaMismatch { .. } => {
                format!(
                    "{}\n\nHint: Enable schema merging (drop --no-merge-schema) or drop the table first.",
                    self
                )
            }
        }
    }
}

/// Result type for warehouse operations
pub type WarehouseResult<T> = Result<T, WarehouseError>;
