//! Error types for table extraction

use thiserror::Error;

use crate::source::SourceError;
use crate::validation::ValidationError;
use crate::warehouse::WarehouseError;

/// Errors that abort a table extraction
#[derive(Error, Debug)]
pub enum ExtractError {
    /// Query against the source failed
    #[error("Error extracting {entity} data: {source}")]
    Source {
        entity: String,
        #[source]
        source: SourceError,
    },

    /// Writing the destination table failed
    #[error("Error writing {entity} data to {table}: {source}")]
    Write {
        entity: String,
        table: String,
        #[source]
        source: WarehouseError,
    },

    /// Destination table name rejected
    #[error("Invalid destination table: {0}")]
    InvalidTable(#[from] ValidationError),
}

impl ExtractError {
    /// Whether the failure happened before any data reached the warehouse
    pub fn is_source_failure(&self) -> bool {
        matches!(self, ExtractError::Source { .. })
    }

    /// Get a user-friendly error message with suggestions
    pub fn user_message(&self) -> String {
        match self {
            ExtractError::Source { entity, source } => {
                format!("Error extracting {} data: {}", entity, source.user_message())
            }
            ExtractError::Write {
                entity,
                table,
                source,
            } => format!(
                "Error writing {} data to {}: {}",
                entity,
                table,
                source.user_message()
            ),
            ExtractError::InvalidTable(_) => self.to_string(),
        }
    }
}

/// Result type for extraction
pub type ExtractResult<T> = Result<T, ExtractError>;
