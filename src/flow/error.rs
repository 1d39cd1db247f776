//! Error types for flow execution
//!
//! Errors chain to the underlying source, warehouse or configuration error
//! while providing user-friendly messages for CLI output.

use thiserror::Error;

use crate::extract::ExtractError;
use crate::validation::ValidationError;
use crate::warehouse::WarehouseError;

/// Errors that abort a flow
#[derive(Error, Debug)]
pub enum FlowError {
    /// Flow configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Destination namespace name rejected
    #[error("Invalid namespace: {0}")]
    InvalidNamespace(#[from] ValidationError),

    /// Catalog or schema could not be created or selected
    #[error("Stage 'namespace' failed: {0}")]
    Namespace(#[source] WarehouseError),

    /// A table extraction failed; later tables were not attempted
    #[error("Stage 'extract' failed for {table}: {source}")]
    Extract {
        table: String,
        #[source]
        source: ExtractError,
    },

    /// Unknown flow name
    #[error("Invalid flow: {0}")]
    InvalidFlow(String),
}

/// Result type for flow operations
pub type FlowResult<T> = Result<T, FlowError>;

impl FlowError {
    /// Create an extraction failure for a table
    pub fn extract(table: impl Into<String>, source: ExtractError) -> Self {
        Self::Extract {
            table: table.into(),
            source,
        }
    }

    /// Name of the stage that failed
    pub fn stage(&self) -> &'static str {
        match self {
            Self::ConfigError(_) | Self::InvalidNamespace(_) | Self::InvalidFlow(_) => "config",
            Self::Namespace(_) => "namespace",
            Self::Extract { .. } => "extract",
        }
    }

    /// Get a user-friendly error message with suggestions
    pub fn user_message(&self) -> String {
        match self {
            Self::ConfigError(_) | Self::InvalidNamespace(_) => {
                format!(
                    "{}\n\nHint: Check catalog_name and schema_name in your config file or flags.",
                    self
                )
            }
            Self::Namespace(source) => {
                format!("Could not prepare the destination namespace: {}", source.user_message())
            }
            Self::Extract { source, .. } => source.user_message(),
            Self::InvalidFlow(_) => {
                format!("{}\n\nHint: Valid flows are orders and stock.", self)
            }
        }
    }
}
