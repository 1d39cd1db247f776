//! Error types for source database access

use thiserror::Error;

/// Errors that can occur while reading from the source database
#[derive(Error, Debug)]
pub enum SourceError {
    /// TCP connection could not be established
    #[error("Connection to {address} failed: {message}")]
    Connection { address: String, message: String },

    /// Login, TLS or protocol failure
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Query rejected or failed while streaming results
    #[error("Query failed: {0}")]
    Query(String),

    /// The source no longer holds credentials to connect with
    #[error("Source is closed")]
    Closed,
}

impl From<tiberius::error::Error> for SourceError {
    fn from(err: tiberius::error::Error) -> Self {
        match err {
            tiberius::error::Error::Server(token) => SourceError::Query(token.to_string()),
            other => SourceError::Protocol(other.to_string()),
        }
    }
}

impl SourceError {
    /// Whether the error happened before any query reached the server
    pub fn is_connectivity(&self) -> bool {
        matches!(self, SourceError::Connection { .. } | SourceError::Protocol(_))
    }

    /// Get a user-friendly error message with suggestions
    pub fn user_message(&self) -> String {
        match self {
            SourceError::Connection { .. } => {
                format!(
                    "{}\n\nHint: Check sql_server_host and that port 1433 is reachable from this machine.",
                    self
                )
            }
            SourceError::Protocol(_) => {
                format!(
                    "{}\n\nHint: Check sql_username and sql_password, and that the server accepts SQL authentication over TLS.",
                    self
                )
            }
            SourceError::Query(_) => {
                format!(
                    "{}\n\nHint: Check that sql_database_name points at a WideWorldImporters database.",
                    self
                )
            }
            SourceError::Closed => self.to_string(),
        }
    }
}

/// Result type for source operations
pub type SourceResult<T> = Result<T, SourceError>;
