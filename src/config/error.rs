//! Error types for run configuration

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while resolving run configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML or has unexpected keys
    #[error("Invalid config file {path}: {message}")]
    Parse { path: PathBuf, message: String },

    /// A supplied parameter is not one of the declared parameters
    #[error("Unknown parameter: {0}")]
    UnknownParameter(String),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ConfigError {
    /// Get a user-friendly error message with suggestions
    pub fn user_message(&self) -> String {
        match self {
            ConfigError::Io { path, .. } => {
                format!(
                    "{}\n\nHint: Check that {} exists and is readable.",
                    self,
                    path.display()
                )
            }
            ConfigError::Parse { .. } => {
                format!(
                    "{}\n\nHint: The config file accepts a [parameters] table and a [destination] table with warehouse, source_system and merge_schema.",
                    self
                )
            }
            ConfigError::UnknownParameter(_) => {
                format!(
                    "{}\n\nHint: Valid parameters are catalog_name, schema_name, sql_server_host, sql_database_name, sql_username and sql_password.",
                    self
                )
            }
            _ => self.to_string(),
        }
    }
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;
