//! CLI error types

use thiserror::Error;

use crate::config::ConfigError;
use crate::flow::FlowError;
use crate::warehouse::WarehouseError;

/// Errors surfaced by the command-line interface
#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Flow(#[from] FlowError),

    #[error(transparent)]
    Warehouse(#[from] WarehouseError),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Output error: {0}")]
    Output(#[from] serde_json::Error),

    /// One or more flows of a multi-flow run failed
    #[error("Flow(s) failed: {}", .0.join(", "))]
    FlowsFailed(Vec<String>),
}

impl CliError {
    /// Get a user-friendly error message with suggestions
    pub fn user_message(&self) -> String {
        match self {
            Self::Config(e) => e.user_message(),
            Self::Flow(e) => e.user_message(),
            Self::Warehouse(e) => e.user_message(),
            Self::FlowsFailed(_) => {
                format!("{}\n\nHint: See the log output above for the failing stage.", self)
            }
            _ => self.to_string(),
        }
    }
}
