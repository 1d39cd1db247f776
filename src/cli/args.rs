//! Command-line arguments

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::flow::Flow;

/// Bronze-layer ingestion of WideWorldImporters tables into DuckDB catalogs
#[derive(Parser, Debug)]
#[command(name = "bronze-ingest")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Extract the selected flows into the bronze namespace
    Run {
        #[arg(value_enum)]
        flow: FlowSelection,
    },
    /// Print the summary report over already written tables
    Report {
        #[arg(value_enum)]
        flow: FlowSelection,
    },
    /// Show resolved parameters and the table plan without connecting
    Describe {
        #[arg(value_enum)]
        flow: FlowSelection,
    },
    /// Run SQL against the warehouse
    Query {
        /// SQL query to execute
        sql: String,
        /// Output format
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
    },
}

/// Flows selectable on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FlowSelection {
    Orders,
    Stock,
    All,
}

impl FlowSelection {
    /// Flows to run, in order
    pub fn flows(&self) -> Vec<Flow> {
        match self {
            Self::Orders => vec![Flow::Orders],
            Self::Stock => vec![Flow::Stock],
            Self::All => Flow::all(),
        }
    }
}

/// Query output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

/// Flags shared by every command
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// TOML run configuration file
    #[arg(long, global = true, env = "BRONZE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory holding one DuckDB file per catalog
    #[arg(long, global = true, env = "BRONZE_WAREHOUSE")]
    pub warehouse: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Fail instead of keeping existing columns missing from incoming data
    #[arg(long, global = true)]
    pub no_merge_schema: bool,

    #[command(flatten)]
    pub params: ParameterArgs,
}

/// One flag per run parameter
#[derive(Args, Debug, Clone, Default)]
pub struct ParameterArgs {
    /// Destination catalog
    #[arg(long, global = true, env = "BRONZE_CATALOG_NAME")]
    pub catalog_name: Option<String>,

    /// Destination schema
    #[arg(long, global = true, env = "BRONZE_SCHEMA_NAME")]
    pub schema_name: Option<String>,

    /// SQL Server host name
    #[arg(long, global = true, env = "BRONZE_SQL_SERVER_HOST")]
    pub sql_server_host: Option<String>,

    /// Source database
    #[arg(long, global = true, env = "BRONZE_SQL_DATABASE_NAME")]
    pub sql_database_name: Option<String>,

    /// SQL login
    #[arg(long, global = true, env = "BRONZE_SQL_USERNAME")]
    pub sql_username: Option<String>,

    /// SQL password
    #[arg(long, global = true, env = "BRONZE_SQL_PASSWORD", hide_env_values = true)]
    pub sql_password: Option<String>,
}

impl ParameterArgs {
    /// Supplied values keyed by parameter name
    pub fn supplied(&self) -> Vec<(&'static str, &str)> {
        use crate::config::params::{
            CATALOG_NAME, SCHEMA_NAME, SQL_DATABASE_NAME, SQL_PASSWORD, SQL_SERVER_HOST,
            SQL_USERNAME,
        };

        [
            (CATALOG_NAME, &self.catalog_name),
            (SCHEMA_NAME, &self.schema_name),
            (SQL_SERVER_HOST, &self.sql_server_host),
            (SQL_DATABASE_NAME, &self.sql_database_name),
            (SQL_USERNAME, &self.sql_username),
            (SQL_PASSWORD, &self.sql_password),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.as_deref().map(|v| (name, v)))
        .collect()
    }
}
