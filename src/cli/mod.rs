//! CLI module for the bronze-ingest binary

pub mod args;
pub mod commands;
pub mod error;
pub mod output;
pub mod settings;

pub use args::{Cli, Commands, FlowSelection, GlobalArgs, OutputFormat, ParameterArgs};
pub use error::CliError;
pub use settings::Settings;

/// Dispatch a parsed command line
pub async fn execute(cli: Cli) -> Result<(), CliError> {
    let settings = Settings::resolve(&cli.global)?;

    match cli.command {
        Commands::Run { flow } => commands::handle_run(flow, settings).await,
        Commands::Report { flow } => commands::handle_report(flow, &settings),
        Commands::Describe { flow } => commands::handle_describe(flow, &settings),
        Commands::Query { sql, format } => commands::handle_query(&sql, format, &settings),
    }
}
