//! bronze-ingest: extract WideWorldImporters tables into bronze DuckDB catalogs

use std::process::ExitCode;

use bronze_ingest::cli::{Cli, execute};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Install the log subscriber. `RUST_LOG` overrides `--log-level`.
fn init_tracing(log_level: &str, json: bool) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    let result = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    result.map_err(|e| anyhow::anyhow!("Failed to initialise logging: {}", e))
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_tracing(&cli.global.log_level, cli.global.json_logs) {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }
    info!(version = env!("CARGO_PKG_VERSION"), "bronze-ingest starting");

    match execute(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e.user_message());
            ExitCode::FAILURE
        }
    }
}
