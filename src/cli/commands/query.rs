//! Query command implementation

use crate::cli::args::OutputFormat;
use crate::cli::error::CliError;
use crate::cli::output::format_table;
use crate::cli::settings::Settings;

/// Handle the `query` command. The session starts in the configured
/// catalog and schema, so unqualified table names resolve there.
pub fn handle_query(sql: &str, format: OutputFormat, settings: &Settings) -> Result<(), CliError> {
    let warehouse = settings.open_warehouse_read_only()?;
    warehouse.ensure_namespace(&settings.namespace()?)?;

    let results = warehouse.query(sql)?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&results)?),
        OutputFormat::Table => print!("{}", format_table(&results)),
    }

    Ok(())
}
