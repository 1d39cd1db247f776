//! Report command implementation

use crate::cli::args::FlowSelection;
use crate::cli::error::CliError;
use crate::cli::settings::Settings;
use crate::flow::summarize;

/// Handle the `report` command
pub fn handle_report(selection: FlowSelection, settings: &Settings) -> Result<(), CliError> {
    let warehouse = settings.open_warehouse_read_only()?;
    let namespace = settings.namespace()?;
    warehouse.ensure_namespace(&namespace)?;

    for flow in selection.flows() {
        let report = summarize(flow, &warehouse, &namespace)?;
        println!("{}", report);
        println!();
    }

    Ok(())
}
