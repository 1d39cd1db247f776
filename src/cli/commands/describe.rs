//! Describe command implementation

use crate::cli::args::FlowSelection;
use crate::cli::error::CliError;
use crate::cli::output::format_plan;
use crate::cli::settings::Settings;
use crate::source::ConnectionDescriptor;

/// Handle the `describe` command. No connection is made.
pub fn handle_describe(selection: FlowSelection, settings: &Settings) -> Result<(), CliError> {
    let namespace = settings.namespace()?;
    let descriptor = ConnectionDescriptor::from_params(&settings.params);
    let tables: Vec<_> = selection
        .flows()
        .iter()
        .flat_map(|flow| flow.tables().iter().copied())
        .collect();

    print!(
        "{}",
        format_plan(&settings.params, &descriptor, &namespace, &tables)
    );
    println!("\nMerge schema: {}", settings.merge_schema);
    println!("Source system: {}", settings.source_system);
    match &settings.warehouse {
        Some(root) => println!("Warehouse: {}", root.display()),
        None => println!("Warehouse: in-memory"),
    }

    Ok(())
}
