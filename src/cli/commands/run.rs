//! Run command implementation

use tracing::error;

use crate::cli::args::FlowSelection;
use crate::cli::error::CliError;
use crate::cli::settings::Settings;
use crate::flow::run_flow;

/// Handle the `run` command.
///
/// Flows run one after another against the same warehouse session. A failed
/// flow does not stop the next one; the command fails if any flow failed.
/// The password held in `settings` is scrubbed once the last flow is done.
pub async fn handle_run(selection: FlowSelection, mut settings: Settings) -> Result<(), CliError> {
    let mut warehouse = settings.open_warehouse()?;
    let mut failed = Vec::new();

    for flow in selection.flows() {
        eprintln!("Starting {} flow ({})", flow, flow.description());

        match run_flow(flow, settings.flow_config(), &mut warehouse).await {
            Ok(report) => {
                report.print_summary();
                if let Some(summary) = &report.summary {
                    println!("{}", summary);
                    println!();
                }
            }
            Err(e) => {
                error!(flow = flow.name(), stage = e.stage(), "Flow failed");
                eprintln!("Flow {} failed: {}", flow, e.user_message());
                failed.push(flow.name().to_string());
            }
        }
    }

    settings.scrub();

    if failed.is_empty() {
        Ok(())
    } else {
        Err(CliError::FlowsFailed(failed))
    }
}
