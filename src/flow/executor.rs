//! Flow executor for running one extraction flow end to end

use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{Instrument, error, info, info_span, warn};
use uuid::Uuid;

use super::config::{Flow, FlowConfig, FlowStage};
use super::error::{FlowError, FlowResult};
use super::report::{SummaryReport, run_reporter};
use super::run::{FlowRun, FlowStatus};
use crate::extract::{TableExtractor, TableOutcome};
use crate::source::{ConnectionDescriptor, Source, SqlServerSource};
use crate::warehouse::{Namespace, Warehouse};

/// Flow executor that runs all stages
pub struct FlowExecutor<'w, S: Source> {
    config: FlowConfig,
    descriptor: ConnectionDescriptor,
    source: S,
    warehouse: &'w mut Warehouse,
    run: FlowRun,
}

impl<'w, S: Source> FlowExecutor<'w, S> {
    /// Create a new flow executor
    pub fn new(
        flow: Flow,
        config: FlowConfig,
        descriptor: ConnectionDescriptor,
        source: S,
        warehouse: &'w mut Warehouse,
    ) -> FlowResult<Self> {
        config.validate().map_err(FlowError::ConfigError)?;
        let run = FlowRun::new(Uuid::new_v4().to_string(), flow);

        Ok(Self {
            config,
            descriptor,
            source,
            warehouse,
            run,
        })
    }

    /// Get the current run state
    pub fn run_state(&self) -> &FlowRun {
        &self.run
    }

    /// Run the flow. The scrub stage runs whether the flow completes or fails.
    pub async fn run(&mut self) -> FlowResult<FlowReport> {
        let span = info_span!(
            "flow_run",
            run_id = %self.run.run_id,
            flow = self.run.flow.name()
        );
        self.execute().instrument(span).await
    }

    async fn execute(&mut self) -> FlowResult<FlowReport> {
        let start = Instant::now();
        let flow = self.run.flow;

        info!(
            run_id = %self.run.run_id,
            tables = ?flow.tables().iter().map(|t| t.table_name).collect::<Vec<_>>(),
            "Starting flow"
        );
        info!("Connection URL: {}", self.descriptor.url());
        info!("Source: {}", self.source.describe());

        let mut summary = None;
        let result = match self.run_tables().await {
            Ok(()) => {
                if self.config.report {
                    summary = self.run_report();
                }
                Ok(())
            }
            Err(e) => {
                let stage = e.stage();
                let error_msg = e.to_string();
                error!(stage, error = %error_msg, "Stage failed");
                self.run.fail(&error_msg);
                Err(e)
            }
        };

        self.scrub().await;
        result?;

        self.run.complete();
        let duration_ms = start.elapsed().as_millis() as u64;
        info!(
            run_id = %self.run.run_id,
            duration_ms,
            tables_written = self.run.completed_tables.len(),
            "Flow completed"
        );

        Ok(FlowReport {
            run_id: self.run.run_id.clone(),
            flow,
            status: self.run.status,
            tables: self.run.completed_tables.clone(),
            summary,
            warnings: self.run.warnings.clone(),
            duration_ms,
        })
    }

    /// Namespace and extract stages; the first error aborts the rest
    async fn run_tables(&mut self) -> FlowResult<()> {
        self.run.start_stage(FlowStage::Namespace);
        let namespace = self.config.namespace()?;
        self.warehouse
            .ensure_namespace(&namespace)
            .map_err(FlowError::Namespace)?;

        self.run.start_stage(FlowStage::Extract);
        for spec in self.run.flow.tables() {
            let table = namespace.table(spec.table_name)?;
            self.run.start_table(table.to_string());

            let outcome = TableExtractor::new(spec, &namespace, &self.config.source_system)
                .with_merge_schema(self.config.merge_schema)
                .run(&mut self.source, &mut *self.warehouse)
                .await
                .map_err(|e| FlowError::extract(table.to_string(), e))?;
            self.run.complete_table(outcome);
        }
        Ok(())
    }

    fn run_report(&mut self) -> Option<SummaryReport> {
        self.run.start_stage(FlowStage::Report);
        let namespace: Namespace = match self.config.namespace() {
            Ok(namespace) => namespace,
            Err(e) => {
                self.run.warn(e.to_string());
                return None;
            }
        };

        let outcome = run_reporter(self.run.flow, &*self.warehouse, &namespace);
        for warning in outcome.warnings {
            self.run.warn(warning);
        }
        outcome.report
    }

    async fn scrub(&mut self) {
        self.run.start_stage(FlowStage::Scrub);
        self.config.params.scrub();
        self.descriptor.scrub();
        if let Err(e) = self.source.close().await {
            warn!(error = %e, "Failed to close source connection");
        }
        info!("🧹 Cleanup completed - sensitive data cleared from memory");
        self.run.mark_scrubbed();
    }
}

/// Run a flow against SQL Server using the parameters in `config`
pub async fn run_flow(
    flow: Flow,
    config: FlowConfig,
    warehouse: &mut Warehouse,
) -> FlowResult<FlowReport> {
    let descriptor = ConnectionDescriptor::from_params(&config.params);
    let source = SqlServerSource::new(descriptor.clone());
    let mut executor = FlowExecutor::new(flow, config, descriptor, source, warehouse)?;
    executor.run().await
}

/// Report from a flow run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowReport {
    /// Run ID
    pub run_id: String,
    pub flow: Flow,
    /// Final status
    pub status: FlowStatus,
    /// Table outcomes in extraction order
    pub tables: Vec<TableOutcome>,
    /// Summary report, if the reporter ran and succeeded
    pub summary: Option<SummaryReport>,
    pub warnings: Vec<String>,
    /// Total duration in milliseconds
    pub duration_ms: u64,
}

impl FlowReport {
    /// Check if the flow was successful
    pub fn is_success(&self) -> bool {
        self.status == FlowStatus::Completed
    }

    /// Get formatted duration
    pub fn duration_formatted(&self) -> String {
        let secs = self.duration_ms / 1000;
        let mins = secs / 60;
        let remaining_secs = secs % 60;

        if mins > 0 {
            format!("{}m {}s", mins, remaining_secs)
        } else {
            format!("{}s", secs)
        }
    }

    /// Print summary to stderr
    pub fn print_summary(&self) {
        eprintln!();
        eprintln!("Flow {} ({}) - {}", self.flow, self.run_id, self.status);
        eprintln!("Duration: {}", self.duration_formatted());
        eprintln!("Tables written: {}", self.tables.len());

        for table in &self.tables {
            let flagged = table.flagged_checks().count();
            eprintln!(
                "  - {}: {} rows, batch {} ({}ms){}",
                table.table,
                table.rows_written,
                table.batch_id,
                table.duration_ms,
                if flagged > 0 {
                    format!(", {} check(s) flagged", flagged)
                } else {
                    String::new()
                }
            );
        }
        for warning in &self.warnings {
            eprintln!("  ! {}", warning);
        }
    }
}
