//! Run state of a flow

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::config::{Flow, FlowStage};
use crate::extract::TableOutcome;

/// Flow run status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowStatus {
    /// Flow is running
    Running,
    /// Every table was written
    Completed,
    /// A stage failed and the remaining tables were not attempted
    Failed,
}

impl std::fmt::Display for FlowStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Running => write!(f, "running"),
            Self::Completed => write!(f, "completed"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// State of one flow run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowRun {
    /// Unique run ID
    pub run_id: String,
    pub flow: Flow,
    pub started_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub status: FlowStatus,
    /// Current stage (if running)
    pub current_stage: Option<FlowStage>,
    /// Destination table being extracted (if any)
    pub current_table: Option<String>,
    /// Tables written so far
    pub completed_tables: Vec<TableOutcome>,
    /// Non-fatal problems, e.g. a failed summary report
    pub warnings: Vec<String>,
    /// Error message if failed
    pub error: Option<String>,
    /// Whether credentials have been discarded
    pub scrubbed: bool,
}

impl FlowRun {
    /// Create the state for a new run
    pub fn new(run_id: impl Into<String>, flow: Flow) -> Self {
        let now = Utc::now();
        Self {
            run_id: run_id.into(),
            flow,
            started_at: now,
            updated_at: now,
            status: FlowStatus::Running,
            current_stage: None,
            current_table: None,
            completed_tables: Vec::new(),
            warnings: Vec::new(),
            error: None,
            scrubbed: false,
        }
    }

    /// Mark a stage as started
    pub fn start_stage(&mut self, stage: FlowStage) {
        self.current_stage = Some(stage);
        self.updated_at = Utc::now();
    }

    /// Mark a table extraction as started
    pub fn start_table(&mut self, table: impl Into<String>) {
        self.current_table = Some(table.into());
        self.updated_at = Utc::now();
    }

    /// Record a written table
    pub fn complete_table(&mut self, outcome: TableOutcome) {
        self.completed_tables.push(outcome);
        self.current_table = None;
        self.updated_at = Utc::now();
    }

    /// Record a non-fatal problem
    pub fn warn(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
        self.updated_at = Utc::now();
    }

    /// Mark the run as completed
    pub fn complete(&mut self) {
        self.status = FlowStatus::Completed;
        self.current_stage = None;
        self.updated_at = Utc::now();
    }

    /// Mark the run as failed
    pub fn fail(&mut self, error: impl Into<String>) {
        self.status = FlowStatus::Failed;
        self.error = Some(error.into());
        self.updated_at = Utc::now();
    }

    /// Mark credentials as discarded
    pub fn mark_scrubbed(&mut self) {
        self.scrubbed = true;
        self.updated_at = Utc::now();
    }

    /// Whether the run reached a terminal state
    pub fn is_finished(&self) -> bool {
        self.status != FlowStatus::Running
    }

    /// Calculate duration so far
    pub fn duration(&self) -> chrono::Duration {
        self.updated_at - self.started_at
    }
}
