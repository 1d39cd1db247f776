//! Flow definitions and configuration

use serde::{Deserialize, Serialize};

use crate::config::{DEFAULT_SOURCE_SYSTEM, ExtractParams};
use crate::extract::{
    ORDER_LINES, ORDERS, STOCK_GROUPS, STOCK_ITEM_HOLDINGS, STOCK_ITEM_STOCK_GROUPS, STOCK_ITEMS,
    TableSpec,
};
use crate::warehouse::Namespace;

/// A source domain and the tables extracted for it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Flow {
    /// Sales orders and order lines
    Orders,
    /// Warehouse stock items, holdings and groups
    Stock,
}

const ORDERS_TABLES: [&TableSpec; 2] = [&ORDERS, &ORDER_LINES];
const STOCK_TABLES: [&TableSpec; 4] = [
    &STOCK_ITEMS,
    &STOCK_ITEM_HOLDINGS,
    &STOCK_GROUPS,
    &STOCK_ITEM_STOCK_GROUPS,
];

impl Flow {
    /// Get all flows in run order
    pub fn all() -> Vec<Self> {
        vec![Self::Orders, Self::Stock]
    }

    /// Get flow name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Orders => "orders",
            Self::Stock => "stock",
        }
    }

    /// Get flow description
    pub fn description(&self) -> &'static str {
        match self {
            Self::Orders => "Sales.Orders and Sales.OrderLines",
            Self::Stock => "Warehouse stock items, holdings, groups and group assignments",
        }
    }

    /// Tables extracted, in order
    pub fn tables(&self) -> &'static [&'static TableSpec] {
        match self {
            Self::Orders => &ORDERS_TABLES,
            Self::Stock => &STOCK_TABLES,
        }
    }
}

impl std::fmt::Display for Flow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for Flow {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "orders" | "sales" => Ok(Self::Orders),
            "stock" | "stock_items" | "warehouse" => Ok(Self::Stock),
            _ => Err(format!("Unknown flow: {}", s)),
        }
    }
}

/// Stages of a flow run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowStage {
    /// Stage 1: Create and select the destination catalog and schema
    Namespace,
    /// Stage 2: Extract each table
    Extract,
    /// Stage 3: Summarise the written tables (best effort)
    Report,
    /// Stage 4: Discard credentials
    Scrub,
}

impl FlowStage {
    /// Get all stages in execution order
    pub fn all() -> Vec<Self> {
        vec![Self::Namespace, Self::Extract, Self::Report, Self::Scrub]
    }

    /// Get stage name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Namespace => "namespace",
            Self::Extract => "extract",
            Self::Report => "report",
            Self::Scrub => "scrub",
        }
    }

    /// Get stage description
    pub fn description(&self) -> &'static str {
        match self {
            Self::Namespace => "Create and select the destination catalog and schema",
            Self::Extract => "Extract, tag and write each table",
            Self::Report => "Summarise the written tables",
            Self::Scrub => "Discard in-memory credentials",
        }
    }

    /// Get stage index (1-based)
    pub fn index(&self) -> usize {
        match self {
            Self::Namespace => 1,
            Self::Extract => 2,
            Self::Report => 3,
            Self::Scrub => 4,
        }
    }
}

impl std::fmt::Display for FlowStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Configuration for a flow run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowConfig {
    /// Resolved run parameters
    pub params: ExtractParams,
    /// Value written to `_source_system`
    pub source_system: String,
    /// Keep existing columns missing from incoming data
    pub merge_schema: bool,
    /// Run the summary reporter after extraction
    pub report: bool,
}

impl FlowConfig {
    /// Create a config with default settings
    pub fn new(params: ExtractParams) -> Self {
        Self {
            params,
            source_system: DEFAULT_SOURCE_SYSTEM.to_string(),
            merge_schema: true,
            report: true,
        }
    }

    /// Set the source system label
    pub fn with_source_system(mut self, source_system: impl Into<String>) -> Self {
        self.source_system = source_system.into();
        self
    }

    /// Enable or disable schema merging
    pub fn with_merge_schema(mut self, merge_schema: bool) -> Self {
        self.merge_schema = merge_schema;
        self
    }

    /// Enable or disable the summary report
    pub fn with_report(mut self, report: bool) -> Self {
        self.report = report;
        self
    }

    /// Destination namespace
    pub fn namespace(&self) -> Result<Namespace, crate::validation::ValidationError> {
        Namespace::new(&self.params.catalog_name, &self.params.schema_name)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        self.namespace().map_err(|e| e.to_string())?;
        if self.source_system.trim().is_empty() {
            return Err("Source system label cannot be empty".to_string());
        }
        Ok(())
    }
}
