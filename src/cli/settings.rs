//! Merge of config file, environment and flags into one run setup

use std::collections::BTreeMap;
use std::path::PathBuf;

use super::args::GlobalArgs;
use super::error::CliError;
use crate::config::{ExtractParams, RunConfig, resolve_parameters};
use crate::flow::FlowConfig;
use crate::warehouse::{Namespace, Warehouse};

/// Everything a command needs, resolved once per invocation
#[derive(Debug, Clone)]
pub struct Settings {
    pub params: ExtractParams,
    /// Warehouse root; in-memory when unset
    pub warehouse: Option<PathBuf>,
    pub source_system: String,
    pub merge_schema: bool,
}

impl Settings {
    /// Resolve settings from global flags and the optional config file
    pub fn resolve(args: &GlobalArgs) -> Result<Self, CliError> {
        let file = match &args.config {
            Some(path) => RunConfig::load(path)?,
            None => RunConfig::default(),
        };
        Self::merge(file, args)
    }

    fn merge(file: RunConfig, args: &GlobalArgs) -> Result<Self, CliError> {
        let mut supplied: BTreeMap<String, String> = file.parameters;
        for (name, value) in args.params.supplied() {
            supplied.insert(name.to_string(), value.to_string());
        }
        let params = resolve_parameters(&supplied)?;

        Ok(Self {
            params,
            warehouse: args.warehouse.clone().or(file.destination.warehouse),
            source_system: file.destination.source_system,
            merge_schema: file.destination.merge_schema && !args.no_merge_schema,
        })
    }

    /// Flow configuration for one flow run
    pub fn flow_config(&self) -> FlowConfig {
        FlowConfig::new(self.params.clone())
            .with_source_system(&self.source_system)
            .with_merge_schema(self.merge_schema)
    }

    /// Destination namespace
    pub fn namespace(&self) -> Result<Namespace, CliError> {
        self.flow_config()
            .namespace()
            .map_err(|e| CliError::InvalidArgument(e.to_string()))
    }

    /// Open the warehouse session
    pub fn open_warehouse(&self) -> Result<Warehouse, CliError> {
        let warehouse = match &self.warehouse {
            Some(root) => Warehouse::open(root)?,
            None => Warehouse::memory()?,
        };
        Ok(warehouse)
    }

    /// Open the warehouse session for reading only. An in-memory warehouse
    /// has nothing to protect and opens as usual.
    pub fn open_warehouse_read_only(&self) -> Result<Warehouse, CliError> {
        let warehouse = match &self.warehouse {
            Some(root) => Warehouse::open_read_only(root)?,
            None => Warehouse::memory()?,
        };
        Ok(warehouse)
    }

    /// Clear the source password held for this invocation
    pub fn scrub(&mut self) {
        self.params.scrub();
    }
}
