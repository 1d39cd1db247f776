//! TOML run configuration file

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::error::{ConfigError, ConfigResult};
use super::DEFAULT_SOURCE_SYSTEM;

/// Contents of a run configuration file.
///
/// ```toml
/// [parameters]
/// sql_server_host = "sql.example.internal"
///
/// [destination]
/// warehouse = "warehouse"
/// merge_schema = true
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Parameter values by name, validated on resolution
    pub parameters: BTreeMap<String, String>,
    /// Where and how tables are written
    pub destination: DestinationConfig,
}

/// Destination settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DestinationConfig {
    /// Directory holding one DuckDB file per catalog; in-memory when unset
    pub warehouse: Option<PathBuf>,
    /// Value written to `_source_system`
    pub source_system: String,
    /// Keep existing columns missing from incoming data
    pub merge_schema: bool,
}

impl Default for DestinationConfig {
    fn default() -> Self {
        Self {
            warehouse: None,
            source_system: DEFAULT_SOURCE_SYSTEM.to_string(),
            merge_schema: true,
        }
    }
}

impl RunConfig {
    /// Load a config file from disk
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&raw, path)
    }

    fn parse(raw: &str, path: &Path) -> ConfigResult<Self> {
        let config: RunConfig = toml::from_str(raw).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> ConfigResult<()> {
        if self.destination.source_system.trim().is_empty() {
            return Err(ConfigError::InvalidConfig(
                "destination.source_system cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}
