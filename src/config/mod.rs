//! Run configuration
//!
//! Parameters are layered, lowest precedence first:
//!
//! 1. declared defaults ([`PARAMETERS`])
//! 2. the `[parameters]` table of a TOML [`RunConfig`] file
//! 3. `BRONZE_<NAME>` environment variables
//! 4. command-line flags
//!
//! Layers 3 and 4 are merged by the CLI; the library only sees the final
//! name/value map handed to [`resolve_parameters`].

pub mod error;
pub mod file;
pub mod params;
pub mod secret;

pub use error::{ConfigError, ConfigResult};
pub use file::{DestinationConfig, RunConfig};
pub use params::{ExtractParams, PARAMETERS, ParameterSpec, parameter_spec, resolve_parameters};
pub use secret::Secret;

/// Label written to `_source_system` unless configured otherwise
pub const DEFAULT_SOURCE_SYSTEM: &str = "WorldWideImporters_SQL";
