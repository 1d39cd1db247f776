//! Run parameters and their resolution
//!
//! The six parameters every flow takes, with their defaults. Callers supply
//! any subset by name; everything else falls back to the declared default.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;

use super::error::{ConfigError, ConfigResult};
use super::secret::Secret;

pub const CATALOG_NAME: &str = "catalog_name";
pub const SCHEMA_NAME: &str = "schema_name";
pub const SQL_SERVER_HOST: &str = "sql_server_host";
pub const SQL_DATABASE_NAME: &str = "sql_database_name";
pub const SQL_USERNAME: &str = "sql_username";
pub const SQL_PASSWORD: &str = "sql_password";

/// A declared run parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParameterSpec {
    /// Parameter key
    pub name: &'static str,
    /// Value used when the caller supplies none
    pub default: &'static str,
    /// Human-readable label
    pub label: &'static str,
    /// Whether the value must never be displayed
    pub secret: bool,
}

/// Every parameter a flow accepts
pub const PARAMETERS: [ParameterSpec; 6] = [
    ParameterSpec {
        name: CATALOG_NAME,
        default: "don_datalab_catalog",
        label: "Catalog Name",
        secret: false,
    },
    ParameterSpec {
        name: SCHEMA_NAME,
        default: "bronze",
        label: "Schema Name",
        secret: false,
    },
    ParameterSpec {
        name: SQL_SERVER_HOST,
        default: "",
        label: "SQL Server Host",
        secret: false,
    },
    ParameterSpec {
        name: SQL_DATABASE_NAME,
        default: "WorldWideImporters",
        label: "SQL Database Name",
        secret: false,
    },
    ParameterSpec {
        name: SQL_USERNAME,
        default: "",
        label: "SQL Username",
        secret: false,
    },
    ParameterSpec {
        name: SQL_PASSWORD,
        default: "",
        label: "SQL Password",
        secret: true,
    },
];

/// Look up a declared parameter by name
pub fn parameter_spec(name: &str) -> Option<&'static ParameterSpec> {
    PARAMETERS.iter().find(|spec| spec.name == name)
}

/// Resolved parameters for one flow run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractParams {
    pub catalog_name: String,
    pub schema_name: String,
    pub sql_server_host: String,
    pub sql_database_name: String,
    pub sql_username: String,
    pub sql_password: Secret,
}

impl Default for ExtractParams {
    fn default() -> Self {
        Self {
            catalog_name: "don_datalab_catalog".to_string(),
            schema_name: "bronze".to_string(),
            sql_server_host: String::new(),
            sql_database_name: "WorldWideImporters".to_string(),
            sql_username: String::new(),
            sql_password: Secret::default(),
        }
    }
}

impl ExtractParams {
    /// Set the destination catalog
    pub fn with_catalog(mut self, catalog: impl Into<String>) -> Self {
        self.catalog_name = catalog.into();
        self
    }

    /// Set the destination schema
    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema_name = schema.into();
        self
    }

    /// Set the source host
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.sql_server_host = host.into();
        self
    }

    /// Set the source database
    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.sql_database_name = database.into();
        self
    }

    /// Set the SQL login
    pub fn with_credentials(mut self, username: impl Into<String>, password: Secret) -> Self {
        self.sql_username = username.into();
        self.sql_password = password;
        self
    }

    /// Destination namespace as `catalog.schema`
    pub fn namespace(&self) -> String {
        format!("{}.{}", self.catalog_name, self.schema_name)
    }

    /// Value of a parameter for display, with secrets redacted
    pub fn display_value(&self, name: &str) -> Option<String> {
        let value = match name {
            CATALOG_NAME => self.catalog_name.clone(),
            SCHEMA_NAME => self.schema_name.clone(),
            SQL_SERVER_HOST => self.sql_server_host.clone(),
            SQL_DATABASE_NAME => self.sql_database_name.clone(),
            SQL_USERNAME => self.sql_username.clone(),
            SQL_PASSWORD => self.sql_password.to_string(),
            _ => return None,
        };
        Some(value)
    }

    /// Discard the in-memory password
    pub fn scrub(&mut self) {
        self.sql_password.scrub();
    }

    fn set(&mut self, name: &str, value: &str) -> ConfigResult<()> {
        match name {
            CATALOG_NAME => self.catalog_name = value.to_string(),
            SCHEMA_NAME => self.schema_name = value.to_string(),
            SQL_SERVER_HOST => self.sql_server_host = value.to_string(),
            SQL_DATABASE_NAME => self.sql_database_name = value.to_string(),
            SQL_USERNAME => self.sql_username = value.to_string(),
            SQL_PASSWORD => self.sql_password = Secret::new(value),
            other => return Err(ConfigError::UnknownParameter(other.to_string())),
        }
        Ok(())
    }
}

/// Resolve run parameters from caller-supplied values.
///
/// Unsupplied parameters take their declared default. Values are not
/// checked for emptiness: an empty host surfaces as a connection failure
/// later on. Echoes the target namespace and the source location; the
/// password is never logged.
pub fn resolve_parameters(supplied: &BTreeMap<String, String>) -> ConfigResult<ExtractParams> {
    let mut params = ExtractParams::default();
    for (name, value) in supplied {
        params.set(name, value)?;
    }

    info!("Target: {}.{}", params.catalog_name, params.schema_name);
    info!("Source: {}/{}", params.sql_server_host, params.sql_database_name);

    Ok(params)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_declared_parameters() {
        let params = ExtractParams::default();
        for spec in PARAMETERS.iter().filter(|s| !s.secret) {
            assert_eq!(
                params.display_value(spec.name).as_deref(),
                Some(spec.default),
                "default mismatch for {}",
                spec.name
            );
        }
        assert!(params.sql_password.is_empty());
    }

    #[test]
    fn test_resolve_falls_back_to_defaults() {
        let mut supplied = BTreeMap::new();
        supplied.insert(SQL_SERVER_HOST.to_string(), "sql.internal".to_string());
        supplied.insert(SQL_PASSWORD.to_string(), "pw".to_string());

        let params = resolve_parameters(&supplied).unwrap();
        assert_eq!(params.catalog_name, "don_datalab_catalog");
        assert_eq!(params.schema_name, "bronze");
        assert_eq!(params.sql_server_host, "sql.internal");
        assert_eq!(params.sql_database_name, "WorldWideImporters");
        assert_eq!(params.sql_username, "");
        assert_eq!(params.sql_password.expose(), "pw");
        assert_eq!(params.namespace(), "don_datalab_catalog.bronze");
    }

    #[test]
    fn test_resolve_rejects_unknown_parameter() {
        let mut supplied = BTreeMap::new();
        supplied.insert("sql_port".to_string(), "1434".to_string());

        let err = resolve_parameters(&supplied).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownParameter(ref p) if p == "sql_port"));
    }

    #[test]
    fn test_password_never_displayed() {
        let params = ExtractParams::default().with_credentials("etl", Secret::new("s3cret"));
        assert_eq!(params.display_value(SQL_PASSWORD).as_deref(), Some("***"));
        assert!(!format!("{:?}", params).contains("s3cret"));
    }

    #[test]
    fn test_scrub_clears_password() {
        let mut params = ExtractParams::default().with_credentials("etl", Secret::new("s3cret"));
        params.scrub();
        assert!(params.sql_password.is_empty());
        assert_eq!(params.sql_username, "etl");
    }
}
