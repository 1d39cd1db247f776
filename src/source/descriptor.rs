//! Connection descriptor for the source database

use std::collections::BTreeMap;
use std::fmt;
use tracing::warn;

use crate::config::{ExtractParams, Secret};

/// Fixed SQL Server port
pub const SQL_SERVER_PORT: u16 = 1433;

/// Client library used for the TDS connection
pub const DRIVER_NAME: &str = "tiberius";

/// Login and transport options
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionOptions {
    pub user: String,
    pub password: Secret,
    pub driver: String,
    pub encrypt: bool,
    pub trust_server_certificate: bool,
}

/// Where and how to connect to the source.
///
/// Encryption is always on, but the server certificate is trusted without
/// validation (`trustServerCertificate=true`).
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionDescriptor {
    host: String,
    port: u16,
    database: String,
    url: String,
    options: Option<ConnectionOptions>,
}

impl ConnectionDescriptor {
    /// Build a descriptor from its parts
    pub fn new(host: &str, database: &str, username: &str, password: Secret) -> Self {
        let url = format!(
            "sqlserver://{}:{};database={};encrypt=true;trustServerCertificate=true",
            host, SQL_SERVER_PORT, database
        );
        warn!(
            host = %host,
            "Server certificate validation is disabled (trustServerCertificate=true)"
        );

        Self {
            host: host.to_string(),
            port: SQL_SERVER_PORT,
            database: database.to_string(),
            url,
            options: Some(ConnectionOptions {
                user: username.to_string(),
                password,
                driver: DRIVER_NAME.to_string(),
                encrypt: true,
                trust_server_certificate: true,
            }),
        }
    }

    /// Build a descriptor from resolved run parameters
    pub fn from_params(params: &ExtractParams) -> Self {
        Self::new(
            &params.sql_server_host,
            &params.sql_database_name,
            &params.sql_username,
            params.sql_password.clone(),
        )
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    /// Connection URI
    pub fn url(&self) -> &str {
        &self.url
    }

    /// `host:port` for log lines and errors
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Login options, `None` once scrubbed
    pub fn options(&self) -> Option<&ConnectionOptions> {
        self.options.as_ref()
    }

    /// Option mapping with the password redacted
    pub fn options_map(&self) -> BTreeMap<String, String> {
        let mut map = BTreeMap::new();
        if let Some(options) = &self.options {
            map.insert("user".to_string(), options.user.clone());
            map.insert("password".to_string(), options.password.to_string());
            map.insert("driver".to_string(), options.driver.clone());
            map.insert("encrypt".to_string(), options.encrypt.to_string());
            map.insert(
                "trustServerCertificate".to_string(),
                options.trust_server_certificate.to_string(),
            );
        }
        map
    }

    /// Overwrite the password and empty the option mapping
    pub fn scrub(&mut self) {
        if let Some(mut options) = self.options.take() {
            options.password.scrub();
        }
    }
}

impl fmt::Display for ConnectionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.url)?;
        if let Some(options) = &self.options {
            write!(f, " (user: {}, password: {})", options.user, options.password)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_url_and_options() {
        let params = ExtractParams::default()
            .with_host("sql.internal")
            .with_credentials("etl", Secret::new("pw"));
        let descriptor = ConnectionDescriptor::from_params(&params);

        assert_eq!(
            descriptor.url(),
            "sqlserver://sql.internal:1433;database=WorldWideImporters;encrypt=true;trustServerCertificate=true"
        );
        assert_eq!(descriptor.address(), "sql.internal:1433");

        let options = descriptor.options_map();
        assert_eq!(options.get("user").map(String::as_str), Some("etl"));
        assert_eq!(options.get("password").map(String::as_str), Some("***"));
        assert_eq!(options.get("driver").map(String::as_str), Some("tiberius"));
        assert_eq!(options.get("encrypt").map(String::as_str), Some("true"));
        assert_eq!(
            options.get("trustServerCertificate").map(String::as_str),
            Some("true")
        );
        assert_eq!(descriptor.options().unwrap().password.expose(), "pw");
    }

    #[test]
    fn test_empty_host_is_accepted() {
        let descriptor = ConnectionDescriptor::new("", "WorldWideImporters", "", Secret::default());
        assert_eq!(descriptor.address(), ":1433");
    }

    #[test]
    fn test_display_never_leaks_password() {
        let descriptor = ConnectionDescriptor::new("h", "db", "etl", Secret::new("topsecret"));
        let shown = format!("{} {:?}", descriptor, descriptor);
        assert!(!shown.contains("topsecret"));
    }

    #[test]
    fn test_scrub_empties_options() {
        let mut descriptor = ConnectionDescriptor::new("h", "db", "etl", Secret::new("pw"));
        descriptor.scrub();
        assert!(descriptor.options().is_none());
        assert!(descriptor.options_map().is_empty());
        assert_eq!(descriptor.host(), "h");
    }
}
