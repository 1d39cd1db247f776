//! Input validation and sanitization utilities.
//!
//! Destination names arrive as free-form run parameters and end up inside
//! generated DuckDB statements (`ATTACH`, `CREATE SCHEMA`, `CREATE TABLE`).
//! Every name is validated here before use and always emitted quoted.
//!
//! # Security
//!
//! Input validation prevents:
//! - SQL injection via malicious catalog/schema/table names
//! - Path traversal via catalog names (a catalog maps to a file name)
//! - Excessively long identifiers

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum length for identifiers in general
pub const MAX_IDENTIFIER_LENGTH: usize = 255;

/// Errors that can occur during input validation.
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum ValidationError {
    /// Input is empty when a value is required
    #[error("{0} cannot be empty")]
    Empty(&'static str),

    /// Input exceeds maximum allowed length
    #[error("{field} exceeds maximum length (max: {max}, got: {actual})")]
    TooLong {
        field: &'static str,
        max: usize,
        actual: usize,
    },

    /// Input contains invalid characters
    #[error("{field} contains invalid characters: {reason}")]
    InvalidCharacters { field: &'static str, reason: String },

    /// Input has invalid format
    #[error("{0}: {1}")]
    InvalidFormat(&'static str, String),
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validate a destination identifier (catalog, schema or table name).
///
/// # Rules
///
/// - Must not be empty
/// - Must not exceed 255 characters
/// - Must start with a letter or underscore
/// - May contain letters, digits, underscores, and hyphens
///
/// # Examples
///
/// ```
/// use bronze_ingest::validation::validate_identifier;
///
/// assert!(validate_identifier("catalog name", "don_datalab_catalog").is_ok());
/// assert!(validate_identifier("schema name", "bronze").is_ok());
/// assert!(validate_identifier("schema name", "").is_err());
/// assert!(validate_identifier("catalog name", "../etc").is_err());
/// ```
pub fn validate_identifier(field: &'static str, name: &str) -> ValidationResult<()> {
    if name.is_empty() {
        return Err(ValidationError::Empty(field));
    }

    if name.len() > MAX_IDENTIFIER_LENGTH {
        return Err(ValidationError::TooLong {
            field,
            max: MAX_IDENTIFIER_LENGTH,
            actual: name.len(),
        });
    }

    let first_char = match name.chars().next() {
        Some(c) => c,
        None => return Err(ValidationError::Empty(field)),
    };
    if !first_char.is_alphabetic() && first_char != '_' {
        return Err(ValidationError::InvalidFormat(
            field,
            "must start with a letter or underscore".to_string(),
        ));
    }

    for c in name.chars() {
        if !c.is_alphanumeric() && c != '_' && c != '-' {
            return Err(ValidationError::InvalidCharacters {
                field,
                reason: format!("invalid character: '{}'", c),
            });
        }
    }

    Ok(())
}

/// Quote an identifier for DuckDB, doubling any embedded quote characters.
///
/// Column names come straight from the source result set and are not
/// validated, so this is the only protection they get.
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Quote a string literal, doubling embedded single quotes.
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}
