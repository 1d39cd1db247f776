//! Validation functionality
//!
//! Provides validation logic for:
//! - Destination identifiers (catalog, schema and table names)
//! - Quoting of identifiers and string literals in generated SQL

pub mod input;

pub use input::{
    ValidationError, ValidationResult, quote_identifier, quote_literal, validate_identifier,
};
