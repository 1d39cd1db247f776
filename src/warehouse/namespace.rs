//! Catalog/schema namespaces and table references

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::validation::{ValidationResult, quote_identifier, validate_identifier};

/// A validated `catalog.schema` pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Namespace {
    catalog: String,
    schema: String,
}

impl Namespace {
    pub fn new(catalog: &str, schema: &str) -> ValidationResult<Self> {
        validate_identifier("catalog name", catalog)?;
        validate_identifier("schema name", schema)?;
        Ok(Self {
            catalog: catalog.to_string(),
            schema: schema.to_string(),
        })
    }

    pub fn catalog(&self) -> &str {
        &self.catalog
    }

    pub fn schema(&self) -> &str {
        &self.schema
    }

    /// Quoted `"catalog"."schema"`
    pub fn qualified(&self) -> String {
        format!(
            "{}.{}",
            quote_identifier(&self.catalog),
            quote_identifier(&self.schema)
        )
    }

    /// Reference a table inside this namespace
    pub fn table(&self, name: &str) -> ValidationResult<TableRef> {
        validate_identifier("table name", name)?;
        Ok(TableRef {
            namespace: self.clone(),
            name: name.to_string(),
        })
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.catalog, self.schema)
    }
}

/// A validated `catalog.schema.table` reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRef {
    namespace: Namespace,
    name: String,
}

impl TableRef {
    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Quoted `"catalog"."schema"."table"`
    pub fn qualified(&self) -> String {
        format!("{}.{}", self.namespace.qualified(), quote_identifier(&self.name))
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.namespace, self.name)
    }
}
