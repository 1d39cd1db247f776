//! Column planning for overwrite-with-merge writes

use serde::{Deserialize, Serialize};

use super::error::{WarehouseError, WarehouseResult};
use crate::source::Column;

/// A column as it exists in the warehouse before a write
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExistingColumn {
    pub name: String,
    pub data_type: String,
}

/// A column of the replacement table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedColumn {
    pub name: String,
    pub data_type: String,
    /// Kept from the existing table and absent from the incoming data
    pub carried: bool,
}

/// Columns of the table that replaces the existing one
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WritePlan {
    pub columns: Vec<PlannedColumn>,
}

impl WritePlan {
    /// Columns filled from incoming rows, in incoming order
    pub fn insert_columns(&self) -> impl Iterator<Item = &PlannedColumn> {
        self.columns.iter().filter(|c| !c.carried)
    }

    /// Names of columns carried over as NULL
    pub fn carried_columns(&self) -> Vec<String> {
        self.columns
            .iter()
            .filter(|c| c.carried)
            .map(|c| c.name.clone())
            .collect()
    }
}

fn contains(names: &[&str], name: &str) -> bool {
    names.iter().any(|n| n.eq_ignore_ascii_case(name))
}

/// Plan the replacement table's columns.
///
/// Incoming columns come first and their types win. With `merge_schema`,
/// existing columns the incoming data lacks are appended with their existing
/// type. Without it, any difference in column names is an error.
pub fn plan_write(
    table: &str,
    incoming: &[Column],
    existing: &[ExistingColumn],
    merge_schema: bool,
) -> WarehouseResult<WritePlan> {
    let incoming_names: Vec<&str> = incoming.iter().map(|c| c.name.as_str()).collect();
    let existing_names: Vec<&str> = existing.iter().map(|c| c.name.as_str()).collect();

    let missing: Vec<String> = existing_names
        .iter()
        .filter(|name| !contains(&incoming_names, name))
        .map(|name| name.to_string())
        .collect();

    if !merge_schema && !existing.is_empty() {
        let added: Vec<String> = incoming_names
            .iter()
            .filter(|name| !contains(&existing_names, name))
            .map(|name| name.to_string())
            .collect();
        if !missing.is_empty() || !added.is_empty() {
            return Err(WarehouseError::SchemaMismatch {
                table: table.to_string(),
                missing,
                added,
            });
        }
    }

    let mut columns: Vec<PlannedColumn> = incoming
        .iter()
        .map(|c| PlannedColumn {
            name: c.name.clone(),
            data_type: c.column_type.duckdb_type(),
            carried: false,
        })
        .collect();

    if merge_schema {
        columns.extend(
            existing
                .iter()
                .filter(|c| !contains(&incoming_names, &c.name))
                .map(|c| PlannedColumn {
                    name: c.name.clone(),
                    data_type: c.data_type.clone(),
                    carried: true,
                }),
        );
    }

    Ok(WritePlan { columns })
}
