//! Output formatting for CLI

use crate::config::{ExtractParams, PARAMETERS};
use crate::extract::TableSpec;
use crate::source::ConnectionDescriptor;
use crate::warehouse::Namespace;

/// Format query rows as a tab-separated table
pub fn format_table(rows: &[serde_json::Value]) -> String {
    if rows.is_empty() {
        return "No results.\n".to_string();
    }

    // Column names from the first row
    let columns: Vec<&str> = rows[0]
        .as_object()
        .map(|obj| obj.keys().map(|k| k.as_str()).collect())
        .unwrap_or_default();

    let mut output = String::new();
    output.push_str(&columns.join("\t"));
    output.push('\n');
    output.push_str(&columns.iter().map(|_| "---").collect::<Vec<_>>().join("\t"));
    output.push('\n');

    for row in rows {
        let values: Vec<String> = columns
            .iter()
            .map(|col| {
                row.get(*col)
                    .map(|v| match v {
                        serde_json::Value::String(s) => s.clone(),
                        serde_json::Value::Null => "NULL".to_string(),
                        other => other.to_string(),
                    })
                    .unwrap_or_default()
            })
            .collect();
        output.push_str(&values.join("\t"));
        output.push('\n');
    }

    output.push_str(&format!("\n{} row(s)\n", rows.len()));
    output
}

/// Format resolved parameters, the connection and the table plan
pub fn format_plan(
    params: &ExtractParams,
    descriptor: &ConnectionDescriptor,
    namespace: &Namespace,
    tables: &[&TableSpec],
) -> String {
    let mut output = String::new();

    output.push_str("Parameters:\n");
    for spec in PARAMETERS.iter() {
        let value = params.display_value(spec.name).unwrap_or_default();
        output.push_str(&format!("  {} ({}): {}\n", spec.label, spec.name, value));
    }

    output.push_str(&format!("\nConnection URL: {}\n", descriptor.url()));
    for (key, value) in descriptor.options_map() {
        output.push_str(&format!("  {}: {}\n", key, value));
    }

    output.push_str(&format!("\nTables ({}):\n", namespace));
    for spec in tables {
        output.push_str(&format!(
            "  - {} -> {}",
            spec.source_table, spec.table_name
        ));
        if let Some(column) = spec.cluster_by {
            output.push_str(&format!(" (clustered by {})", column));
        }
        output.push('\n');
        output.push_str(&format!("      {}\n", spec.query()));
    }

    output
}
