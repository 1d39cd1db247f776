//! Data-quality checks
//!
//! Checks count matching rows and log the count. They never block a write.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::{info, warn};

use crate::source::{RecordSet, Value};

/// How a check result is reported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Logged at WARN when the count is non-zero
    Warning,
    /// Logged at INFO when the count is non-zero
    Notice,
    /// Always logged
    Metric,
}

/// Row condition a check counts. Comparisons against NULL never match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Predicate {
    IsNull(&'static str),
    AtMostZero(&'static str),
    BelowZero(&'static str),
    EqualsZero(&'static str),
    /// First column strictly below the second
    BelowColumn(&'static str, &'static str),
}

impl Predicate {
    fn columns(&self) -> Vec<&'static str> {
        match *self {
            Predicate::IsNull(c)
            | Predicate::AtMostZero(c)
            | Predicate::BelowZero(c)
            | Predicate::EqualsZero(c) => vec![c],
            Predicate::BelowColumn(a, b) => vec![a, b],
        }
    }

    fn matches(&self, row: &[Value], indices: &[usize]) -> bool {
        let zero = Value::Int(0);
        match self {
            Predicate::IsNull(_) => row[indices[0]].is_null(),
            Predicate::AtMostZero(_) => matches!(
                row[indices[0]].compare(&zero),
                Some(Ordering::Less | Ordering::Equal)
            ),
            Predicate::BelowZero(_) => row[indices[0]].compare(&zero) == Some(Ordering::Less),
            Predicate::EqualsZero(_) => row[indices[0]].compare(&zero) == Some(Ordering::Equal),
            Predicate::BelowColumn(..) => {
                row[indices[0]].compare(&row[indices[1]]) == Some(Ordering::Less)
            }
        }
    }
}

/// A named row count
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QualityCheck {
    pub label: &'static str,
    pub predicate: Predicate,
    pub severity: Severity,
}

/// Result of one check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckOutcome {
    pub label: String,
    pub severity: Severity,
    /// Matching rows, `None` when the check could not run
    pub count: Option<u64>,
    pub skipped_reason: Option<String>,
}

impl CheckOutcome {
    /// Whether the check found something worth a warning or notice
    pub fn is_flagged(&self) -> bool {
        self.severity != Severity::Metric && self.count.unwrap_or(0) > 0
    }
}

/// Count the rows matching a check
pub fn evaluate(check: &QualityCheck, records: &RecordSet) -> CheckOutcome {
    let mut indices = Vec::new();
    for column in check.predicate.columns() {
        match records.column_index(column) {
            Some(index) => indices.push(index),
            None => {
                return CheckOutcome {
                    label: check.label.to_string(),
                    severity: check.severity,
                    count: None,
                    skipped_reason: Some(format!("column {} not present", column)),
                };
            }
        }
    }

    let count = records
        .rows
        .iter()
        .filter(|row| check.predicate.matches(row, &indices))
        .count() as u64;

    CheckOutcome {
        label: check.label.to_string(),
        severity: check.severity,
        count: Some(count),
        skipped_reason: None,
    }
}

/// Log a check result according to its severity
pub fn log_outcome(outcome: &CheckOutcome) {
    let count = match (outcome.count, &outcome.skipped_reason) {
        (Some(count), _) => count,
        (None, reason) => {
            warn!(
                check = %outcome.label,
                reason = reason.as_deref().unwrap_or("unknown"),
                "Quality check skipped"
            );
            return;
        }
    };

    match outcome.severity {
        Severity::Warning if count > 0 => {
            warn!("WARNING: Found {} records with {}", count, outcome.label)
        }
        Severity::Notice if count > 0 => {
            info!("INFO: Found {} records with {}", count, outcome.label)
        }
        Severity::Metric => info!("{}: {}", outcome.label, count),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{Column, ColumnType, Decimal};

    fn holdings() -> RecordSet {
        let mut records = RecordSet::new(vec![
            Column::new("QuantityOnHand", ColumnType::Integer),
            Column::new("ReorderLevel", ColumnType::Integer),
        ]);
        records.push_row(vec![Value::Int(-2), Value::Int(5)]);
        records.push_row(vec![Value::Int(0), Value::Int(5)]);
        records.push_row(vec![Value::Int(10), Value::Int(5)]);
        records.push_row(vec![Value::Null, Value::Int(5)]);
        records.push_row(vec![Value::Int(3), Value::Null]);
        records
    }

    fn check(predicate: Predicate) -> QualityCheck {
        QualityCheck {
            label: "test",
            predicate,
            severity: Severity::Metric,
        }
    }

    #[test]
    fn test_comparisons_ignore_nulls() {
        let records = holdings();
        assert_eq!(evaluate(&check(Predicate::BelowZero("QuantityOnHand")), &records).count, Some(1));
        assert_eq!(evaluate(&check(Predicate::EqualsZero("QuantityOnHand")), &records).count, Some(1));
        assert_eq!(evaluate(&check(Predicate::AtMostZero("QuantityOnHand")), &records).count, Some(2));
        assert_eq!(
            evaluate(&check(Predicate::BelowColumn("QuantityOnHand", "ReorderLevel")), &records).count,
            Some(2)
        );
        assert_eq!(evaluate(&check(Predicate::IsNull("ReorderLevel")), &records).count, Some(1));
    }

    #[test]
    fn test_decimal_comparison() {
        let mut records = RecordSet::new(vec![Column::new("UnitPrice", ColumnType::Decimal { scale: 2 })]);
        records.push_row(vec![Value::Decimal(Decimal::new(0, 2))]);
        records.push_row(vec![Value::Decimal(Decimal::new(-150, 2))]);
        records.push_row(vec![Value::Decimal(Decimal::new(1899, 2))]);

        let outcome = evaluate(&check(Predicate::AtMostZero("UnitPrice")), &records);
        assert_eq!(outcome.count, Some(2));
    }

    #[test]
    fn test_missing_column_is_skipped() {
        let outcome = evaluate(&check(Predicate::IsNull("OrderID")), &holdings());
        assert_eq!(outcome.count, None);
        assert!(outcome.skipped_reason.unwrap().contains("OrderID"));
    }

    #[test]
    fn test_is_flagged() {
        let warning = QualityCheck {
            label: "null OrderID",
            predicate: Predicate::IsNull("QuantityOnHand"),
            severity: Severity::Warning,
        };
        assert!(evaluate(&warning, &holdings()).is_flagged());

        let metric = check(Predicate::IsNull("QuantityOnHand"));
        assert!(!evaluate(&metric, &holdings()).is_flagged());
    }
}
