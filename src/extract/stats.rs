//! Informational statistics logged during extraction

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{info, warn};

use crate::source::{RecordSet, Value};

/// What a statistic computes. Aggregates skip nulls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregate {
    Sum(&'static str),
    Average(&'static str),
    Max(&'static str),
    /// Sum of the row-wise product of two columns
    SumOfProducts(&'static str, &'static str),
    /// Rows where the column is true
    CountTrue(&'static str),
    /// Distinct values, NULL counted as one value
    DistinctCount(&'static str),
    /// The distinct values themselves
    DistinctValues(&'static str),
}

impl Aggregate {
    fn columns(&self) -> Vec<&'static str> {
        match *self {
            Aggregate::Sum(c)
            | Aggregate::Average(c)
            | Aggregate::Max(c)
            | Aggregate::CountTrue(c)
            | Aggregate::DistinctCount(c)
            | Aggregate::DistinctValues(c) => vec![c],
            Aggregate::SumOfProducts(a, b) => vec![a, b],
        }
    }
}

/// How a statistic value is printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rendering {
    Integer,
    Currency,
    Count,
    List,
}

/// A named aggregate over one extracted table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Statistic {
    pub label: &'static str,
    pub aggregate: Aggregate,
    pub rendering: Rendering,
}

/// Computed statistic value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum StatValue {
    /// `None` when there were no non-null inputs
    Number(Option<f64>),
    Count(u64),
    Values(Vec<String>),
}

/// Result of one statistic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticOutcome {
    pub label: String,
    /// `None` when a required column was missing
    pub value: Option<StatValue>,
    pub rendered: String,
}

fn numbers<'a>(records: &'a RecordSet, index: usize) -> impl Iterator<Item = f64> + 'a {
    records.column_values(index).filter_map(Value::as_f64)
}

fn compute_value(aggregate: &Aggregate, records: &RecordSet, indices: &[usize]) -> StatValue {
    match aggregate {
        Aggregate::Sum(_) => {
            let mut seen = false;
            let total = numbers(records, indices[0]).fold(0.0, |acc, x| {
                seen = true;
                acc + x
            });
            StatValue::Number(seen.then_some(total))
        }
        Aggregate::Average(_) => {
            let (sum, count) = numbers(records, indices[0])
                .fold((0.0, 0u64), |(sum, count), x| (sum + x, count + 1));
            StatValue::Number((count > 0).then(|| sum / count as f64))
        }
        Aggregate::Max(_) => StatValue::Number(numbers(records, indices[0]).reduce(f64::max)),
        Aggregate::SumOfProducts(..) => {
            let products: Vec<f64> = records
                .rows
                .iter()
                .filter_map(|row| Some(row[indices[0]].as_f64()? * row[indices[1]].as_f64()?))
                .collect();
            StatValue::Number((!products.is_empty()).then(|| products.iter().sum()))
        }
        Aggregate::CountTrue(_) => StatValue::Count(
            records
                .column_values(indices[0])
                .filter(|v| v.as_bool() == Some(true))
                .count() as u64,
        ),
        Aggregate::DistinctCount(_) => {
            let distinct: BTreeSet<String> = records
                .column_values(indices[0])
                .map(|v| format!("{:?}", v))
                .collect();
            StatValue::Count(distinct.len() as u64)
        }
        Aggregate::DistinctValues(_) => {
            let distinct: BTreeSet<String> = records
                .column_values(indices[0])
                .map(|v| v.to_string())
                .collect();
            StatValue::Values(distinct.into_iter().collect())
        }
    }
}

fn render(value: &StatValue, rendering: Rendering) -> String {
    match (value, rendering) {
        (StatValue::Number(None), _) => "n/a".to_string(),
        (StatValue::Number(Some(x)), Rendering::Currency) => format!("${:.2}", x),
        (StatValue::Number(Some(x)), _) => format!("{:.0}", x),
        (StatValue::Count(n), _) => n.to_string(),
        (StatValue::Values(values), _) => values.join(", "),
    }
}

/// Compute a statistic over the extracted rows
pub fn compute(statistic: &Statistic, records: &RecordSet) -> StatisticOutcome {
    let mut indices = Vec::new();
    for column in statistic.aggregate.columns() {
        match records.column_index(column) {
            Some(index) => indices.push(index),
            None => {
                return StatisticOutcome {
                    label: statistic.label.to_string(),
                    value: None,
                    rendered: format!("n/a (column {} not present)", column),
                };
            }
        }
    }

    let value = compute_value(&statistic.aggregate, records, &indices);
    StatisticOutcome {
        label: statistic.label.to_string(),
        rendered: render(&value, statistic.rendering),
        value: Some(value),
    }
}

/// Log a statistic
pub fn log_outcome(outcome: &StatisticOutcome) {
    if outcome.value.is_none() {
        warn!(statistic = %outcome.label, "{}", outcome.rendered);
        return;
    }
    info!("{}: {}", outcome.label, outcome.rendered);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{Column, ColumnType, Decimal};

    fn lines() -> RecordSet {
        let mut records = RecordSet::new(vec![
            Column::new("Quantity", ColumnType::Integer),
            Column::new("UnitPrice", ColumnType::Decimal { scale: 2 }),
            Column::new("IsChillerStock", ColumnType::Boolean),
        ]);
        records.push_row(vec![
            Value::Int(10),
            Value::Decimal(Decimal::new(250, 2)),
            Value::Bool(true),
        ]);
        records.push_row(vec![Value::Int(4), Value::Null, Value::Bool(false)]);
        records.push_row(vec![
            Value::Null,
            Value::Decimal(Decimal::new(1750, 2)),
            Value::Null,
        ]);
        records
    }

    fn stat(aggregate: Aggregate, rendering: Rendering) -> Statistic {
        Statistic {
            label: "test",
            aggregate,
            rendering,
        }
    }

    #[test]
    fn test_numeric_aggregates_skip_nulls() {
        let records = lines();
        let total = compute(&stat(Aggregate::Sum("Quantity"), Rendering::Integer), &records);
        assert_eq!(total.value, Some(StatValue::Number(Some(14.0))));
        assert_eq!(total.rendered, "14");

        let avg = compute(&stat(Aggregate::Average("UnitPrice"), Rendering::Currency), &records);
        assert_eq!(avg.rendered, "$10.00");

        let max = compute(&stat(Aggregate::Max("UnitPrice"), Rendering::Currency), &records);
        assert_eq!(max.rendered, "$17.50");

        let value = compute(
            &stat(Aggregate::SumOfProducts("Quantity", "UnitPrice"), Rendering::Currency),
            &records,
        );
        assert_eq!(value.rendered, "$25.00");
    }

    #[test]
    fn test_empty_input_renders_na() {
        let records = RecordSet::new(lines().columns);
        let avg = compute(&stat(Aggregate::Average("UnitPrice"), Rendering::Currency), &records);
        assert_eq!(avg.value, Some(StatValue::Number(None)));
        assert_eq!(avg.rendered, "n/a");
    }

    #[test]
    fn test_counts() {
        let records = lines();
        let chiller = compute(&stat(Aggregate::CountTrue("IsChillerStock"), Rendering::Count), &records);
        assert_eq!(chiller.rendered, "1");

        let distinct = compute(&stat(Aggregate::DistinctCount("Quantity"), Rendering::Count), &records);
        // NULL counts as one distinct value
        assert_eq!(distinct.value, Some(StatValue::Count(3)));
    }

    #[test]
    fn test_distinct_values_sorted() {
        let mut records = RecordSet::new(vec![Column::new("StockGroupName", ColumnType::Text)]);
        for name in ["T-Shirts", "Clothing", "T-Shirts"] {
            records.push_row(vec![Value::Text(name.into())]);
        }
        let values = compute(&stat(Aggregate::DistinctValues("StockGroupName"), Rendering::List), &records);
        assert_eq!(values.rendered, "Clothing, T-Shirts");
    }

    #[test]
    fn test_missing_column() {
        let outcome = compute(&stat(Aggregate::Sum("Missing"), Rendering::Integer), &lines());
        assert!(outcome.value.is_none());
        assert!(outcome.rendered.contains("Missing"));
    }
}
