//! In-memory result sets
//!
//! A [`RecordSet`] is what a source query returns and what the warehouse
//! writes: ordered, typed columns and row-major values.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Exact fixed-point number as read from a SQL Server `decimal`/`money` column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Decimal {
    mantissa: i128,
    scale: u8,
}

impl Decimal {
    /// Build from an unscaled integer and a scale (digits after the point)
    pub fn new(mantissa: i128, scale: u8) -> Self {
        Self { mantissa, scale }
    }

    pub fn mantissa(&self) -> i128 {
        self.mantissa
    }

    pub fn scale(&self) -> u8 {
        self.scale
    }

    /// Lossy conversion for aggregates
    pub fn to_f64(&self) -> f64 {
        self.mantissa as f64 / 10f64.powi(self.scale as i32)
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.mantissa < 0 { "-" } else { "" };
        let abs = self.mantissa.unsigned_abs();
        if self.scale == 0 {
            return write!(f, "{}{}", sign, abs);
        }
        let pow = 10u128.pow(self.scale as u32);
        write!(
            f,
            "{}{}.{:0width$}",
            sign,
            abs / pow,
            abs % pow,
            width = self.scale as usize
        )
    }
}

/// Column types the pipeline carries through to the warehouse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    Boolean,
    Integer,
    BigInt,
    Double,
    Decimal { scale: u8 },
    Text,
    Binary,
    Date,
    Time,
    Timestamp,
}

impl ColumnType {
    /// DuckDB type used for the column in DDL
    pub fn duckdb_type(&self) -> String {
        match self {
            ColumnType::Boolean => "BOOLEAN".to_string(),
            ColumnType::Integer => "INTEGER".to_string(),
            ColumnType::BigInt => "BIGINT".to_string(),
            ColumnType::Double => "DOUBLE".to_string(),
            ColumnType::Decimal { scale } => format!("DECIMAL(38,{})", scale),
            ColumnType::Text => "VARCHAR".to_string(),
            ColumnType::Binary => "BLOB".to_string(),
            ColumnType::Date => "DATE".to_string(),
            ColumnType::Time => "TIME".to_string(),
            ColumnType::Timestamp => "TIMESTAMP".to_string(),
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.duckdb_type())
    }
}

/// A single cell
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Decimal(Decimal),
    Text(String),
    Bytes(Vec<u8>),
    Date(NaiveDate),
    Time(NaiveTime),
    Timestamp(NaiveDateTime),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Numeric view of the value, `None` for nulls and non-numeric values
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(n) => Some(*n as f64),
            Value::Float(f) => Some(*f),
            Value::Decimal(d) => Some(d.to_f64()),
            _ => None,
        }
    }

    /// Boolean view of the value; SQL Server `bit` may arrive as an integer
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            Value::Int(n) => Some(*n != 0),
            _ => None,
        }
    }

    /// SQL comparison: `None` when either side is null or the types do not
    /// compare.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Null, _) | (_, Value::Null) => None,
            (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
            (Value::Text(a), Value::Text(b)) => Some(a.cmp(b)),
            (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
            (Value::Date(a), Value::Date(b)) => Some(a.cmp(b)),
            (Value::Time(a), Value::Time(b)) => Some(a.cmp(b)),
            (Value::Timestamp(a), Value::Timestamp(b)) => Some(a.cmp(b)),
            (Value::Bytes(a), Value::Bytes(b)) => Some(a.cmp(b)),
            (a, b) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        }
    }

    /// Ordering used for clustered inserts: nulls first, then by value
    pub fn sort_cmp(&self, other: &Value) -> Ordering {
        match (self.is_null(), other.is_null()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            (false, false) => self.compare(other).unwrap_or(Ordering::Equal),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(x) => write!(f, "{}", x),
            Value::Decimal(d) => write!(f, "{}", d),
            Value::Text(s) => write!(f, "{}", s),
            Value::Bytes(b) => write!(f, "<{} bytes>", b.len()),
            Value::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Value::Time(t) => write!(f, "{}", t.format("%H:%M:%S%.6f")),
            Value::Timestamp(ts) => write!(f, "{}", ts.format("%Y-%m-%d %H:%M:%S%.6f")),
        }
    }
}

/// A named, typed column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub column_type: ColumnType,
}

impl Column {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
        }
    }
}

/// Rows returned by a source query
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordSet {
    pub columns: Vec<Column>,
    pub rows: Vec<Vec<Value>>,
}

impl RecordSet {
    pub fn new(columns: Vec<Column>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Append a row. Short rows are padded with nulls, long rows truncated.
    pub fn push_row(&mut self, mut row: Vec<Value>) {
        row.resize(self.columns.len(), Value::Null);
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Position of a column, matched case-insensitively
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// Values of one column in row order
    pub fn column_values(&self, index: usize) -> impl Iterator<Item = &Value> + '_ {
        self.rows.iter().filter_map(move |row| row.get(index))
    }

    /// Set every row's value for `name`, replacing the column when it exists
    /// and appending it otherwise.
    pub fn set_constant_column(&mut self, name: &str, column_type: ColumnType, value: Value) {
        match self.column_index(name) {
            Some(index) => {
                self.columns[index] = Column::new(name, column_type);
                for row in self.rows.iter_mut() {
                    row[index] = value.clone();
                }
            }
            None => {
                self.columns.push(Column::new(name, column_type));
                for row in self.rows.iter_mut() {
                    row.push(value.clone());
                }
            }
        }
    }

    /// Row positions ordered by one column, nulls first; ties keep source order
    pub fn order_by(&self, index: usize) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.rows.len()).collect();
        order.sort_by(|&a, &b| self.rows[a][index].sort_cmp(&self.rows[b][index]));
        order
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decimal_display() {
        assert_eq!(Decimal::new(12345, 2).to_string(), "123.45");
        assert_eq!(Decimal::new(-5, 2).to_string(), "-0.05");
        assert_eq!(Decimal::new(7, 0).to_string(), "7");
        assert_eq!(Decimal::new(1000, 3).to_string(), "1.000");
        assert!((Decimal::new(12345, 2).to_f64() - 123.45).abs() < 1e-9);
    }

    #[test]
    fn test_compare_is_sql_like() {
        assert_eq!(Value::Int(1).compare(&Value::Null), None);
        assert_eq!(Value::Null.compare(&Value::Null), None);
        assert_eq!(
            Value::Int(2).compare(&Value::Decimal(Decimal::new(150, 2))),
            Some(Ordering::Greater)
        );
        assert_eq!(
            Value::Text("a".into()).compare(&Value::Text("b".into())),
            Some(Ordering::Less)
        );
        assert_eq!(Value::Text("1".into()).compare(&Value::Int(1)), None);
    }

    #[test]
    fn test_set_constant_column_appends_and_replaces() {
        let mut records = RecordSet::new(vec![Column::new("OrderID", ColumnType::Integer)]);
        records.push_row(vec![Value::Int(1)]);
        records.push_row(vec![Value::Int(2)]);

        records.set_constant_column("_source_system", ColumnType::Text, Value::Text("a".into()));
        assert_eq!(records.columns.len(), 2);
        assert_eq!(records.rows[1][1], Value::Text("a".into()));

        records.set_constant_column("_SOURCE_SYSTEM", ColumnType::Text, Value::Text("b".into()));
        assert_eq!(records.columns.len(), 2);
        assert_eq!(records.rows[0][1], Value::Text("b".into()));
    }

    #[test]
    fn test_column_index_case_insensitive() {
        let records = RecordSet::new(vec![Column::new("StockItemID", ColumnType::Integer)]);
        assert_eq!(records.column_index("stockitemid"), Some(0));
        assert_eq!(records.column_index("missing"), None);
    }

    #[test]
    fn test_order_by_nulls_first_and_stable() {
        let mut records = RecordSet::new(vec![
            Column::new("OrderDate", ColumnType::Date),
            Column::new("OrderID", ColumnType::Integer),
        ]);
        let d = |day| Value::Date(NaiveDate::from_ymd_opt(2016, 5, day).unwrap());
        records.push_row(vec![d(3), Value::Int(1)]);
        records.push_row(vec![Value::Null, Value::Int(2)]);
        records.push_row(vec![d(1), Value::Int(3)]);
        records.push_row(vec![d(3), Value::Int(4)]);

        assert_eq!(records.order_by(0), vec![1, 2, 0, 3]);
    }
}
