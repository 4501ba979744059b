//! Tabular dataset model
//!
//! A [`Table`] is an ordered list of column names and rows of scalar
//! [`Value`]s. It is the in-process form of every dataset the pipeline
//! computes and exports.

use crate::domain::{PipelineError, Result};
use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;

/// Scalar cell value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// 64-bit integer
    Int(i64),
    /// 64-bit float
    Float(f64),
    /// UTF-8 text
    Text(String),
    /// Missing value
    Null,
}

impl Value {
    /// Parses a raw text field, inferring the narrowest type
    ///
    /// Empty fields are null, then integers, then floats, else text.
    pub fn infer(raw: &str) -> Value {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Value::Null;
        }
        if let Ok(i) = trimmed.parse::<i64>() {
            return Value::Int(i);
        }
        if let Ok(f) = trimmed.parse::<f64>() {
            if f.is_finite() {
                return Value::Float(f);
            }
        }
        Value::Text(raw.to_string())
    }

    /// Numeric view of the value; text and null are not numeric
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            Value::Text(_) | Value::Null => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Total order used for sorting and grouping
    ///
    /// Null sorts first, then numbers (compared numerically), then text.
    pub fn total_cmp(&self, other: &Value) -> Ordering {
        fn rank(v: &Value) -> u8 {
            match v {
                Value::Null => 0,
                Value::Int(_) | Value::Float(_) => 1,
                Value::Text(_) => 2,
            }
        }

        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a.cmp(b),
            (Value::Text(a), Value::Text(b)) => a.cmp(b),
            (Value::Null, Value::Null) => Ordering::Equal,
            _ => match (self.as_f64(), other.as_f64()) {
                (Some(a), Some(b)) => a.total_cmp(&b),
                _ => rank(self).cmp(&rank(other)),
            },
        }
    }
}

impl fmt::Display for Value {
    /// CSV rendering: null is empty, integral floats keep one decimal
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => {
                if x.is_finite() && x.fract() == 0.0 && x.abs() < 1e16 {
                    write!(f, "{x:.1}")
                } else {
                    write!(f, "{x}")
                }
            }
            Value::Text(s) => write!(f, "{s}"),
            Value::Null => Ok(()),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

/// Ordered, column-named dataset
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    /// Creates a table, checking that every row matches the column count
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Result<Self> {
        let mut seen = HashSet::new();
        for column in &columns {
            if !seen.insert(column.as_str()) {
                return Err(PipelineError::Dataset(format!(
                    "Duplicate column name: {column}"
                )));
            }
        }
        if let Some((idx, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != columns.len())
        {
            return Err(PipelineError::Dataset(format!(
                "Row {idx} has {} values, expected {}",
                row.len(),
                columns.len()
            )));
        }
        Ok(Self { columns, rows })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of a column by name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Column index or a dataset error naming the missing column
    pub fn require_column(&self, name: &str) -> Result<usize> {
        self.column_index(name)
            .ok_or_else(|| PipelineError::Dataset(format!("Missing required column: {name}")))
    }

    /// Value at (row, column name)
    pub fn value(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.column_index(column)?;
        self.rows.get(row).and_then(|r| r.get(idx))
    }

    /// Keeps the listed columns that exist, in the listed order
    ///
    /// A name listed more than once is selected at its first position only.
    pub fn select_available(&self, wanted: &[&str]) -> Table {
        let mut selected = HashSet::new();
        let indices: Vec<(usize, &str)> = wanted
            .iter()
            .filter(|name| selected.insert(**name))
            .filter_map(|name| self.column_index(name).map(|idx| (idx, *name)))
            .collect();

        let columns = indices.iter().map(|(_, name)| name.to_string()).collect();
        let rows = self
            .rows
            .iter()
            .map(|row| indices.iter().map(|(idx, _)| row[*idx].clone()).collect())
            .collect();

        Table { columns, rows }
    }

    /// Drops rows whose key-column values repeat an earlier row, keeping the first
    pub fn dedup_by(&self, keys: &[&str]) -> Result<Table> {
        let key_indices = keys
            .iter()
            .map(|k| self.require_column(k))
            .collect::<Result<Vec<_>>>()?;

        let mut seen = HashSet::new();
        let rows = self
            .rows
            .iter()
            .filter(|row| {
                let key: Vec<String> = key_indices.iter().map(|&i| dedup_key(&row[i])).collect();
                seen.insert(key)
            })
            .cloned()
            .collect();

        Ok(Table {
            columns: self.columns.clone(),
            rows,
        })
    }

    /// Appends a column; `values` must have one entry per row
    pub fn with_column(mut self, name: &str, values: Vec<Value>) -> Result<Table> {
        if self.has_column(name) {
            return Err(PipelineError::Dataset(format!(
                "Column already exists: {name}"
            )));
        }
        if values.len() != self.rows.len() {
            return Err(PipelineError::Dataset(format!(
                "Column {name} has {} values, expected {}",
                values.len(),
                self.rows.len()
            )));
        }
        self.columns.push(name.to_string());
        for (row, value) in self.rows.iter_mut().zip(values) {
            row.push(value);
        }
        Ok(self)
    }

    /// Stable sort on one column, descending, nulls last
    pub fn sort_desc_nulls_last(mut self, column: &str) -> Result<Table> {
        let idx = self.require_column(column)?;
        self.rows.sort_by(|a, b| match (a[idx].is_null(), b[idx].is_null()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => b[idx].total_cmp(&a[idx]),
        });
        Ok(self)
    }

    /// Keeps the first `n` rows
    pub fn limit(mut self, n: usize) -> Table {
        self.rows.truncate(n);
        self
    }
}

fn dedup_key(value: &Value) -> String {
    match value {
        Value::Null => "\u{0}null".to_string(),
        Value::Float(f) => format!("f:{}", f.to_bits()),
        Value::Int(i) => format!("i:{i}"),
        Value::Text(s) => format!("t:{s}"),
    }
}
