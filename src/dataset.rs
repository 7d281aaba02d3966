//! Held-out rows the service draws predictions from.
//!
//! The dataset is loaded once from CSV and never mutated afterwards. Cells are
//! typed loosely: anything that parses as a float is a number, empty cells are
//! missing, everything else is a category.

use std::fmt;
use std::path::Path;
use tabled::builder::Builder;
use tabled::settings::Style;

use crate::error::{Result, ServeError};

/// A single raw cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f64),
    Category(String),
    Missing,
}

impl Value {
    /// Parse one CSV cell.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Value::Missing;
        }
        match trimmed.parse::<f64>() {
            Ok(n) => Value::Number(n),
            Err(_) => Value::Category(trimmed.to_string()),
        }
    }

    /// Key used to look the value up in an encoding table.
    ///
    /// Numbers use their shortest decimal form so a `signup_flow` of `3`
    /// matches a `"3"` entry.
    pub fn lookup_key(&self) -> Option<String> {
        match self {
            Value::Number(n) => Some(n.to_string()),
            Value::Category(s) => Some(s.clone()),
            Value::Missing => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{n}"),
            Value::Category(s) => f.write_str(s),
            Value::Missing => f.write_str("nan"),
        }
    }
}

/// One observation: feature name -> value, in dataset column order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    cells: Vec<(String, Value)>,
}

impl Row {
    pub fn new(cells: Vec<(String, Value)>) -> Self {
        Self { cells }
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.cells
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    /// Replace the value of an existing column. Returns false when the column
    /// is not part of the row.
    pub fn set(&mut self, column: &str, value: Value) -> bool {
        match self.cells.iter_mut().find(|(name, _)| name == column) {
            Some((_, slot)) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.cells.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Column-named table of raw rows.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Dataset {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Result<Self> {
        for (i, row) in rows.iter().enumerate() {
            if row.len() != columns.len() {
                return Err(ServeError::ShapeMismatch(format!(
                    "dataset row {i} has {} cells, header has {}",
                    row.len(),
                    columns.len()
                )));
            }
        }
        Ok(Self { columns, rows })
    }

    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let reader = csv::Reader::from_path(path)
            .map_err(|e| ServeError::artifact(path, format!("opening CSV: {e}")))?;
        Self::from_reader(reader)
    }

    pub fn from_csv_str(text: &str) -> Result<Self> {
        Self::from_reader(csv::Reader::from_reader(text.as_bytes()))
    }

    fn from_reader<R: std::io::Read>(mut reader: csv::Reader<R>) -> Result<Self> {
        let columns: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(record.iter().map(Value::parse).collect());
        }

        Self::new(columns, rows)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Owned copy of the row at `index`.
    pub fn row(&self, index: usize) -> Result<Row> {
        let values = self.rows.get(index).ok_or(ServeError::RowOutOfRange {
            index,
            rows: self.rows.len(),
        })?;
        Ok(Row::new(
            self.columns.iter().cloned().zip(values.iter().cloned()).collect(),
        ))
    }

    /// Render the row at `index` as an ASCII table with the row index in the
    /// first column.
    pub fn render_row(&self, index: usize) -> Result<String> {
        let values = self.rows.get(index).ok_or(ServeError::RowOutOfRange {
            index,
            rows: self.rows.len(),
        })?;

        let mut builder = Builder::default();
        builder.push_record(std::iter::once(String::new()).chain(self.columns.iter().cloned()));
        builder.push_record(
            std::iter::once(index.to_string()).chain(values.iter().map(|v| v.to_string())),
        );

        let mut table = builder.build();
        table.with(Style::ascii());
        Ok(table.to_string())
    }
}
