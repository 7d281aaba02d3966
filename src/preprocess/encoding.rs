//! Categorical target encoding.
//!
//! The table is fitted at training time and maps, per column, each category
//! to an integer code. Values the table does not know are passed through
//! unchanged; callers get the list of such columns back so the silent
//! pass-through can be surfaced in logs.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::dataset::{Row, Value};
use crate::error::{Result, ServeError};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EncodingTable {
    columns: BTreeMap<String, BTreeMap<String, i64>>,
}

/// Columns that were left unencoded because their value was not in the table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassThrough {
    pub columns: Vec<String>,
}

impl PassThrough {
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl EncodingTable {
    pub fn new(columns: BTreeMap<String, BTreeMap<String, i64>>) -> Self {
        Self { columns }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ServeError::artifact(path, e.to_string()))?;
        let table: Self = serde_json::from_str(&content)
            .map_err(|e| ServeError::artifact(path, e.to_string()))?;
        Ok(table)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    /// Code for `category` in `column`, if the table covers it.
    pub fn code(&self, column: &str, category: &str) -> Option<i64> {
        self.columns.get(column)?.get(category).copied()
    }

    /// Reverse lookup. Only meaningful while codes are unique per column.
    pub fn category(&self, column: &str, code: i64) -> Option<&str> {
        self.columns
            .get(column)?
            .iter()
            .find(|(_, c)| **c == code)
            .map(|(category, _)| category.as_str())
    }

    /// Columns whose codes are not unique, so the reverse lookup is ambiguous.
    pub fn ambiguous_columns(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|(_, codes)| {
                let mut seen: Vec<i64> = codes.values().copied().collect();
                seen.sort_unstable();
                seen.dedup();
                seen.len() != codes.len()
            })
            .map(|(column, _)| column.as_str())
            .collect()
    }

    /// Replace every covered categorical value in `row` with its code.
    ///
    /// Columns present in the table but absent from the row are ignored.
    pub fn encode(&self, row: &mut Row) -> PassThrough {
        let mut report = PassThrough::default();

        for (column, codes) in &self.columns {
            let Some(value) = row.get(column) else {
                continue;
            };
            let Some(key) = value.lookup_key() else {
                continue;
            };
            match codes.get(&key) {
                Some(code) => {
                    row.set(column, Value::Number(*code as f64));
                }
                None => report.columns.push(column.clone()),
            }
        }

        report
    }
}
