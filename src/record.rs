use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde::ser::{Serialize, SerializeMap, Serializer};

/// Canonical column name used to join rows to boundaries.
pub const ZIPCODE: &str = "zipcode";

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Normalize a CSV header: lowercase, whitespace runs become `_`, and `zip_code` becomes `zipcode`.
pub fn normalize_header(header: &str) -> String {
    let lowered = header.to_lowercase();
    let normalized = WHITESPACE.replace_all(&lowered, "_");
    if normalized == "zip_code" { ZIPCODE.to_string() } else { normalized.into_owned() }
}

/// One CSV data row, keyed by normalized column name.
/// Columns are shared between all rows read from the same file.
#[derive(Debug, Clone, PartialEq)]
pub struct RowRecord {
    columns: Arc<[String]>,
    values: Vec<String>,
}

impl RowRecord {
    /// Build a record from a shared header and its cell values.
    /// Missing trailing values are padded with empty strings; extra values are dropped.
    pub fn new(columns: Arc<[String]>, mut values: Vec<String>) -> Self {
        values.resize(columns.len(), String::new());
        Self { columns, values }
    }

    /// Build a standalone record from `(column, value)` pairs.
    pub fn from_pairs<K: Into<String>, V: Into<String>>(pairs: impl IntoIterator<Item = (K, V)>) -> Self {
        let (columns, values): (Vec<String>, Vec<String>) = pairs.into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .unzip();
        Self { columns: columns.into(), values }
    }

    /// Value of `column`, if the column exists in this record.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.columns.iter()
            .position(|c| c == column)
            .map(|i| self.values[i].as_str())
    }

    /// Whether the record has a column named `column` (even if its value is empty).
    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    /// Column names in header order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(String::as_str)
    }

    /// `(column, value)` pairs in header order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.columns.iter().map(String::as_str).zip(self.values.iter().map(String::as_str))
    }

    pub fn len(&self) -> usize { self.columns.len() }

    pub fn is_empty(&self) -> bool { self.columns.is_empty() }
}

impl Serialize for RowRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (column, value) in self.iter() {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}
