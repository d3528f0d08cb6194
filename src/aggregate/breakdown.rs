use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::record::{RowRecord, normalize_header};

/// Value recorded when neither the breakdown column nor its fallback has a value.
pub const NOT_PROVIDED: &str = "Not Provided";

/// Which categorical column to histogram per key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakdownSpec {
    pub column: String,
    /// Used for rows that lack `column` entirely.
    #[serde(default)]
    pub fallback: Option<String>,
}

impl BreakdownSpec {
    pub fn new(column: impl Into<String>) -> Self {
        Self { column: column.into(), fallback: None }
    }

    pub fn with_fallback(mut self, fallback: impl Into<String>) -> Self {
        self.fallback = Some(fallback.into());
        self
    }

    /// The same spec with column names normalized like CSV headers.
    pub fn normalized(&self) -> Self {
        Self {
            column: normalize_header(&self.column),
            fallback: self.fallback.as_deref().map(normalize_header),
        }
    }

    /// The category of one row.
    pub fn category<'a>(&self, row: &'a RowRecord) -> &'a str {
        let value = row.get(&self.column)
            .or_else(|| self.fallback.as_deref().and_then(|f| row.get(f)));
        match value {
            Some(v) if !v.is_empty() => v,
            _ => NOT_PROVIDED,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BreakdownEntry {
    pub value: String,
    pub count: usize,
    /// Share of the key's rows, in percent, rounded to two decimals.
    pub percentage: f64,
}

/// Value histogram of one categorical column within one key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Breakdown {
    pub column: String,
    pub entries: Vec<BreakdownEntry>,
}

impl Breakdown {
    /// Count categories over `rows`; entries are sorted by descending share,
    /// ties keep first-seen order.
    pub fn compute(spec: &BreakdownSpec, rows: &[RowRecord]) -> Self {
        let mut index: AHashMap<&str, usize> = AHashMap::new();
        let mut counts: Vec<(&str, usize)> = Vec::new();
        for row in rows {
            let value = spec.category(row);
            match index.get(value) {
                Some(&i) => counts[i].1 += 1,
                None => {
                    index.insert(value, counts.len());
                    counts.push((value, 1));
                }
            }
        }
        counts.sort_by(|a, b| b.1.cmp(&a.1));

        let total = rows.len();
        let entries = counts.into_iter()
            .map(|(value, count)| BreakdownEntry {
                value: value.to_string(),
                count,
                percentage: percentage(count, total),
            })
            .collect();

        Self { column: spec.column.clone(), entries }
    }

    pub fn get(&self, value: &str) -> Option<&BreakdownEntry> {
        self.entries.iter().find(|e| e.value == value)
    }
}

fn percentage(count: usize, total: usize) -> f64 {
    if total == 0 { return 0.0 }
    (10_000.0 * count as f64 / total as f64).round() / 100.0
}
