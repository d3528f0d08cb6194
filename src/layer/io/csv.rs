use std::path::Path;

use ahash::AHashSet;
use anyhow::Result;
use polars::{frame::DataFrame, prelude::NamedFrom, series::Series};

use crate::io::csv::{write_csv, write_csv_string};
use crate::layer::ChoroplethLayer;

impl ChoroplethLayer {
    /// Per-key row counts as a three-column DataFrame (`key`, `count`, `matched`), in first-seen
    /// key order. Keys without a boundary are included with `matched = false`.
    pub fn summary_frame(&self) -> Result<DataFrame> {
        let joined: AHashSet<String> = self.features().iter().filter_map(|f| self.key_of(f)).collect();

        let (keys, counts) = self.aggregates().iter()
            .map(|agg| (agg.key().to_string(), agg.count() as u32))
            .unzip::<_, _, Vec<_>, Vec<_>>();
        let matched: Vec<bool> = keys.iter().map(|key| joined.contains(key)).collect();

        Ok(DataFrame::new(vec![
            Series::new("key".into(), keys).into(),
            Series::new("count".into(), counts).into(),
            Series::new("matched".into(), matched).into(),
        ])?)
    }

    /// Write the per-key summary to a CSV file.
    pub fn write_summary(&self, path: &Path, force: bool) -> Result<()> {
        write_csv(&mut self.summary_frame()?, path, force)
    }

    /// The per-key summary as CSV text.
    pub fn summary_csv(&self) -> Result<String> {
        write_csv_string(&mut self.summary_frame()?)
    }
}
