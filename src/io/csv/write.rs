//! CSV writing operations.

use std::path::Path;

use anyhow::{Context, Result};
use polars::{frame::DataFrame, io::SerWriter, prelude::CsvWriter};

use crate::io::fs::{finalize_big_write, open_for_big_write};

/// Write a DataFrame to a CSV file, atomically replacing `path`.
pub(crate) fn write_csv(df: &mut DataFrame, path: &Path, force: bool) -> Result<()> {
    let mut pending = open_for_big_write(path, force)?;
    CsvWriter::new(&mut pending)
        .finish(df)
        .with_context(|| format!("[io::csv::write] Failed to write CSV to {:?}", path))?;
    finalize_big_write(pending)
}

/// Write a DataFrame to a CSV string.
pub(crate) fn write_csv_string(df: &mut DataFrame) -> Result<String> {
    let mut buffer = Vec::new();
    CsvWriter::new(&mut buffer)
        .finish(df)
        .with_context(|| "[io::csv::write] Failed to write CSV to string")?;
    String::from_utf8(buffer)
        .with_context(|| "[io::csv::write] CSV output is not valid UTF-8")
}
