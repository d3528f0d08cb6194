//! CSV reading operations.

use std::{fmt, sync::Arc};

use csv::{ErrorKind, ReaderBuilder, StringRecord};
use thiserror::Error;
use tracing::{debug, warn};

use crate::record::{RowRecord, normalize_header};

/// Whole-file CSV failures. Row-level problems are reported as [`RowDiagnostic`]s instead.
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("CSV input has no header row")]
    MissingHeader,

    #[error("failed to read CSV header: {0}")]
    Header(#[from] csv::Error),
}

/// A data row that could not be parsed and was skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowDiagnostic {
    /// 1-based line on which the offending row starts.
    pub line: u64,
    pub message: String,
}

impl fmt::Display for RowDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

/// Result of reading one CSV file.
#[derive(Debug, Clone)]
pub struct CsvRows {
    pub header: Arc<[String]>,
    pub rows: Vec<RowRecord>,
    pub diagnostics: Vec<RowDiagnostic>,
}

/// Reads comma-delimited text with a header row into normalized row records.
pub fn read_rows(text: &str) -> Result<CsvRows, IngestError> {
    read_rows_with_delimiter(text, b',')
}

/// Reads delimited text with a header row into normalized row records.
///
/// Rows with too few fields are padded with empty values and rows with too many are truncated
/// to the header. Rows that cannot be parsed at all (invalid UTF-8, an unterminated quoted field)
/// are skipped and reported in [`CsvRows::diagnostics`]. Blank lines never produce a record.
pub fn read_rows_with_delimiter(text: &str, delimiter: u8) -> Result<CsvRows, IngestError> {
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let raw_header = reader.headers()?.clone();
    if raw_header.is_empty() {
        return Err(IngestError::MissingHeader);
    }
    let header: Arc<[String]> = raw_header.iter().map(normalize_header).collect::<Vec<_>>().into();

    let mut rows = Vec::new();
    let mut diagnostics = Vec::new();
    let mut last_start: Option<(usize, u64)> = None;

    for result in reader.records() {
        match result {
            Ok(record) => {
                last_start = record.position().map(|p| (p.byte() as usize, p.line()));
                if record.len() != header.len() {
                    debug!(
                        "[io::csv::read] line {}: expected {} fields, found {}",
                        last_start.map_or(0, |(_, line)| line), header.len(), record.len()
                    );
                }
                rows.push(to_row(&header, &record));
            }
            Err(e) => {
                last_start = None;
                let diagnostic = diagnostic_from_error(&e);
                warn!("[io::csv::read] skipping malformed row: {diagnostic}");
                diagnostics.push(diagnostic);
            }
        }
    }

    // An unterminated quoted field swallows the rest of the input, so only the final row can be
    // affected.
    if let Some((byte, line)) = last_start {
        if text.get(byte..).is_some_and(|raw| ends_inside_quoted_field(raw, delimiter)) {
            rows.pop();
            let diagnostic = RowDiagnostic { line, message: "unterminated quoted field".into() };
            warn!("[io::csv::read] skipping malformed row: {diagnostic}");
            diagnostics.push(diagnostic);
        }
    }

    debug!("[io::csv::read] read {} rows ({} skipped)", rows.len(), diagnostics.len());
    Ok(CsvRows { header, rows, diagnostics })
}

/// Pads or truncates to the header length.
fn to_row(header: &Arc<[String]>, record: &StringRecord) -> RowRecord {
    RowRecord::new(header.clone(), record.iter().map(str::to_string).collect())
}

fn diagnostic_from_error(e: &csv::Error) -> RowDiagnostic {
    let line = e.position().map(|p| p.line()).unwrap_or(0);
    let message = match e.kind() {
        ErrorKind::Utf8 { err, .. } => format!("invalid UTF-8 in field {}", err.field() + 1),
        _ => e.to_string(),
    };
    RowDiagnostic { line, message }
}

#[derive(Clone, Copy, PartialEq)]
enum QuoteState {
    FieldStart,
    Unquoted,
    Quoted,
    /// A `"` seen inside a quoted field: either a closing quote or the first half of `""`.
    QuoteInQuoted,
}

/// Whether `raw` ends while still inside a quoted field. Only a `"` at the start of a field
/// opens one; a `"` elsewhere in an unquoted field is literal text.
fn ends_inside_quoted_field(raw: &str, delimiter: u8) -> bool {
    use QuoteState::*;

    let mut state = FieldStart;
    for b in raw.bytes() {
        let boundary = b == delimiter || b == b'\n' || b == b'\r';
        state = match (state, b) {
            (Quoted, b'"') => QuoteInQuoted,
            (Quoted, _) => Quoted,
            (QuoteInQuoted, b'"') => Quoted,
            (FieldStart, b'"') => Quoted,
            (_, _) if boundary => FieldStart,
            _ => Unquoted,
        };
    }
    state == Quoted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_is_normalized() {
        let csv = read_rows("Zip Code,Client Name\n60601,Ann\n").unwrap();
        assert_eq!(&*csv.header, ["zipcode".to_string(), "client_name".to_string()]);
        assert_eq!(csv.rows[0].get("zipcode"), Some("60601"));
        assert_eq!(csv.rows[0].get("client_name"), Some("Ann"));
    }

    #[test]
    fn trailing_blank_line_adds_no_record() {
        let csv = read_rows("zipcode,x\n60601,1\n60602,2\n\n").unwrap();
        assert_eq!(csv.rows.len(), 2);
        assert!(csv.diagnostics.is_empty());
    }

    #[test]
    fn first_row_is_always_header() {
        let csv = read_rows("60601,1\n60602,2\n").unwrap();
        assert_eq!(&*csv.header, ["60601".to_string(), "1".to_string()]);
        assert_eq!(csv.rows.len(), 1);
    }

    #[test]
    fn empty_input_has_no_header() {
        assert!(matches!(read_rows(""), Err(IngestError::MissingHeader)));
    }

    #[test]
    fn ragged_rows_are_padded_or_truncated() {
        let csv = read_rows("zipcode,name,note\n60601,Ann\n60602,Bo,x\n60603,Cy,y,extra\n").unwrap();
        assert_eq!(csv.rows.len(), 3);
        assert!(csv.diagnostics.is_empty());
        assert_eq!(csv.rows[0].get("name"), Some("Ann"));
        assert_eq!(csv.rows[0].get("note"), Some(""));
        assert_eq!(csv.rows[2].len(), 3);
        assert_eq!(csv.rows[2].get("note"), Some("y"));
    }

    #[test]
    fn unterminated_quote_drops_only_the_final_row() {
        let csv = read_rows("zipcode,note\n60601,ok\n60602,\"broken\n60603,lost\n").unwrap();
        assert_eq!(csv.rows.len(), 1);
        assert_eq!(csv.rows[0].get("zipcode"), Some("60601"));
        assert_eq!(csv.diagnostics.len(), 1);
        assert_eq!(csv.diagnostics[0].message, "unterminated quoted field");
    }

    #[test]
    fn literal_quote_inside_field_is_kept_in_any_position() {
        let first = read_rows("zipcode,note\n60601,5\" screen\n60602,ok\n").unwrap();
        let last = read_rows("zipcode,note\n60602,ok\n60601,5\" screen\n").unwrap();
        for csv in [&first, &last] {
            assert_eq!(csv.rows.len(), 2);
            assert!(csv.diagnostics.is_empty());
        }
        assert_eq!(last.rows[1].get("note"), Some("5\" screen"));
    }

    #[test]
    fn closed_quoted_last_field_is_kept() {
        let csv = read_rows("zipcode,note\n60601,\"say \"\"hi\"\"\"").unwrap();
        assert_eq!(csv.rows.len(), 1);
        assert!(csv.diagnostics.is_empty());
    }

    #[test]
    fn quote_state_scanner() {
        assert!(ends_inside_quoted_field("60601,\"open\n60602,x\n", b','));
        assert!(ends_inside_quoted_field("\"a\"\"b", b','));
        assert!(!ends_inside_quoted_field("60601,5\" screen\n", b','));
        assert!(!ends_inside_quoted_field("60601,\"closed\"\n", b','));
        assert!(ends_inside_quoted_field("60601;\"open", b';'));
        assert!(!ends_inside_quoted_field("60601;a\"b", b';'));
    }

    #[test]
    fn quoted_fields_with_delimiters_are_kept() {
        let csv = read_rows("zipcode,note\n60601,\"a, \"\"quoted\"\" note\"\n").unwrap();
        assert_eq!(csv.rows[0].get("note"), Some("a, \"quoted\" note"));
        assert!(csv.diagnostics.is_empty());
    }

    #[test]
    fn custom_delimiter() {
        let csv = read_rows_with_delimiter("Zip Code|n\n60601|1\n", b'|').unwrap();
        assert_eq!(csv.rows[0].get("zipcode"), Some("60601"));
    }
}
