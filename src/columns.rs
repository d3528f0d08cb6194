use crate::record::{RowRecord, normalize_header};

/// Which row fields a layer shows.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ColumnSelection {
    /// Every column of the first row in a group.
    #[default]
    All,
    /// Exactly these columns, in this order.
    Explicit(Vec<String>),
}

impl ColumnSelection {
    /// An empty list means all columns; `show_all` overrides any list.
    /// Names are normalized like CSV headers, so "Client Name" selects `client_name`.
    pub fn from_config(columns: &[String], show_all: bool) -> Self {
        if show_all || columns.is_empty() {
            Self::All
        } else {
            Self::Explicit(columns.iter().map(|c| normalize_header(c)).collect())
        }
    }

    /// Resolve the column names to use for `rows`.
    pub fn resolve<'a>(&'a self, rows: &'a [RowRecord]) -> Vec<&'a str> {
        match self {
            Self::Explicit(columns) if !columns.is_empty() => columns.iter().map(String::as_str).collect(),
            _ => rows.first().map(|row| row.columns().collect()).unwrap_or_default(),
        }
    }
}
