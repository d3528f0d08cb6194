#![doc = "Choromap public API: CSV records joined to ZIP boundaries and styled as choropleth layers"]
mod aggregate;
mod columns;
mod geo;
mod layer;
mod popup;
mod record;
mod style;

pub mod io;

#[doc(inline)]
pub use record::{RowRecord, ZIPCODE, normalize_header};

#[doc(inline)]
pub use columns::ColumnSelection;

#[doc(inline)]
pub use aggregate::{Aggregates, Aggregator, Breakdown, BreakdownEntry, BreakdownSpec, KeyedAggregate, NOT_PROVIDED};

#[doc(inline)]
pub use geo::{BoundaryFeature, COUNT_PROPERTY, FeatureCollection, ROWS_PROPERTY, join_aggregates, merge_first_row};

#[doc(inline)]
pub use style::{Bucket, BucketTable, Classifier, GREEN_BREAKS, GREEN_PALETTE, Rgb, Rgba, StyleDescriptor};

#[doc(inline)]
pub use popup::{PopupBuilder, escape, properties_popup};

#[doc(inline)]
pub use layer::{
    ChoroplethLayer, ClassifierConfig, ConfigError, DEFAULT_KEY_PROPERTY, LayerConfig, LayerKind, LayerSet,
    MapConfig, POPUP_PROPERTY, STYLE_PROPERTY,
};

#[doc(inline)]
pub use io::csv::{CsvRows, IngestError, RowDiagnostic, read_rows, read_rows_with_delimiter};

#[doc(inline)]
pub use io::source::{DataSource, DefaultSource, DiskSource, MemSource};

#[cfg(feature = "download")]
#[doc(inline)]
pub use io::source::HttpSource;
