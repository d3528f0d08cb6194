//! IO module for format-specific reading and writing operations.
//!
//! - `csv` - CSV ingestion of row records and CSV export of per-key summaries
//! - `geojson` - GeoJSON boundary file reading and writing
//! - `source` - where input files come from (disk, memory, HTTP)
//! - `fs` - atomic output writes

pub mod csv;
pub mod fs;
pub mod geojson;
pub mod source;
