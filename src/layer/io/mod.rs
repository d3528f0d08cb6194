//! Layer export: GeoJSON with baked styles and popups, and the per-key count summary.

mod csv;
mod geojson;

pub use geojson::{POPUP_PROPERTY, STYLE_PROPERTY};
