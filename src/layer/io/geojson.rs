use std::path::Path;

use anyhow::{Context, Result};
use serde_json::json;

use crate::geo::FeatureCollection;
use crate::io::{fs::write_atomic, geojson::write_feature_collection};
use crate::layer::ChoroplethLayer;

/// Property holding a feature's style object in exported GeoJSON.
pub const STYLE_PROPERTY: &str = "style";
/// Property holding a feature's popup HTML in exported GeoJSON.
pub const POPUP_PROPERTY: &str = "popup";

impl ChoroplethLayer {
    /// Export the joined features with each feature's style and popup HTML baked into its
    /// properties, so any web map can render the layer without calling back into Rust.
    pub fn to_geojson(&self) -> Result<FeatureCollection> {
        self.features().iter()
            .map(|feature| {
                let style = serde_json::to_value(self.style(feature))
                    .context("[layer::to_geojson] Failed to serialize style")?;
                let popup = self.popup(feature);
                let mut feature = feature.clone();
                feature.set_property(STYLE_PROPERTY, style);
                feature.set_property(POPUP_PROPERTY, popup);
                Ok(feature)
            })
            .collect()
    }

    pub fn to_geojson_string(&self) -> Result<String> {
        write_feature_collection(&self.to_geojson()?)
    }

    /// Write the exported GeoJSON to `path` (write-then-rename).
    pub fn write_geojson(&self, path: &Path, force: bool) -> Result<()> {
        let text = self.to_geojson_string()?;
        write_atomic(path, text.as_bytes(), force)
            .with_context(|| format!("[layer::write_geojson] {}", path.display()))
    }

    /// Legend entries for discrete layers, as a JSON array of `{ label, color }`.
    pub fn legend_json(&self) -> serde_json::Value {
        self.classifier().legend().into_iter()
            .map(|(label, color)| json!({ "label": label, "color": color }))
            .collect()
    }
}
