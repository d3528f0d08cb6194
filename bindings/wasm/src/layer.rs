use choromap_core::{ChoroplethLayer, LayerConfig, io::geojson::read_feature_collection};
use wasm_bindgen::{JsValue, prelude::wasm_bindgen};

use crate::common::*;

#[wasm_bindgen]
pub struct WasmLayer {
    inner: ChoroplethLayer,
}

#[wasm_bindgen]
impl WasmLayer {
    /// Build a layer from in-memory inputs:
    /// boundaries: GeoJSON FeatureCollection text, csv: CSV text, config: layer config JSON
    /// (same fields as one entry of a map config's `layers`).
    #[wasm_bindgen(constructor)]
    pub fn new(boundaries: &str, csv: &str, config: &str) -> Result<WasmLayer, JsValue> {
        let config: LayerConfig = serde_json::from_str(config).map_err(js_err)?;
        let boundaries = read_feature_collection(boundaries.as_bytes()).map_err(js_err)?;
        let inner = ChoroplethLayer::build(&config, &boundaries, csv).map_err(js_err)?;
        Ok(WasmLayer { inner })
    }

    pub fn name(&self) -> String { self.inner.name().to_string() }

    /// Style object for the feature with `key` (Leaflet path options).
    pub fn style(&self, key: &str) -> Result<JsValue, JsValue> {
        to_js(&self.inner.style_for_key(key))
    }

    /// Popup HTML for the feature with `key`, or undefined when there is none.
    pub fn popup(&self, key: &str) -> Option<String> {
        self.inner.popup_for_key(key)
    }

    /// Number of rows aggregated under `key`.
    pub fn count(&self, key: &str) -> usize {
        self.inner.aggregates().count(key)
    }

    /// Joined features with `style` and `popup` properties, as a GeoJSON object.
    #[wasm_bindgen(js_name = "to_geojson")]
    pub fn to_geojson(&self) -> Result<JsValue, JsValue> {
        let fc = self.inner.to_geojson().map_err(js_err)?;
        to_js(&fc)
    }

    /// `[{ label, color }]` for discrete layers, empty otherwise.
    pub fn legend(&self) -> Result<JsValue, JsValue> {
        to_js(&self.inner.legend_json())
    }

    /// Per-key counts as CSV text.
    pub fn summary_csv(&self) -> Result<String, JsValue> {
        self.inner.summary_csv().map_err(js_err)
    }

    /// Rows skipped while reading the CSV, as "line N: message" strings.
    pub fn diagnostics(&self) -> Vec<String> {
        self.inner.diagnostics().iter().map(ToString::to_string).collect()
    }
}
