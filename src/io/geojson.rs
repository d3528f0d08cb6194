//! GeoJSON reading and writing operations.

use anyhow::{Context, Result};

use crate::geo::FeatureCollection;

/// Parse a GeoJSON FeatureCollection from bytes.
pub fn read_feature_collection(bytes: &[u8]) -> Result<FeatureCollection> {
    serde_json::from_slice(bytes)
        .context("[io::geojson::read] Failed to parse GeoJSON FeatureCollection")
}

/// Serialize a FeatureCollection to compact GeoJSON text.
pub fn write_feature_collection(collection: &FeatureCollection) -> Result<String> {
    serde_json::to_string(collection)
        .context("[io::geojson::write] Failed to serialize GeoJSON FeatureCollection")
}
