use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::aggregate::{Aggregates, Aggregator, BreakdownSpec, KeyedAggregate};
use crate::geo::{BoundaryFeature, FeatureCollection, join_aggregates, merge_first_row};
use crate::io::{csv::{RowDiagnostic, read_rows_with_delimiter}, geojson::read_feature_collection, source::DataSource};
use crate::popup::{PopupBuilder, properties_popup};
use crate::record::normalize_header;
use crate::style::{Classifier, StyleDescriptor};
use super::config::{LayerConfig, LayerKind};

/// One built map layer: the joined boundaries plus everything needed to style them and
/// build their popups.
#[derive(Debug, Clone)]
pub struct ChoroplethLayer {
    name: String,
    kind: LayerKind,
    key_property: String,
    trusted_html: bool,
    aggregates: Aggregates,
    features: FeatureCollection,
    classifier: Classifier,
    popup: PopupBuilder,
    diagnostics: Vec<RowDiagnostic>,
}

impl ChoroplethLayer {
    /// Build a layer from already-loaded boundaries and CSV text.
    pub fn build(config: &LayerConfig, boundaries: &FeatureCollection, csv_text: &str) -> Result<Self> {
        config.validate()?;

        let csv = read_rows_with_delimiter(csv_text, config.delimiter as u8)
            .with_context(|| format!("[layer::build] Failed to read {}", config.data_source))?;

        // Config names refer to CSV columns, which are matched after header normalization.
        let aggregates = Aggregator::new(normalize_header(&config.key_field))
            .with_breakdown(config.breakdown.as_ref().map(BreakdownSpec::normalized))
            .aggregate(csv.rows);

        let columns = config.column_selection();
        let features = match config.kind {
            LayerKind::Choropleth => join_aggregates(boundaries, &aggregates, &config.key_property, &columns),
            LayerKind::Records => merge_first_row(boundaries, &aggregates, &config.key_property),
        };

        let popup = PopupBuilder::new(columns)
            .key_label(&config.key_label)
            .detail_table(config.detail_table)
            .trusted_html(config.trusted_html);

        info!(
            "[layer::build] {}: {} rows, {} keys, {} features ({} rows skipped)",
            config.name, aggregates.total(), aggregates.len(), features.len(), csv.diagnostics.len()
        );

        Ok(Self {
            name: config.name.clone(),
            kind: config.kind,
            key_property: config.key_property.clone(),
            trusted_html: config.trusted_html,
            aggregates,
            features,
            classifier: config.build_classifier(),
            popup,
            diagnostics: csv.diagnostics,
        })
    }

    /// Load the boundary file and the layer's CSV from `source` concurrently, then build.
    pub fn load(config: &LayerConfig, source: &dyn DataSource, boundary_source: &str) -> Result<Self> {
        debug!("[layer::load] {}: {} + {}", config.name, boundary_source, config.data_source);
        let (boundaries, csv_text) = rayon::join(
            || source.fetch(boundary_source).and_then(|bytes| read_feature_collection(&bytes)),
            || source.fetch_text(&config.data_source),
        );
        let boundaries = boundaries
            .with_context(|| format!("[layer::load] {}: boundary file {boundary_source}", config.name))?;
        let csv_text = csv_text
            .with_context(|| format!("[layer::load] {}: data file {}", config.name, config.data_source))?;
        Self::build(config, &boundaries, &csv_text)
    }

    pub fn name(&self) -> &str { &self.name }

    pub fn kind(&self) -> LayerKind { self.kind }

    /// The joined boundaries (inner join with the CSV keys).
    pub fn features(&self) -> &FeatureCollection { &self.features }

    pub fn aggregates(&self) -> &Aggregates { &self.aggregates }

    pub fn classifier(&self) -> &Classifier { &self.classifier }

    /// Rows skipped while reading the CSV.
    pub fn diagnostics(&self) -> &[RowDiagnostic] { &self.diagnostics }

    /// The key of `feature`, if it has one.
    pub fn key_of(&self, feature: &BoundaryFeature) -> Option<String> {
        feature.key(&self.key_property)
    }

    /// Aggregate for `key`, if any rows had it.
    pub fn aggregate(&self, key: &str) -> Option<&KeyedAggregate> { self.aggregates.get(key) }

    /// Style hook for the map renderer.
    pub fn style(&self, feature: &BoundaryFeature) -> StyleDescriptor {
        let count = self.key_of(feature).map_or(0, |key| self.aggregates.count(&key));
        self.classifier.classify(count as f64)
    }

    pub fn style_for_key(&self, key: &str) -> StyleDescriptor {
        self.classifier.classify(self.aggregates.count(key) as f64)
    }

    /// Popup hook for the map renderer; built fresh on every call.
    pub fn popup(&self, feature: &BoundaryFeature) -> String {
        match self.kind {
            LayerKind::Records => properties_popup(feature, self.trusted_html),
            LayerKind::Choropleth => {
                let key = self.key_of(feature).unwrap_or_default();
                self.popup.render(&key, self.aggregates.get(&key))
            }
        }
    }

    pub fn popup_for_key(&self, key: &str) -> Option<String> {
        match self.kind {
            LayerKind::Records => self.features.iter()
                .find(|f| self.key_of(f).as_deref() == Some(key))
                .map(|f| properties_popup(f, self.trusted_html)),
            LayerKind::Choropleth => Some(self.popup.render(key, self.aggregates.get(key))),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{Map, Value, json};

    use super::*;
    use crate::io::source::MemSource;
    use crate::layer::ClassifierConfig;

    const BOUNDARIES: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            { "type": "Feature", "geometry": null, "properties": { "ZCTA5CE20": "60601" } },
            { "type": "Feature", "geometry": null, "properties": { "ZCTA5CE20": "60602" } },
            { "type": "Feature", "geometry": null, "properties": { "ZCTA5CE20": "60603" } }
        ]
    }"#;

    const TICKETS: &str = "Ticket ID,Zip Code,Client Name\n1,60601,Ann\n2,60602,Bo\n3,60601,Cy\n4,,Di\n5,99999,Ed\n";

    fn boundaries() -> FeatureCollection {
        read_feature_collection(BOUNDARIES.as_bytes()).unwrap()
    }

    #[test]
    fn build_joins_and_styles() {
        let layer = ChoroplethLayer::build(&LayerConfig::new("tickets", "t.csv"), &boundaries(), TICKETS).unwrap();
        assert_eq!(layer.features().len(), 2);
        assert_eq!(layer.aggregates().total(), 4);
        assert_eq!(layer.aggregates().dropped(), 1);

        let f = &layer.features().features[0];
        assert_eq!(layer.style(f).fill_color, "rgba(27, 120, 55, 1)");
        let g = &layer.features().features[1];
        assert_eq!(layer.style(g).fill_color, "rgba(27, 120, 55, 0.5)");
        assert_eq!(layer.style_for_key("60603").fill_color, "rgba(27, 120, 55, 0)");
    }

    #[test]
    fn popup_for_feature() {
        let mut config = LayerConfig::new("tickets", "t.csv");
        config.columns_to_display = vec!["client_name".into()];
        let layer = ChoroplethLayer::build(&config, &boundaries(), TICKETS).unwrap();
        let popup = layer.popup(&layer.features().features[0]);
        assert!(popup.contains("<strong>Zip Code:</strong> 60601"));
        assert!(popup.contains("<strong>Count:</strong> 2"));
        assert!(popup.contains("<tr><th>client_name</th></tr>"));
        assert!(popup.contains("<tr><td>Ann</td></tr><tr><td>Cy</td></tr>"));
    }

    #[test]
    fn discrete_layer_uses_green_ramp() {
        let mut config = LayerConfig::new("tickets", "t.csv");
        config.classifier = ClassifierConfig::Discrete;
        let layer = ChoroplethLayer::build(&config, &boundaries(), TICKETS).unwrap();
        assert_eq!(layer.style_for_key("60601").fill_color, "#e5f5e0");
        assert_eq!(layer.style_for_key("60602").fill_color, "#f7fcf5");
        assert!(layer.style_for_key("60603").is_hidden());
    }

    #[test]
    fn records_layer_merges_first_row() {
        let mut config = LayerConfig::new("records", "t.csv");
        config.kind = LayerKind::Records;
        let layer = ChoroplethLayer::build(&config, &boundaries(), TICKETS).unwrap();
        let f = &layer.features().features[0];
        assert_eq!(f.properties["client_name"], "Ann");
        assert_eq!(layer.style(f), StyleDescriptor::records());
        assert!(layer.popup(f).contains("<p><strong>client_name: </strong>Ann</p>"));
        assert!(layer.popup_for_key("60603").is_none());
    }

    #[test]
    fn malformed_rows_are_reported_not_fatal() {
        let csv = "zipcode,name\n60601,Ann\n60601,Cy\n60602,\"broken\n";
        let layer = ChoroplethLayer::build(&LayerConfig::new("t", "t.csv"), &boundaries(), csv).unwrap();
        assert_eq!(layer.diagnostics().len(), 1);
        assert_eq!(layer.aggregates().count("60601"), 2);
        assert_eq!(layer.features().len(), 1);
    }

    #[test]
    fn configured_column_names_match_normalized_headers() {
        let mut config = LayerConfig::new("t", "t.csv");
        config.key_field = "Zip Code".into();
        config.columns_to_display = vec!["Client Name".into()];
        config.breakdown = Some(BreakdownSpec::new("Client Name"));
        let layer = ChoroplethLayer::build(&config, &boundaries(), TICKETS).unwrap();
        assert_eq!(layer.aggregates().count("60601"), 2);
        let breakdown = layer.aggregate("60601").unwrap().breakdown().unwrap();
        assert_eq!(breakdown.get("Ann").unwrap().count, 1);
        let popup = layer.popup_for_key("60601").unwrap();
        assert!(popup.contains("<tr><td>Ann</td></tr><tr><td>Cy</td></tr>"));
    }

    #[test]
    fn short_rows_still_count() {
        let csv = "zipcode,name,note\n60601,Ann\n60602,Bo,x\n";
        let layer = ChoroplethLayer::build(&LayerConfig::new("t", "t.csv"), &boundaries(), csv).unwrap();
        assert!(layer.diagnostics().is_empty());
        assert_eq!(layer.aggregates().total(), 2);
        assert_eq!(layer.features().len(), 2);
    }

    #[test]
    fn configured_delimiter_is_used() {
        let mut config = LayerConfig::new("t", "t.csv");
        config.delimiter = ';';
        let layer = ChoroplethLayer::build(&config, &boundaries(), "Zip Code;Name\n60601;Ann\n").unwrap();
        assert_eq!(layer.aggregates().count("60601"), 1);
    }

    #[test]
    fn load_reads_both_sources() {
        let source = MemSource::new()
            .with_file("zips.geojson", BOUNDARIES)
            .with_file("t.csv", TICKETS);
        let layer = ChoroplethLayer::load(&LayerConfig::new("t", "t.csv"), &source, "zips.geojson").unwrap();
        assert_eq!(layer.features().len(), 2);

        let err = ChoroplethLayer::load(&LayerConfig::new("t", "missing.csv"), &source, "zips.geojson");
        assert!(err.is_err());
    }

    #[test]
    fn feature_without_key_gets_zero_count_style() {
        let layer = ChoroplethLayer::build(&LayerConfig::new("t", "t.csv"), &boundaries(), TICKETS).unwrap();
        let orphan = BoundaryFeature::new(Value::Null, Map::new());
        assert_eq!(layer.style(&orphan), layer.style_for_key("no-such-key"));
        let mut numeric = Map::new();
        numeric.insert("ZCTA5CE20".into(), json!(60601));
        assert_eq!(layer.key_of(&BoundaryFeature::new(Value::Null, numeric)).as_deref(), Some("60601"));
    }
}
