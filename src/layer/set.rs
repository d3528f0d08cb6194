use anyhow::Result;
use tracing::{error, info};

use crate::io::source::DataSource;
use super::{ChoroplethLayer, config::MapConfig};

/// Every layer of a map, each built independently.
#[derive(Debug)]
pub struct LayerSet {
    layers: Vec<ChoroplethLayer>,
    failures: Vec<(String, anyhow::Error)>,
}

impl LayerSet {
    /// Load and build every layer in `config`. A layer that fails to load is logged and
    /// recorded in `failures()`; the remaining layers are still built.
    pub fn load(config: &MapConfig, source: &dyn DataSource) -> Self {
        let mut layers = Vec::with_capacity(config.layers.len());
        let mut failures = Vec::new();

        for layer_config in &config.layers {
            match ChoroplethLayer::load(layer_config, source, &config.boundary_source) {
                Ok(layer) => layers.push(layer),
                Err(e) => {
                    error!("[layer::set] {}: {e:#}", layer_config.name);
                    failures.push((layer_config.name.clone(), e));
                }
            }
        }

        info!("[layer::set] {} layers built, {} failed", layers.len(), failures.len());
        Self { layers, failures }
    }

    /// Successfully built layers, in config order.
    pub fn layers(&self) -> &[ChoroplethLayer] { &self.layers }

    pub fn get(&self, name: &str) -> Option<&ChoroplethLayer> {
        self.layers.iter().find(|layer| layer.name() == name)
    }

    /// `(layer name, error)` for each layer that could not be built.
    pub fn failures(&self) -> &[(String, anyhow::Error)] { &self.failures }

    pub fn is_complete(&self) -> bool { self.failures.is_empty() }

    /// Turn any layer failure into an error naming the failed layers.
    pub fn into_result(self) -> Result<Vec<ChoroplethLayer>> {
        if self.failures.is_empty() {
            return Ok(self.layers);
        }
        let names = self.failures.iter().map(|(name, _)| name.as_str()).collect::<Vec<_>>().join(", ");
        Err(anyhow::anyhow!("[layer::set] {} layer(s) failed: {names}", self.failures.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::source::MemSource;
    use crate::layer::LayerConfig;

    const BOUNDARIES: &str = r#"{"type":"FeatureCollection","features":[
        {"type":"Feature","geometry":null,"properties":{"ZCTA5CE20":"60601"}}
    ]}"#;

    fn config() -> MapConfig {
        MapConfig {
            boundary_source: "zips.geojson".into(),
            layers: vec![
                LayerConfig::new("help", "help.csv"),
                LayerConfig::new("missing", "missing.csv"),
                LayerConfig::new("outreach", "outreach.csv"),
            ],
        }
    }

    fn source() -> MemSource {
        MemSource::new()
            .with_file("zips.geojson", BOUNDARIES)
            .with_file("help.csv", "zipcode\n60601\n60601\n")
            .with_file("outreach.csv", "Zip Code\n60601\n")
    }

    #[test]
    fn failing_layer_does_not_block_others() {
        let set = LayerSet::load(&config(), &source());
        assert_eq!(set.layers().len(), 2);
        assert_eq!(set.failures().len(), 1);
        assert_eq!(set.failures()[0].0, "missing");
        assert!(!set.is_complete());
        assert_eq!(set.get("help").unwrap().aggregates().count("60601"), 2);
        assert_eq!(set.get("outreach").unwrap().aggregates().count("60601"), 1);
        assert!(set.get("missing").is_none());
    }

    #[test]
    fn into_result_names_failed_layers() {
        let err = LayerSet::load(&config(), &source()).into_result().unwrap_err();
        assert!(err.to_string().contains("missing"));

        let mut ok = config();
        ok.layers.remove(1);
        assert_eq!(LayerSet::load(&ok, &source()).into_result().unwrap().len(), 2);
    }

    #[test]
    fn missing_boundaries_fail_every_layer() {
        let source = MemSource::new().with_file("help.csv", "zipcode\n60601\n");
        let set = LayerSet::load(&config(), &source);
        assert!(set.layers().is_empty());
        assert_eq!(set.failures().len(), 3);
    }
}
