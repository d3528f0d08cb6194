use std::path::Path;

use ahash::AHashSet;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::aggregate::BreakdownSpec;
use crate::columns::ColumnSelection;
use crate::record::ZIPCODE;
use crate::style::{Classifier, Rgb};

/// Boundary property holding the ZIP code (2020 ZCTA).
pub const DEFAULT_KEY_PROPERTY: &str = "ZCTA5CE20";

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("layer name must not be empty")]
    EmptyName,

    #[error("duplicate layer name {0:?}")]
    DuplicateName(String),

    #[error("layer {0:?}: data_source must not be empty")]
    EmptySource(String),

    #[error("layer {layer:?}: divisor must be a positive number, got {divisor}")]
    BadDivisor { layer: String, divisor: f64 },

    #[error("layer {layer:?}: delimiter must be an ASCII character other than a quote, got {delimiter:?}")]
    BadDelimiter { layer: String, delimiter: char },
}

/// How a layer turns rows into a rendered feature set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerKind {
    /// Rows aggregated per key, colored by count, popup with tables.
    #[default]
    Choropleth,
    /// First row per key merged onto the boundary, fixed style, popup lists properties.
    Records,
}

/// How counts become colors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum ClassifierConfig {
    /// Base color with opacity `count / divisor`.
    Continuous {
        #[serde(default = "default_divisor")]
        divisor: f64,
    },
    /// The fixed 8-bucket green ramp.
    Discrete,
}

impl Default for ClassifierConfig {
    fn default() -> Self { Self::Continuous { divisor: default_divisor() } }
}

fn default_divisor() -> f64 { 2.0 }

fn default_base_color() -> Rgb { Rgb::new(27, 120, 55) }

fn default_key_field() -> String { ZIPCODE.into() }

fn default_key_property() -> String { DEFAULT_KEY_PROPERTY.into() }

fn default_key_label() -> String { "Zip Code".into() }

fn default_true() -> bool { true }

fn default_delimiter() -> char { ',' }

/// Configuration for one layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerConfig {
    pub name: String,
    /// CSV file reference (path relative to the config file, or URL).
    pub data_source: String,
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
    /// Columns shown per row; empty means all columns.
    #[serde(default)]
    pub columns_to_display: Vec<String>,
    #[serde(default = "default_base_color")]
    pub base_color: Rgb,
    /// Show every column even if `columns_to_display` is set.
    #[serde(default)]
    pub show_all_columns: bool,
    #[serde(default)]
    pub kind: LayerKind,
    #[serde(default)]
    pub classifier: ClassifierConfig,
    #[serde(default)]
    pub breakdown: Option<BreakdownSpec>,
    #[serde(default = "default_true")]
    pub detail_table: bool,
    /// Embed CSV values in popups without HTML escaping.
    #[serde(default)]
    pub trusted_html: bool,
    /// CSV column (after header normalization) holding the key.
    #[serde(default = "default_key_field")]
    pub key_field: String,
    /// Boundary property holding the key.
    #[serde(default = "default_key_property")]
    pub key_property: String,
    #[serde(default = "default_key_label")]
    pub key_label: String,
}

impl LayerConfig {
    /// A choropleth layer over `data_source` with all defaults.
    pub fn new(name: impl Into<String>, data_source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_source: data_source.into(),
            delimiter: default_delimiter(),
            columns_to_display: Vec::new(),
            base_color: default_base_color(),
            show_all_columns: false,
            kind: LayerKind::default(),
            classifier: ClassifierConfig::default(),
            breakdown: None,
            detail_table: true,
            trusted_html: false,
            key_field: default_key_field(),
            key_property: default_key_property(),
            key_label: default_key_label(),
        }
    }

    pub fn column_selection(&self) -> ColumnSelection {
        ColumnSelection::from_config(&self.columns_to_display, self.show_all_columns)
    }

    /// The classifier this layer styles features with.
    pub fn build_classifier(&self) -> Classifier {
        match self.kind {
            LayerKind::Records => Classifier::Fixed(crate::style::StyleDescriptor::records()),
            LayerKind::Choropleth => match self.classifier {
                ClassifierConfig::Continuous { divisor } => Classifier::continuous(self.base_color, divisor),
                ClassifierConfig::Discrete => Classifier::green_ramp(),
            },
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::EmptyName);
        }
        if self.data_source.trim().is_empty() {
            return Err(ConfigError::EmptySource(self.name.clone()));
        }
        if !self.delimiter.is_ascii() || self.delimiter == '"' {
            return Err(ConfigError::BadDelimiter { layer: self.name.clone(), delimiter: self.delimiter });
        }
        if let ClassifierConfig::Continuous { divisor } = self.classifier {
            if !(divisor.is_finite() && divisor > 0.0) {
                return Err(ConfigError::BadDivisor { layer: self.name.clone(), divisor });
            }
        }
        Ok(())
    }
}

/// A map: one boundary file and the layers drawn over it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapConfig {
    /// GeoJSON boundary file reference (path relative to the config file, or URL).
    pub boundary_source: String,
    pub layers: Vec<LayerConfig>,
}

impl MapConfig {
    pub fn from_json(text: &str) -> Result<Self> {
        let config: MapConfig = serde_json::from_str(text)
            .context("[layer::config] Failed to parse map config")?;
        config.validate()?;
        Ok(config)
    }

    pub fn read(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("[layer::config] Failed to read {}", path.display()))?;
        Self::from_json(&text)
            .with_context(|| format!("[layer::config] Invalid config {}", path.display()))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = AHashSet::new();
        for layer in &self.layers {
            layer.validate()?;
            if !seen.insert(layer.name.as_str()) {
                return Err(ConfigError::DuplicateName(layer.name.clone()));
            }
        }
        Ok(())
    }
}
