//! Layers: configuration, building and export.

mod config;
mod io;
#[allow(clippy::module_inception)]
mod layer;
mod set;

pub use config::{ClassifierConfig, ConfigError, DEFAULT_KEY_PROPERTY, LayerConfig, LayerKind, MapConfig};
pub use io::{POPUP_PROPERTY, STYLE_PROPERTY};
pub use layer::ChoroplethLayer;
pub use set::LayerSet;
