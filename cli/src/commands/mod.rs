pub mod render;
pub mod summary;

use std::path::{Path, PathBuf};

use anyhow::Result;
use choromap::{ChoroplethLayer, DefaultSource, LayerSet, MapConfig, io::fs::ensure_dir_exists};
use tracing::info;

use crate::cli::OutputArgs;

/// Load the config and every layer, with sources resolved against the config file's directory.
pub(crate) fn load_layers(args: &OutputArgs) -> Result<LayerSet> {
    let config = MapConfig::read(&args.config)?;
    let root = args.config.parent().map(Path::to_path_buf).unwrap_or_default();
    info!("[choromap] {} layers from {}", config.layers.len(), args.config.display());
    Ok(LayerSet::load(&config, &DefaultSource::new(root)))
}

/// Output file for `layer`: its name with path separators replaced, plus `suffix`.
pub(crate) fn output_path(out_dir: &Path, layer: &ChoroplethLayer, suffix: &str) -> PathBuf {
    let stem: String = layer.name().chars()
        .map(|c| if c == '/' || c == '\\' { '_' } else { c })
        .collect();
    out_dir.join(format!("{stem}{suffix}"))
}

/// Write each built layer with `write`, then fail if any layer could not be built.
pub(crate) fn write_each(
    args: &OutputArgs,
    set: LayerSet,
    suffix: &str,
    write: impl Fn(&ChoroplethLayer, &Path, bool) -> Result<()>,
) -> Result<()> {
    let out_dir = args.output.clone().unwrap_or(".".into());
    ensure_dir_exists(&out_dir)?;
    for layer in set.layers() {
        let path = output_path(&out_dir, layer, suffix);
        write(layer, &path, args.force)?;
        info!("[choromap] wrote {}", path.display());
    }
    set.into_result().map(|_| ())
}
