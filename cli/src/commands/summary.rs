use anyhow::Result;

use crate::cli::{Cli, OutputArgs};

pub fn run(_cli: &Cli, args: &OutputArgs) -> Result<()> {
    let set = super::load_layers(args)?;
    for layer in set.layers() {
        if !layer.diagnostics().is_empty() {
            tracing::warn!("[choromap] {}: {} rows skipped", layer.name(), layer.diagnostics().len());
        }
    }
    super::write_each(args, set, ".counts.csv", |layer, path, force| layer.write_summary(path, force))
}
