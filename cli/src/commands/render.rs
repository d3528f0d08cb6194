use anyhow::Result;

use crate::cli::{Cli, OutputArgs};

pub fn run(_cli: &Cli, args: &OutputArgs) -> Result<()> {
    let set = super::load_layers(args)?;
    super::write_each(args, set, ".geojson", |layer, path, force| layer.write_geojson(path, force))
}
