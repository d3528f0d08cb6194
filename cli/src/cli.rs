use std::path::PathBuf;

/// Choropleth layer builder
#[derive(clap::Parser, Debug)]
#[command(name = "choromap", version, about, propagate_version = true)]
pub struct Cli {
    /// Increase output verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Build every layer and write `<layer>.geojson` with styles and popups baked in
    Render(OutputArgs),

    /// Build every layer and write per-key counts to `<layer>.counts.csv`
    Summary(OutputArgs),
}

#[derive(clap::Args, Debug)]
pub struct OutputArgs {
    /// Map config file (JSON); relative data sources resolve against its directory
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Output directory, defaults to "."
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub output: Option<PathBuf>,

    /// Overwrite existing output files
    #[arg(long)]
    pub force: bool,
}
