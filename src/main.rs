//! Dispersion - refraction and chromatic dispersion demo viewer.

use std::path::PathBuf;

use clap::Parser;
use dispersion::asset::{DEFAULT_MESH_NAME, DEFAULT_MODEL_PATH};
use dispersion::viewer::{self, Settings};

#[derive(Parser, Debug)]
#[command(name = "dispersion", version, about = "Refractive mesh with chromatic dispersion")]
struct Args {
    /// glTF/GLB file holding the dispersive mesh (defaults to the last opened model)
    model: Option<PathBuf>,

    /// Node or mesh name to display
    #[arg(long, default_value = DEFAULT_MESH_NAME)]
    mesh: String,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

impl Args {
    fn log_level(&self) -> &'static str {
        match (self.quiet, self.verbose) {
            (true, _) => "error",
            (false, 0) => "info",
            (false, 1) => "debug",
            (false, _) => "trace",
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let level = args.log_level();

    let model = args
        .model
        .or_else(|| Settings::load().last_model)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_MODEL_PATH));

    viewer::run(model, args.mesh, level)
}
