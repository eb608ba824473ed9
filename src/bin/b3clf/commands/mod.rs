mod descriptors;
mod geometry;
mod predict;

use descriptors::run_descriptors;
use geometry::run_geometry;
use predict::run_predict;

use anyhow::Result;

use b3clf::config::Settings;

use crate::cli::{Cli, Command};
use crate::display::Context;

pub fn dispatch(cli: Cli, ctx: Context) -> Result<()> {
    let settings = Settings::discover(cli.global.config.as_deref())?;
    match cli.command {
        Command::Predict(args) => run_predict(args, &settings, ctx),
        Command::Geometry(args) => run_geometry(args, &settings, ctx),
        Command::Descriptors(args) => run_descriptors(args, &settings, ctx),
    }
}
