use anyhow::{Result, bail};

use b3clf::config::Settings;
use b3clf::geometry::GeometryConfig;
use b3clf::io::TextLayout;

use crate::cli::{GeometryOptions, InputOptions};

pub fn build_layout(opts: &InputOptions) -> TextLayout {
    TextLayout {
        separator: opts.separator,
        smiles_column: opts.smiles_col,
        name_column: opts.name_col,
    }
}

/// Flags over the settings file over built-in defaults.
pub fn build_geometry_config(
    opts: &GeometryOptions,
    layout: TextLayout,
    settings: &Settings,
) -> Result<GeometryConfig> {
    let mut config = settings.geometry_config()?;
    if let Some(ff) = opts.force_field {
        config.force_field = ff;
    }
    if let Some(n) = opts.max_iterations {
        if n == 0 {
            bail!("--max-iters must be positive");
        }
        config.max_iterations = n;
    }
    if let Some(seed) = opts.seed {
        config.seed = seed;
    }
    if let Some(tool) = &opts.tool {
        config.tool = tool.parse().map_err(anyhow::Error::msg)?;
    }
    config.layout = layout;
    Ok(config)
}
