use anyhow::{Context, Result, bail};

use b3clf::config::Settings;
use b3clf::geometry;

use crate::cli::GeometryArgs;
use crate::config::{build_geometry_config, build_layout};
use crate::display::{
    Context as DisplayContext, Progress, print_geometry_summary, print_status_breakdown,
};

const TOTAL_STEPS: u8 = 1;

pub fn run_geometry(args: GeometryArgs, settings: &Settings, ctx: DisplayContext) -> Result<()> {
    if !args.input.input.is_file() {
        bail!("Input file '{}' does not exist", args.input.input.display());
    }

    let layout = build_layout(&args.input);
    let config = build_geometry_config(&args.geometry, layout, settings)?;

    let mut progress = Progress::new(ctx.interactive, TOTAL_STEPS);

    progress.step("Generating 3D geometries");
    let report = geometry::optimize_file(&args.input.input, &args.output, &config)
        .context("Geometry generation failed")?;

    let mut substeps = vec![
        format!("Embed conformers (seed {})", config.seed),
        format!(
            "Minimize with {} ({} iterations)",
            config.force_field, config.max_iterations
        ),
    ];
    if report.alternate_force_field > 0 {
        substeps.push(format!(
            "Fell back to {} for {} molecule(s)",
            config.force_field.alternate(),
            report.alternate_force_field
        ));
    }
    substeps.push(format!("Write {}", args.output.display()));
    progress.complete_step("Generating 3D geometries", &substeps);

    progress.finish(&format!("{} structure(s) written", report.written));

    if ctx.interactive {
        print_geometry_summary(&report);
        print_status_breakdown(report.records.iter().map(|r| &r.status));
    }

    Ok(())
}
