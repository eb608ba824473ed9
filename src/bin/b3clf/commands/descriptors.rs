use anyhow::{Context, Result, bail};

use b3clf::config::Settings;
use b3clf::descriptors::{self, DescriptorOptions};
use b3clf::io::Format;

use crate::cli::DescriptorArgs;
use crate::config::{build_descriptor_timeout, build_descriptor_tool};
use crate::display::{
    Context as DisplayContext, Progress, print_descriptor_summary, print_status_breakdown,
};

const TOTAL_STEPS: u8 = 1;

pub fn run_descriptors(args: DescriptorArgs, settings: &Settings, ctx: DisplayContext) -> Result<()> {
    if !args.input.is_file() {
        bail!("Input file '{}' does not exist", args.input.display());
    }
    Format::table_from_path(&args.output)?;

    let tool = build_descriptor_tool(&args.descriptors, settings)?;
    let options = DescriptorOptions {
        timeout: build_descriptor_timeout(&args.descriptors, settings)?,
        output: Some(args.output.clone()),
    };

    let mut progress = Progress::new(ctx.interactive, TOTAL_STEPS);

    progress.step("Computing descriptors");
    let outcome = descriptors::compute_descriptors(&args.input, tool.as_ref(), &options)
        .context("Descriptor calculation failed")?;

    let mut substeps = vec![format!("Run {}", tool.name())];
    if let Some(timeout) = options.timeout {
        substeps.push(format!("Deadline {:.1}s", timeout.as_secs_f64()));
    }
    substeps.push(format!("Write {}", args.output.display()));
    progress.complete_step("Computing descriptors", &substeps);

    progress.finish(&format!("{} row(s) written", outcome.table.row_count()));

    if ctx.interactive {
        print_descriptor_summary(&outcome);
        print_status_breakdown(outcome.statuses.iter().map(|(_, s)| s));
    }

    Ok(())
}
