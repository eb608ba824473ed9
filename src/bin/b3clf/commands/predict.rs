use anyhow::{Context, Result, bail};

use b3clf::config::Settings;
use b3clf::io::Format;
use b3clf::pipeline::{self, PipelineConfig, PipelineReport};
use b3clf::{DescriptorTool, InputKind};

use crate::cli::PredictArgs;
use crate::config::{build_descriptor_tool, build_pipeline_config};
use crate::display::{
    Context as DisplayContext, Progress, print_predictions, print_run_summary,
    print_status_breakdown,
};

const TOTAL_STEPS: u8 = 2;

pub fn run_predict(args: PredictArgs, settings: &Settings, ctx: DisplayContext) -> Result<()> {
    if !args.input.input.is_file() {
        bail!("Input file '{}' does not exist", args.input.input.display());
    }

    let config = build_pipeline_config(&args, settings)?;
    let tool = build_descriptor_tool(&args.descriptors, settings)?;

    let mut progress = Progress::new(ctx.interactive, TOTAL_STEPS);

    progress.step("Checking inputs");
    let input_format = match config.input_kind {
        InputKind::Molecules => Format::molecules_from_path(&config.input)?,
        InputKind::Features => Format::table_from_path(&config.input)?,
    };
    progress.complete_step(
        "Checking inputs",
        &[
            format!("Input: {} ({input_format})", config.input.display()),
            format!("Artifacts: {}", config.artifacts.dir().display()),
        ],
    );

    progress.step("Classifying molecules");
    let report = pipeline::run(&config, tool.as_ref()).context("Prediction failed")?;
    progress.complete_step(
        "Classifying molecules",
        &build_run_substeps(&config, tool.as_ref(), &report),
    );

    progress.finish(&format!("{} prediction(s)", report.predictions.len()));

    if ctx.interactive {
        print_run_summary(&report, config.key, config.policy);
        print_status_breakdown(report.molecules.iter().map(|m| &m.status));
    }
    if args.print {
        print_predictions(&report);
    }

    Ok(())
}

fn build_run_substeps(
    config: &PipelineConfig,
    tool: &dyn DescriptorTool,
    report: &PipelineReport,
) -> Vec<String> {
    let mut steps = Vec::new();

    if config.input_kind == InputKind::Molecules {
        steps.push(format!(
            "Embed and minimize ({}, seed {}, {} iterations)",
            config.geometry.force_field, config.geometry.seed, config.geometry.max_iterations
        ));
        steps.push(format!("Compute descriptors ({})", tool.name()));
    } else {
        steps.push("Read descriptor table".to_string());
    }

    if report.missing_descriptors.is_empty() {
        steps.push("Select and scale descriptors".to_string());
    } else {
        steps.push(format!(
            "Select and scale descriptors ({} absent)",
            report.missing_descriptors.len()
        ));
    }
    steps.push(format!(
        "Classify with {} (cutoff {:.3}, policy {})",
        config.key, report.cutoff, config.policy
    ));

    if let Some(output) = &config.output {
        steps.push(format!("Write {}", output.display()));
    }
    for path in &report.kept {
        steps.push(format!("Keep {}", path.display()));
    }

    steps
}
