use anyhow::Result;

use b3clf::classifier::ArtifactStore;
use b3clf::config::Settings;
use b3clf::{InputKind, ModelKey, PipelineConfig};

use crate::cli::PredictArgs;

use super::{build_descriptor_timeout, build_geometry_config, build_layout};

pub fn build_pipeline_config(args: &PredictArgs, settings: &Settings) -> Result<PipelineConfig> {
    let layout = build_layout(&args.input);
    let mut config = PipelineConfig::new(&args.input.input);
    config.input_kind = if args.features {
        InputKind::Features
    } else {
        InputKind::Molecules
    };
    config.output = Some(args.output.clone());
    config.key = ModelKey::new(args.algorithm, args.resampling);
    config.policy = args.threshold;
    config.artifacts = match &args.artifacts {
        Some(dir) => ArtifactStore::new(dir),
        None => settings.artifact_store(),
    };
    config.geometry = build_geometry_config(&args.geometry, layout, settings)?;
    config.descriptor_timeout = build_descriptor_timeout(&args.descriptors, settings)?;
    config.keep_sdf = args.keep_sdf;
    config.keep_features = args.keep_features;
    config.with_status = args.with_status;
    Ok(config)
}
