mod descriptors;
mod geometry;
mod predict;

pub use descriptors::{build_descriptor_tool, build_descriptor_timeout};
pub use geometry::{build_geometry_config, build_layout};
pub use predict::build_pipeline_config;
