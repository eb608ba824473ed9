//! Settings file (`b3clf.toml`).
//!
//! ```toml
//! [artifacts]
//! dir = "/opt/b3clf/artifacts"
//!
//! [descriptors]
//! java = "/usr/bin/java"
//! jar = "/opt/padel/PaDEL-Descriptor.jar"
//! threads = 4
//!
//! [geometry]
//! force_field = "MMFF94s"
//! max_iterations = 10000
//! seed = 999
//! ```
//!
//! Every key is optional. Command-line flags take precedence over the file
//! and the file over built-in defaults. The artifact directory defaults to
//! `$B3CLF_ARTIFACTS`, then `./artifacts`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::classifier::ArtifactStore;
use crate::descriptors::{CommandTool, DescriptorTool, PadelTool};
use crate::geometry::GeometryConfig;

/// File looked up in the working directory when no path is given.
pub const DEFAULT_FILE: &str = "b3clf.toml";

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read settings '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse settings '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid setting '{key}': {details}")]
    Invalid { key: String, details: String },
}

impl Error {
    fn invalid(key: &str, details: impl ToString) -> Self {
        Error::Invalid {
            key: key.to_string(),
            details: details.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub artifacts: ArtifactSettings,
    pub descriptors: DescriptorSettings,
    pub geometry: GeometrySettings,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ArtifactSettings {
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DescriptorSettings {
    pub java: Option<PathBuf>,
    pub jar: Option<PathBuf>,
    pub threads: Option<i32>,
    /// Replaces PaDEL with a command template using `{input}` and `{output}`.
    pub command: Option<String>,
    pub timeout_secs: Option<f64>,
    pub max_runtime_per_molecule_secs: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeometrySettings {
    pub force_field: Option<String>,
    pub max_iterations: Option<usize>,
    pub seed: Option<u64>,
    pub tool: Option<String>,
}

fn seconds(key: &str, value: Option<f64>) -> Result<Option<Duration>, Error> {
    value
        .map(|s| Duration::try_from_secs_f64(s).map_err(|e| Error::invalid(key, e)))
        .transpose()
}

impl Settings {
    pub fn from_toml(text: &str, origin: &Path) -> Result<Self, Error> {
        toml::from_str(text).map_err(|source| Error::Parse {
            path: origin.to_path_buf(),
            source,
        })
    }

    pub fn load(path: &Path) -> Result<Self, Error> {
        let text = std::fs::read_to_string(path).map_err(|source| Error::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::from_toml(&text, path)?;
        debug!(path = %path.display(), "loaded settings");
        Ok(settings)
    }

    /// Loads `path`, or [`DEFAULT_FILE`] if present, or nothing.
    pub fn discover(path: Option<&Path>) -> Result<Self, Error> {
        match path {
            Some(path) => Self::load(path),
            None if Path::new(DEFAULT_FILE).is_file() => Self::load(Path::new(DEFAULT_FILE)),
            None => Ok(Self::default()),
        }
    }

    pub fn artifact_store(&self) -> ArtifactStore {
        match &self.artifacts.dir {
            Some(dir) => ArtifactStore::new(dir),
            None => ArtifactStore::from_env(),
        }
    }

    /// Geometry settings over [`GeometryConfig::default`].
    pub fn geometry_config(&self) -> Result<GeometryConfig, Error> {
        let mut config = GeometryConfig::default();
        let g = &self.geometry;
        if let Some(name) = &g.force_field {
            config.force_field = name
                .parse()
                .map_err(|e: String| Error::invalid("geometry.force_field", e))?;
        }
        if let Some(tool) = &g.tool {
            config.tool = tool
                .parse()
                .map_err(|e: String| Error::invalid("geometry.tool", e))?;
        }
        if let Some(n) = g.max_iterations {
            if n == 0 {
                return Err(Error::invalid("geometry.max_iterations", "must be positive"));
            }
            config.max_iterations = n;
        }
        if let Some(seed) = g.seed {
            config.seed = seed;
        }
        Ok(config)
    }

    pub fn padel_tool(&self) -> Result<PadelTool, Error> {
        let d = &self.descriptors;
        let mut tool = PadelTool::default();
        if let Some(java) = &d.java {
            tool.java = java.clone();
        }
        if let Some(jar) = &d.jar {
            tool.jar = jar.clone();
        }
        if let Some(threads) = d.threads {
            tool.threads = threads;
        }
        tool.max_runtime_per_molecule = seconds(
            "descriptors.max_runtime_per_molecule_secs",
            d.max_runtime_per_molecule_secs,
        )?;
        Ok(tool)
    }

    /// The configured command template, or PaDEL.
    pub fn descriptor_tool(&self) -> Result<Box<dyn DescriptorTool>, Error> {
        match &self.descriptors.command {
            Some(template) => Ok(Box::new(
                CommandTool::parse(template).map_err(|e| Error::invalid("descriptors.command", e))?,
            )),
            None => Ok(Box::new(self.padel_tool()?)),
        }
    }

    pub fn descriptor_timeout(&self) -> Result<Option<Duration>, Error> {
        seconds("descriptors.timeout_secs", self.descriptors.timeout_secs)
    }
}
