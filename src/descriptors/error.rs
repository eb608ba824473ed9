use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] crate::io::Error),

    #[error(transparent)]
    Features(#[from] crate::features::Error),

    /// The tool process could not be started.
    #[error("failed to launch {tool}: {source}")]
    Launch {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    /// The tool exited unsuccessfully.
    #[error("{tool} exited with {status}: {stderr}")]
    ToolFailed {
        tool: String,
        status: String,
        stderr: String,
    },

    /// The whole-run deadline passed and the tool was killed.
    #[error("{tool} did not finish within {seconds:.0} s")]
    ToolTimedOut { tool: String, seconds: f64 },

    #[error("{tool} produced no output at '{path}'")]
    MissingOutput { tool: String, path: PathBuf },

    /// Tool rows cannot be matched to SD records by position.
    #[error("descriptor tool returned {found} rows for {expected} molecules")]
    RowCountMismatch { expected: usize, found: usize },

    #[error("invalid command template '{template}': {details}")]
    InvalidTemplate { template: String, details: String },
}
