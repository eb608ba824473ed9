use super::Format;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O operation failed: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    #[error("failed to parse {format} data: {details} (at line ~{line})")]
    Parse {
        format: Format,
        line: usize,
        details: String,
    },

    #[error("invalid SMILES '{smiles}': {details} (at position {position})")]
    Smiles {
        smiles: String,
        position: usize,
        details: String,
    },

    #[error("unsupported file extension for '{path}': {details}")]
    UnsupportedFormat { path: String, details: String },

    #[error("column {index} requested but the row has only {available} column(s)")]
    ColumnOutOfRange { index: usize, available: usize },

    #[error("delimited table error: {0}")]
    Table(#[from] csv::Error),
}

impl Error {
    pub fn parse(format: Format, line: usize, details: impl Into<String>) -> Self {
        Self::Parse {
            format,
            line,
            details: details.into(),
        }
    }

    pub fn smiles(smiles: &str, position: usize, details: impl Into<String>) -> Self {
        Self::Smiles {
            smiles: smiles.to_string(),
            position,
            details: details.into(),
        }
    }

    pub fn unsupported(path: &std::path::Path, details: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            path: path.display().to_string(),
            details: details.into(),
        }
    }
}
