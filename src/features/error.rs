use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] crate::io::Error),

    #[error("table has no '{0}' column")]
    MissingIndexColumn(String),

    #[error("column '{column}' row {row} ('{id}'): '{value}' is not a number")]
    NonNumeric {
        column: String,
        row: usize,
        id: String,
        value: String,
    },

    #[error("row '{id}' has {found} values but the table has {expected} columns")]
    RowWidth {
        id: String,
        expected: usize,
        found: usize,
    },

    #[error("scaler has no statistics for column '{0}'")]
    UnknownColumn(String),

    #[error("failed to read scaler '{path}': {source}")]
    ScalerRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid scaler '{path}': {source}")]
    ScalerParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("scaler is inconsistent: {0}")]
    ScalerShape(String),
}

impl Error {
    pub fn non_numeric(column: &str, row: usize, id: &str, value: &str) -> Self {
        Self::NonNumeric {
            column: column.to_string(),
            row,
            id: id.to_string(),
            value: value.to_string(),
        }
    }
}
