//! Error types for 3D structure generation.

use std::path::PathBuf;

use thiserror::Error;

use super::config::ForceFieldKind;
use crate::model::types::Element;

/// Errors that abort geometry generation for a whole file.
///
/// Problems confined to one molecule are reported through
/// [`MoleculeStatus`](crate::MoleculeStatus) instead.
#[derive(Debug, Error)]
pub enum Error {
    /// Reading the input or writing the SD output failed.
    #[error(transparent)]
    Io(#[from] crate::io::Error),

    /// The output file could not be created.
    #[error("cannot create '{path}': {source}")]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The embedded force field parameter table is malformed.
    #[error("failed to parse force field parameters: {0}")]
    ParameterParse(#[from] toml::de::Error),

    /// The selected optimization backend is recognized but not available.
    #[error("optimization tool '{0}' is not supported; use 'builtin'")]
    UnsupportedTool(String),

    /// No parameters exist for an element in the chosen force field.
    #[error("{force_field} has no parameters for element {element} (atom {atom})")]
    MissingParameter {
        force_field: ForceFieldKind,
        element: Element,
        atom: usize,
    },

    /// The molecule cannot be embedded.
    #[error("embedding failed: {0}")]
    Embedding(String),
}

impl Error {
    pub fn missing_parameter(force_field: ForceFieldKind, element: Element, atom: usize) -> Self {
        Self::MissingParameter {
            force_field,
            element,
            atom,
        }
    }

    pub fn embedding(details: impl Into<String>) -> Self {
        Self::Embedding(details.into())
    }
}
