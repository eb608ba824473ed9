use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Features(#[from] crate::features::Error),

    #[error("unsupported algorithm '{0}' (expected one of dtree, knn, logreg, xgb)")]
    UnsupportedAlgorithm(String),

    #[error(
        "unsupported resampling strategy '{0}' (expected one of common, classic_RandUndersampling, \
         classic_SMOTE, borderline_SMOTE, kmeans_SMOTE, classic_ADASYN)"
    )]
    UnsupportedResampling(String),

    #[error("unsupported threshold policy '{0}' (expected none, J or F)")]
    UnsupportedPolicy(String),

    #[error("failed to read artifact '{path}': {source}")]
    ArtifactRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse artifact '{path}': {source}")]
    ArtifactParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The artifact parsed but its arrays are inconsistent.
    #[error("invalid classifier artifact: {0}")]
    InvalidArtifact(String),

    /// The feature table lacks columns the classifier was trained on.
    #[error("feature table lacks {} classifier input(s): {}", .0.len(), .0.join(", "))]
    MissingFeatures(Vec<String>),

    #[error("no {policy} threshold for '{key}'")]
    MissingThreshold { key: String, policy: String },

    #[error("threshold {0} lies outside [0, 1]")]
    InvalidThreshold(f64),

    /// Feature and info tables disagree on row identity.
    #[error("row {row} is '{features}' in the feature table but '{info}' in the info table")]
    IndexMismatch {
        row: usize,
        features: String,
        info: String,
    },

    #[error("feature table has {features} rows but info table has {info}")]
    RowCountMismatch { features: usize, info: usize },
}

impl Error {
    pub(crate) fn invalid(details: impl Into<String>) -> Self {
        Error::InvalidArtifact(details.into())
    }
}
