use thiserror::Error;

/// Failure of a pipeline stage.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] crate::io::Error),

    #[error("geometry optimization failed: {0}")]
    Geometry(#[from] crate::geometry::Error),

    #[error("descriptor computation failed: {0}")]
    Descriptors(#[from] crate::descriptors::Error),

    #[error("feature preparation failed: {0}")]
    Features(#[from] crate::features::Error),

    #[error("classification failed: {0}")]
    Classifier(#[from] crate::classifier::Error),
}
