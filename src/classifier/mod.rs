//! Pre-trained BBB permeability classifiers and decision thresholds.
//!
//! A classifier is chosen by an [`Algorithm`] and the [`Resampling`]
//! strategy it was trained with. Both are closed enumerations, so an
//! unsupported name fails while parsing, before any artifact is opened.

mod error;
mod key;
mod model;
mod store;
mod threshold;

use tracing::debug;

use crate::features::{FeatureTable, InfoTable};

pub use error::Error;
pub use key::{Algorithm, ModelKey, Resampling};
pub use model::{
    BoostedTree, ClassifierArtifact, DecisionTree, GradientBoosting, Knn, LogisticRegression,
    Model, Weights,
};
pub use store::{ARTIFACTS_ENV, ArtifactStore, SCALER_FILE, THRESHOLDS_FILE};
pub use threshold::{ThresholdEntry, ThresholdPolicy, ThresholdTable, label};

/// One classified molecule.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub id: String,
    pub smiles: Option<String>,
    /// Probability of crossing the barrier, in [0, 1].
    pub probability: f64,
    pub label: u8,
}

/// Classifies every row of `features`.
///
/// `features` and `info` must share the same index in the same order; a
/// disagreement means an upstream stage is broken and fails before any
/// row is predicted.
pub fn predict_permeability(
    model: &ClassifierArtifact,
    features: &FeatureTable,
    info: &InfoTable,
    cutoff: f64,
) -> Result<Vec<Prediction>, Error> {
    if features.row_count() != info.row_count() {
        return Err(Error::RowCountMismatch {
            features: features.row_count(),
            info: info.row_count(),
        });
    }
    if let Some((row, (f, i))) = features
        .index
        .iter()
        .zip(&info.index)
        .enumerate()
        .find(|(_, (f, i))| f != i)
    {
        return Err(Error::IndexMismatch {
            row,
            features: f.clone(),
            info: i.clone(),
        });
    }

    let positions = model.align(features)?;
    let mut aligned = vec![0.0; positions.len()];
    let predictions = features
        .index
        .iter()
        .zip(&features.values)
        .enumerate()
        .map(|(r, (id, values))| {
            for (slot, &p) in aligned.iter_mut().zip(&positions) {
                *slot = values[p];
            }
            let probability = model.predict_proba(&aligned);
            let smiles = info
                .get(r, "SMILES")
                .filter(|s| !s.is_empty())
                .map(str::to_string);
            debug!(%id, probability, "classified");
            Prediction {
                id: id.clone(),
                smiles,
                probability,
                label: label(probability, cutoff),
            }
        })
        .collect();
    Ok(predictions)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> ClassifierArtifact {
        ClassifierArtifact {
            feature_names: vec!["x".into()],
            model: Model::LogisticRegression(LogisticRegression {
                coef: vec![1.0],
                intercept: 0.0,
            }),
        }
    }

    fn tables() -> (FeatureTable, InfoTable) {
        let mut features = FeatureTable::new(vec!["y".into(), "x".into()]);
        features.push_row("m1", vec![9.0, 2.0]).unwrap();
        features.push_row("m2", vec![9.0, -2.0]).unwrap();
        let mut info = InfoTable::from_index(features.index.clone());
        info.set(0, "SMILES", "CCO");
        (features, info)
    }

    #[test]
    fn predicts_each_row_in_order() {
        let (features, info) = tables();
        let predictions = predict_permeability(&model(), &features, &info, 0.5).unwrap();
        assert_eq!(predictions.len(), 2);
        assert_eq!(predictions[0].id, "m1");
        assert_eq!(predictions[0].smiles.as_deref(), Some("CCO"));
        assert_eq!(predictions[0].label, 1);
        assert_eq!(predictions[1].smiles, None);
        assert_eq!(predictions[1].label, 0);
        assert!((predictions[0].probability + predictions[1].probability - 1.0).abs() < 1e-12);
    }

    #[test]
    fn mismatched_index_fails_before_predicting() {
        let (features, mut info) = tables();
        info.index.swap(0, 1);
        match predict_permeability(&model(), &features, &info, 0.5) {
            Err(Error::IndexMismatch { row: 0, features, info }) => {
                assert_eq!(features, "m1");
                assert_eq!(info, "m2");
            }
            other => panic!("unexpected: {other:?}"),
        }

        let short = InfoTable::from_index(vec!["m1".into()]);
        assert!(matches!(
            predict_permeability(&model(), &features, &short, 0.5),
            Err(Error::RowCountMismatch { .. })
        ));
    }

    #[test]
    fn missing_inputs_are_named() {
        let (features, info) = tables();
        let mut wide = model();
        wide.feature_names.push("z".into());
        if let Model::LogisticRegression(lr) = &mut wide.model {
            lr.coef.push(0.0);
        }
        assert!(matches!(
            predict_permeability(&wide, &features, &info, 0.5),
            Err(Error::MissingFeatures(names)) if names == vec!["z".to_string()]
        ));
    }
}
