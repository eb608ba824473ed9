use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use tracing::{debug, info};

use super::error::Error;
use super::key::ModelKey;
use super::model::ClassifierArtifact;
use super::threshold::ThresholdTable;
use crate::features::StandardScaler;

pub const SCALER_FILE: &str = "b3db_scaler.json";
pub const THRESHOLDS_FILE: &str = "b3clf_thresholds.json";

/// Environment variable that overrides the default artifact directory.
pub const ARTIFACTS_ENV: &str = "B3CLF_ARTIFACTS";

/// Directory of read-only model artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `$B3CLF_ARTIFACTS` if set, otherwise `./artifacts`.
    pub fn from_env() -> Self {
        let dir = std::env::var_os(ARTIFACTS_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("artifacts"));
        Self::new(dir)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn classifier_path(&self, key: ModelKey) -> PathBuf {
        self.dir.join(key.file_name())
    }

    pub fn load_classifier(&self, key: ModelKey) -> Result<ClassifierArtifact, Error> {
        let path = self.classifier_path(key);
        let artifact: ClassifierArtifact = read_json(&path)?;
        artifact.validate()?;
        info!(
            %key,
            features = artifact.feature_names.len(),
            "loaded classifier"
        );
        Ok(artifact)
    }

    pub fn load_scaler(&self) -> Result<StandardScaler, Error> {
        Ok(StandardScaler::load(&self.dir.join(SCALER_FILE))?)
    }

    /// Reads the threshold table; a store without one uses a 0.5 default
    /// cutoff and no per-classifier entries.
    pub fn load_thresholds(&self) -> Result<ThresholdTable, Error> {
        let path = self.dir.join(THRESHOLDS_FILE);
        if !path.exists() {
            debug!(path = %path.display(), "no threshold table, using defaults");
            return Ok(ThresholdTable::default());
        }
        read_json(&path)
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, Error> {
    let text = fs::read_to_string(path).map_err(|source| Error::ArtifactRead {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| Error::ArtifactParse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::key::{Algorithm, Resampling};
    use crate::classifier::model::Model;
    use crate::classifier::threshold::ThresholdPolicy;

    #[test]
    fn loads_classifier_by_key() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("b3clf_logreg_common.json"),
            r#"{"feature_names": ["a"], "model": {"type": "logistic_regression", "coef": [1.0], "intercept": 0.0}}"#,
        )
        .unwrap();
        let store = ArtifactStore::new(dir.path());
        let key = ModelKey::new(Algorithm::LogisticRegression, Resampling::Common);
        assert_eq!(store.load_classifier(key).unwrap().feature_names, vec!["a"]);

        let absent = ModelKey::new(Algorithm::Knn, Resampling::Common);
        assert!(matches!(store.load_classifier(absent), Err(Error::ArtifactRead { .. })));
    }

    #[test]
    fn invalid_artifacts_are_rejected_on_load() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("b3clf_logreg_common.json"),
            r#"{"feature_names": ["a", "b"], "model": {"type": "logistic_regression", "coef": [1.0], "intercept": 0.0}}"#,
        )
        .unwrap();
        fs::write(dir.path().join("b3clf_knn_common.json"), "{not json").unwrap();
        let store = ArtifactStore::new(dir.path());
        assert!(matches!(
            store.load_classifier(ModelKey::new(Algorithm::LogisticRegression, Resampling::Common)),
            Err(Error::InvalidArtifact(_))
        ));
        assert!(matches!(
            store.load_classifier(ModelKey::new(Algorithm::Knn, Resampling::Common)),
            Err(Error::ArtifactParse { .. })
        ));
    }

    fn minimal_artifact(algorithm: Algorithm) -> &'static str {
        match algorithm {
            Algorithm::LogisticRegression => {
                r#"{"feature_names": ["a"], "model": {"type": "logistic_regression", "coef": [1.0], "intercept": 0.0}}"#
            }
            Algorithm::DecisionTree => {
                r#"{"feature_names": ["a"], "model": {"type": "decision_tree",
                    "children_left": [1, -1, -1], "children_right": [2, -1, -1],
                    "feature": [0, -2, -2], "threshold": [0.0, -2.0, -2.0],
                    "value": [[2.0, 2.0], [2.0, 0.0], [0.0, 2.0]]}}"#
            }
            Algorithm::Knn => {
                r#"{"feature_names": ["a"], "model": {"type": "knn", "n_neighbors": 1,
                    "samples": [[0.0], [1.0]], "labels": [0, 1]}}"#
            }
            Algorithm::GradientBoosting => {
                r#"{"feature_names": ["a"], "model": {"type": "gradient_boosting", "trees": [{
                    "children_left": [-1], "children_right": [-1], "feature": [-2],
                    "threshold": [-2.0], "leaf_value": [0.5]}]}}"#
            }
        }
    }

    #[test]
    fn every_supported_pair_loads() {
        let dir = tempfile::tempdir().unwrap();
        for key in ModelKey::all() {
            fs::write(dir.path().join(key.file_name()), minimal_artifact(key.algorithm)).unwrap();
        }
        let store = ArtifactStore::new(dir.path());

        let mut loaded = 0;
        for key in ModelKey::all() {
            let artifact = store
                .load_classifier(key)
                .unwrap_or_else(|e| panic!("{key}: {e}"));
            let matches_algorithm = matches!(
                (key.algorithm, &artifact.model),
                (Algorithm::LogisticRegression, Model::LogisticRegression(_))
                    | (Algorithm::DecisionTree, Model::DecisionTree(_))
                    | (Algorithm::Knn, Model::Knn(_))
                    | (Algorithm::GradientBoosting, Model::GradientBoosting(_))
            );
            assert!(matches_algorithm, "{key} loaded the wrong model kind");
            assert!((0.0..=1.0).contains(&artifact.predict_proba(&[0.5])));
            loaded += 1;
        }
        assert_eq!(loaded, 24);
    }

    #[test]
    fn missing_threshold_table_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        let table = store.load_thresholds().unwrap();
        assert_eq!(table.cutoff(ThresholdPolicy::None, ModelKey::default()).unwrap(), 0.5);
        assert!(store.load_scaler().is_err());
    }
}
