use std::fmt;
use std::str::FromStr;

use super::error::Error;

/// Classifier family of a pre-trained artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Algorithm {
    DecisionTree,
    Knn,
    LogisticRegression,
    #[default]
    GradientBoosting,
}

impl Algorithm {
    pub const ALL: [Algorithm; 4] = [
        Algorithm::DecisionTree,
        Algorithm::Knn,
        Algorithm::LogisticRegression,
        Algorithm::GradientBoosting,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Algorithm::DecisionTree => "dtree",
            Algorithm::Knn => "knn",
            Algorithm::LogisticRegression => "logreg",
            Algorithm::GradientBoosting => "xgb",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Algorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "dtree" | "decision-tree" => Ok(Algorithm::DecisionTree),
            "knn" | "k-nearest-neighbors" => Ok(Algorithm::Knn),
            "logreg" | "logistic-regression" => Ok(Algorithm::LogisticRegression),
            "xgb" | "gradient-boosting" => Ok(Algorithm::GradientBoosting),
            _ => Err(Error::UnsupportedAlgorithm(s.to_string())),
        }
    }
}

/// Class rebalancing used when the artifact was trained.
///
/// Only selects which artifact to load; nothing is resampled at inference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Resampling {
    Common,
    ClassicRandUndersampling,
    ClassicSmote,
    BorderlineSmote,
    KmeansSmote,
    #[default]
    ClassicAdasyn,
}

impl Resampling {
    pub const ALL: [Resampling; 6] = [
        Resampling::Common,
        Resampling::ClassicRandUndersampling,
        Resampling::ClassicSmote,
        Resampling::BorderlineSmote,
        Resampling::KmeansSmote,
        Resampling::ClassicAdasyn,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Resampling::Common => "common",
            Resampling::ClassicRandUndersampling => "classic_RandUndersampling",
            Resampling::ClassicSmote => "classic_SMOTE",
            Resampling::BorderlineSmote => "borderline_SMOTE",
            Resampling::KmeansSmote => "kmeans_SMOTE",
            Resampling::ClassicAdasyn => "classic_ADASYN",
        }
    }
}

impl fmt::Display for Resampling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Resampling {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "common" | "none" => Ok(Resampling::Common),
            "classic_randundersampling" | "random_undersampling" => {
                Ok(Resampling::ClassicRandUndersampling)
            }
            "classic_smote" | "smote" => Ok(Resampling::ClassicSmote),
            "borderline_smote" => Ok(Resampling::BorderlineSmote),
            "kmeans_smote" | "k_means_smote" => Ok(Resampling::KmeansSmote),
            "classic_adasyn" | "adasyn" => Ok(Resampling::ClassicAdasyn),
            _ => Err(Error::UnsupportedResampling(s.to_string())),
        }
    }
}

/// Identifies one pre-trained classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ModelKey {
    pub algorithm: Algorithm,
    pub resampling: Resampling,
}

impl ModelKey {
    pub fn new(algorithm: Algorithm, resampling: Resampling) -> Self {
        Self {
            algorithm,
            resampling,
        }
    }

    /// Validates both names against the closed lists.
    pub fn parse(algorithm: &str, resampling: &str) -> Result<Self, Error> {
        Ok(Self::new(algorithm.parse()?, resampling.parse()?))
    }

    pub fn file_name(&self) -> String {
        format!("b3clf_{}.json", self)
    }

    /// Every supported pair.
    pub fn all() -> impl Iterator<Item = ModelKey> {
        Algorithm::ALL.into_iter().flat_map(|algorithm| {
            Resampling::ALL
                .into_iter()
                .map(move |resampling| ModelKey::new(algorithm, resampling))
        })
    }
}

impl fmt::Display for ModelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.algorithm, self.resampling)
    }
}
