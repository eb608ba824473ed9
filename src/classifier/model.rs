use serde::{Deserialize, Serialize};

use super::error::Error;
use crate::features::FeatureTable;

/// A pre-trained classifier exported as JSON.
///
/// `feature_names` fixes the input order; tree `feature` indices and
/// coefficient positions refer to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierArtifact {
    pub feature_names: Vec<String>,
    pub model: Model,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Model {
    LogisticRegression(LogisticRegression),
    DecisionTree(DecisionTree),
    Knn(Knn),
    GradientBoosting(GradientBoosting),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegression {
    pub coef: Vec<f64>,
    pub intercept: f64,
}

/// scikit-learn tree arrays; a node is a leaf when `children_left` is -1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    /// Per-node class weights `[non-permeable, permeable]`.
    pub value: Vec<[f64; 2]>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Weights {
    #[default]
    Uniform,
    Distance,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Knn {
    pub n_neighbors: usize,
    /// Minkowski exponent.
    #[serde(default = "default_minkowski_p")]
    pub p: f64,
    #[serde(default)]
    pub weights: Weights,
    pub samples: Vec<Vec<f64>>,
    pub labels: Vec<u8>,
}

fn default_minkowski_p() -> f64 {
    2.0
}

/// One regression tree of a boosted ensemble.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoostedTree {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    pub leaf_value: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientBoosting {
    #[serde(default)]
    pub base_margin: f64,
    pub trees: Vec<BoostedTree>,
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Walks tree arrays from the root; `go_left` decides each split.
fn find_leaf(
    left: &[i64],
    right: &[i64],
    feature: &[i64],
    threshold: &[f64],
    row: &[f64],
    go_left: impl Fn(f64, f64) -> bool,
) -> usize {
    let mut node = 0usize;
    while left[node] >= 0 {
        let x = row[feature[node] as usize];
        node = if go_left(x, threshold[node]) {
            left[node] as usize
        } else {
            right[node] as usize
        };
    }
    node
}

fn check_tree(
    what: &str,
    left: &[i64],
    right: &[i64],
    feature: &[i64],
    threshold: &[f64],
    leaf_len: usize,
    n_features: usize,
) -> Result<(), Error> {
    let nodes = left.len();
    if nodes == 0 {
        return Err(Error::invalid(format!("{what} has no nodes")));
    }
    if [right.len(), feature.len(), threshold.len(), leaf_len]
        .iter()
        .any(|&n| n != nodes)
    {
        return Err(Error::invalid(format!("{what} arrays differ in length")));
    }
    for node in 0..nodes {
        if left[node] < 0 {
            continue;
        }
        // Children must point forward so traversal terminates.
        for child in [left[node], right[node]] {
            if child <= node as i64 || child as usize >= nodes {
                return Err(Error::invalid(format!(
                    "{what} node {node} has invalid child {child}"
                )));
            }
        }
        if feature[node] < 0 || feature[node] as usize >= n_features {
            return Err(Error::invalid(format!(
                "{what} node {node} splits on feature {} of {n_features}",
                feature[node]
            )));
        }
    }
    Ok(())
}

impl DecisionTree {
    fn probability(&self, row: &[f64]) -> f64 {
        let leaf = find_leaf(
            &self.children_left,
            &self.children_right,
            &self.feature,
            &self.threshold,
            row,
            |x, t| x <= t,
        );
        let [negative, positive] = self.value[leaf];
        let total = negative + positive;
        if total > 0.0 { positive / total } else { 0.0 }
    }
}

impl Knn {
    fn probability(&self, row: &[f64]) -> f64 {
        let mut distances: Vec<(f64, u8)> = self
            .samples
            .iter()
            .zip(&self.labels)
            .map(|(sample, &label)| (minkowski(sample, row, self.p), label))
            .collect();
        distances.sort_by(|a, b| a.0.total_cmp(&b.0));
        let neighbours = &distances[..self.n_neighbors.min(distances.len())];

        match self.weights {
            Weights::Uniform => {
                let positive = neighbours.iter().filter(|(_, l)| *l == 1).count();
                positive as f64 / neighbours.len() as f64
            }
            Weights::Distance => {
                // Exact matches take all the weight.
                let exact: Vec<_> = neighbours.iter().filter(|(d, _)| *d == 0.0).collect();
                if !exact.is_empty() {
                    let positive = exact.iter().filter(|(_, l)| *l == 1).count();
                    return positive as f64 / exact.len() as f64;
                }
                let (positive, total) = neighbours.iter().fold((0.0, 0.0), |(p, t), (d, l)| {
                    let w = 1.0 / d;
                    (if *l == 1 { p + w } else { p }, t + w)
                });
                positive / total
            }
        }
    }
}

fn minkowski(a: &[f64], b: &[f64], p: f64) -> f64 {
    if p == 2.0 {
        return a.iter().zip(b).map(|(x, y)| (x - y).powi(2)).sum::<f64>().sqrt();
    }
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y).abs().powf(p))
        .sum::<f64>()
        .powf(1.0 / p)
}

impl GradientBoosting {
    fn probability(&self, row: &[f64]) -> f64 {
        let margin: f64 = self
            .trees
            .iter()
            .map(|tree| {
                let leaf = find_leaf(
                    &tree.children_left,
                    &tree.children_right,
                    &tree.feature,
                    &tree.threshold,
                    row,
                    |x, t| x < t,
                );
                tree.leaf_value[leaf]
            })
            .sum();
        sigmoid(self.base_margin + margin)
    }
}

impl ClassifierArtifact {
    /// Checks array shapes against `feature_names`.
    pub fn validate(&self) -> Result<(), Error> {
        let n = self.feature_names.len();
        if n == 0 {
            return Err(Error::invalid("artifact lists no features"));
        }
        match &self.model {
            Model::LogisticRegression(m) => {
                if m.coef.len() != n {
                    return Err(Error::invalid(format!(
                        "{} coefficients for {n} features",
                        m.coef.len()
                    )));
                }
            }
            Model::DecisionTree(m) => check_tree(
                "decision tree",
                &m.children_left,
                &m.children_right,
                &m.feature,
                &m.threshold,
                m.value.len(),
                n,
            )?,
            Model::Knn(m) => {
                if m.n_neighbors == 0 || m.samples.is_empty() {
                    return Err(Error::invalid("knn needs neighbours and samples"));
                }
                if m.samples.len() != m.labels.len() {
                    return Err(Error::invalid(format!(
                        "knn has {} samples but {} labels",
                        m.samples.len(),
                        m.labels.len()
                    )));
                }
                if m.samples.iter().any(|s| s.len() != n) {
                    return Err(Error::invalid("knn sample width differs from feature count"));
                }
                if let Some(label) = m.labels.iter().find(|&&l| l > 1) {
                    return Err(Error::invalid(format!(
                        "knn label {label} is not a class (0 or 1)"
                    )));
                }
                if !(m.p >= 1.0) {
                    return Err(Error::invalid(format!("knn Minkowski p = {}", m.p)));
                }
            }
            Model::GradientBoosting(m) => {
                for (i, tree) in m.trees.iter().enumerate() {
                    check_tree(
                        &format!("boosted tree {i}"),
                        &tree.children_left,
                        &tree.children_right,
                        &tree.feature,
                        &tree.threshold,
                        tree.leaf_value.len(),
                        n,
                    )?;
                }
            }
        }
        Ok(())
    }

    /// Probability of the permeable class for one row in `feature_names` order.
    pub fn predict_proba(&self, row: &[f64]) -> f64 {
        let p = match &self.model {
            Model::LogisticRegression(m) => {
                let score: f64 = m.coef.iter().zip(row).map(|(c, x)| c * x).sum();
                sigmoid(score + m.intercept)
            }
            Model::DecisionTree(m) => m.probability(row),
            Model::Knn(m) => m.probability(row),
            Model::GradientBoosting(m) => m.probability(row),
        };
        p.clamp(0.0, 1.0)
    }

    /// Positions of `feature_names` in `table`.
    pub fn align(&self, table: &FeatureTable) -> Result<Vec<usize>, Error> {
        let mut positions = Vec::with_capacity(self.feature_names.len());
        let mut missing = Vec::new();
        for name in &self.feature_names {
            match table.column_index(name) {
                Some(p) => positions.push(p),
                None => missing.push(name.clone()),
            }
        }
        if missing.is_empty() {
            Ok(positions)
        } else {
            Err(Error::MissingFeatures(missing))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn artifact(model: Model) -> ClassifierArtifact {
        ClassifierArtifact {
            feature_names: vec!["a".into(), "b".into()],
            model,
        }
    }

    fn stump() -> DecisionTree {
        DecisionTree {
            children_left: vec![1, -1, -1],
            children_right: vec![2, -1, -1],
            feature: vec![1, -2, -2],
            threshold: vec![0.5, -2.0, -2.0],
            value: vec![[5.0, 5.0], [4.0, 1.0], [1.0, 3.0]],
        }
    }

    #[test]
    fn logistic_regression_is_sigmoid_of_score() {
        let model = artifact(Model::LogisticRegression(LogisticRegression {
            coef: vec![1.0, -1.0],
            intercept: 0.0,
        }));
        assert!((model.predict_proba(&[2.0, 2.0]) - 0.5).abs() < 1e-12);
        assert!(model.predict_proba(&[10.0, 0.0]) > 0.99);
    }

    #[test]
    fn decision_tree_threshold_is_inclusive_on_the_left() {
        let model = artifact(Model::DecisionTree(stump()));
        model.validate().unwrap();
        assert!((model.predict_proba(&[0.0, 0.5]) - 0.2).abs() < 1e-12);
        assert!((model.predict_proba(&[0.0, 0.6]) - 0.75).abs() < 1e-12);
    }

    #[test]
    fn boosted_threshold_is_strict_on_the_left() {
        let tree = BoostedTree {
            children_left: vec![1, -1, -1],
            children_right: vec![2, -1, -1],
            feature: vec![0, 0, 0],
            threshold: vec![1.0, 0.0, 0.0],
            leaf_value: vec![0.0, -2.0, 2.0],
        };
        let model = artifact(Model::GradientBoosting(GradientBoosting {
            base_margin: 0.0,
            trees: vec![tree.clone(), tree],
        }));
        model.validate().unwrap();
        assert!((model.predict_proba(&[1.0, 0.0]) - sigmoid(4.0)).abs() < 1e-12);
        assert!((model.predict_proba(&[0.9, 0.0]) - sigmoid(-4.0)).abs() < 1e-12);
    }

    #[test]
    fn knn_uniform_and_distance_weights() {
        let knn = Knn {
            n_neighbors: 3,
            p: 2.0,
            weights: Weights::Uniform,
            samples: vec![vec![0.0, 0.0], vec![1.0, 0.0], vec![3.0, 0.0], vec![10.0, 0.0]],
            labels: vec![1, 0, 1, 0],
        };
        let uniform = artifact(Model::Knn(knn.clone()));
        assert!((uniform.predict_proba(&[0.5, 0.0]) - 2.0 / 3.0).abs() < 1e-12);

        let distance = artifact(Model::Knn(Knn {
            weights: Weights::Distance,
            ..knn
        }));
        // Weights 2, 2 and 0.4 for labels 1, 0 and 1.
        assert!((distance.predict_proba(&[0.5, 0.0]) - 2.4 / 4.4).abs() < 1e-12);
        assert_eq!(distance.predict_proba(&[1.0, 0.0]), 0.0);
    }

    #[test]
    fn knn_labels_must_be_binary() {
        let knn = Knn {
            n_neighbors: 1,
            p: 2.0,
            weights: Weights::Uniform,
            samples: vec![vec![0.0, 0.0], vec![1.0, 0.0]],
            labels: vec![0, 1],
        };
        artifact(Model::Knn(knn.clone())).validate().unwrap();

        let stray = artifact(Model::Knn(Knn {
            labels: vec![0, 2],
            ..knn
        }));
        let err = stray.validate().unwrap_err();
        assert!(err.to_string().contains("label 2"), "{err}");
    }

    #[test]
    fn manhattan_distance() {
        assert_eq!(minkowski(&[0.0, 0.0], &[3.0, 4.0], 1.0), 7.0);
        assert_eq!(minkowski(&[0.0, 0.0], &[3.0, 4.0], 2.0), 5.0);
    }

    #[test]
    fn validation_catches_bad_shapes() {
        let mut tree = stump();
        tree.feature[0] = 7;
        assert!(artifact(Model::DecisionTree(tree)).validate().is_err());

        let mut cyclic = stump();
        cyclic.children_left[0] = 0;
        assert!(artifact(Model::DecisionTree(cyclic)).validate().is_err());

        let lr = artifact(Model::LogisticRegression(LogisticRegression {
            coef: vec![1.0],
            intercept: 0.0,
        }));
        assert!(lr.validate().is_err());
    }

    #[test]
    fn alignment_reports_every_missing_feature() {
        let model = artifact(Model::DecisionTree(stump()));
        let table = FeatureTable::new(vec!["b".into(), "x".into(), "a".into()]);
        assert_eq!(model.align(&table).unwrap(), vec![2, 0]);

        let partial = FeatureTable::new(vec!["x".into()]);
        match model.align(&partial) {
            Err(Error::MissingFeatures(names)) => assert_eq!(names, vec!["a", "b"]),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn json_is_tagged_by_type() {
        let text = r#"{
            "feature_names": ["a", "b"],
            "model": {"type": "logistic_regression", "coef": [0.5, 0.5], "intercept": -1.0}
        }"#;
        let parsed: ClassifierArtifact = serde_json::from_str(text).unwrap();
        assert!(matches!(parsed.model, Model::LogisticRegression(_)));

        let knn = r#"{"feature_names": ["a"], "model": {"type": "knn", "n_neighbors": 1,
            "samples": [[0.0]], "labels": [1]}}"#;
        let parsed: ClassifierArtifact = serde_json::from_str(knn).unwrap();
        match parsed.model {
            Model::Knn(k) => {
                assert_eq!(k.p, 2.0);
                assert_eq!(k.weights, Weights::Uniform);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }
}
