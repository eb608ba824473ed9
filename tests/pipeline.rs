use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tempfile::TempDir;

use b3clf::classifier::{self, SCALER_FILE, THRESHOLDS_FILE};
use b3clf::descriptors::{self, DescriptorTool};
use b3clf::pipeline::{self, LABEL_COLUMN, PROBABILITY_COLUMN, STATUS_COLUMN};
use b3clf::{
    Algorithm, ArtifactStore, InputKind, ModelKey, MoleculeStatus, PipelineConfig, Resampling,
    ThresholdPolicy, io,
};

/// Emits one descriptor row per SD record; rows listed in `blank` lose
/// their `nAcid` value.
struct MockTool {
    blank: Vec<usize>,
    /// Rows to emit regardless of the input, to break the row contract.
    rows_override: Option<usize>,
}

impl MockTool {
    fn new() -> Self {
        Self {
            blank: Vec::new(),
            rows_override: None,
        }
    }
}

impl DescriptorTool for MockTool {
    fn name(&self) -> &str {
        "mock"
    }

    fn compute(
        &self,
        input_sdf: &Path,
        output_csv: &Path,
        _timeout: Option<Duration>,
    ) -> Result<(), descriptors::Error> {
        let sdf = fs::read_to_string(input_sdf).unwrap();
        let records = sdf.lines().filter(|l| l.trim() == "$$$$").count();
        let rows = self.rows_override.unwrap_or(records);

        let mut csv = String::from("Name,ALogP,nAcid,nH,Unlisted\n");
        for row in 0..rows {
            let acid = if self.blank.contains(&row) { "" } else { "0" };
            csv.push_str(&format!("AUTOGEN_{row},{}.0,{acid},6,42\n", row + 3));
        }
        fs::write(output_csv, csv).unwrap();
        Ok(())
    }
}

/// Scaler over the three listed descriptors and a one-split boosted
/// model on `ALogP`: scaled values at or above zero score 0.73.
fn write_artifacts(dir: &Path, key: ModelKey) {
    fs::write(
        dir.join(SCALER_FILE),
        r#"{
            "feature_names": ["ALogP", "nAcid", "nH"],
            "mean": [1.0, 0.0, 4.0],
            "scale": [2.0, 1.0, 0.0]
        }"#,
    )
    .unwrap();
    fs::write(
        dir.join(key.file_name()),
        r#"{
            "feature_names": ["ALogP", "nH"],
            "model": {
                "type": "gradient_boosting",
                "base_margin": 0.0,
                "trees": [{
                    "children_left": [1, -1, -1],
                    "children_right": [2, -1, -1],
                    "feature": [0, -2, -2],
                    "threshold": [0.0, 0.0, 0.0],
                    "leaf_value": [0.0, -1.0, 1.0]
                }]
            }
        }"#,
    )
    .unwrap();
}

fn default_key() -> ModelKey {
    ModelKey::new(Algorithm::GradientBoosting, Resampling::ClassicAdasyn)
}

fn setup(input_name: &str, input: &str) -> (TempDir, PipelineConfig) {
    let dir = TempDir::new().unwrap();
    let artifacts = dir.path().join("artifacts");
    fs::create_dir(&artifacts).unwrap();
    write_artifacts(&artifacts, default_key());

    let input_path = dir.path().join(input_name);
    fs::write(&input_path, input).unwrap();

    let mut config = PipelineConfig::new(&input_path);
    config.output = Some(dir.path().join("B3clf_output.csv"));
    config.artifacts = ArtifactStore::new(artifacts);
    (dir, config)
}

fn read_output(path: &Path) -> io::Table {
    io::table::read_path(path).unwrap()
}

#[test]
fn single_smiles_end_to_end() {
    let (_dir, config) = setup("single.smi", "CCO mol1\n");

    let report = pipeline::run(&config, &MockTool::new()).unwrap();
    assert_eq!(report.predictions.len(), 1);
    let p = &report.predictions[0];
    assert_eq!(p.id, "mol1");
    assert!((0.0..=1.0).contains(&p.probability));
    assert!(p.label == 0 || p.label == 1);

    let output = read_output(config.output.as_ref().unwrap());
    assert_eq!(
        output.headers,
        vec!["ID", "SMILES", PROBABILITY_COLUMN, LABEL_COLUMN]
    );
    assert_eq!(output.rows.len(), 1);
    assert_eq!(output.rows[0][0], "mol1");
    assert_eq!(output.rows[0][1], "CCO");
}

#[test]
fn failed_molecules_carry_a_status() {
    let (_dir, mut config) = setup("mixed.smi", "CCO mol1\nC(C broken\nc1ccccc1O phenol\n");
    config.with_status = true;
    // Second SD record is phenol; the broken SMILES never reaches the SDF.
    let tool = MockTool {
        blank: vec![1],
        rows_override: None,
    };

    let report = pipeline::run(&config, &tool).unwrap();
    let statuses: Vec<_> = report.molecules.iter().map(|m| m.status.clone()).collect();
    assert_eq!(statuses[0], MoleculeStatus::Ok);
    assert!(matches!(statuses[1], MoleculeStatus::ParseFailure(_)));
    assert_eq!(statuses[2], MoleculeStatus::MissingDescriptors(1));
    assert_eq!(report.predictions.len(), 1);
    assert_eq!(report.failed(), 2);

    let output = read_output(config.output.as_ref().unwrap());
    assert_eq!(output.headers.last().map(String::as_str), Some(STATUS_COLUMN));
    assert_eq!(output.rows.len(), 3);
    assert_eq!(output.rows[1][0], "broken");
    assert_eq!(output.rows[1][2], "");
    assert_eq!(output.rows[2][4], "missing-descriptors");
}

#[test]
fn descriptor_row_mismatch_aborts_without_output() {
    let (_dir, config) = setup("pair.smi", "CCO mol1\nCCN mol2\n");
    let tool = MockTool {
        blank: Vec::new(),
        rows_override: Some(1),
    };

    let err = pipeline::run(&config, &tool).unwrap_err();
    assert!(matches!(
        err,
        pipeline::Error::Descriptors(descriptors::Error::RowCountMismatch {
            expected: 2,
            found: 1
        })
    ));
    assert!(!config.output.as_ref().unwrap().exists());
}

#[test]
fn intermediates_are_removed_unless_kept() {
    let (dir, mut config) = setup("mols.smi", "CCO mol1\n");
    let geometry = dir.path().join("mols_b3clf_geometry.sdf");
    let descriptors = dir.path().join("mols_b3clf_descriptors.csv");

    let report = pipeline::run(&config, &MockTool::new()).unwrap();
    assert!(report.kept.is_empty());
    assert!(!geometry.exists());
    assert!(!descriptors.exists());

    config.keep_sdf = true;
    config.keep_features = true;
    let report = pipeline::run(&config, &MockTool::new()).unwrap();
    assert_eq!(report.kept, vec![geometry.clone(), descriptors.clone()]);
    assert!(geometry.exists());
    assert!(descriptors.exists());

    let table = read_output(&descriptors);
    assert_eq!(table.headers[0], "ID");
    assert!(!table.headers.iter().any(|h| h == "Name"));
}

#[test]
fn feature_table_input_skips_structure_stages() {
    let (_dir, mut config) = setup(
        "features.csv",
        "ID,SMILES,ALogP,nAcid,nH,Unlisted\n\
         a,CCO,5.0,0,6,1\n\
         b,CCN,-3.0,0,7,1\n\
         c,CCC,NaN,0,8,1\n",
    );
    config.input_kind = InputKind::Features;

    let report = pipeline::run(&config, &MockTool::new()).unwrap();
    let ids: Vec<&str> = report.predictions.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b"]);
    assert_eq!(report.predictions[0].label, 1);
    assert_eq!(report.predictions[1].label, 0);
    assert_eq!(report.predictions[0].smiles.as_deref(), Some("CCO"));
    assert_eq!(
        report.molecules[2].status,
        MoleculeStatus::MissingDescriptors(1)
    );
    assert!(report.kept.is_empty());
}

#[test]
fn missing_classifier_artifact_fails_before_output() {
    let (_dir, mut config) = setup("single.smi", "CCO mol1\n");
    config.key = ModelKey::new(Algorithm::Knn, Resampling::Common);

    let err = pipeline::run(&config, &MockTool::new()).unwrap_err();
    assert!(matches!(
        err,
        pipeline::Error::Classifier(classifier::Error::ArtifactRead { .. })
    ));
    assert!(!config.output.as_ref().unwrap().exists());
}

#[test]
fn unsupported_classifier_name_is_rejected_before_any_read() {
    let err = ModelKey::parse("svm", "classic_ADASYN").unwrap_err();
    assert!(matches!(err, classifier::Error::UnsupportedAlgorithm(_)));
}

#[test]
fn default_policy_ignores_the_classifier_pair() {
    let (dir, mut config) = setup("single.smi", "CCO mol1\n");
    let artifacts = dir.path().join("artifacts");
    fs::write(
        artifacts.join(THRESHOLDS_FILE),
        r#"{
            "default": 0.5,
            "entries": {
                "xgb_classic_ADASYN": {"J": 0.9, "F": 0.1},
                "logreg_common": {"J": 0.2, "F": 0.3}
            }
        }"#,
    )
    .unwrap();
    let other = ModelKey::new(Algorithm::LogisticRegression, Resampling::Common);
    fs::write(
        artifacts.join(other.file_name()),
        r#"{
            "feature_names": ["ALogP"],
            "model": {"type": "logistic_regression", "coef": [1.0], "intercept": 0.0}
        }"#,
    )
    .unwrap();

    config.policy = ThresholdPolicy::None;
    let first = pipeline::run(&config, &MockTool::new()).unwrap();
    config.key = other;
    let second = pipeline::run(&config, &MockTool::new()).unwrap();
    assert_eq!(first.cutoff, 0.5);
    assert_eq!(second.cutoff, 0.5);

    config.policy = ThresholdPolicy::J;
    let tuned = pipeline::run(&config, &MockTool::new()).unwrap();
    assert_eq!(tuned.cutoff, 0.2);
}

#[test]
fn tsv_output_is_tab_separated() {
    let (dir, mut config) = setup("single.smi", "CCO mol1\n");
    let output: PathBuf = dir.path().join("result.tsv");
    config.output = Some(output.clone());

    pipeline::run(&config, &MockTool::new()).unwrap();
    let text = fs::read_to_string(&output).unwrap();
    assert!(text.starts_with("ID\tSMILES\t"));
}
