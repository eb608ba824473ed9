//! End-to-end classification of a molecule or feature file.
//!
//! Stages run strictly in order: geometry, descriptors, selection, scaling,
//! classification. A pre-computed feature table enters at selection. Model
//! artifacts and the output format are checked before any stage runs.

mod error;
mod intermediate;

use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{info, warn};

use crate::classifier::{self, ArtifactStore, ModelKey, Prediction, ThresholdPolicy};
use crate::descriptors::{self, DescriptorOptions, DescriptorTool};
use crate::features::{self, FeatureTable, InfoTable};
use crate::geometry::{self, GeometryConfig};
use crate::io::{self, Format, Table};
use crate::model::record::MoleculeStatus;

pub use error::Error;
pub use intermediate::Intermediates;

pub const PROBABILITY_COLUMN: &str = "B3clf_predicted_probability";
pub const LABEL_COLUMN: &str = "B3clf_predicted_label";
pub const STATUS_COLUMN: &str = "status";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputKind {
    /// SMILES list or SD file; runs geometry and descriptor stages.
    #[default]
    Molecules,
    /// Pre-computed descriptor table with an `ID` column.
    Features,
}

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub input: PathBuf,
    pub input_kind: InputKind,
    /// Result table path; `.csv` or `.tsv`.
    pub output: Option<PathBuf>,
    pub key: ModelKey,
    pub policy: ThresholdPolicy,
    pub artifacts: ArtifactStore,
    pub geometry: GeometryConfig,
    /// Deadline for the whole descriptor tool run.
    pub descriptor_timeout: Option<Duration>,
    pub keep_sdf: bool,
    pub keep_features: bool,
    /// List every input molecule with a status column in the result table.
    pub with_status: bool,
}

impl PipelineConfig {
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            input_kind: InputKind::default(),
            output: None,
            key: ModelKey::default(),
            policy: ThresholdPolicy::default(),
            artifacts: ArtifactStore::from_env(),
            geometry: GeometryConfig::default(),
            descriptor_timeout: None,
            keep_sdf: false,
            keep_features: false,
            with_status: false,
        }
    }

    /// Directory for intermediates: beside the output if given, else
    /// beside the input.
    fn work_dir(&self) -> PathBuf {
        let anchor = self.output.as_deref().unwrap_or(&self.input);
        anchor
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

/// What happened to one input molecule.
#[derive(Debug, Clone, PartialEq)]
pub struct MoleculeOutcome {
    pub id: String,
    pub smiles: Option<String>,
    pub status: MoleculeStatus,
}

#[derive(Debug, Clone)]
pub struct PipelineReport {
    /// Every input molecule, in input order.
    pub molecules: Vec<MoleculeOutcome>,
    /// One entry per molecule with status `Ok`, in input order.
    pub predictions: Vec<Prediction>,
    pub cutoff: f64,
    /// Selected descriptors the feature table did not provide.
    pub missing_descriptors: Vec<&'static str>,
    /// Intermediate files retained on request.
    pub kept: Vec<PathBuf>,
}

impl PipelineReport {
    pub fn failed(&self) -> usize {
        self.molecules.iter().filter(|m| !m.status.is_ok()).count()
    }

    /// The result table: `ID`, `SMILES` when known, probability and label.
    ///
    /// With `with_status`, molecules without a prediction are listed too,
    /// with empty probability and label cells.
    pub fn result_table(&self, with_status: bool) -> Table {
        let with_smiles = self.molecules.iter().any(|m| m.smiles.is_some());
        let mut headers = vec![features::ID_COLUMN.to_string()];
        if with_smiles {
            headers.push("SMILES".to_string());
        }
        headers.push(PROBABILITY_COLUMN.to_string());
        headers.push(LABEL_COLUMN.to_string());
        if with_status {
            headers.push(STATUS_COLUMN.to_string());
        }
        let mut table = Table::new(headers);

        let mut predictions = self.predictions.iter();
        for molecule in &self.molecules {
            let prediction = if molecule.status.is_ok() {
                predictions.next()
            } else {
                None
            };
            if prediction.is_none() && !with_status {
                continue;
            }
            let mut row = vec![molecule.id.clone()];
            if with_smiles {
                row.push(molecule.smiles.clone().unwrap_or_default());
            }
            match prediction {
                Some(p) => {
                    row.push(p.probability.to_string());
                    row.push(p.label.to_string());
                }
                None => {
                    row.push(String::new());
                    row.push(String::new());
                }
            }
            if with_status {
                row.push(molecule.status.label().to_string());
            }
            table.push_row(row);
        }
        table
    }
}

/// Rows entering selection, with the molecules they came from.
struct Staged {
    features: FeatureTable,
    info: InfoTable,
    molecules: Vec<MoleculeOutcome>,
}

pub fn run(config: &PipelineConfig, tool: &dyn DescriptorTool) -> Result<PipelineReport, Error> {
    if let Some(output) = &config.output {
        Format::table_from_path(output)?;
    }
    let model = config.artifacts.load_classifier(config.key)?;
    let scaler = config.artifacts.load_scaler()?;
    let cutoff = config
        .artifacts
        .load_thresholds()?
        .cutoff(config.policy, config.key)?;
    info!(
        key = %config.key,
        policy = %config.policy,
        cutoff,
        "classifier ready"
    );

    let (mut staged, kept) = match config.input_kind {
        InputKind::Molecules => {
            let files = Intermediates::new(
                &config.work_dir(),
                &config.input,
                config.keep_sdf,
                config.keep_features,
            );
            let staged = stage_molecules(config, tool, &files)?;
            (staged, files.kept())
        }
        InputKind::Features => (stage_features(&config.input)?, Vec::new()),
    };

    let selection = features::select_descriptors(&staged.features);
    let mut selected = selection.table;
    drop_incomplete(&mut selected, &mut staged.info, &mut staged.molecules);
    scaler.transform(&mut selected)?;

    let predictions = classifier::predict_permeability(&model, &selected, &staged.info, cutoff)?;

    let report = PipelineReport {
        molecules: staged.molecules,
        predictions,
        cutoff,
        missing_descriptors: selection.missing,
        kept,
    };

    if let Some(output) = &config.output {
        io::table::write_path(output, &report.result_table(config.with_status))?;
        info!(path = %output.display(), rows = report.predictions.len(), "wrote predictions");
    }
    info!(
        predicted = report.predictions.len(),
        failed = report.failed(),
        "classification done"
    );
    Ok(report)
}

fn stage_molecules(
    config: &PipelineConfig,
    tool: &dyn DescriptorTool,
    files: &Intermediates,
) -> Result<Staged, Error> {
    let geometry = geometry::optimize_file(&config.input, &files.geometry, &config.geometry)?;

    let options = DescriptorOptions {
        timeout: config.descriptor_timeout,
        output: Some(files.descriptors.clone()),
    };
    let computed = descriptors::compute_descriptors(&files.geometry, tool, &options)?;

    // SD records are the molecules that survived geometry, in input order.
    let mut descriptor_statuses = computed.statuses.into_iter().map(|(_, status)| status);
    let mut molecules = Vec::with_capacity(geometry.records.len());
    let mut smiles = Vec::new();
    for record in geometry.records {
        let status = if record.status.is_ok() {
            descriptor_statuses.next().unwrap_or_else(|| {
                MoleculeStatus::ParseFailure("absent from optimized structure file".to_string())
            })
        } else {
            record.status
        };
        if status.is_ok() {
            smiles.push(record.smiles.clone());
        }
        molecules.push(MoleculeOutcome {
            id: record.id,
            smiles: record.smiles,
            status,
        });
    }

    let mut info = InfoTable::from_index(computed.table.index.clone());
    for (row, smiles) in smiles.into_iter().enumerate() {
        if let Some(smiles) = smiles {
            info.set(row, "SMILES", smiles);
        }
    }

    Ok(Staged {
        features: computed.table,
        info,
        molecules,
    })
}

fn stage_features(path: &Path) -> Result<Staged, Error> {
    let raw = io::table::read_path(path)?;
    let (features, info) = features::split_info(&raw)?;
    info!(
        path = %path.display(),
        rows = features.row_count(),
        columns = features.column_count(),
        "read feature table"
    );
    let molecules = info
        .index
        .iter()
        .enumerate()
        .map(|(row, id)| MoleculeOutcome {
            id: id.clone(),
            smiles: info
                .get(row, "SMILES")
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            status: MoleculeStatus::Ok,
        })
        .collect();
    Ok(Staged {
        features,
        info,
        molecules,
    })
}

/// Removes rows with missing selected descriptors and records why.
fn drop_incomplete(features: &mut FeatureTable, info: &mut InfoTable, molecules: &mut [MoleculeOutcome]) {
    let missing: Vec<usize> = features
        .values
        .iter()
        .map(|row| row.iter().filter(|v| !v.is_finite()).count())
        .collect();
    if missing.iter().all(|&n| n == 0) {
        return;
    }

    let mut rows = missing.iter();
    for molecule in molecules.iter_mut().filter(|m| m.status.is_ok()) {
        match rows.next() {
            Some(&0) => {}
            Some(&n) => {
                warn!(name = %molecule.id, missing = n, "dropping molecule with missing descriptors");
                molecule.status = MoleculeStatus::MissingDescriptors(n);
            }
            None => break,
        }
    }
    features.retain_rows(|row, _| missing[row] == 0);
    info.retain_rows(|row, _| missing[row] == 0);
}
