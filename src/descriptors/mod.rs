//! Descriptor computation through an external tool.
//!
//! The tool reads the optimized SD file and writes one CSV row per record.
//! Rows are matched back to SD record names by position, so the tool must
//! keep record order (PaDEL's `-retainorder`). Rows with missing values
//! are dropped here and reported through [`MoleculeStatus`].

mod error;
mod tool;

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::features::FeatureTable;
use crate::io::{self, Format, TextLayout};
use crate::model::record::MoleculeStatus;

pub use error::Error;
pub use tool::{CommandTool, DescriptorTool, PadelTool};

#[derive(Debug, Clone, Default)]
pub struct DescriptorOptions {
    /// Deadline for the whole tool run.
    pub timeout: Option<Duration>,
    /// Where to persist the cleaned table, if anywhere.
    pub output: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct DescriptorOutcome {
    /// Complete descriptor rows, in SD record order.
    pub table: FeatureTable,
    /// One entry per SD record, in record order.
    pub statuses: Vec<(String, MoleculeStatus)>,
}

impl DescriptorOutcome {
    pub fn dropped(&self) -> usize {
        self.statuses.iter().filter(|(_, s)| !s.is_ok()).count()
    }
}

/// Removes the raw tool output however `compute_descriptors` exits.
struct Scratch(PathBuf);

impl Drop for Scratch {
    fn drop(&mut self) {
        if self.0.exists() {
            if let Err(err) = fs::remove_file(&self.0) {
                warn!(path = %self.0.display(), "could not remove raw descriptor output: {err}");
            }
        }
    }
}

fn scratch_path(sdf: &Path) -> PathBuf {
    let stem = sdf
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "molecules".to_string());
    sdf.with_file_name(format!(".{stem}_raw_descriptors.csv"))
}

/// Runs `tool` on `sdf` and reconciles its rows with the SD records.
pub fn compute_descriptors(
    sdf: &Path,
    tool: &dyn DescriptorTool,
    options: &DescriptorOptions,
) -> Result<DescriptorOutcome, Error> {
    let records = io::read_molecules(sdf, &TextLayout::default())?;
    info!(
        tool = tool.name(),
        molecules = records.len(),
        "computing descriptors"
    );

    let scratch = Scratch(scratch_path(sdf));
    tool.compute(sdf, &scratch.0, options.timeout)?;
    if !scratch.0.exists() {
        return Err(Error::MissingOutput {
            tool: tool.name().to_string(),
            path: scratch.0.clone(),
        });
    }
    let raw = io::table::read(fs::File::open(&scratch.0).map_err(io::Error::from)?, Format::Csv)?;

    if raw.row_count() != records.len() {
        return Err(Error::RowCountMismatch {
            expected: records.len(),
            found: raw.row_count(),
        });
    }

    // The first column is the tool's own molecule name.
    let columns: Vec<String> = raw.headers.iter().skip(1).cloned().collect();
    let mut table = FeatureTable::new(columns);
    let mut statuses = Vec::with_capacity(records.len());

    for (record, row) in records.iter().zip(&raw.rows) {
        if !record.status.is_ok() {
            statuses.push((record.id.clone(), record.status.clone()));
            continue;
        }
        let values: Vec<f64> = row.iter().skip(1).map(|cell| parse_value(cell)).collect();
        let missing = values.iter().filter(|v| !v.is_finite()).count();
        let status = if missing == 0 {
            table.push_row(record.id.clone(), values)?;
            MoleculeStatus::Ok
        } else if missing == values.len() {
            MoleculeStatus::Timeout
        } else {
            MoleculeStatus::MissingDescriptors(missing)
        };
        if !status.is_ok() {
            warn!(name = %record.id, "dropping molecule: {status}");
        }
        statuses.push((record.id.clone(), status));
    }

    debug!(
        kept = table.row_count(),
        columns = table.column_count(),
        "descriptor table reconciled"
    );

    if let Some(path) = &options.output {
        io::table::write_path(path, &table.to_table())?;
        info!(path = %path.display(), "wrote descriptor table");
    }

    Ok(DescriptorOutcome { table, statuses })
}

fn parse_value(cell: &str) -> f64 {
    cell.trim().parse::<f64>().unwrap_or(f64::NAN)
}
