//! 3D structure generation.
//!
//! Molecules read from a SMILES list or SD file get explicit hydrogens,
//! seeded coordinates from [`embed`], and a force-field minimization with
//! the fallback policy below. Results are written as a multi-record SD file
//! whose record names are the input identifiers.
//!
//! | primary  | outcome               | action                                   |
//! |----------|-----------------------|------------------------------------------|
//! | any      | converged             | write                                    |
//! | any      | more iterations needed| rerun with twice the budget, then write  |
//! | MMFF94s  | setup failed          | UFF with the fixed fallback budget       |
//! | UFF      | setup failed          | MMFF94s with the primary budget          |
//!
//! If the alternate force field cannot be set up either, the embedded
//! coordinates are written unminimized.

mod config;
mod embed;
mod error;
mod forcefield;
mod hydrogens;
mod minimize;
mod params;

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use tracing::{debug, info, warn};

use crate::io::{self, sdf};
use crate::model::{
    molecule::Molecule,
    record::{MoleculeRecord, MoleculeStatus},
};

pub use config::{ForceFieldKind, GeometryConfig, OptimizationTool};
pub use embed::embed;
pub use error::Error;
pub use forcefield::ForceField;
pub use hydrogens::add_explicit_hydrogens;
pub use minimize::{MinimizeOutcome, MinimizeResult, steepest_descent};
pub use params::{ForceFieldParams, builtin_parameters, load_parameters};

/// Which branch of the fallback policy a molecule went through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fallback {
    None,
    /// Rerun with a doubled iteration budget.
    Retried,
    /// The primary force field could not be set up.
    AlternateForceField,
    /// Neither force field could be set up.
    Unoptimized,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Minimization {
    /// Force field that produced the final coordinates, if any did.
    pub force_field: Option<ForceFieldKind>,
    pub fallback: Fallback,
    pub result: Option<MinimizeResult>,
}

/// Per-file summary of a geometry run.
#[derive(Debug, Clone, Default)]
pub struct GeometryReport {
    /// Every input molecule in input order, with its status.
    pub records: Vec<MoleculeRecord>,
    pub written: usize,
    pub retried: usize,
    pub alternate_force_field: usize,
    pub unoptimized: usize,
}

impl GeometryReport {
    pub fn failed(&self) -> usize {
        self.records.iter().filter(|r| !r.status.is_ok()).count()
    }
}

fn check_tool(config: &GeometryConfig) -> Result<(), Error> {
    match &config.tool {
        OptimizationTool::Builtin => Ok(()),
        OptimizationTool::Unsupported(name) => Err(Error::UnsupportedTool(name.clone())),
    }
}

/// Budget for the rerun after a minimization ran out of iterations.
fn retry_budget(max_iterations: usize) -> usize {
    max_iterations.saturating_mul(2)
}

/// Adds hydrogens, embeds, and minimizes one molecule in place.
pub fn optimize_molecule(mol: &mut Molecule, config: &GeometryConfig) -> Result<Minimization, Error> {
    check_tool(config)?;

    add_explicit_hydrogens(mol);
    embed(mol, config.seed)?;

    let mut coords: Vec<[f64; 3]> = mol.atoms.iter().map(|a| a.position).collect();
    let primary = config.force_field;

    let minimization = match ForceField::setup(mol, primary) {
        Ok(ff) => {
            let first = steepest_descent(
                &ff,
                &mut coords,
                config.max_iterations,
                config.gradient_tolerance,
            );
            match first.outcome {
                MinimizeOutcome::Converged => Minimization {
                    force_field: Some(primary),
                    fallback: Fallback::None,
                    result: Some(first),
                },
                MinimizeOutcome::NeedsMoreIterations => {
                    debug!(name = %mol.name, "retrying minimization with a doubled budget");
                    let second = steepest_descent(
                        &ff,
                        &mut coords,
                        retry_budget(config.max_iterations),
                        config.gradient_tolerance,
                    );
                    Minimization {
                        force_field: Some(primary),
                        fallback: Fallback::Retried,
                        result: Some(second),
                    }
                }
            }
        }
        Err(Error::MissingParameter { element, .. }) => {
            let alternate = primary.alternate();
            let budget = match primary {
                ForceFieldKind::Mmff94s => config.fallback_iterations,
                ForceFieldKind::Uff => config.max_iterations,
            };
            match ForceField::setup(mol, alternate) {
                Ok(ff) => {
                    warn!(
                        name = %mol.name,
                        "{primary} has no parameters for {element}; falling back to {alternate}"
                    );
                    let result =
                        steepest_descent(&ff, &mut coords, budget, config.gradient_tolerance);
                    Minimization {
                        force_field: Some(alternate),
                        fallback: Fallback::AlternateForceField,
                        result: Some(result),
                    }
                }
                Err(Error::MissingParameter { element, .. }) => {
                    warn!(
                        name = %mol.name,
                        "no force field covers {element}; keeping embedded coordinates"
                    );
                    Minimization {
                        force_field: None,
                        fallback: Fallback::Unoptimized,
                        result: None,
                    }
                }
                Err(other) => return Err(other),
            }
        }
        Err(other) => return Err(other),
    };

    for (atom, pos) in mol.atoms.iter_mut().zip(coords) {
        atom.position = pos;
    }
    Ok(minimization)
}

/// Generates 3D structures for every molecule in `input` and writes them to
/// `output` as SDF.
pub fn optimize_file(input: &Path, output: &Path, config: &GeometryConfig) -> Result<GeometryReport, Error> {
    check_tool(config)?;

    let mut records = io::read_molecules(input, &config.layout)?;
    info!(
        input = %input.display(),
        molecules = records.len(),
        force_field = %config.force_field,
        "generating 3D geometries"
    );

    let mut report = GeometryReport::default();
    let mut optimized = Vec::with_capacity(records.len());

    for record in &mut records {
        let Some(mol) = record.molecule.as_mut() else {
            continue;
        };
        match optimize_molecule(mol, config) {
            Ok(minimization) => {
                match minimization.fallback {
                    Fallback::None => {}
                    Fallback::Retried => report.retried += 1,
                    Fallback::AlternateForceField => report.alternate_force_field += 1,
                    Fallback::Unoptimized => report.unoptimized += 1,
                }
                debug!(
                    name = %record.id,
                    atoms = mol.atom_count(),
                    fallback = ?minimization.fallback,
                    energy = minimization.result.map(|r| r.energy),
                    "optimized"
                );
                optimized.push(mol.clone());
            }
            Err(Error::Embedding(reason)) => {
                warn!(name = %record.id, "embedding failed: {reason}");
                record.status = MoleculeStatus::EmbedFailure(reason);
            }
            Err(other) => return Err(other),
        }
    }

    let file = File::create(output).map_err(|source| Error::Output {
        path: output.to_path_buf(),
        source,
    })?;
    sdf::write_all(BufWriter::new(file), &optimized)?;

    report.written = optimized.len();
    report.records = records;
    info!(
        output = %output.display(),
        written = report.written,
        failed = report.failed(),
        "geometry optimization done"
    );
    Ok(report)
}
