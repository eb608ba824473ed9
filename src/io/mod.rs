//! Readers and writers for the file formats the pipeline touches.
//!
//! - [`smiles`] – SMILES parsing/writing and headerless SMILES lists.
//! - [`sdf`] – Multi-record MDL V2000 SD files.
//! - [`table`] – Delimited CSV/TSV tables for descriptors and results.

use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use tracing::{debug, warn};

use crate::model::record::{MoleculeRecord, MoleculeStatus};

pub mod error;
pub mod sdf;
pub mod smiles;
pub mod table;

pub use error::Error;
pub use smiles::{Separator, SmilesEntry, TextLayout};
pub use table::Table;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Headerless SMILES list (`.smi`, `.txt`, `.csv` when read as molecules).
    Smiles,
    Sdf,
    Csv,
    Tsv,
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Format::Smiles => write!(f, "SMILES"),
            Format::Sdf => write!(f, "SDF"),
            Format::Csv => write!(f, "CSV"),
            Format::Tsv => write!(f, "TSV"),
        }
    }
}

fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default()
}

impl Format {
    /// Interprets `path` as a molecule source.
    pub fn molecules_from_path(path: &Path) -> Result<Self, Error> {
        match extension(path).as_str() {
            "smi" | "smiles" | "txt" | "csv" => Ok(Format::Smiles),
            "sdf" | "sd" | "mol" => Ok(Format::Sdf),
            "xlsx" | "xls" => Err(Error::unsupported(
                path,
                "spreadsheet files are not supported; export to CSV",
            )),
            "" => Err(Error::unsupported(path, "missing file extension")),
            other => Err(Error::unsupported(
                path,
                format!("'.{other}' is not a molecule format (.smi, .csv, .txt, .sdf)"),
            )),
        }
    }

    /// Interprets `path` as a delimited table.
    pub fn table_from_path(path: &Path) -> Result<Self, Error> {
        match extension(path).as_str() {
            "csv" => Ok(Format::Csv),
            "tsv" | "tab" | "txt" => Ok(Format::Tsv),
            "xlsx" | "xls" => Err(Error::unsupported(
                path,
                "spreadsheet files are not supported; use .csv or .tsv",
            )),
            "" => Err(Error::unsupported(path, "missing file extension")),
            other => Err(Error::unsupported(
                path,
                format!("'.{other}' is not a table format (.csv, .tsv)"),
            )),
        }
    }
}

/// Reads every molecule from a SMILES list or SD file.
///
/// Per-molecule parse failures become [`MoleculeStatus::ParseFailure`]
/// records; only unreadable files and malformed lists are errors. SD
/// records with an empty title are named after their SMILES.
pub fn read_molecules(path: &Path, layout: &TextLayout) -> Result<Vec<MoleculeRecord>, Error> {
    let format = Format::molecules_from_path(path)?;
    let reader = BufReader::new(File::open(path)?);

    let records = match format {
        Format::Sdf => sdf::reader::read_all(reader)?
            .into_iter()
            .map(sdf_record)
            .collect(),
        _ => smiles::read_smiles_list(reader, layout)?
            .into_iter()
            .map(smiles_record)
            .collect::<Vec<_>>(),
    };

    debug!(
        path = %path.display(),
        %format,
        count = records.len(),
        "read molecule input"
    );
    Ok(records)
}

fn smiles_record(entry: SmilesEntry) -> MoleculeRecord {
    match smiles::parse(&entry.smiles) {
        Ok(mut mol) => {
            mol.name = entry.name.clone();
            MoleculeRecord::parsed(entry.name, Some(entry.smiles), mol)
        }
        Err(err) => {
            warn!(name = %entry.name, line = entry.line, "skipping molecule: {err}");
            MoleculeRecord::failed(
                entry.name,
                Some(entry.smiles),
                MoleculeStatus::ParseFailure(err.to_string()),
            )
        }
    }
}

fn sdf_record(record: sdf::reader::SdfRecord) -> MoleculeRecord {
    match record.molecule {
        Ok(mut mol) => {
            let smiles = mol
                .property("SMILES")
                .map(str::to_string)
                .unwrap_or_else(|| smiles::write(&mol));
            if mol.name.is_empty() {
                mol.name = smiles.clone();
            }
            MoleculeRecord::parsed(mol.name.clone(), Some(smiles), mol)
        }
        Err(err) => {
            let id = if record.title.is_empty() {
                format!("record_{}", record.index + 1)
            } else {
                record.title
            };
            warn!(name = %id, "skipping SD record: {err}");
            MoleculeRecord::failed(id, None, MoleculeStatus::ParseFailure(err.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn format_inference() {
        assert_eq!(Format::molecules_from_path(Path::new("a.SMI")).unwrap(), Format::Smiles);
        assert_eq!(Format::molecules_from_path(Path::new("a.csv")).unwrap(), Format::Smiles);
        assert_eq!(Format::molecules_from_path(Path::new("a.sdf")).unwrap(), Format::Sdf);
        assert!(Format::molecules_from_path(Path::new("a.xlsx")).is_err());
        assert!(Format::molecules_from_path(Path::new("a.pdb")).is_err());
        assert_eq!(Format::table_from_path(Path::new("a.tsv")).unwrap(), Format::Tsv);
        assert!(Format::table_from_path(Path::new("noext")).is_err());
    }

    #[test]
    fn smiles_list_keeps_failures_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("input.smi");
        let mut file = File::create(&path).unwrap();
        writeln!(file, "CCO mol1").unwrap();
        writeln!(file, "C1CC mol2").unwrap();
        writeln!(file, "c1ccccc1 mol3").unwrap();

        let records = read_molecules(&path, &TextLayout::default()).unwrap();
        let ids: Vec<_> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["mol1", "mol2", "mol3"]);
        assert!(records[0].status.is_ok());
        assert!(matches!(records[1].status, MoleculeStatus::ParseFailure(_)));
        assert_eq!(records[2].molecule.as_ref().unwrap().name, "mol3");
    }

    #[test]
    fn unnamed_sd_records_fall_back_to_smiles() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("input.sdf");
        let mol = smiles::parse("CO").unwrap();
        let file = File::create(&path).unwrap();
        sdf::writer::write_all(file, [&mol]).unwrap();

        let records = read_molecules(&path, &TextLayout::default()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, records[0].smiles.clone().unwrap());
        assert_eq!(records[0].id.len(), 2);
    }
}
