use std::fmt;

use super::molecule::Molecule;

/// What happened to one input molecule on its way through the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoleculeStatus {
    Ok,
    /// The structure could not be parsed from the input.
    ParseFailure(String),
    /// No 3D conformation could be produced.
    EmbedFailure(String),
    /// The descriptor tool ran out of time on this molecule.
    Timeout,
    /// The descriptor row had this many missing values.
    MissingDescriptors(usize),
}

impl MoleculeStatus {
    pub fn is_ok(&self) -> bool {
        matches!(self, MoleculeStatus::Ok)
    }

    /// Short machine-friendly label used in result tables.
    pub fn label(&self) -> &'static str {
        match self {
            MoleculeStatus::Ok => "ok",
            MoleculeStatus::ParseFailure(_) => "parse-failure",
            MoleculeStatus::EmbedFailure(_) => "embed-failure",
            MoleculeStatus::Timeout => "timeout",
            MoleculeStatus::MissingDescriptors(_) => "missing-descriptors",
        }
    }
}

impl fmt::Display for MoleculeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoleculeStatus::Ok => write!(f, "ok"),
            MoleculeStatus::ParseFailure(reason) => write!(f, "parse failure: {reason}"),
            MoleculeStatus::EmbedFailure(reason) => write!(f, "embedding failed: {reason}"),
            MoleculeStatus::Timeout => write!(f, "descriptor computation timed out"),
            MoleculeStatus::MissingDescriptors(n) => write!(f, "{n} descriptor values missing"),
        }
    }
}

/// One input molecule as identified by the user.
#[derive(Debug, Clone)]
pub struct MoleculeRecord {
    pub id: String,
    pub smiles: Option<String>,
    pub molecule: Option<Molecule>,
    pub status: MoleculeStatus,
}

impl MoleculeRecord {
    pub fn parsed(id: impl Into<String>, smiles: Option<String>, molecule: Molecule) -> Self {
        Self {
            id: id.into(),
            smiles,
            molecule: Some(molecule),
            status: MoleculeStatus::Ok,
        }
    }

    pub fn failed(id: impl Into<String>, smiles: Option<String>, status: MoleculeStatus) -> Self {
        Self {
            id: id.into(),
            smiles,
            molecule: None,
            status,
        }
    }
}
