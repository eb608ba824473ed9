//! Blood-brain barrier (BBB) permeability classification of small molecules.
//!
//! Molecules given as SMILES or SD records are embedded in 3D and minimized,
//! described by an external descriptor tool, reduced to a fixed descriptor
//! selection, standardized, and classified by a pre-trained model. Each
//! molecule ends with a permeability probability and a 0/1 label, or with a
//! [`MoleculeStatus`] saying why it was left out.
//!
//! # Quick Start
//!
//! ```
//! use b3clf::classifier::ModelKey;
//! use b3clf::io::smiles;
//!
//! let ethanol = smiles::parse("CCO")?;
//! assert_eq!(ethanol.heavy_atom_count(), 3);
//!
//! // Classifiers are addressed by algorithm and resampling strategy.
//! let key = ModelKey::parse("xgb", "classic_ADASYN")?;
//! assert_eq!(key.file_name(), "b3clf_xgb_classic_ADASYN.json");
//! assert!(ModelKey::parse("svm", "common").is_err());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! A full run goes through [`pipeline::run`] with a [`PipelineConfig`] and a
//! [`DescriptorTool`], normally [`PadelTool`].
//!
//! # Module Organization
//!
//! - [`io`] – SMILES lists, SD files and delimited tables
//! - [`geometry`] – hydrogens, 3D embedding and force-field minimization
//! - [`descriptors`] – external descriptor tool and row reconciliation
//! - [`features`] – info/feature split, descriptor selection, scaling
//! - [`classifier`] – model artifacts, inference and thresholds
//! - [`pipeline`] – stage sequencing and result tables
//! - [`config`] – `b3clf.toml` settings

mod model;

pub mod classifier;
pub mod config;
pub mod descriptors;
pub mod features;
pub mod geometry;
pub mod io;
pub mod pipeline;

pub use model::atom::Atom;
pub use model::molecule::{Bond, Molecule};
pub use model::record::{MoleculeRecord, MoleculeStatus};
pub use model::types::{
    BondDirection, BondOrder, Chirality, Element, ParseBondOrderError, ParseElementError,
};

pub use classifier::{Algorithm, ArtifactStore, ModelKey, Prediction, Resampling, ThresholdPolicy};
pub use descriptors::{CommandTool, DescriptorTool, PadelTool};
pub use pipeline::{InputKind, PipelineConfig, PipelineReport};
