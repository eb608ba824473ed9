//! Core data structures for molecules flowing through the prediction pipeline.
//!
//! - [`types`] – Supported elements and bond orders.
//! - [`atom`] – Atom with element, coordinates, charge and hydrogen bookkeeping.
//! - [`molecule`] – Named molecular graph with SDF data items and valence helpers.
//! - [`record`] – Per-input bookkeeping: identifier, SMILES, status.

pub mod atom;
pub mod molecule;
pub mod record;
pub mod types;
