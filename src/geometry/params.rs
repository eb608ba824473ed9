use super::config::ForceFieldKind;
use super::error::Error;
use crate::model::types::Element;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::OnceLock;

const MMFF94S_TOML: &str = include_str!("../../resources/forcefield/mmff94s.toml");
const UFF_TOML: &str = include_str!("../../resources/forcefield/uff.toml");

static MMFF94S: OnceLock<ForceFieldParams> = OnceLock::new();
static UFF: OnceLock<ForceFieldParams> = OnceLock::new();

#[derive(Debug, Clone, Deserialize)]
pub struct ForceFieldParams {
    #[serde(default)]
    pub global: GlobalParams,
    #[serde(default)]
    pub elements: HashMap<String, ElementParams>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GlobalParams {
    #[serde(default = "default_bond_k")]
    pub bond_k: f64,
    #[serde(default = "default_angle_k")]
    pub angle_k: f64,
    #[serde(default = "default_contact_k")]
    pub contact_k: f64,
    #[serde(default = "default_contact_scale")]
    pub contact_scale: f64,
    #[serde(default = "default_bond_order_factor")]
    pub bond_order_factor: f64,
    /// Twofold barrier holding double-bond substituents in plane.
    #[serde(default = "default_torsion_k")]
    pub torsion_k: f64,
}

fn default_bond_k() -> f64 {
    700.0
}
fn default_angle_k() -> f64 {
    100.0
}
fn default_contact_k() -> f64 {
    20.0
}
fn default_contact_scale() -> f64 {
    0.7
}
fn default_bond_order_factor() -> f64 {
    0.1332
}
fn default_torsion_k() -> f64 {
    15.0
}

impl Default for GlobalParams {
    fn default() -> Self {
        Self {
            bond_k: default_bond_k(),
            angle_k: default_angle_k(),
            contact_k: default_contact_k(),
            contact_scale: default_contact_scale(),
            bond_order_factor: default_bond_order_factor(),
            torsion_k: default_torsion_k(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ElementParams {
    pub radius: f64,
    pub vdw_radius: f64,
    #[serde(default = "default_sp3_angle")]
    pub sp3_angle: f64,
}

fn default_sp3_angle() -> f64 {
    109.47
}

impl ForceFieldParams {
    pub fn element(&self, element: Element) -> Option<&ElementParams> {
        self.elements.get(element.symbol())
    }
}

pub fn load_parameters(custom_toml: &str) -> Result<ForceFieldParams, Error> {
    Ok(toml::from_str(custom_toml)?)
}

pub fn builtin_parameters(kind: ForceFieldKind) -> &'static ForceFieldParams {
    let (cell, source) = match kind {
        ForceFieldKind::Mmff94s => (&MMFF94S, MMFF94S_TOML),
        ForceFieldKind::Uff => (&UFF, UFF_TOML),
    };
    cell.get_or_init(|| {
        toml::from_str(source)
            .expect("Failed to parse embedded force field parameters. This is a library bug.")
    })
}
