use std::fmt;
use std::str::FromStr;

use crate::io::TextLayout;

/// Force field used to minimize embedded conformers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ForceFieldKind {
    /// The static MMFF variant; the default.
    #[default]
    Mmff94s,
    Uff,
}

impl ForceFieldKind {
    /// The force field tried when this one cannot be set up.
    pub fn alternate(self) -> Self {
        match self {
            ForceFieldKind::Mmff94s => ForceFieldKind::Uff,
            ForceFieldKind::Uff => ForceFieldKind::Mmff94s,
        }
    }
}

impl fmt::Display for ForceFieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ForceFieldKind::Mmff94s => write!(f, "MMFF94s"),
            ForceFieldKind::Uff => write!(f, "uff"),
        }
    }
}

impl FromStr for ForceFieldKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mmff94s" => Ok(ForceFieldKind::Mmff94s),
            "uff" => Ok(ForceFieldKind::Uff),
            other => Err(format!(
                "unsupported force field '{other}' (expected MMFF94s or uff)"
            )),
        }
    }
}

/// Backend that performs embedding and minimization.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum OptimizationTool {
    #[default]
    Builtin,
    /// A named tool that is recognized but has no backend.
    Unsupported(String),
}

impl fmt::Display for OptimizationTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptimizationTool::Builtin => write!(f, "builtin"),
            OptimizationTool::Unsupported(name) => write!(f, "{name}"),
        }
    }
}

impl FromStr for OptimizationTool {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "builtin" | "rdkit" => Ok(OptimizationTool::Builtin),
            "" => Err("optimization tool name is empty".to_string()),
            _ => Ok(OptimizationTool::Unsupported(s.to_string())),
        }
    }
}

/// Settings for [`optimize_file`](super::optimize_file) and
/// [`optimize_molecule`](super::optimize_molecule).
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryConfig {
    pub force_field: ForceFieldKind,
    /// Iteration budget of the primary minimization.
    pub max_iterations: usize,
    /// Seed for coordinate embedding; runs with equal seeds are identical.
    pub seed: u64,
    pub tool: OptimizationTool,
    /// Largest gradient component accepted as converged.
    pub gradient_tolerance: f64,
    /// Budget used when falling back from MMFF94s to UFF.
    pub fallback_iterations: usize,
    /// Column layout of SMILES list inputs.
    pub layout: TextLayout,
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            force_field: ForceFieldKind::Mmff94s,
            max_iterations: 10_000,
            seed: 999,
            tool: OptimizationTool::Builtin,
            gradient_tolerance: 1e-2,
            fallback_iterations: 400,
            layout: TextLayout::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn force_field_names_are_case_insensitive() {
        assert_eq!("MMFF94s".parse::<ForceFieldKind>().unwrap(), ForceFieldKind::Mmff94s);
        assert_eq!("UFF".parse::<ForceFieldKind>().unwrap(), ForceFieldKind::Uff);
        assert!("gaff".parse::<ForceFieldKind>().is_err());
        assert_eq!(ForceFieldKind::Uff.alternate(), ForceFieldKind::Mmff94s);
    }

    #[test]
    fn unknown_tools_parse_but_are_flagged() {
        assert_eq!("builtin".parse::<OptimizationTool>().unwrap(), OptimizationTool::Builtin);
        assert_eq!(
            "openbabel".parse::<OptimizationTool>().unwrap(),
            OptimizationTool::Unsupported("openbabel".into())
        );
    }
}
