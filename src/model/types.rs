use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid or unsupported element symbol: '{0}'")]
pub struct ParseElementError(String);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid bond order string: '{0}'")]
pub struct ParseBondOrderError(String);

/// Elements that occur in drug-like molecules and their common counter-ions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Element {
    H = 1,
    Li = 3,
    B = 5,
    C = 6,
    N = 7,
    O = 8,
    F = 9,
    Na = 11,
    Mg = 12,
    Al = 13,
    Si = 14,
    P = 15,
    S = 16,
    Cl = 17,
    K = 19,
    Ca = 20,
    Fe = 26,
    Cu = 29,
    Zn = 30,
    As = 33,
    Se = 34,
    Br = 35,
    Sn = 50,
    I = 53,
    Pt = 78,
}

struct ElementData {
    element: Element,
    symbol: &'static str,
    mass: f64,
    covalent_radius: f64,
    valences: &'static [u8],
}

#[rustfmt::skip]
const ELEMENT_TABLE: &[ElementData] = &[
    ElementData { element: Element::H,  symbol: "H",  mass: 1.008,   covalent_radius: 0.31, valences: &[1] },
    ElementData { element: Element::Li, symbol: "Li", mass: 6.94,    covalent_radius: 1.28, valences: &[] },
    ElementData { element: Element::B,  symbol: "B",  mass: 10.81,   covalent_radius: 0.84, valences: &[3] },
    ElementData { element: Element::C,  symbol: "C",  mass: 12.011,  covalent_radius: 0.76, valences: &[4] },
    ElementData { element: Element::N,  symbol: "N",  mass: 14.007,  covalent_radius: 0.71, valences: &[3, 5] },
    ElementData { element: Element::O,  symbol: "O",  mass: 15.999,  covalent_radius: 0.66, valences: &[2] },
    ElementData { element: Element::F,  symbol: "F",  mass: 18.998,  covalent_radius: 0.57, valences: &[1] },
    ElementData { element: Element::Na, symbol: "Na", mass: 22.99,   covalent_radius: 1.66, valences: &[] },
    ElementData { element: Element::Mg, symbol: "Mg", mass: 24.305,  covalent_radius: 1.41, valences: &[] },
    ElementData { element: Element::Al, symbol: "Al", mass: 26.982,  covalent_radius: 1.21, valences: &[] },
    ElementData { element: Element::Si, symbol: "Si", mass: 28.085,  covalent_radius: 1.11, valences: &[4] },
    ElementData { element: Element::P,  symbol: "P",  mass: 30.974,  covalent_radius: 1.07, valences: &[3, 5] },
    ElementData { element: Element::S,  symbol: "S",  mass: 32.06,   covalent_radius: 1.05, valences: &[2, 4, 6] },
    ElementData { element: Element::Cl, symbol: "Cl", mass: 35.45,   covalent_radius: 1.02, valences: &[1] },
    ElementData { element: Element::K,  symbol: "K",  mass: 39.098,  covalent_radius: 2.03, valences: &[] },
    ElementData { element: Element::Ca, symbol: "Ca", mass: 40.078,  covalent_radius: 1.76, valences: &[] },
    ElementData { element: Element::Fe, symbol: "Fe", mass: 55.845,  covalent_radius: 1.32, valences: &[] },
    ElementData { element: Element::Cu, symbol: "Cu", mass: 63.546,  covalent_radius: 1.32, valences: &[] },
    ElementData { element: Element::Zn, symbol: "Zn", mass: 65.38,   covalent_radius: 1.22, valences: &[] },
    ElementData { element: Element::As, symbol: "As", mass: 74.922,  covalent_radius: 1.19, valences: &[3, 5] },
    ElementData { element: Element::Se, symbol: "Se", mass: 78.971,  covalent_radius: 1.20, valences: &[2, 4, 6] },
    ElementData { element: Element::Br, symbol: "Br", mass: 79.904,  covalent_radius: 1.20, valences: &[1] },
    ElementData { element: Element::Sn, symbol: "Sn", mass: 118.71,  covalent_radius: 1.39, valences: &[] },
    ElementData { element: Element::I,  symbol: "I",  mass: 126.9,   covalent_radius: 1.39, valences: &[1] },
    ElementData { element: Element::Pt, symbol: "Pt", mass: 195.08,  covalent_radius: 1.36, valences: &[] },
];

impl Element {
    fn data(&self) -> &'static ElementData {
        ELEMENT_TABLE
            .iter()
            .find(|d| d.element == *self)
            .unwrap_or(&ELEMENT_TABLE[0])
    }

    pub fn symbol(&self) -> &'static str {
        self.data().symbol
    }

    #[inline]
    pub fn atomic_number(&self) -> u8 {
        *self as u8
    }

    pub fn atomic_mass(&self) -> f64 {
        self.data().mass
    }

    /// Single-bond covalent radius in Å.
    pub fn covalent_radius(&self) -> f64 {
        self.data().covalent_radius
    }

    /// Allowed neutral valences in ascending order; empty for elements that
    /// never receive implicit hydrogens.
    pub fn default_valences(&self) -> &'static [u8] {
        self.data().valences
    }

    /// Elements that may be written without brackets in SMILES.
    pub fn is_organic_subset(&self) -> bool {
        matches!(
            self,
            Element::B
                | Element::C
                | Element::N
                | Element::O
                | Element::P
                | Element::S
                | Element::F
                | Element::Cl
                | Element::Br
                | Element::I
        )
    }

    pub fn is_hydrogen(&self) -> bool {
        *self == Element::H
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Element {
    type Err = ParseElementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ELEMENT_TABLE
            .iter()
            .find(|d| d.symbol == s)
            .map(|d| d.element)
            .ok_or_else(|| ParseElementError(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BondOrder {
    Single,
    Double,
    Triple,
    Aromatic,
}

impl BondOrder {
    pub fn value(&self) -> f64 {
        match self {
            BondOrder::Single => 1.0,
            BondOrder::Double => 2.0,
            BondOrder::Triple => 3.0,
            BondOrder::Aromatic => 1.5,
        }
    }

    /// Integer contribution to the valence of a non-aromatic atom.
    pub fn valence_contribution(&self) -> u8 {
        match self {
            BondOrder::Single | BondOrder::Aromatic => 1,
            BondOrder::Double => 2,
            BondOrder::Triple => 3,
        }
    }

    pub fn from_ctfile(value: i32) -> Option<Self> {
        match value {
            1 => Some(BondOrder::Single),
            2 => Some(BondOrder::Double),
            3 => Some(BondOrder::Triple),
            4 => Some(BondOrder::Aromatic),
            _ => None,
        }
    }

    pub fn to_ctfile(self) -> i32 {
        match self {
            BondOrder::Single => 1,
            BondOrder::Double => 2,
            BondOrder::Triple => 3,
            BondOrder::Aromatic => 4,
        }
    }
}

impl fmt::Display for BondOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BondOrder::Single => write!(f, "Single"),
            BondOrder::Double => write!(f, "Double"),
            BondOrder::Triple => write!(f, "Triple"),
            BondOrder::Aromatic => write!(f, "Aromatic"),
        }
    }
}

impl FromStr for BondOrder {
    type Err = ParseBondOrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "single" | "1" => Ok(BondOrder::Single),
            "double" | "2" => Ok(BondOrder::Double),
            "triple" | "3" => Ok(BondOrder::Triple),
            "aromatic" | "ar" | "4" => Ok(BondOrder::Aromatic),
            _ => Err(ParseBondOrderError(s.to_string())),
        }
    }
}

/// Direction mark of a single bond next to a double bond, read from the
/// lower-indexed atom toward the higher one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BondDirection {
    /// Written as `/`.
    Up,
    /// Written as `\`.
    Down,
}

impl BondDirection {
    pub fn reversed(self) -> Self {
        match self {
            BondDirection::Up => BondDirection::Down,
            BondDirection::Down => BondDirection::Up,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BondDirection::Up => "/",
            BondDirection::Down => "\\",
        }
    }
}

/// Tetrahedral parity. Looking from the first neighbour, the other three
/// run anticlockwise (`@`) or clockwise (`@@`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Chirality {
    Anticlockwise,
    Clockwise,
}

impl Chirality {
    pub fn inverted(self) -> Self {
        match self {
            Chirality::Anticlockwise => Chirality::Clockwise,
            Chirality::Clockwise => Chirality::Anticlockwise,
        }
    }

    /// Re-expresses a parity given for neighbours listed as `keys` against
    /// the same neighbours in ascending key order.
    pub fn reorder(self, keys: &[usize]) -> Self {
        let inversions = (0..keys.len())
            .flat_map(|a| (a + 1..keys.len()).map(move |b| (a, b)))
            .filter(|&(a, b)| keys[a] > keys[b])
            .count();
        if inversions % 2 == 1 { self.inverted() } else { self }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Chirality::Anticlockwise => "@",
            Chirality::Clockwise => "@@",
        }
    }
}
