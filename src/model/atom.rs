use super::types::{Chirality, Element};

#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    pub element: Element,
    pub position: [f64; 3],
    pub formal_charge: i8,
    pub isotope: Option<u16>,
    pub aromatic: bool,
    /// Hydrogens attached to this atom that are not yet explicit atoms.
    pub implicit_hydrogens: u8,
    /// Parity against the neighbours in ascending index order, with an
    /// implicit hydrogen counted after all of them.
    pub chirality: Option<Chirality>,
}

impl Atom {
    pub fn new(element: Element, position: [f64; 3]) -> Self {
        Self {
            element,
            position,
            formal_charge: 0,
            isotope: None,
            aromatic: false,
            implicit_hydrogens: 0,
            chirality: None,
        }
    }

    pub fn with_charge(mut self, charge: i8) -> Self {
        self.formal_charge = charge;
        self
    }

    pub fn aromatic(mut self) -> Self {
        self.aromatic = true;
        self
    }
}
