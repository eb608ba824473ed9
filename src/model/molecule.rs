use super::atom::Atom;
use super::types::{BondDirection, BondOrder, Element};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Bond {
    pub i: usize,
    pub j: usize,
    pub order: BondOrder,
    /// `/` or `\` mark, read from `i` toward `j`.
    pub direction: Option<BondDirection>,
}

impl Bond {
    pub fn new(idx1: usize, idx2: usize, order: BondOrder) -> Self {
        let (i, j) = if idx1 <= idx2 { (idx1, idx2) } else { (idx2, idx1) };
        Self {
            i,
            j,
            order,
            direction: None,
        }
    }

    /// The direction mark as seen walking from `from` to the other end.
    pub fn direction_from(&self, from: usize) -> Option<BondDirection> {
        self.direction
            .map(|d| if from == self.i { d } else { d.reversed() })
    }

    /// Returns the atom on the other end of the bond, if `idx` is one end.
    pub fn partner(&self, idx: usize) -> Option<usize> {
        if self.i == idx {
            Some(self.j)
        } else if self.j == idx {
            Some(self.i)
        } else {
            None
        }
    }
}

/// Relative placement of one substituent on each end of a double bond.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DoubleBondStereo {
    pub a: usize,
    pub b: usize,
    /// Substituent on `a`.
    pub left: usize,
    /// Substituent on `b`.
    pub right: usize,
    pub cis: bool,
}

/// A named molecular graph with optional 3D coordinates and SDF data items.
#[derive(Debug, Clone, Default)]
pub struct Molecule {
    pub name: String,
    pub atoms: Vec<Atom>,
    pub bonds: Vec<Bond>,
    pub properties: Vec<(String, String)>,
}

impl Molecule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[inline]
    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    #[inline]
    pub fn bond_count(&self) -> usize {
        self.bonds.len()
    }

    pub fn heavy_atom_count(&self) -> usize {
        self.atoms.iter().filter(|a| !a.element.is_hydrogen()).count()
    }

    pub fn add_atom(&mut self, atom: Atom) -> usize {
        self.atoms.push(atom);
        self.atoms.len() - 1
    }

    pub fn add_bond(&mut self, i: usize, j: usize, order: BondOrder) {
        self.bonds.push(Bond::new(i, j, order));
    }

    /// Adds a bond whose direction mark was written walking from `from` to `to`.
    pub fn add_directed_bond(
        &mut self,
        from: usize,
        to: usize,
        order: BondOrder,
        direction: Option<BondDirection>,
    ) {
        let mut bond = Bond::new(from, to, order);
        bond.direction = direction.map(|d| if from == bond.i { d } else { d.reversed() });
        self.bonds.push(bond);
    }

    pub fn bond_between(&self, i: usize, j: usize) -> Option<&Bond> {
        let probe = Bond::new(i, j, BondOrder::Single);
        self.bonds.iter().find(|b| b.i == probe.i && b.j == probe.j)
    }

    /// Adjacency lists, one per atom, in bond order of appearance.
    pub fn adjacency(&self) -> Vec<Vec<usize>> {
        let mut adj = vec![Vec::new(); self.atoms.len()];
        for bond in &self.bonds {
            adj[bond.i].push(bond.j);
            adj[bond.j].push(bond.i);
        }
        adj
    }

    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn set_property(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.properties.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.properties.push((key, value)),
        }
    }

    /// True once any atom has been placed away from the origin.
    pub fn has_coordinates(&self) -> bool {
        self.atoms
            .iter()
            .any(|a| a.position.iter().any(|c| c.abs() > 1e-6))
    }

    /// Sum of bond valence contributions around `idx`, counting one extra
    /// electron for aromatic atoms that take part in aromatic bonds.
    pub fn explicit_valence(&self, idx: usize) -> u8 {
        let mut valence = 0u8;
        let mut aromatic_bonds = 0u8;
        for bond in self.bonds.iter().filter(|b| b.i == idx || b.j == idx) {
            valence += bond.order.valence_contribution();
            if bond.order == BondOrder::Aromatic {
                aromatic_bonds += 1;
            }
        }
        if self.atoms[idx].aromatic && aromatic_bonds > 0 {
            valence += 1;
        }
        valence
    }

    /// Hydrogens needed to satisfy the lowest allowed valence of atom `idx`
    /// given its formal charge and current bonds.
    pub fn default_implicit_hydrogens(&self, idx: usize) -> u8 {
        let atom = &self.atoms[idx];
        let explicit = self.explicit_valence(idx) as i16;
        let charge = atom.formal_charge as i16;

        atom.element
            .default_valences()
            .iter()
            .map(|&v| charge_adjusted_valence(atom.element, v as i16, charge))
            .find(|&target| target >= explicit)
            .map(|target| (target - explicit).clamp(0, u8::MAX as i16) as u8)
            .unwrap_or(0)
    }

    /// Total hydrogens on atom `idx`: explicit neighbours plus implicit count.
    pub fn total_hydrogens(&self, idx: usize) -> usize {
        let explicit = self
            .bonds
            .iter()
            .filter_map(|b| b.partner(idx))
            .filter(|&n| self.atoms[n].element.is_hydrogen())
            .count();
        explicit + self.atoms[idx].implicit_hydrogens as usize
    }

    /// Cis/trans relations encoded by direction marks around double bonds.
    ///
    /// Two substituents whose marks, read toward the double bond, agree
    /// are on the same side.
    pub fn double_bond_stereo(&self) -> Vec<DoubleBondStereo> {
        self.bonds
            .iter()
            .filter(|b| b.order == BondOrder::Double)
            .filter_map(|bond| {
                let (left, l_dir) = self.directed_substituent(bond.i, bond.j)?;
                let (right, r_dir) = self.directed_substituent(bond.j, bond.i)?;
                Some(DoubleBondStereo {
                    a: bond.i,
                    b: bond.j,
                    left,
                    right,
                    cis: l_dir == r_dir,
                })
            })
            .collect()
    }

    fn directed_substituent(&self, atom: usize, across: usize) -> Option<(usize, BondDirection)> {
        self.bonds
            .iter()
            .filter(|b| b.order == BondOrder::Single)
            .find_map(|b| {
                let n = b.partner(atom).filter(|&n| n != across)?;
                Some((n, b.direction_from(n)?))
            })
    }

    /// Connected components as sorted atom index lists.
    pub fn fragments(&self) -> Vec<Vec<usize>> {
        let adj = self.adjacency();
        let mut seen = vec![false; self.atoms.len()];
        let mut fragments = Vec::new();

        for start in 0..self.atoms.len() {
            if seen[start] {
                continue;
            }
            let mut stack = vec![start];
            let mut members = Vec::new();
            seen[start] = true;
            while let Some(idx) = stack.pop() {
                members.push(idx);
                for &n in &adj[idx] {
                    if !seen[n] {
                        seen[n] = true;
                        stack.push(n);
                    }
                }
            }
            members.sort_unstable();
            fragments.push(members);
        }
        fragments
    }
}

fn charge_adjusted_valence(element: Element, valence: i16, charge: i16) -> i16 {
    match element {
        Element::C | Element::Si => valence - charge.abs(),
        Element::B => valence - charge,
        _ => valence + charge,
    }
}
