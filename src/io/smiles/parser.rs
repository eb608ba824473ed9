use std::collections::BTreeMap;

use crate::io::error::Error;
use crate::model::{
    atom::Atom,
    molecule::Molecule,
    types::{BondDirection, BondOrder, Chirality, Element},
};

/// Parses a SMILES string into a heavy-atom graph with implicit hydrogen
/// counts filled in.
///
/// `/` and `\` marks are kept on their bonds and tetrahedral `@`/`@@` on
/// their atoms. Other chirality classes are accepted and dropped.
pub fn parse(smiles: &str) -> Result<Molecule, Error> {
    let trimmed = smiles.trim();
    if trimmed.is_empty() {
        return Err(Error::smiles(smiles, 0, "empty SMILES string"));
    }

    let mut parser = Parser::new(trimmed);
    parser.run()?;
    parser.finish()
}

struct RingOpening {
    atom: usize,
    order: Option<BondOrder>,
    direction: Option<BondDirection>,
    /// Index of the reserved entry in the opening atom's neighbour order.
    slot: usize,
    position: usize,
}

/// One entry in an atom's neighbour list as written.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Slot {
    Atom(usize),
    ImplicitHydrogen,
    OpenRing,
}

struct Parser<'a> {
    src: &'a str,
    chars: Vec<char>,
    pos: usize,
    mol: Molecule,
    prev: Option<usize>,
    branches: Vec<Option<usize>>,
    pending: Option<BondOrder>,
    pending_direction: Option<BondDirection>,
    rings: BTreeMap<u16, RingOpening>,
    bracket: Vec<bool>,
    written_order: Vec<Vec<Slot>>,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            chars: src.chars().collect(),
            pos: 0,
            mol: Molecule::new(),
            prev: None,
            branches: Vec::new(),
            pending: None,
            pending_direction: None,
            rings: BTreeMap::new(),
            bracket: Vec::new(),
            written_order: Vec::new(),
        }
    }

    fn err(&self, details: impl Into<String>) -> Error {
        Error::smiles(self.src, self.pos, details)
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn run(&mut self) -> Result<(), Error> {
        while let Some(c) = self.peek() {
            match c {
                '(' => {
                    if self.prev.is_none() {
                        return Err(self.err("branch opened before any atom"));
                    }
                    self.branches.push(self.prev);
                    self.pos += 1;
                }
                ')' => {
                    if self.pending.is_some() {
                        return Err(self.err("bond symbol before closing branch"));
                    }
                    self.prev = self
                        .branches
                        .pop()
                        .ok_or_else(|| self.err("unbalanced ')'"))?;
                    self.pos += 1;
                }
                '.' => {
                    if self.pending.is_some() {
                        return Err(self.err("bond symbol before '.'"));
                    }
                    self.prev = None;
                    self.pos += 1;
                }
                '-' => self.set_bond(BondOrder::Single, None)?,
                '/' => self.set_bond(BondOrder::Single, Some(BondDirection::Up))?,
                '\\' => self.set_bond(BondOrder::Single, Some(BondDirection::Down))?,
                '=' => self.set_bond(BondOrder::Double, None)?,
                '#' => self.set_bond(BondOrder::Triple, None)?,
                ':' => self.set_bond(BondOrder::Aromatic, None)?,
                '$' => return Err(self.err("quadruple bonds are not supported")),
                '%' => {
                    let d1 = self.peek_at(1).and_then(|d| d.to_digit(10));
                    let d2 = self.peek_at(2).and_then(|d| d.to_digit(10));
                    match (d1, d2) {
                        (Some(a), Some(b)) => {
                            self.pos += 3;
                            self.ring_bond((a * 10 + b) as u16)?;
                        }
                        _ => return Err(self.err("'%' must be followed by two digits")),
                    }
                }
                d if d.is_ascii_digit() => {
                    self.pos += 1;
                    self.ring_bond(d.to_digit(10).unwrap_or(0) as u16)?;
                }
                '[' => self.bracket_atom()?,
                '*' => return Err(self.err("wildcard atoms are not supported")),
                c if c.is_ascii_alphabetic() => self.organic_atom()?,
                c if c.is_whitespace() => break,
                other => return Err(self.err(format!("unexpected character '{other}'"))),
            }
        }
        Ok(())
    }

    fn set_bond(&mut self, order: BondOrder, direction: Option<BondDirection>) -> Result<(), Error> {
        if self.pending.is_some() {
            return Err(self.err("two consecutive bond symbols"));
        }
        if self.prev.is_none() {
            return Err(self.err("bond symbol without a preceding atom"));
        }
        self.pending = Some(order);
        self.pending_direction = direction;
        self.pos += 1;
        Ok(())
    }

    fn organic_atom(&mut self) -> Result<(), Error> {
        let c = self.peek().unwrap_or(' ');
        let next = self.peek_at(1);

        let (element, aromatic, width) = match (c, next) {
            ('C', Some('l')) => (Element::Cl, false, 2),
            ('B', Some('r')) => (Element::Br, false, 2),
            ('B', _) => (Element::B, false, 1),
            ('C', _) => (Element::C, false, 1),
            ('N', _) => (Element::N, false, 1),
            ('O', _) => (Element::O, false, 1),
            ('P', _) => (Element::P, false, 1),
            ('S', _) => (Element::S, false, 1),
            ('F', _) => (Element::F, false, 1),
            ('I', _) => (Element::I, false, 1),
            ('b', _) => (Element::B, true, 1),
            ('c', _) => (Element::C, true, 1),
            ('n', _) => (Element::N, true, 1),
            ('o', _) => (Element::O, true, 1),
            ('p', _) => (Element::P, true, 1),
            ('s', _) => (Element::S, true, 1),
            _ => return Err(self.err(format!("'{c}' is not an organic-subset atom"))),
        };
        self.pos += width;

        let mut atom = Atom::new(element, [0.0; 3]);
        atom.aromatic = aromatic;
        self.push_atom(atom, false)
    }

    fn bracket_atom(&mut self) -> Result<(), Error> {
        self.pos += 1;

        let isotope = self.read_number();

        let (element, aromatic) = self.bracket_symbol()?;

        // Chirality: @, @@, @TH1, @AL2, @SP3, @TB12, @OH25 ...
        let mut marks = 0;
        while self.peek() == Some('@') {
            marks += 1;
            self.pos += 1;
        }
        let mut chirality = match marks {
            1 => Some(Chirality::Anticlockwise),
            2 => Some(Chirality::Clockwise),
            _ => None,
        };
        if self.peek().is_some_and(|c| c.is_ascii_uppercase())
            && self.peek_at(1).is_some_and(|c| c.is_ascii_uppercase())
            && self.peek() != Some('H')
        {
            let tetrahedral = self.peek() == Some('T') && self.peek_at(1) == Some('H');
            self.pos += 2;
            let number = self.read_number();
            chirality = match (tetrahedral, number) {
                (true, Some(1)) => Some(Chirality::Anticlockwise),
                (true, Some(2)) => Some(Chirality::Clockwise),
                _ => None,
            };
        }

        let mut hydrogens = 0u8;
        if self.peek() == Some('H') {
            self.pos += 1;
            hydrogens = self.read_number().map(|n| n as u8).unwrap_or(1);
        }

        let mut charge: i32 = 0;
        if let Some(sign @ ('+' | '-')) = self.peek() {
            let unit = if sign == '+' { 1 } else { -1 };
            self.pos += 1;
            if let Some(n) = self.read_number() {
                charge = unit * n as i32;
            } else {
                charge = unit;
                while self.peek() == Some(sign) {
                    charge += unit;
                    self.pos += 1;
                }
            }
        }

        if self.peek() == Some(':') {
            self.pos += 1;
            if self.read_number().is_none() {
                return Err(self.err("atom class must be numeric"));
            }
        }

        if self.peek() != Some(']') {
            return Err(self.err("unterminated bracket atom"));
        }
        self.pos += 1;

        let charge = i8::try_from(charge).map_err(|_| self.err("formal charge out of range"))?;
        let mut atom = Atom::new(element, [0.0; 3]).with_charge(charge);
        atom.aromatic = aromatic;
        atom.isotope = isotope.map(|n| n as u16);
        atom.implicit_hydrogens = hydrogens;
        atom.chirality = chirality;
        self.push_atom(atom, true)
    }

    fn bracket_symbol(&mut self) -> Result<(Element, bool), Error> {
        let first = self.peek().ok_or_else(|| self.err("unterminated bracket atom"))?;
        let second = self.peek_at(1);

        if first.is_ascii_lowercase() {
            let two: Option<String> = second
                .filter(|c| c.is_ascii_lowercase())
                .map(|c| format!("{}{}", first.to_ascii_uppercase(), c));
            if let Some(sym) = two.filter(|s| s == "Se" || s == "As") {
                self.pos += 2;
                let element = sym.parse().map_err(|_| self.err("unknown element"))?;
                return Ok((element, true));
            }
            let sym = first.to_ascii_uppercase().to_string();
            let element: Element = sym
                .parse()
                .map_err(|_| self.err(format!("unknown aromatic element '{first}'")))?;
            self.pos += 1;
            return Ok((element, true));
        }

        if !first.is_ascii_uppercase() {
            return Err(self.err("expected element symbol in bracket atom"));
        }

        if let Some(c) = second.filter(|c| c.is_ascii_lowercase()) {
            let sym = format!("{first}{c}");
            if let Ok(element) = sym.parse::<Element>() {
                self.pos += 2;
                return Ok((element, false));
            }
        }

        let element: Element = first
            .to_string()
            .parse()
            .map_err(|_| self.err(format!("unknown element '{first}'")))?;
        self.pos += 1;
        Ok((element, false))
    }

    fn read_number(&mut self) -> Option<u32> {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.pos += 1;
        }
        if self.pos == start {
            return None;
        }
        self.chars[start..self.pos]
            .iter()
            .collect::<String>()
            .parse()
            .ok()
    }

    fn push_atom(&mut self, atom: Atom, bracket: bool) -> Result<(), Error> {
        let bracket_hydrogen = bracket && atom.implicit_hydrogens > 0;
        let idx = self.mol.add_atom(atom);
        self.bracket.push(bracket);
        self.written_order.push(Vec::new());

        if let Some(prev) = self.prev {
            let order = self
                .pending
                .take()
                .unwrap_or_else(|| self.default_order(prev, idx));
            let direction = self.pending_direction.take();
            self.mol.add_directed_bond(prev, idx, order, direction);
            self.written_order[prev].push(Slot::Atom(idx));
            self.written_order[idx].push(Slot::Atom(prev));
        }
        // A bracket hydrogen follows the preceding atom in neighbour order.
        if bracket_hydrogen {
            self.written_order[idx].push(Slot::ImplicitHydrogen);
        }
        self.prev = Some(idx);
        Ok(())
    }

    fn default_order(&self, a: usize, b: usize) -> BondOrder {
        if self.mol.atoms[a].aromatic && self.mol.atoms[b].aromatic {
            BondOrder::Aromatic
        } else {
            BondOrder::Single
        }
    }

    fn ring_bond(&mut self, label: u16) -> Result<(), Error> {
        let current = self
            .prev
            .ok_or_else(|| self.err("ring closure without a preceding atom"))?;
        let order = self.pending.take();
        let direction = self.pending_direction.take();

        match self.rings.remove(&label) {
            None => {
                let slot = self.written_order[current].len();
                self.written_order[current].push(Slot::OpenRing);
                self.rings.insert(
                    label,
                    RingOpening {
                        atom: current,
                        order,
                        direction,
                        slot,
                        position: self.pos,
                    },
                );
            }
            Some(open) => {
                if open.atom == current {
                    return Err(self.err("ring closure bonds an atom to itself"));
                }
                if self.mol.bond_between(open.atom, current).is_some() {
                    return Err(self.err("ring closure duplicates an existing bond"));
                }
                let order = match (open.order, order) {
                    (Some(a), Some(b)) if a != b => {
                        return Err(self.err("conflicting ring closure bond orders"));
                    }
                    (Some(a), _) | (None, Some(a)) => a,
                    (None, None) => self.default_order(open.atom, current),
                };
                match (open.direction, direction) {
                    (Some(d), _) => self.mol.add_directed_bond(open.atom, current, order, Some(d)),
                    (None, d) => self.mol.add_directed_bond(current, open.atom, order, d),
                }
                self.written_order[open.atom][open.slot] = Slot::Atom(current);
                self.written_order[current].push(Slot::Atom(open.atom));
            }
        }
        Ok(())
    }

    fn finish(mut self) -> Result<Molecule, Error> {
        if self.pending.is_some() {
            return Err(self.err("dangling bond symbol"));
        }
        if !self.branches.is_empty() {
            return Err(self.err("unclosed branch"));
        }
        if let Some((label, open)) = self.rings.iter().next() {
            return Err(Error::smiles(
                self.src,
                open.position,
                format!("ring bond {label} never closed"),
            ));
        }
        if self.mol.atoms.is_empty() {
            return Err(self.err("no atoms"));
        }

        for idx in 0..self.mol.atom_count() {
            if !self.bracket[idx] {
                self.mol.atoms[idx].implicit_hydrogens = self.mol.default_implicit_hydrogens(idx);
            }
            check_valence(&self.mol, idx).map_err(|details| Error::smiles(self.src, 0, details))?;
            self.normalize_chirality(idx);
        }

        Ok(self.mol)
    }

    /// Rewrites a parity read in written order against ascending neighbour
    /// indices. Centres without exactly four neighbours lose the mark.
    fn normalize_chirality(&mut self, idx: usize) {
        let atom = &self.mol.atoms[idx];
        let Some(tag) = atom.chirality else {
            return;
        };
        let written = &self.written_order[idx];
        let neighbours = written.iter().filter(|s| matches!(s, Slot::Atom(_))).count();
        let tetrahedral = written.len() == 4 && neighbours + atom.implicit_hydrogens as usize == 4;

        let keys: Vec<usize> = written
            .iter()
            .map(|slot| match slot {
                Slot::Atom(n) => *n,
                Slot::ImplicitHydrogen | Slot::OpenRing => usize::MAX,
            })
            .collect();
        self.mol.atoms[idx].chirality = tetrahedral.then(|| tag.reorder(&keys));
    }
}

fn check_valence(mol: &Molecule, idx: usize) -> Result<(), String> {
    let atom = &mol.atoms[idx];
    let valences = atom.element.default_valences();
    if valences.is_empty() {
        return Ok(());
    }
    let used = mol.explicit_valence(idx) as i16 + atom.implicit_hydrogens as i16;
    let charge = atom.formal_charge as i16;
    // Aromatic O, S and [nH] donate a lone pair to the ring.
    let slack = i16::from(atom.aromatic);
    let max = valences
        .iter()
        .map(|&v| v as i16 + charge.abs() + slack)
        .max()
        .unwrap_or(0);
    if used > max {
        Err(format!(
            "explicit valence {used} exceeds the maximum for {} (atom {})",
            atom.element,
            idx + 1
        ))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hydrogens(mol: &Molecule) -> Vec<u8> {
        mol.atoms.iter().map(|a| a.implicit_hydrogens).collect()
    }

    #[test]
    fn parses_ethanol() {
        let mol = parse("CCO").unwrap();
        assert_eq!(mol.atom_count(), 3);
        assert_eq!(mol.bond_count(), 2);
        assert_eq!(hydrogens(&mol), vec![3, 2, 1]);
    }

    #[test]
    fn parses_branches_and_multiple_bonds() {
        let mol = parse("CC(=O)O").unwrap();
        assert_eq!(mol.atom_count(), 4);
        let carbonyl = mol.bond_between(1, 2).unwrap();
        assert_eq!(carbonyl.order, BondOrder::Double);
        assert_eq!(hydrogens(&mol), vec![3, 0, 0, 1]);
    }

    #[test]
    fn parses_aromatic_ring_closures() {
        let mol = parse("c1ccccc1O").unwrap();
        assert_eq!(mol.atom_count(), 7);
        assert_eq!(mol.bond_count(), 7);
        assert_eq!(mol.bond_between(0, 5).unwrap().order, BondOrder::Aromatic);
        assert_eq!(mol.atoms[5].implicit_hydrogens, 0);
        assert_eq!(mol.atoms[0].implicit_hydrogens, 1);
        assert_eq!(mol.bond_between(5, 6).unwrap().order, BondOrder::Single);
    }

    #[test]
    fn parses_heteroaromatic_rings() {
        let furan = parse("c1ccoc1").unwrap();
        assert_eq!(furan.atoms[3].implicit_hydrogens, 0);
        let pyrrole = parse("c1cc[nH]c1").unwrap();
        assert_eq!(pyrrole.atoms[3].implicit_hydrogens, 1);
    }

    #[test]
    fn parses_bracket_atoms() {
        let mol = parse("[NH4+].[Cl-]").unwrap();
        assert_eq!(mol.atoms[0].formal_charge, 1);
        assert_eq!(mol.atoms[0].implicit_hydrogens, 4);
        assert_eq!(mol.atoms[1].formal_charge, -1);
        assert_eq!(mol.atoms[1].implicit_hydrogens, 0);
        assert_eq!(mol.fragments().len(), 2);
    }

    #[test]
    fn parses_isotopes_and_stereo() {
        let mol = parse("[13CH3][C@@H](N)C(=O)O").unwrap();
        assert_eq!(mol.atoms[0].isotope, Some(13));
        assert_eq!(mol.atoms[1].implicit_hydrogens, 1);
        assert_eq!(mol.atoms[1].chirality, Some(Chirality::Clockwise));
        assert_eq!(mol.atom_count(), 6);
    }

    #[test]
    fn chirality_is_stored_against_ascending_neighbours() {
        // Written order F, H, Cl, Br is already ascending with H last.
        let plain = parse("F[C@H](Cl)Br").unwrap();
        assert_eq!(plain.atoms[1].chirality, Some(Chirality::Anticlockwise));

        // Leading hydrogen: H, F, Cl, Br is one cyclic shift of four.
        let leading = parse("[C@H](F)(Cl)Br").unwrap();
        assert_eq!(leading.atoms[0].chirality, Some(Chirality::Clockwise));

        // Ring closure digits take the place where they are written.
        let ring = parse("[C@@]1(F)(Cl)CC1").unwrap();
        assert_eq!(ring.atoms[0].chirality, Some(Chirality::Anticlockwise));

        assert_eq!(parse("F[C@TH2H](Cl)Br").unwrap().atoms[1].chirality, Some(Chirality::Clockwise));
        assert_eq!(parse("F[C@SP1H](Cl)Br").unwrap().atoms[1].chirality, None);
        assert_eq!(parse("[C@H2](F)Cl").unwrap().atoms[0].chirality, None);
    }

    #[test]
    fn direction_marks_encode_cis_and_trans() {
        let trans = parse("F/C=C/F").unwrap();
        let cis = parse("F/C=C\\F").unwrap();
        let branched_cis = parse("C(/F)=C/F").unwrap();

        assert_eq!(trans.bond_between(0, 1).unwrap().direction, Some(BondDirection::Up));
        assert!(!trans.double_bond_stereo()[0].cis);
        assert!(cis.double_bond_stereo()[0].cis);
        assert!(branched_cis.double_bond_stereo()[0].cis);
        assert!(parse("FC=CF").unwrap().double_bond_stereo().is_empty());
    }

    #[test]
    fn parses_two_digit_ring_labels() {
        let mol = parse("C%10CCCCC%10").unwrap();
        assert_eq!(mol.bond_count(), 6);
    }

    #[test]
    fn rejects_malformed_input() {
        for bad in ["", "C1CC", "C(C", "CC)", "C==C", "[Xx]", "C(C)(C)(C)(C)C", "c1cc*cc1"] {
            assert!(parse(bad).is_err(), "expected failure for {bad:?}");
        }
    }

    #[test]
    fn error_reports_position() {
        let err = parse("CC(C").unwrap_err();
        assert!(err.to_string().contains("unclosed branch"));
    }
}
