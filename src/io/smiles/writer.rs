use std::collections::{BTreeSet, HashMap};
use std::fmt::Write as _;

use crate::model::{
    atom::Atom,
    molecule::Molecule,
    types::{BondOrder, Chirality, Element},
};

/// Writes a deterministic SMILES string for `mol`.
///
/// Hydrogens attached to exactly one heavy atom are folded into their
/// neighbour's hydrogen count. Atoms are ranked by iterated neighbourhood
/// refinement, so the same graph gives the same string regardless of input
/// atom order up to ties between symmetry-equivalent atoms. Bond direction
/// marks and tetrahedral parity are written back out.
pub fn write(mol: &Molecule) -> String {
    let skeleton = heavy_skeleton(mol);
    if skeleton.atoms.is_empty() {
        return String::new();
    }

    let ranks = rank_atoms(&skeleton);
    let adjacency = sorted_adjacency(&skeleton, &ranks);

    let mut order: Vec<usize> = (0..skeleton.atom_count()).collect();
    order.sort_by_key(|&i| (ranks[i], i));

    let mut walk = Walk {
        mol: &skeleton,
        adjacency: &adjacency,
        visited: vec![false; skeleton.atom_count()],
        children: vec![Vec::new(); skeleton.atom_count()],
        closures: vec![Vec::new(); skeleton.atom_count()],
    };

    let mut roots = Vec::new();
    for &start in &order {
        if !walk.visited[start] {
            walk.explore(start, None);
            roots.push(start);
        }
    }

    let mut emitter = Emitter {
        walk: &walk,
        out: String::new(),
        open: HashMap::new(),
        free: BTreeSet::new(),
        next_digit: 1,
    };
    for (n, &root) in roots.iter().enumerate() {
        if n > 0 {
            emitter.out.push('.');
        }
        emitter.emit(root, None);
    }
    emitter.out
}

fn heavy_skeleton(mol: &Molecule) -> Molecule {
    let folded: Vec<bool> = (0..mol.atom_count())
        .map(|i| {
            let atom = &mol.atoms[i];
            if !atom.element.is_hydrogen() || atom.isotope.is_some() || atom.formal_charge != 0 {
                return false;
            }
            let neighbours: Vec<usize> = mol.bonds.iter().filter_map(|b| b.partner(i)).collect();
            neighbours.len() == 1 && !mol.atoms[neighbours[0]].element.is_hydrogen()
        })
        .collect();

    let mut remap = vec![usize::MAX; mol.atom_count()];
    let mut skeleton = Molecule::named(mol.name.clone());
    for (i, atom) in mol.atoms.iter().enumerate() {
        if folded[i] {
            continue;
        }
        let mut kept = atom.clone();
        kept.implicit_hydrogens = mol.total_hydrogens(i).min(u8::MAX as usize) as u8;
        kept.implicit_hydrogens -= mol
            .bonds
            .iter()
            .filter_map(|b| b.partner(i))
            .filter(|&n| mol.atoms[n].element.is_hydrogen() && !folded[n])
            .count()
            .min(kept.implicit_hydrogens as usize) as u8;
        remap[i] = skeleton.add_atom(kept);
    }
    for bond in &mol.bonds {
        if remap[bond.i] != usize::MAX && remap[bond.j] != usize::MAX {
            // Kept atoms keep their relative order, so the mark stays low-to-high.
            skeleton.add_directed_bond(remap[bond.i], remap[bond.j], bond.order, bond.direction);
        }
    }

    // Folded hydrogens become the implicit hydrogen, which sorts last.
    for (i, atom) in mol.atoms.iter().enumerate() {
        let (Some(tag), false) = (atom.chirality, folded[i]) else {
            continue;
        };
        let mut neighbours: Vec<usize> = mol.bonds.iter().filter_map(|b| b.partner(i)).collect();
        neighbours.sort_unstable();
        let mut keys: Vec<usize> = neighbours
            .iter()
            .map(|&n| if folded[n] { usize::MAX } else { remap[n] })
            .collect();
        keys.extend(std::iter::repeat_n(usize::MAX, atom.implicit_hydrogens as usize));
        skeleton.atoms[remap[i]].chirality = Some(tag.reorder(&keys));
    }
    skeleton
}

fn rank_atoms(mol: &Molecule) -> Vec<usize> {
    let adjacency = mol.adjacency();
    let invariants: Vec<_> = mol
        .atoms
        .iter()
        .enumerate()
        .map(|(i, a)| {
            (
                a.element.atomic_number(),
                adjacency[i].len(),
                a.implicit_hydrogens,
                a.formal_charge,
                a.aromatic,
                a.isotope.unwrap_or(0),
            )
        })
        .collect();
    let mut ranks = dense_ranks(&invariants);

    for _ in 0..mol.atom_count() {
        let keys: Vec<(usize, Vec<(usize, u8)>)> = (0..mol.atom_count())
            .map(|i| {
                let mut around: Vec<(usize, u8)> = mol
                    .bonds
                    .iter()
                    .filter_map(|b| b.partner(i).map(|n| (ranks[n], order_code(b.order))))
                    .collect();
                around.sort_unstable();
                (ranks[i], around)
            })
            .collect();
        let refined = dense_ranks(&keys);
        let classes = |r: &[usize]| r.iter().collect::<BTreeSet<_>>().len();
        if classes(&refined) == classes(&ranks) {
            break;
        }
        ranks = refined;
    }
    ranks
}

fn dense_ranks<T: Ord + Clone>(keys: &[T]) -> Vec<usize> {
    let distinct: BTreeSet<T> = keys.iter().cloned().collect();
    let lookup: Vec<T> = distinct.into_iter().collect();
    keys.iter()
        .map(|k| lookup.binary_search(k).unwrap_or(0))
        .collect()
}

fn order_code(order: BondOrder) -> u8 {
    match order {
        BondOrder::Single => 1,
        BondOrder::Double => 2,
        BondOrder::Triple => 3,
        BondOrder::Aromatic => 4,
    }
}

fn sorted_adjacency(mol: &Molecule, ranks: &[usize]) -> Vec<Vec<usize>> {
    let mut adjacency = mol.adjacency();
    for list in &mut adjacency {
        list.sort_by_key(|&n| (ranks[n], n));
    }
    adjacency
}

struct Walk<'a> {
    mol: &'a Molecule,
    adjacency: &'a [Vec<usize>],
    visited: Vec<bool>,
    children: Vec<Vec<usize>>,
    closures: Vec<Vec<usize>>,
}

impl Walk<'_> {
    fn explore(&mut self, atom: usize, parent: Option<usize>) {
        self.visited[atom] = true;
        let neighbours = self.adjacency[atom].clone();
        for next in neighbours {
            if Some(next) == parent {
                continue;
            }
            if self.visited[next] {
                if !self.closures[atom].contains(&next) && !self.children[next].contains(&atom) {
                    self.closures[atom].push(next);
                    self.closures[next].push(atom);
                }
                continue;
            }
            self.children[atom].push(next);
            self.explore(next, Some(atom));
        }
    }
}

struct Emitter<'a> {
    walk: &'a Walk<'a>,
    out: String,
    open: HashMap<(usize, usize), u32>,
    free: BTreeSet<u32>,
    next_digit: u32,
}

impl Emitter<'_> {
    fn emit(&mut self, atom: usize, parent: Option<usize>) {
        let mol = self.walk.mol;
        let chirality = mol.atoms[atom]
            .chirality
            .map(|tag| tag.reorder(&self.written_neighbours(atom, parent)));
        self.out.push_str(&atom_symbol(mol, atom, chirality));

        for &partner in &self.walk.closures[atom] {
            let key = (atom.min(partner), atom.max(partner));
            match self.open.remove(&key) {
                Some(digit) => {
                    push_ring_digit(&mut self.out, digit);
                    self.free.insert(digit);
                }
                None => {
                    let digit = self.take_digit();
                    self.out.push_str(bond_symbol(mol, atom, partner));
                    push_ring_digit(&mut self.out, digit);
                    self.open.insert(key, digit);
                }
            }
        }

        let children = &self.walk.children[atom];
        for (n, &child) in children.iter().enumerate() {
            let branch = n + 1 < children.len();
            if branch {
                self.out.push('(');
            }
            self.out.push_str(bond_symbol(mol, atom, child));
            self.emit(child, Some(atom));
            if branch {
                self.out.push(')');
            }
        }
    }

    /// Neighbours of `atom` in the order they appear in the output, with
    /// `usize::MAX` standing for a bracket hydrogen.
    fn written_neighbours(&self, atom: usize, parent: Option<usize>) -> Vec<usize> {
        let mut keys: Vec<usize> = parent.into_iter().collect();
        if self.walk.mol.atoms[atom].implicit_hydrogens > 0 {
            keys.push(usize::MAX);
        }
        keys.extend(&self.walk.closures[atom]);
        keys.extend(&self.walk.children[atom]);
        keys
    }

    fn take_digit(&mut self) -> u32 {
        if let Some(&digit) = self.free.iter().next() {
            self.free.remove(&digit);
            return digit;
        }
        let digit = self.next_digit;
        self.next_digit += 1;
        digit
    }
}

fn push_ring_digit(out: &mut String, digit: u32) {
    if digit < 10 {
        let _ = write!(out, "{digit}");
    } else {
        let _ = write!(out, "%{digit:02}");
    }
}

fn bond_symbol(mol: &Molecule, a: usize, b: usize) -> &'static str {
    let Some(bond) = mol.bond_between(a, b) else {
        return "";
    };
    if let Some(direction) = bond.direction_from(a) {
        return direction.symbol();
    }
    let both_aromatic = mol.atoms[a].aromatic && mol.atoms[b].aromatic;
    match bond.order {
        BondOrder::Double => "=",
        BondOrder::Triple => "#",
        BondOrder::Aromatic if !both_aromatic => ":",
        BondOrder::Single if both_aromatic => "-",
        _ => "",
    }
}

fn atom_symbol(mol: &Molecule, idx: usize, chirality: Option<Chirality>) -> String {
    let atom = &mol.atoms[idx];
    let symbol = element_text(atom);

    let bare = atom.element.is_organic_subset()
        && chirality.is_none()
        && atom.formal_charge == 0
        && atom.isotope.is_none()
        && atom.implicit_hydrogens == mol.default_implicit_hydrogens(idx);
    if bare {
        return symbol;
    }

    let mut text = String::from("[");
    if let Some(isotope) = atom.isotope {
        let _ = write!(text, "{isotope}");
    }
    text.push_str(&symbol);
    if let Some(tag) = chirality {
        text.push_str(tag.symbol());
    }
    match atom.implicit_hydrogens {
        0 => {}
        1 => text.push('H'),
        n => {
            let _ = write!(text, "H{n}");
        }
    }
    match atom.formal_charge {
        0 => {}
        1 => text.push('+'),
        -1 => text.push('-'),
        q if q > 0 => {
            let _ = write!(text, "+{q}");
        }
        q => {
            let _ = write!(text, "-{}", -q);
        }
    }
    text.push(']');
    text
}

fn element_text(atom: &Atom) -> String {
    let symbol = atom.element.symbol();
    if atom.aromatic && atom.element != Element::H {
        symbol.to_ascii_lowercase()
    } else {
        symbol.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::smiles::parser::parse;

    fn roundtrip(smiles: &str) -> String {
        write(&parse(smiles).unwrap())
    }

    #[test]
    fn writes_simple_chain() {
        let written = roundtrip("OCC");
        assert_eq!(written.len(), 3);
        let reparsed = parse(&written).unwrap();
        assert_eq!(reparsed.atom_count(), 3);
    }

    #[test]
    fn atom_order_does_not_change_output() {
        assert_eq!(roundtrip("OCC"), roundtrip("CCO"));
        assert_eq!(roundtrip("CC(=O)O"), roundtrip("OC(C)=O"));
        assert_eq!(roundtrip("c1ccccc1O"), roundtrip("Oc1ccccc1"));
    }

    #[test]
    fn writes_charges_and_brackets() {
        let written = roundtrip("[NH4+].[Cl-]");
        assert!(written.contains("[NH4+]"));
        assert!(written.contains("[Cl-]"));
        assert!(written.contains('.'));
    }

    #[test]
    fn ring_closures_survive_reparse() {
        let written = roundtrip("C1CCC2CCCCC2C1");
        let reparsed = parse(&written).unwrap();
        assert_eq!(reparsed.atom_count(), 10);
        assert_eq!(reparsed.bond_count(), 11);
    }

    #[test]
    fn double_bond_marks_survive_a_rewrite() {
        let trans = roundtrip("F/C=C/F");
        let cis = roundtrip("F/C=C\\F");
        assert_ne!(trans, cis);
        assert!(trans.contains('/') || trans.contains('\\'));
        assert!(!parse(&trans).unwrap().double_bond_stereo()[0].cis);
        assert!(parse(&cis).unwrap().double_bond_stereo()[0].cis);
    }

    #[test]
    fn tetrahedral_parity_survives_a_rewrite() {
        let l = roundtrip("N[C@@H](C)C(=O)O");
        let d = roundtrip("N[C@H](C)C(=O)O");
        assert!(l.contains('@'));
        assert_ne!(l, d);
        // Rewriting the output reads the centre back the same way.
        assert_eq!(roundtrip(&l), l);
        assert_eq!(roundtrip(&d), d);
        assert_eq!(roundtrip("C[C@H](N)C(=O)O"), l);
    }

    #[test]
    fn parity_is_kept_when_hydrogens_are_folded() {
        let mut mol = parse("F[C@H](Cl)Br").unwrap();
        crate::geometry::add_explicit_hydrogens(&mut mol);
        assert_eq!(write(&mol), roundtrip("F[C@H](Cl)Br"));
    }

    #[test]
    fn folds_explicit_hydrogens() {
        let mut mol = parse("C").unwrap();
        mol.atoms[0].implicit_hydrogens = 0;
        for _ in 0..4 {
            let h = mol.add_atom(Atom::new(Element::H, [0.0; 3]));
            mol.add_bond(0, h, BondOrder::Single);
        }
        assert_eq!(write(&mol), "C");
    }
}
