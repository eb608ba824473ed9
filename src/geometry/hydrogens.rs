use crate::model::{
    atom::Atom,
    molecule::Molecule,
    types::{BondOrder, Element},
};

/// Turns implicit hydrogen counts into explicit hydrogen atoms.
///
/// New hydrogens are appended after the existing atoms and placed on their
/// parent, so heavy-atom indices are unchanged. Returns the number added.
pub fn add_explicit_hydrogens(mol: &mut Molecule) -> usize {
    let heavy = mol.atom_count();
    let mut added = 0;

    for parent in 0..heavy {
        let count = std::mem::take(&mut mol.atoms[parent].implicit_hydrogens);
        let position = mol.atoms[parent].position;
        for _ in 0..count {
            let h = mol.add_atom(Atom::new(Element::H, position));
            mol.add_bond(parent, h, BondOrder::Single);
            added += 1;
        }
    }
    added
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::smiles;

    #[test]
    fn ethanol_gets_six_hydrogens() {
        let mut mol = smiles::parse("CCO").unwrap();
        assert_eq!(add_explicit_hydrogens(&mut mol), 6);
        assert_eq!(mol.atom_count(), 9);
        assert_eq!(mol.bond_count(), 8);
        assert!(mol.atoms.iter().all(|a| a.implicit_hydrogens == 0));
        assert_eq!(mol.total_hydrogens(0), 3);
        assert_eq!(mol.total_hydrogens(2), 1);
    }

    #[test]
    fn second_call_is_a_no_op() {
        let mut mol = smiles::parse("C").unwrap();
        add_explicit_hydrogens(&mut mol);
        assert_eq!(add_explicit_hydrogens(&mut mol), 0);
        assert_eq!(mol.atom_count(), 5);
    }
}
