use crate::io::error::Error;
use crate::model::molecule::Molecule;
use std::io::Write;

/// Writes one V2000 record, including data items and the `$$$$` terminator.
pub fn write<W: Write>(mut writer: W, mol: &Molecule) -> Result<(), Error> {
    writeln!(writer, "{}", mol.name)?;
    writeln!(writer, "  b3clf         3D")?;
    writeln!(writer)?;
    writeln!(
        writer,
        "{:>3}{:>3}  0  0  0  0  0  0  0  0999 V2000",
        mol.atom_count(),
        mol.bond_count()
    )?;

    for atom in &mol.atoms {
        writeln!(
            writer,
            "{:>10.4}{:>10.4}{:>10.4} {:<3} 0{:>3}  0  0  0  0  0  0  0  0  0  0",
            atom.position[0],
            atom.position[1],
            atom.position[2],
            atom.element.symbol(),
            charge_code(atom.formal_charge)
        )?;
    }

    for bond in &mol.bonds {
        writeln!(
            writer,
            "{:>3}{:>3}{:>3}  0  0  0  0",
            bond.i + 1,
            bond.j + 1,
            bond.order.to_ctfile()
        )?;
    }

    let charged: Vec<(usize, i32)> = mol
        .atoms
        .iter()
        .enumerate()
        .filter(|(_, a)| a.formal_charge != 0)
        .map(|(i, a)| (i + 1, a.formal_charge as i32))
        .collect();
    write_property_lines(&mut writer, "CHG", &charged)?;

    let isotopes: Vec<(usize, i32)> = mol
        .atoms
        .iter()
        .enumerate()
        .filter_map(|(i, a)| a.isotope.map(|iso| (i + 1, iso as i32)))
        .collect();
    write_property_lines(&mut writer, "ISO", &isotopes)?;

    writeln!(writer, "M  END")?;

    for (key, value) in &mol.properties {
        writeln!(writer, "> <{key}>")?;
        writeln!(writer, "{value}")?;
        writeln!(writer)?;
    }

    writeln!(writer, "$$$$")?;
    Ok(())
}

/// Writes every molecule as consecutive records.
pub fn write_all<'a, W, I>(mut writer: W, molecules: I) -> Result<(), Error>
where
    W: Write,
    I: IntoIterator<Item = &'a Molecule>,
{
    for mol in molecules {
        write(&mut writer, mol)?;
    }
    writer.flush()?;
    Ok(())
}

fn charge_code(charge: i8) -> i32 {
    match charge {
        3 => 1,
        2 => 2,
        1 => 3,
        -1 => 5,
        -2 => 6,
        -3 => 7,
        _ => 0,
    }
}

fn write_property_lines<W: Write>(
    writer: &mut W,
    tag: &str,
    entries: &[(usize, i32)],
) -> Result<(), Error> {
    for chunk in entries.chunks(8) {
        write!(writer, "M  {tag}{:>3}", chunk.len())?;
        for (idx, value) in chunk {
            write!(writer, " {idx:>3} {value:>3}")?;
        }
        writeln!(writer)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::sdf::reader;
    use crate::model::{
        atom::Atom,
        types::{BondOrder, Element},
    };
    use std::io::Cursor;

    fn acetate() -> Molecule {
        let mut mol = Molecule::named("acetate");
        let c1 = mol.add_atom(Atom::new(Element::C, [0.0, 0.0, 0.0]));
        let c2 = mol.add_atom(Atom::new(Element::C, [1.5, 0.0, 0.0]));
        let o1 = mol.add_atom(Atom::new(Element::O, [2.1, 1.1, 0.0]));
        let o2 = mol.add_atom(Atom::new(Element::O, [2.1, -1.1, 0.0]).with_charge(-1));
        mol.add_bond(c1, c2, BondOrder::Single);
        mol.add_bond(c2, o1, BondOrder::Double);
        mol.add_bond(c2, o2, BondOrder::Single);
        mol.atoms[c1].isotope = Some(13);
        mol.set_property("SMILES", "CC(=O)[O-]");
        mol
    }

    #[test]
    fn records_survive_a_reread() {
        let mols = vec![acetate(), Molecule::named("empty")];
        let mut buf = Vec::new();
        write_all(&mut buf, &mols).unwrap();

        let records = reader::read_all(Cursor::new(buf)).unwrap();
        assert_eq!(records.len(), 2);

        let parsed = records[0].molecule.as_ref().unwrap();
        assert_eq!(parsed.name, "acetate");
        assert_eq!(parsed.bonds, mols[0].bonds);
        assert_eq!(parsed.atoms[3].formal_charge, -1);
        assert_eq!(parsed.atoms[0].isotope, Some(13));
        assert_eq!(parsed.property("SMILES"), Some("CC(=O)[O-]"));
        for (a, b) in mols[0].atoms.iter().zip(&parsed.atoms) {
            for k in 0..3 {
                assert!((a.position[k] - b.position[k]).abs() < 1e-4);
            }
        }
    }

    #[test]
    fn long_charge_lists_are_chunked() {
        let mut mol = Molecule::named("ions");
        for _ in 0..10 {
            mol.add_atom(Atom::new(Element::Na, [0.0; 3]).with_charge(1));
        }
        let mut buf = Vec::new();
        write(&mut buf, &mol).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text.matches("M  CHG").count(), 2);
        assert!(text.contains("M  CHG  8"));
        assert!(text.contains("M  CHG  2"));
    }
}
