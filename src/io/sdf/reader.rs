use crate::io::{Format, error::Error};
use crate::model::{
    atom::Atom,
    molecule::{Bond, Molecule},
    types::{BondOrder, Element},
};
use std::io::BufRead;

/// One `$$$$`-terminated block of an SD file.
///
/// Parsing failures are kept per record so that one broken entry does not
/// abort the rest of the file.
#[derive(Debug)]
pub struct SdfRecord {
    /// Zero-based position in the file.
    pub index: usize,
    /// Title line as written, trimmed.
    pub title: String,
    pub molecule: Result<Molecule, Error>,
}

/// Reads the first record, failing if it cannot be parsed.
pub fn read<R: BufRead>(reader: R) -> Result<Molecule, Error> {
    let blocks = collect_blocks(reader)?;
    let first = blocks
        .first()
        .ok_or_else(|| Error::parse(Format::Sdf, 1, "no records found"))?;
    parse_block(first)
}

/// Reads every record of a multi-molecule SD file.
pub fn read_all<R: BufRead>(reader: R) -> Result<Vec<SdfRecord>, Error> {
    let blocks = collect_blocks(reader)?;
    Ok(blocks
        .iter()
        .enumerate()
        .map(|(index, block)| SdfRecord {
            index,
            title: block
                .first()
                .map(|(_, l)| l.trim().to_string())
                .unwrap_or_default(),
            molecule: parse_block(block),
        })
        .collect())
}

fn collect_blocks<R: BufRead>(reader: R) -> Result<Vec<Vec<(usize, String)>>, Error> {
    let mut blocks = Vec::new();
    let mut current = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let content = line.map_err(|e| Error::Io { source: e })?;
        if content.trim() == "$$$$" {
            blocks.push(std::mem::take(&mut current));
            continue;
        }
        current.push((i + 1, content));
    }
    if current.iter().any(|(_, l)| !l.trim().is_empty()) {
        blocks.push(current);
    }
    Ok(blocks)
}

fn parse_block(lines: &[(usize, String)]) -> Result<Molecule, Error> {
    if lines.len() < 4 {
        return Err(Error::parse(
            Format::Sdf,
            lines.first().map(|(ln, _)| *ln).unwrap_or(1),
            "SDF block must contain at least a header and counts line",
        ));
    }

    let counts_line_no = lines[3].0;
    let counts_line = &lines[3].1;
    if counts_line.contains("V3000") {
        return Err(Error::parse(
            Format::Sdf,
            counts_line_no,
            "V3000 is not supported",
        ));
    }

    let (atom_count, bond_count) = parse_counts(counts_line, counts_line_no)?;
    let atom_start = 4;
    let bond_start = atom_start + atom_count;
    let props_start = bond_start + bond_count;

    if lines.len() < props_start {
        return Err(Error::parse(
            Format::Sdf,
            lines.last().map(|(ln, _)| *ln).unwrap_or(counts_line_no),
            "SDF block ended before atoms/bonds were fully specified",
        ));
    }

    let mut mol = Molecule::named(lines[0].1.trim());
    mol.atoms = parse_atoms(&lines[atom_start..bond_start])?;
    mol.bonds = parse_bonds(&lines[bond_start..props_start], atom_count)?;

    for bond in &mol.bonds {
        if bond.order == BondOrder::Aromatic {
            mol.atoms[bond.i].aromatic = true;
            mol.atoms[bond.j].aromatic = true;
        }
    }

    let data_start = parse_property_block(&lines[props_start..], &mut mol)?;
    parse_data_items(&lines[props_start + data_start..], &mut mol);

    for idx in 0..mol.atom_count() {
        mol.atoms[idx].implicit_hydrogens = mol.default_implicit_hydrogens(idx);
    }

    Ok(mol)
}

fn parse_counts(line: &str, line_no: usize) -> Result<(usize, usize), Error> {
    let field = |range: std::ops::Range<usize>| line.get(range).map(str::trim);
    // Fixed-width first, whitespace split as a fallback for sloppy writers.
    let fixed = field(0..3)
        .zip(field(3..6))
        .and_then(|(a, b)| Some((a.parse().ok()?, b.parse().ok()?)));
    if let Some(counts) = fixed {
        return Ok(counts);
    }

    let tokens: Vec<_> = line.split_whitespace().collect();
    if tokens.len() < 2 {
        return Err(Error::parse(
            Format::Sdf,
            line_no,
            "counts line must contain atom and bond counts",
        ));
    }
    let atoms = tokens[0]
        .parse::<usize>()
        .map_err(|_| Error::parse(Format::Sdf, line_no, "invalid atom count"))?;
    let bonds = tokens[1]
        .parse::<usize>()
        .map_err(|_| Error::parse(Format::Sdf, line_no, "invalid bond count"))?;
    Ok((atoms, bonds))
}

fn parse_atoms(lines: &[(usize, String)]) -> Result<Vec<Atom>, Error> {
    let mut atoms = Vec::with_capacity(lines.len());
    for (ln, raw) in lines {
        let coord = |range: std::ops::Range<usize>, axis: &str| {
            column(raw, range).parse::<f64>().map_err(|_| {
                Error::parse(Format::Sdf, *ln, format!("invalid {axis} coordinate in atom line"))
            })
        };
        let x = coord(0..10, "x")?;
        let y = coord(10..20, "y")?;
        let z = coord(20..30, "z")?;

        let symbol = column(raw, 31..34);
        let element: Element = symbol.parse().map_err(|_| {
            Error::parse(Format::Sdf, *ln, format!("unknown element symbol '{symbol}'"))
        })?;

        let charge = match column(raw, 36..39) {
            "1" => 3,
            "2" => 2,
            "3" => 1,
            "5" => -1,
            "6" => -2,
            "7" => -3,
            _ => 0,
        };

        atoms.push(Atom::new(element, [x, y, z]).with_charge(charge));
    }
    Ok(atoms)
}

fn parse_bonds(lines: &[(usize, String)], atom_count: usize) -> Result<Vec<Bond>, Error> {
    let mut bonds = Vec::with_capacity(lines.len());
    for (ln, raw) in lines {
        let field = |range: std::ops::Range<usize>, what: &str| {
            column(raw, range)
                .parse::<i32>()
                .map_err(|_| Error::parse(Format::Sdf, *ln, format!("invalid {what} in bond line")))
        };
        let a1 = field(0..3, "first atom index")?;
        let a2 = field(3..6, "second atom index")?;
        let order_val = field(6..9, "bond order value")?;

        let order = BondOrder::from_ctfile(order_val)
            .ok_or_else(|| Error::parse(Format::Sdf, *ln, "unsupported bond order in bond line"))?;

        if a1 <= 0 || a2 <= 0 || a1 as usize > atom_count || a2 as usize > atom_count {
            return Err(Error::parse(
                Format::Sdf,
                *ln,
                "bond references atom outside declared range",
            ));
        }

        bonds.push(Bond::new(a1 as usize - 1, a2 as usize - 1, order));
    }
    Ok(bonds)
}

fn column(line: &str, range: std::ops::Range<usize>) -> &str {
    let end = range.end.min(line.len());
    line.get(range.start.min(end)..end).unwrap_or("").trim()
}

/// Applies `M  CHG` / `M  ISO` lines and returns the offset just past `M  END`.
fn parse_property_block(lines: &[(usize, String)], mol: &mut Molecule) -> Result<usize, Error> {
    for (offset, (ln, raw)) in lines.iter().enumerate() {
        let line = raw.trim_end();
        if line.starts_with("M  END") {
            return Ok(offset + 1);
        }
        if line.starts_with('>') {
            return Ok(offset);
        }

        let is_chg = line.starts_with("M  CHG");
        let is_iso = line.starts_with("M  ISO");
        if !is_chg && !is_iso {
            continue;
        }

        let values: Vec<i32> = line[6..]
            .split_whitespace()
            .map(|t| t.parse::<i32>())
            .collect::<Result<_, _>>()
            .map_err(|_| Error::parse(Format::Sdf, *ln, "invalid property line"))?;
        let Some((&count, pairs)) = values.split_first() else {
            continue;
        };
        if pairs.len() < count as usize * 2 {
            return Err(Error::parse(Format::Sdf, *ln, "truncated property line"));
        }

        for pair in pairs.chunks(2).take(count as usize) {
            let idx = pair[0] as usize;
            if idx == 0 || idx > mol.atom_count() {
                return Err(Error::parse(
                    Format::Sdf,
                    *ln,
                    "property references atom outside declared range",
                ));
            }
            let atom = &mut mol.atoms[idx - 1];
            if is_chg {
                atom.formal_charge = pair[1] as i8;
            } else {
                atom.isotope = Some(pair[1] as u16);
            }
        }
    }
    Ok(lines.len())
}

fn parse_data_items(lines: &[(usize, String)], mol: &mut Molecule) {
    let mut iter = lines.iter().map(|(_, l)| l.as_str()).peekable();
    while let Some(line) = iter.next() {
        if !line.starts_with('>') {
            continue;
        }
        let Some(key) = line
            .find('<')
            .and_then(|start| line[start + 1..].find('>').map(|end| &line[start + 1..start + 1 + end]))
        else {
            continue;
        };

        let mut value = Vec::new();
        while let Some(next) = iter.peek() {
            if next.trim().is_empty() {
                iter.next();
                break;
            }
            if next.starts_with('>') {
                break;
            }
            value.push(next.trim_end());
            iter.next();
        }
        mol.set_property(key, value.join("\n"));
    }
}
