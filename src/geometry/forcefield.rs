use std::collections::VecDeque;

use super::config::ForceFieldKind;
use super::error::Error;
use super::params::{ForceFieldParams, builtin_parameters};
use crate::model::{
    molecule::Molecule,
    types::{BondOrder, Element},
};

const TETRAHEDRAL: f64 = 109.47;
const TRIGONAL: f64 = 120.0;
const LINEAR: f64 = 180.0;

#[derive(Debug, Clone, PartialEq)]
pub struct BondTerm {
    pub i: usize,
    pub j: usize,
    pub k: f64,
    pub r0: f64,
}

/// Cosine-harmonic bend around `center`.
#[derive(Debug, Clone, PartialEq)]
pub struct AngleTerm {
    pub center: usize,
    pub a: usize,
    pub b: usize,
    pub k: f64,
    pub cos0: f64,
}

/// Twofold torsion about a double bond `b=c`; flat at cis and trans.
#[derive(Debug, Clone, PartialEq)]
pub struct TorsionTerm {
    pub a: usize,
    pub b: usize,
    pub c: usize,
    pub d: usize,
    pub k: f64,
}

/// One-sided harmonic wall keeping distant atoms apart.
#[derive(Debug, Clone, PartialEq)]
pub struct ContactTerm {
    pub i: usize,
    pub j: usize,
    pub k: f64,
    pub d_min: f64,
}

/// Energy terms for one molecule under one force field.
#[derive(Debug, Clone)]
pub struct ForceField {
    pub kind: ForceFieldKind,
    pub bonds: Vec<BondTerm>,
    pub angles: Vec<AngleTerm>,
    pub torsions: Vec<TorsionTerm>,
    pub contacts: Vec<ContactTerm>,
}

impl ForceField {
    /// Builds the terms from the embedded parameter table for `kind`.
    ///
    /// Fails when any atom's element is missing from the table, which is
    /// the signal that triggers a force-field fallback.
    pub fn setup(mol: &Molecule, kind: ForceFieldKind) -> Result<Self, Error> {
        Self::setup_with(mol, kind, builtin_parameters(kind))
    }

    pub fn setup_with(
        mol: &Molecule,
        kind: ForceFieldKind,
        params: &ForceFieldParams,
    ) -> Result<Self, Error> {
        let per_atom = mol
            .atoms
            .iter()
            .enumerate()
            .map(|(idx, atom)| {
                params
                    .element(atom.element)
                    .ok_or_else(|| Error::missing_parameter(kind, atom.element, idx + 1))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let global = &params.global;
        let planar_n = kind == ForceFieldKind::Mmff94s;

        let bonds = mol
            .bonds
            .iter()
            .map(|bond| {
                let ri = per_atom[bond.i].radius;
                let rj = per_atom[bond.j].radius;
                BondTerm {
                    i: bond.i,
                    j: bond.j,
                    k: global.bond_k,
                    r0: rest_length(ri, rj, bond.order, global.bond_order_factor),
                }
            })
            .collect();

        let adjacency = mol.adjacency();
        let mut angles = Vec::new();
        for (center, neighbours) in adjacency.iter().enumerate() {
            let Some(theta0) = ideal_angle(mol, center, per_atom[center].sp3_angle, planar_n) else {
                continue;
            };
            let cos0 = theta0.to_radians().cos();
            for (n, &a) in neighbours.iter().enumerate() {
                for &b in &neighbours[n + 1..] {
                    angles.push(AngleTerm {
                        center,
                        a,
                        b,
                        k: global.angle_k,
                        cos0,
                    });
                }
            }
        }

        let mut torsions = Vec::new();
        for bond in mol.bonds.iter().filter(|b| b.order == BondOrder::Double) {
            let (b, c) = (bond.i, bond.j);
            for &a in adjacency[b].iter().filter(|&&a| a != c) {
                for &d in adjacency[c].iter().filter(|&&d| d != b) {
                    torsions.push(TorsionTerm {
                        a,
                        b,
                        c,
                        d,
                        k: global.torsion_k,
                    });
                }
            }
        }

        let mut contacts = Vec::new();
        for i in 0..mol.atom_count() {
            let separation = bond_separation(&adjacency, i);
            for j in i + 1..mol.atom_count() {
                if separation[j] < 3 {
                    continue;
                }
                contacts.push(ContactTerm {
                    i,
                    j,
                    k: global.contact_k,
                    d_min: global.contact_scale * (per_atom[i].vdw_radius + per_atom[j].vdw_radius),
                });
            }
        }

        Ok(Self {
            kind,
            bonds,
            angles,
            torsions,
            contacts,
        })
    }

    /// Total energy at `coords`; the gradient is written into `grad`.
    pub fn energy_and_gradient(&self, coords: &[[f64; 3]], grad: &mut [[f64; 3]]) -> f64 {
        for g in grad.iter_mut() {
            *g = [0.0; 3];
        }
        let mut energy = 0.0;

        for term in &self.bonds {
            let d = sub(coords[term.i], coords[term.j]);
            let r = norm(d);
            if r < 1e-9 {
                continue;
            }
            let dr = r - term.r0;
            energy += 0.5 * term.k * dr * dr;
            let f = term.k * dr / r;
            accumulate(grad, term.i, d, f);
            accumulate(grad, term.j, d, -f);
        }

        for term in &self.angles {
            let u = sub(coords[term.a], coords[term.center]);
            let v = sub(coords[term.b], coords[term.center]);
            let (lu, lv) = (norm(u), norm(v));
            if lu < 1e-9 || lv < 1e-9 {
                continue;
            }
            let cos = (dot(u, v) / (lu * lv)).clamp(-1.0, 1.0);
            let diff = cos - term.cos0;
            energy += term.k * diff * diff;

            let de = 2.0 * term.k * diff;
            let mut ga = [0.0; 3];
            let mut gb = [0.0; 3];
            for k in 0..3 {
                ga[k] = de * (v[k] / (lu * lv) - cos * u[k] / (lu * lu));
                gb[k] = de * (u[k] / (lu * lv) - cos * v[k] / (lv * lv));
            }
            for k in 0..3 {
                grad[term.a][k] += ga[k];
                grad[term.b][k] += gb[k];
                grad[term.center][k] -= ga[k] + gb[k];
            }
        }

        for term in &self.torsions {
            let b1 = sub(coords[term.b], coords[term.a]);
            let b2 = sub(coords[term.c], coords[term.b]);
            let b3 = sub(coords[term.d], coords[term.c]);
            let m = cross(b1, b2);
            let n = cross(b2, b3);
            let (lm, ln) = (norm(m), norm(n));
            if lm < 1e-9 || ln < 1e-9 {
                continue;
            }
            let cos = (dot(m, n) / (lm * ln)).clamp(-1.0, 1.0);
            energy += term.k * (1.0 - cos * cos);

            // Chain rule through the two plane normals.
            let de = -2.0 * term.k * cos;
            let mut gm = [0.0; 3];
            let mut gn = [0.0; 3];
            for k in 0..3 {
                gm[k] = de * (n[k] / (lm * ln) - cos * m[k] / (lm * lm));
                gn[k] = de * (m[k] / (lm * ln) - cos * n[k] / (ln * ln));
            }
            let g1 = cross(b2, gm);
            let (p, q) = (cross(gm, b1), cross(b3, gn));
            let g3 = cross(gn, b2);
            for k in 0..3 {
                let g2 = p[k] + q[k];
                grad[term.a][k] -= g1[k];
                grad[term.b][k] += g1[k] - g2;
                grad[term.c][k] += g2 - g3[k];
                grad[term.d][k] += g3[k];
            }
        }

        for term in &self.contacts {
            let d = sub(coords[term.i], coords[term.j]);
            let r = norm(d);
            if r >= term.d_min || r < 1e-9 {
                continue;
            }
            let dr = r - term.d_min;
            energy += term.k * dr * dr;
            let f = 2.0 * term.k * dr / r;
            accumulate(grad, term.i, d, f);
            accumulate(grad, term.j, d, -f);
        }

        energy
    }
}

/// Bond-order corrected rest length.
fn rest_length(ri: f64, rj: f64, order: BondOrder, factor: f64) -> f64 {
    let n = order.value();
    let correction = if n > 1.0 { factor * (ri + rj) * n.ln() } else { 0.0 };
    ri + rj - correction
}

/// Ideal bend angle in degrees at `idx`, or `None` where no bend terms apply.
pub(crate) fn ideal_angle(
    mol: &Molecule,
    idx: usize,
    sp3_angle: f64,
    planar_conjugated_n: bool,
) -> Option<f64> {
    let incident: Vec<_> = mol
        .bonds
        .iter()
        .filter(|b| b.partner(idx).is_some())
        .collect();
    let degree = incident.len();
    if !(2..=4).contains(&degree) {
        return None;
    }
    if degree == 4 {
        return Some(TETRAHEDRAL);
    }

    let doubles = incident.iter().filter(|b| b.order == BondOrder::Double).count();
    let triples = incident.iter().filter(|b| b.order == BondOrder::Triple).count();
    if degree == 2 && (triples > 0 || doubles >= 2) {
        return Some(LINEAR);
    }

    let atom = &mol.atoms[idx];
    if atom.aromatic || doubles > 0 || incident.iter().any(|b| b.order == BondOrder::Aromatic) {
        return Some(TRIGONAL);
    }

    if planar_conjugated_n && atom.element == Element::N && degree == 3 {
        let conjugated = incident.iter().any(|b| {
            b.partner(idx).is_some_and(|n| {
                mol.atoms[n].aromatic
                    || mol
                        .bonds
                        .iter()
                        .any(|nb| nb.partner(n).is_some() && nb.order != BondOrder::Single)
            })
        });
        if conjugated {
            return Some(TRIGONAL);
        }
    }

    Some(sp3_angle)
}

/// Number of bonds between `start` and every atom; unreachable atoms get `usize::MAX`.
fn bond_separation(adjacency: &[Vec<usize>], start: usize) -> Vec<usize> {
    let mut dist = vec![usize::MAX; adjacency.len()];
    dist[start] = 0;
    let mut queue = VecDeque::from([start]);
    while let Some(u) = queue.pop_front() {
        if dist[u] >= 2 {
            continue;
        }
        for &v in &adjacency[u] {
            if dist[v] == usize::MAX {
                dist[v] = dist[u] + 1;
                queue.push_back(v);
            }
        }
    }
    dist
}

#[inline]
fn sub(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

#[inline]
fn dot(a: [f64; 3], b: [f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

#[inline]
pub(crate) fn cross(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

#[inline]
pub(crate) fn norm(a: [f64; 3]) -> f64 {
    dot(a, a).sqrt()
}

#[inline]
fn accumulate(grad: &mut [[f64; 3]], idx: usize, d: [f64; 3], f: f64) {
    for k in 0..3 {
        grad[idx][k] += f * d[k];
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::hydrogens::add_explicit_hydrogens;
    use crate::io::smiles;
    use crate::model::atom::Atom;

    fn numeric_gradient(ff: &ForceField, coords: &[[f64; 3]]) -> Vec<[f64; 3]> {
        let h = 1e-6;
        let mut scratch = vec![[0.0; 3]; coords.len()];
        let mut out = vec![[0.0; 3]; coords.len()];
        for i in 0..coords.len() {
            for k in 0..3 {
                let mut plus = coords.to_vec();
                let mut minus = coords.to_vec();
                plus[i][k] += h;
                minus[i][k] -= h;
                let ep = ff.energy_and_gradient(&plus, &mut scratch);
                let em = ff.energy_and_gradient(&minus, &mut scratch);
                out[i][k] = (ep - em) / (2.0 * h);
            }
        }
        out
    }

    #[test]
    fn analytic_gradient_matches_finite_differences() {
        let mut mol = smiles::parse("CC=O").unwrap();
        add_explicit_hydrogens(&mut mol);
        let coords: Vec<[f64; 3]> = (0..mol.atom_count())
            .map(|i| {
                let t = i as f64;
                [t.cos() * 1.3, t.sin() * 1.1, 0.3 * t]
            })
            .collect();
        // Pull two distant atoms together so a contact term is active.
        let mut coords = coords;
        coords[6] = [coords[3][0] + 0.5, coords[3][1], coords[3][2]];

        let ff = ForceField::setup(&mol, ForceFieldKind::Uff).unwrap();
        let mut grad = vec![[0.0; 3]; coords.len()];
        ff.energy_and_gradient(&coords, &mut grad);
        let numeric = numeric_gradient(&ff, &coords);
        for (a, n) in grad.iter().zip(&numeric) {
            for k in 0..3 {
                assert!((a[k] - n[k]).abs() < 1e-3, "analytic {a:?} vs numeric {n:?}");
            }
        }
    }

    #[test]
    fn torsion_gradient_matches_finite_differences() {
        let mut mol = smiles::parse("F/C=C/F").unwrap();
        add_explicit_hydrogens(&mut mol);
        let coords = vec![
            [-0.9, 1.1, 0.2],
            [0.0, 0.0, 0.0],
            [1.34, 0.05, -0.1],
            [2.1, 0.7, 1.0],
            [-0.5, -0.9, 0.3],
            [1.8, -0.8, -0.6],
        ];

        let ff = ForceField::setup(&mol, ForceFieldKind::Mmff94s).unwrap();
        assert_eq!(ff.torsions.len(), 4);
        let mut grad = vec![[0.0; 3]; coords.len()];
        ff.energy_and_gradient(&coords, &mut grad);
        let numeric = numeric_gradient(&ff, &coords);
        for (a, n) in grad.iter().zip(&numeric) {
            for k in 0..3 {
                assert!((a[k] - n[k]).abs() < 1e-3, "analytic {a:?} vs numeric {n:?}");
            }
        }
    }

    #[test]
    fn torsion_energy_is_zero_in_plane_and_peaks_at_right_angles() {
        let mol = smiles::parse("FC=CF").unwrap();
        let ff = ForceField::setup(&mol, ForceFieldKind::Uff).unwrap();
        let mut grad = vec![[0.0; 3]; 4];
        let cis = [[-0.7, 1.2, 0.0], [0.0, 0.0, 0.0], [1.34, 0.0, 0.0], [2.0, 1.2, 0.0]];
        let twisted = [[-0.7, 1.2, 0.0], [0.0, 0.0, 0.0], [1.34, 0.0, 0.0], [2.0, 0.0, 1.2]];
        let torsion_only = |coords: &[[f64; 3]], grad: &mut [[f64; 3]]| {
            let bare = ForceField {
                bonds: Vec::new(),
                angles: Vec::new(),
                contacts: Vec::new(),
                ..ff.clone()
            };
            bare.energy_and_gradient(coords, grad)
        };
        assert!(torsion_only(&cis, &mut grad).abs() < 1e-12);
        assert!((torsion_only(&twisted, &mut grad) - ff.torsions[0].k).abs() < 1e-9);

        let benzene = smiles::parse("c1ccccc1").unwrap();
        assert!(ForceField::setup(&benzene, ForceFieldKind::Uff).unwrap().torsions.is_empty());
    }

    #[test]
    fn double_bonds_are_shorter() {
        let single = rest_length(0.757, 0.757, BondOrder::Single, 0.1332);
        let double = rest_length(0.757, 0.757, BondOrder::Double, 0.1332);
        let triple = rest_length(0.757, 0.757, BondOrder::Triple, 0.1332);
        assert!((single - 1.514).abs() < 1e-9);
        assert!(double < single && triple < double);
    }

    #[test]
    fn hybridization_sets_ideal_angles() {
        let mut mol = smiles::parse("C=CC#N").unwrap();
        add_explicit_hydrogens(&mut mol);
        assert_eq!(ideal_angle(&mol, 1, TETRAHEDRAL, false), Some(TRIGONAL));
        assert_eq!(ideal_angle(&mol, 2, TETRAHEDRAL, false), Some(LINEAR));
        assert_eq!(ideal_angle(&mol, 3, TETRAHEDRAL, false), None);
    }

    #[test]
    fn aniline_nitrogen_is_planar_only_under_mmff() {
        let mut mol = smiles::parse("Nc1ccccc1").unwrap();
        add_explicit_hydrogens(&mut mol);
        assert_eq!(ideal_angle(&mol, 0, 106.7, true), Some(TRIGONAL));
        assert_eq!(ideal_angle(&mol, 0, 106.7, false), Some(106.7));
    }

    #[test]
    fn missing_element_fails_setup() {
        let mut mol = Molecule::new();
        mol.add_atom(Atom::new(Element::B, [0.0; 3]));
        let err = ForceField::setup(&mol, ForceFieldKind::Mmff94s).unwrap_err();
        assert!(matches!(err, Error::MissingParameter { element: Element::B, .. }));
        assert!(ForceField::setup(&mol, ForceFieldKind::Uff).is_ok());
    }

    #[test]
    fn neighbours_within_two_bonds_have_no_contact_term() {
        let mol = smiles::parse("CCCC").unwrap();
        let ff = ForceField::setup(&mol, ForceFieldKind::Mmff94s).unwrap();
        assert_eq!(ff.contacts.len(), 1);
        assert_eq!((ff.contacts[0].i, ff.contacts[0].j), (0, 3));
    }
}
