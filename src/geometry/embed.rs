use std::collections::VecDeque;

use rand::{Rng, SeedableRng, rngs::StdRng};

use super::error::Error;
use super::forcefield::{cross, ideal_angle, norm};
use crate::model::{
    molecule::{DoubleBondStereo, Molecule},
    types::{BondOrder, Chirality},
};

const CANDIDATES: usize = 48;
const FRAGMENT_GAP: f64 = 4.0;
const STEREO_WEIGHT: f64 = 25.0;

/// Assigns initial 3D coordinates by growing a spanning tree outward.
///
/// Each new atom is placed at its bond length from the parent along the
/// best of several random directions, scored by angle strain at the parent
/// and distance to already placed atoms. Ring-closing partners pull the new
/// atom toward them. Candidates that put double-bond substituents on the
/// wrong side, or build a tetrahedral centre with the wrong handedness, are
/// penalized. Output depends only on the graph and `seed`.
pub fn embed(mol: &mut Molecule, seed: u64) -> Result<(), Error> {
    if mol.atoms.is_empty() {
        return Err(Error::embedding("molecule has no atoms"));
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut placer = Placer::new(mol);
    let mut placed_order: Vec<usize> = Vec::with_capacity(mol.atom_count());
    let mut frontier_x = 0.0_f64;

    for fragment in mol.fragments() {
        let root = fragment[0];
        let first_in_fragment = placed_order.len();
        placer.place(root, [0.0; 3]);
        placed_order.push(root);

        let mut queue = VecDeque::from([root]);
        while let Some(parent) = queue.pop_front() {
            for n in 0..placer.adjacency[parent].len() {
                let child = placer.adjacency[parent][n];
                if placer.placed[child] {
                    continue;
                }
                let best = placer.best_position(
                    &placed_order[first_in_fragment..],
                    parent,
                    child,
                    &mut rng,
                );
                placer.place(child, best);
                placed_order.push(child);
                queue.push_back(child);
            }
        }

        // Shift the fragment so it starts past everything placed before it.
        let members = &placed_order[first_in_fragment..];
        let min_x = members
            .iter()
            .map(|&i| placer.positions[i][0])
            .fold(f64::INFINITY, f64::min);
        let offset = if first_in_fragment == 0 {
            0.0
        } else {
            frontier_x + FRAGMENT_GAP - min_x
        };
        for &i in members {
            placer.positions[i][0] += offset;
            frontier_x = frontier_x.max(placer.positions[i][0]);
        }
    }

    let positions = placer.positions;
    if positions.iter().flatten().any(|c| !c.is_finite()) {
        return Err(Error::embedding("non-finite coordinates generated"));
    }

    for (atom, pos) in mol.atoms.iter_mut().zip(positions) {
        atom.position = pos;
    }
    Ok(())
}

fn bond_length(mol: &Molecule, i: usize, j: usize) -> f64 {
    let ri = mol.atoms[i].element.covalent_radius();
    let rj = mol.atoms[j].element.covalent_radius();
    let order = mol
        .bond_between(i, j)
        .map(|b| b.order)
        .unwrap_or(BondOrder::Single);
    let shrink = match order {
        BondOrder::Single => 1.0,
        BondOrder::Aromatic => 0.93,
        BondOrder::Double => 0.88,
        BondOrder::Triple => 0.80,
    };
    (ri + rj) * shrink
}

/// A stereocentre with its neighbours in ascending index order.
struct Centre {
    atom: usize,
    neighbours: Vec<usize>,
    chirality: Chirality,
}

struct Placer<'a> {
    mol: &'a Molecule,
    adjacency: Vec<Vec<usize>>,
    double_bonds: Vec<DoubleBondStereo>,
    centres: Vec<Centre>,
    positions: Vec<[f64; 3]>,
    placed: Vec<bool>,
}

impl<'a> Placer<'a> {
    fn new(mol: &'a Molecule) -> Self {
        let adjacency = mol.adjacency();
        let centres = mol
            .atoms
            .iter()
            .enumerate()
            .filter_map(|(atom, a)| {
                let chirality = a.chirality?;
                let mut neighbours = adjacency[atom].clone();
                neighbours.sort_unstable();
                let slots = neighbours.len() + a.implicit_hydrogens as usize;
                (slots == 4 && neighbours.len() >= 3).then_some(Centre {
                    atom,
                    neighbours,
                    chirality,
                })
            })
            .collect();
        Self {
            mol,
            adjacency,
            double_bonds: mol.double_bond_stereo(),
            centres,
            positions: vec![[0.0; 3]; mol.atom_count()],
            placed: vec![false; mol.atom_count()],
        }
    }

    fn place(&mut self, atom: usize, position: [f64; 3]) {
        self.positions[atom] = position;
        self.placed[atom] = true;
    }

    fn best_position(
        &self,
        placed: &[usize],
        parent: usize,
        child: usize,
        rng: &mut StdRng,
    ) -> [f64; 3] {
        let mol = self.mol;
        let length = bond_length(mol, parent, child);
        let origin = self.positions[parent];
        let cos0 = ideal_angle(mol, parent, 109.47, false)
            .unwrap_or(109.47)
            .to_radians()
            .cos();

        let mut best = [origin[0] + length, origin[1], origin[2]];
        let mut best_score = f64::INFINITY;

        for _ in 0..CANDIDATES {
            let dir = random_unit_vector(rng);
            let candidate = [
                origin[0] + dir[0] * length,
                origin[1] + dir[1] * length,
                origin[2] + dir[2] * length,
            ];

            let mut score = self.stereo_penalty(child, candidate);
            for &other in placed {
                if other == parent {
                    continue;
                }
                let other_pos = self.positions[other];
                let d = norm(sub(candidate, other_pos));

                if self.adjacency[parent].contains(&other) {
                    let arm = sub(other_pos, origin);
                    let arm_len = norm(arm);
                    if arm_len > 1e-9 {
                        let cos = (arm[0] * dir[0] + arm[1] * dir[1] + arm[2] * dir[2]) / arm_len;
                        score += 4.0 * (cos - cos0).powi(2);
                    }
                }

                if self.adjacency[child].contains(&other) {
                    let target = bond_length(mol, child, other);
                    score += (d - target).powi(2);
                } else {
                    let clearance = 2.2 - d;
                    if clearance > 0.0 {
                        score += clearance * clearance;
                    }
                }
            }

            if score < best_score {
                best_score = score;
                best = candidate;
            }
        }
        best
    }

    /// Position of `atom` if `child` were at `candidate`, or `None` if unplaced.
    fn position(&self, atom: usize, child: usize, candidate: [f64; 3]) -> Option<[f64; 3]> {
        if atom == child {
            Some(candidate)
        } else {
            self.placed[atom].then_some(self.positions[atom])
        }
    }

    fn stereo_penalty(&self, child: usize, candidate: [f64; 3]) -> f64 {
        let at = |atom| self.position(atom, child, candidate);
        let mut penalty = 0.0;

        for db in &self.double_bonds {
            if ![db.a, db.b, db.left, db.right].contains(&child) {
                continue;
            }
            let (Some(a), Some(b), Some(x), Some(y)) = (at(db.a), at(db.b), at(db.left), at(db.right))
            else {
                continue;
            };
            if let Some(cos) = side_alignment(a, b, x, y) {
                let target = if db.cis { 1.0 } else { -1.0 };
                penalty += STEREO_WEIGHT * (cos - target).powi(2);
            }
        }

        for centre in &self.centres {
            if centre.atom != child && !centre.neighbours.contains(&child) {
                continue;
            }
            let Some(c) = at(centre.atom) else {
                continue;
            };
            let present: Vec<(usize, [f64; 3])> = centre
                .neighbours
                .iter()
                .enumerate()
                .filter_map(|(slot, &n)| at(n).map(|p| (slot, sub(p, c))))
                .take(3)
                .collect();
            if present.len() < 3 {
                continue;
            }
            let omitted = (0..4)
                .find(|s| present.iter().all(|(slot, _)| slot != s))
                .unwrap_or(3);
            let volume = triple(present[0].1, present[1].1, present[2].1);
            if volume * expected_volume_sign(centre.chirality, omitted) <= 0.0 {
                penalty += STEREO_WEIGHT;
            }
        }
        penalty
    }
}

/// Sign of the triple product of the three neighbours left after dropping
/// slot `omitted`, taken in ascending order around the centre.
fn expected_volume_sign(chirality: Chirality, omitted: usize) -> f64 {
    let anticlockwise = if omitted % 2 == 0 { -1.0 } else { 1.0 };
    match chirality {
        Chirality::Anticlockwise => anticlockwise,
        Chirality::Clockwise => -anticlockwise,
    }
}

/// Cosine between `x` and `y` projected onto the plane normal to `a`-`b`;
/// near 1 when they sit on the same side of the bond.
fn side_alignment(a: [f64; 3], b: [f64; 3], x: [f64; 3], y: [f64; 3]) -> Option<f64> {
    let axis = sub(b, a);
    let len = norm(axis);
    if len < 1e-9 {
        return None;
    }
    let axis = [axis[0] / len, axis[1] / len, axis[2] / len];
    let reject = |v: [f64; 3]| {
        let along = v[0] * axis[0] + v[1] * axis[1] + v[2] * axis[2];
        [v[0] - along * axis[0], v[1] - along * axis[1], v[2] - along * axis[2]]
    };
    let u = reject(sub(x, a));
    let w = reject(sub(y, b));
    let (lu, lw) = (norm(u), norm(w));
    if lu < 1e-9 || lw < 1e-9 {
        return None;
    }
    Some((u[0] * w[0] + u[1] * w[1] + u[2] * w[2]) / (lu * lw))
}

fn triple(a: [f64; 3], b: [f64; 3], c: [f64; 3]) -> f64 {
    let bc = cross(b, c);
    a[0] * bc[0] + a[1] * bc[1] + a[2] * bc[2]
}

fn sub(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

fn random_unit_vector(rng: &mut StdRng) -> [f64; 3] {
    loop {
        let v = [
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
        ];
        let len = norm(v);
        if (0.1..=1.0).contains(&len) {
            return [v[0] / len, v[1] / len, v[2] / len];
        }
    }
}
