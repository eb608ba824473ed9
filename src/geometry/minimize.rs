use super::forcefield::ForceField;

const INITIAL_STEP: f64 = 0.05;
const MAX_STEP: f64 = 0.3;
const MIN_STEP: f64 = 1e-9;

/// How a minimization run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MinimizeOutcome {
    Converged,
    /// The iteration budget ran out first.
    NeedsMoreIterations,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinimizeResult {
    pub outcome: MinimizeOutcome,
    pub iterations: usize,
    pub energy: f64,
}

/// Steepest descent with an adaptive step length.
///
/// Each step moves the atom with the largest gradient component by the
/// current step length. Accepted steps grow the step, rejected steps halve
/// it; a step that shrinks below `MIN_STEP` counts as converged.
pub fn steepest_descent(
    ff: &ForceField,
    coords: &mut [[f64; 3]],
    max_iterations: usize,
    gradient_tolerance: f64,
) -> MinimizeResult {
    let n = coords.len();
    let mut grad = vec![[0.0; 3]; n];
    let mut trial = coords.to_vec();
    let mut trial_grad = vec![[0.0; 3]; n];

    let mut energy = ff.energy_and_gradient(coords, &mut grad);
    let mut step = INITIAL_STEP;

    for iteration in 0..max_iterations {
        let g_max = grad
            .iter()
            .flat_map(|g| g.iter())
            .fold(0.0_f64, |m, &x| m.max(x.abs()));

        if g_max < gradient_tolerance || step < MIN_STEP {
            return MinimizeResult {
                outcome: MinimizeOutcome::Converged,
                iterations: iteration,
                energy,
            };
        }

        let scale = step / g_max;
        for (t, (c, g)) in trial.iter_mut().zip(coords.iter().zip(&grad)) {
            for k in 0..3 {
                t[k] = c[k] - scale * g[k];
            }
        }

        let trial_energy = ff.energy_and_gradient(&trial, &mut trial_grad);
        if trial_energy.is_finite() && trial_energy < energy {
            coords.copy_from_slice(&trial);
            std::mem::swap(&mut grad, &mut trial_grad);
            energy = trial_energy;
            step = (step * 1.2).min(MAX_STEP);
        } else {
            step *= 0.5;
        }
    }

    MinimizeResult {
        outcome: MinimizeOutcome::NeedsMoreIterations,
        iterations: max_iterations,
        energy,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::config::ForceFieldKind;
    use crate::geometry::forcefield::norm;
    use crate::io::smiles;

    fn stretched_ethane_skeleton() -> (ForceField, Vec<[f64; 3]>) {
        let mol = smiles::parse("CC").unwrap();
        let ff = ForceField::setup(&mol, ForceFieldKind::Uff).unwrap();
        (ff, vec![[0.0, 0.0, 0.0], [2.5, 0.3, -0.2]])
    }

    #[test]
    fn relaxes_a_stretched_bond() {
        let (ff, mut coords) = stretched_ethane_skeleton();
        let result = steepest_descent(&ff, &mut coords, 10_000, 1e-4);
        assert_eq!(result.outcome, MinimizeOutcome::Converged);
        let d = norm([
            coords[1][0] - coords[0][0],
            coords[1][1] - coords[0][1],
            coords[1][2] - coords[0][2],
        ]);
        assert!((d - ff.bonds[0].r0).abs() < 1e-3, "bond length {d}");
        assert!(result.energy < 1e-4);
    }

    #[test]
    fn tiny_budget_reports_more_iterations_needed() {
        let (ff, mut coords) = stretched_ethane_skeleton();
        let result = steepest_descent(&ff, &mut coords, 2, 1e-8);
        assert_eq!(result.outcome, MinimizeOutcome::NeedsMoreIterations);
        assert_eq!(result.iterations, 2);
    }

    #[test]
    fn energy_never_increases() {
        let (ff, mut coords) = stretched_ethane_skeleton();
        let mut scratch = vec![[0.0; 3]; coords.len()];
        let before = ff.energy_and_gradient(&coords, &mut scratch);
        let result = steepest_descent(&ff, &mut coords, 5, 1e-8);
        assert!(result.energy <= before);
    }
}
