//! Convex quadratic minimization over a box with a total-mass band.
//!
//! The method is a primal active-set one. The working set holds the bounds
//! currently treated as equalities. Each iteration minimizes the quadratic
//! over the remaining free variables, steps toward that minimizer until a new
//! bound blocks, and once no step is left releases the bound with the most
//! negative multiplier. Every iterate is feasible, so bounds and the mass band
//! hold whenever a point is returned.

use nalgebra::{DMatrix, DVector, SymmetricEigen};
use tracing::{debug, trace};

use crate::planner::constants::*;

/// `½·xᵀHx + cᵀx + k` with a symmetric positive semi-definite `H`.
#[derive(Debug, Clone)]
pub struct QuadraticModel {
    pub hessian: DMatrix<f64>,
    pub linear: DVector<f64>,
    pub constant: f64,
}

impl QuadraticModel {
    pub fn dimension(&self) -> usize {
        self.linear.len()
    }

    pub fn value(&self, x: &DVector<f64>) -> f64 {
        0.5 * x.dot(&(&self.hessian * x)) + self.linear.dot(x) + self.constant
    }

    pub fn gradient(&self, x: &DVector<f64>) -> DVector<f64> {
        &self.hessian * x + &self.linear
    }

    fn is_finite(&self) -> bool {
        self.constant.is_finite()
            && self
                .hessian
                .iter()
                .chain(self.linear.iter())
                .all(|v| v.is_finite())
    }
}

/// Per-variable bounds plus bounds on the sum of all variables.
#[derive(Debug, Clone, PartialEq)]
pub struct FeasibleRegion {
    pub lower: DVector<f64>,
    pub upper: DVector<f64>,
    pub min_total: f64,
    pub max_total: f64,
}

impl FeasibleRegion {
    /// `n` variables sharing the same bounds, within the default mass band.
    pub fn uniform(n: usize, lower: f64, upper: f64) -> Self {
        Self {
            lower: DVector::from_element(n, lower),
            upper: DVector::from_element(n, upper),
            min_total: MIN_TOTAL_GRAMS,
            max_total: MAX_TOTAL_GRAMS,
        }
    }

    pub fn dimension(&self) -> usize {
        self.lower.len()
    }

    /// Whether some point satisfies every bound.
    pub fn is_feasible(&self) -> bool {
        self.lower.len() == self.upper.len()
            && self.lower.iter().zip(self.upper.iter()).all(|(l, u)| l <= u)
            && self.min_total <= self.max_total
            && self.lower.sum() <= self.max_total
            && self.upper.sum() >= self.min_total
    }

    /// Euclidean projection of `y` onto the region. Requires a feasible region.
    ///
    /// The projection has the form `clamp(y + τ)` for a scalar shift `τ`;
    /// `τ = 0` unless the clamped total falls outside the band, in which case
    /// `τ` is found by bisection. The side of the bisection bracket that is
    /// returned always satisfies the violated total bound.
    pub fn project(&self, y: &DVector<f64>) -> DVector<f64> {
        let shifted = |tau: f64| {
            DVector::from_iterator(
                y.len(),
                y.iter()
                    .zip(self.lower.iter().zip(self.upper.iter()))
                    .map(|(v, (&lo, &hi))| (v + tau).clamp(lo, hi)),
            )
        };

        let clamped = shifted(0.0);
        let total = clamped.sum();

        if total < self.min_total {
            // Σ(lo) < min_total <= Σ(hi)
            let reach = (&self.upper - y).max();
            let (mut lo, mut hi) = (0.0, reach.max(0.0));
            for _ in 0..PROJECTION_BISECTIONS {
                let mid = 0.5 * (lo + hi);
                if shifted(mid).sum() < self.min_total {
                    lo = mid;
                } else {
                    hi = mid;
                }
            }
            shifted(hi)
        } else if total > self.max_total {
            // Σ(lo) <= max_total < Σ(hi)
            let reach = (&self.lower - y).min();
            let (mut lo, mut hi) = (reach.min(0.0), 0.0);
            for _ in 0..PROJECTION_BISECTIONS {
                let mid = 0.5 * (lo + hi);
                if shifted(mid).sum() > self.max_total {
                    hi = mid;
                } else {
                    lo = mid;
                }
            }
            shifted(lo)
        } else {
            clamped
        }
    }
}

/// Tuning knobs of the minimizer.
#[derive(Debug, Clone)]
pub struct SolverOptions {
    pub max_iterations: usize,
    /// Optimality tolerance on reduced gradients and multipliers, relative to
    /// the gradient scale of the problem.
    pub tolerance: f64,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            tolerance: DEFAULT_TOLERANCE,
        }
    }
}

pub const MSG_SUCCESS: &str = "Optimization terminated successfully";
pub const MSG_ITERATION_LIMIT: &str = "Iteration limit reached";
pub const MSG_NOT_FINITE: &str = "Objective function is not finite";
pub const MSG_INFEASIBLE: &str = "Inequality constraints incompatible";
pub const MSG_UNBOUNDED: &str = "Objective function is unbounded below";

/// Outcome of a minimization run.
#[derive(Debug, Clone)]
pub struct Minimum {
    /// Last iterate; feasible whenever `converged` is true.
    pub x: DVector<f64>,
    pub objective: f64,
    pub iterations: usize,
    pub converged: bool,
    pub message: String,
}

impl Minimum {
    fn new(x: DVector<f64>, objective: f64, iterations: usize, converged: bool, msg: &str) -> Self {
        Self {
            x,
            objective,
            iterations,
            converged,
            message: msg.to_string(),
        }
    }
}

/// Where a variable or the total sits in the working set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bound {
    Free,
    Lower,
    Upper,
}

/// A constraint that enters or leaves the working set.
#[derive(Debug, Clone, Copy)]
enum Constraint {
    Variable(usize, Bound),
    Total(Bound),
}

fn near(value: f64, bound: f64) -> bool {
    (value - bound).abs() <= 1e-9 * (1.0 + bound.abs())
}

/// Orthonormal basis (k×m) of the directions the free variables may move in:
/// all of them, or only those keeping the total fixed.
fn reduced_basis(k: usize, total_fixed: bool) -> DMatrix<f64> {
    if !total_fixed {
        return DMatrix::identity(k, k);
    }
    // Helmert columns: j ones, then -j, scaled to unit length
    DMatrix::from_fn(k, k.saturating_sub(1), |row, col| {
        let j = (col + 1) as f64;
        let norm = (j * (j + 1.0)).sqrt();
        if row <= col {
            1.0 / norm
        } else if row == col + 1 {
            -j / norm
        } else {
            0.0
        }
    })
}

/// Step on the free variables for the current working set.
///
/// Returns the reduced Newton step when the reduced gradient lies in the span
/// of positive curvature, and otherwise the steepest descent direction along
/// zero curvature, flagged so the caller walks it to the next bound.
fn working_set_step(
    model: &QuadraticModel,
    gradient: &DVector<f64>,
    free: &[usize],
    basis: &DMatrix<f64>,
    reduced_gradient: &DVector<f64>,
    tol: f64,
) -> (DVector<f64>, bool) {
    let k = free.len();
    let h_free = DMatrix::from_fn(k, k, |a, b| model.hessian[(free[a], free[b])]);
    let reduced_hessian = basis.tr_mul(&(h_free * basis));
    let eigen = SymmetricEigen::new(reduced_hessian);
    let cutoff = CURVATURE_CUTOFF * eigen.eigenvalues.amax().max(f64::MIN_POSITIVE);

    let m = reduced_gradient.len();
    let mut newton = DVector::zeros(m);
    let mut flat = DVector::zeros(m);
    for j in 0..m {
        let q = eigen.eigenvectors.column(j);
        let along = q.dot(reduced_gradient);
        let lambda = eigen.eigenvalues[j];
        if lambda > cutoff {
            newton -= q * (along / lambda);
        } else {
            flat -= q * along;
        }
    }

    let (direction, is_newton) = if flat.amax() > tol {
        (flat, false)
    } else {
        (newton, true)
    };

    let moved = basis * direction;
    let mut step = DVector::zeros(gradient.len());
    for (a, &i) in free.iter().enumerate() {
        step[i] = moved[a];
    }
    (step, is_newton)
}

/// Minimize `model` over `region`, starting from the projection of `x0`.
pub fn minimize(
    model: &QuadraticModel,
    x0: &DVector<f64>,
    region: &FeasibleRegion,
    options: &SolverOptions,
) -> Minimum {
    let n = model.dimension();
    if region.dimension() != n || x0.len() != n || !region.is_feasible() {
        return Minimum::new(x0.clone(), f64::NAN, 0, false, MSG_INFEASIBLE);
    }
    if !model.is_finite() || x0.iter().any(|v| !v.is_finite()) {
        return Minimum::new(x0.clone(), f64::NAN, 0, false, MSG_NOT_FINITE);
    }

    let mut x = region.project(x0);
    let mut vars: Vec<Bound> = (0..n)
        .map(|i| {
            if near(x[i], region.lower[i]) {
                x[i] = region.lower[i];
                Bound::Lower
            } else if near(x[i], region.upper[i]) {
                x[i] = region.upper[i];
                Bound::Upper
            } else {
                Bound::Free
            }
        })
        .collect();
    let mut total = if near(x.sum(), region.min_total) {
        Bound::Lower
    } else if near(x.sum(), region.max_total) {
        Bound::Upper
    } else {
        Bound::Free
    };

    let reach = region.lower.amax().max(region.upper.amax());
    let scale = 1.0 + model.linear.amax() + model.hessian.amax() * reach * n as f64;
    let tol = options.tolerance * scale;

    for iteration in 0..options.max_iterations {
        let gradient = model.gradient(&x);
        let free: Vec<usize> = (0..n).filter(|&i| vars[i] == Bound::Free).collect();
        if free.is_empty() {
            total = Bound::Free;
        }

        let basis = reduced_basis(free.len(), total != Bound::Free);
        let g_free = DVector::from_iterator(free.len(), free.iter().map(|&i| gradient[i]));
        let reduced_gradient = basis.tr_mul(&g_free);

        if reduced_gradient.is_empty() || reduced_gradient.amax() <= tol {
            // Stationary on the working set: check the multipliers
            let shift = if total != Bound::Free {
                g_free.mean()
            } else {
                0.0
            };

            let mut release: Option<(Constraint, f64)> = None;
            let mut consider = |constraint: Constraint, multiplier: f64| {
                if multiplier < -tol && release.is_none_or(|(_, worst)| multiplier < worst) {
                    release = Some((constraint, multiplier));
                }
            };
            for (i, &bound) in vars.iter().enumerate() {
                match bound {
                    Bound::Lower => consider(Constraint::Variable(i, bound), gradient[i] - shift),
                    Bound::Upper => consider(Constraint::Variable(i, bound), shift - gradient[i]),
                    Bound::Free => {}
                }
            }
            match total {
                Bound::Lower => consider(Constraint::Total(total), shift),
                Bound::Upper => consider(Constraint::Total(total), -shift),
                Bound::Free => {}
            }

            match release {
                None => {
                    let objective = model.value(&x);
                    debug!(iterations = iteration, objective, "optimality conditions met");
                    return Minimum::new(x, objective, iteration, true, MSG_SUCCESS);
                }
                Some((Constraint::Variable(i, _), multiplier)) => {
                    trace!(iteration, variable = i, multiplier, "releasing bound");
                    vars[i] = Bound::Free;
                }
                Some((Constraint::Total(_), multiplier)) => {
                    trace!(iteration, multiplier, "releasing mass band");
                    total = Bound::Free;
                }
            }
            continue;
        }

        let (step, is_newton) =
            working_set_step(model, &gradient, &free, &basis, &reduced_gradient, tol);

        let mut alpha = if is_newton {
            1.0
        } else {
            let curvature = step.dot(&(&model.hessian * &step));
            if curvature > 0.0 {
                -gradient.dot(&step) / curvature
            } else {
                f64::INFINITY
            }
        };

        let mut blocking = None;
        for &i in &free {
            let (limit, side) = if step[i] < 0.0 {
                ((region.lower[i] - x[i]) / step[i], Bound::Lower)
            } else if step[i] > 0.0 {
                ((region.upper[i] - x[i]) / step[i], Bound::Upper)
            } else {
                continue;
            };
            if limit.max(0.0) < alpha {
                alpha = limit.max(0.0);
                blocking = Some(Constraint::Variable(i, side));
            }
        }
        if total == Bound::Free {
            let (sum, rate) = (x.sum(), step.sum());
            let limit = if rate < 0.0 {
                Some(((region.min_total - sum) / rate, Bound::Lower))
            } else if rate > 0.0 {
                Some(((region.max_total - sum) / rate, Bound::Upper))
            } else {
                None
            };
            if let Some((limit, side)) = limit {
                if limit.max(0.0) < alpha {
                    alpha = limit.max(0.0);
                    blocking = Some(Constraint::Total(side));
                }
            }
        }

        if !alpha.is_finite() {
            let objective = model.value(&x);
            return Minimum::new(x, objective, iteration, false, MSG_UNBOUNDED);
        }

        x.axpy(alpha, &step, 1.0);
        for &i in &free {
            x[i] = x[i].clamp(region.lower[i], region.upper[i]);
        }
        match blocking {
            Some(Constraint::Variable(i, side)) => {
                x[i] = if side == Bound::Lower {
                    region.lower[i]
                } else {
                    region.upper[i]
                };
                vars[i] = side;
            }
            Some(Constraint::Total(side)) => total = side,
            None => {}
        }
        trace!(iteration, alpha, newton = is_newton, "step taken");

        if !model.value(&x).is_finite() {
            return Minimum::new(x, f64::NAN, iteration + 1, false, MSG_NOT_FINITE);
        }
    }

    let objective = model.value(&x);
    debug!(iterations = options.max_iterations, objective, "iteration budget spent");
    Minimum::new(x, objective, options.max_iterations, false, MSG_ITERATION_LIMIT)
}
