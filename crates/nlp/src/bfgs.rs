//! Unconstrained quasi-Newton minimization used for each augmented-Lagrangian subproblem.

use nalgebra::{DMatrix, DVector};

use crate::error::SolverError;

const ARMIJO_C1: f64 = 1e-4;
const MAX_BACKTRACKS: usize = 60;
const STALL_TOLERANCE: f64 = 1e-15;
const STALL_LIMIT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum InnerStatus {
    Converged,
    Budget,
    Stalled,
}

#[derive(Debug, Clone)]
pub(crate) struct InnerOutcome {
    pub point: DVector<f64>,
    pub value: f64,
    pub gradient_norm: f64,
    pub iterations: usize,
    pub status: InnerStatus,
}

/// Minimize `f` from `start` using at most `budget` iterations.
///
/// `f` returning a non-finite value marks a point as outside the model's domain.
pub(crate) fn minimize<F>(
    f: F,
    start: &DVector<f64>,
    budget: usize,
    gradient_tolerance: f64,
) -> Result<InnerOutcome, SolverError>
where
    F: Fn(&DVector<f64>) -> f64,
{
    let n = start.len();
    let mut x = start.clone();
    let mut fx = f(&x);
    if !fx.is_finite() {
        return Err(SolverError::NonFiniteStart);
    }
    let mut g = gradient(&f, &x, fx)?;
    let mut h_inv = DMatrix::<f64>::identity(n, n);
    let mut fresh_hessian = true;
    let mut stalls = 0;
    let mut iterations = 0;

    let outcome = |point, value, g: &DVector<f64>, iterations, status| InnerOutcome {
        point,
        value,
        gradient_norm: g.amax(),
        iterations,
        status,
    };

    while iterations < budget {
        if g.amax() <= gradient_tolerance {
            return Ok(outcome(x, fx, &g, iterations, InnerStatus::Converged));
        }

        let mut direction = -(&h_inv * &g);
        let mut slope = g.dot(&direction);
        if slope >= 0.0 || slope.is_nan() {
            h_inv = DMatrix::identity(n, n);
            fresh_hessian = true;
            direction = -g.clone();
            slope = g.dot(&direction);
        }

        iterations += 1;
        let Some((x_next, f_next)) = backtrack(&f, &x, fx, &direction, slope) else {
            if fresh_hessian {
                return Ok(outcome(x, fx, &g, iterations, InnerStatus::Stalled));
            }
            h_inv = DMatrix::identity(n, n);
            fresh_hessian = true;
            continue;
        };

        let g_next = gradient(&f, &x_next, f_next)?;
        let s = &x_next - &x;
        let y = &g_next - &g;
        let sy = s.dot(&y);
        if sy > 1e-12 * s.norm() * y.norm() {
            if fresh_hessian {
                // Shanno–Phua scaling of the first inverse Hessian estimate.
                h_inv *= sy / y.dot(&y);
                fresh_hessian = false;
            }
            let rho = 1.0 / sy;
            let hy = &h_inv * &y;
            let yhy = y.dot(&hy);
            h_inv += (&s * s.transpose()) * (rho * (1.0 + rho * yhy))
                - (&hy * s.transpose() + &s * hy.transpose()) * rho;
        }

        if (fx - f_next).abs() <= STALL_TOLERANCE * fx.abs().max(1.0) {
            stalls += 1;
        } else {
            stalls = 0;
        }

        x = x_next;
        fx = f_next;
        g = g_next;

        if stalls >= STALL_LIMIT {
            return Ok(outcome(x, fx, &g, iterations, InnerStatus::Stalled));
        }
    }

    let status = if g.amax() <= gradient_tolerance {
        InnerStatus::Converged
    } else {
        InnerStatus::Budget
    };
    Ok(outcome(x, fx, &g, iterations, status))
}

/// Armijo backtracking; non-finite trial values count as insufficient decrease.
fn backtrack<F>(
    f: &F,
    x: &DVector<f64>,
    fx: f64,
    direction: &DVector<f64>,
    slope: f64,
) -> Option<(DVector<f64>, f64)>
where
    F: Fn(&DVector<f64>) -> f64,
{
    let mut alpha = 1.0;
    for _ in 0..MAX_BACKTRACKS {
        let trial = x + direction * alpha;
        let value = f(&trial);
        if value.is_finite() && value <= fx + ARMIJO_C1 * alpha * slope {
            return Some((trial, value));
        }
        alpha *= 0.5;
    }
    None
}

/// Central differences, falling back to one-sided differences at a domain edge.
pub(crate) fn gradient<F>(f: &F, x: &DVector<f64>, fx: f64) -> Result<DVector<f64>, SolverError>
where
    F: Fn(&DVector<f64>) -> f64,
{
    let step_base = f64::EPSILON.cbrt();
    let mut grad = DVector::zeros(x.len());
    let mut probe = x.clone();
    for i in 0..x.len() {
        let h = step_base * x[i].abs().max(1.0);
        let origin = probe[i];

        probe[i] = origin + h;
        let forward = f(&probe);
        probe[i] = origin - h;
        let backward = f(&probe);
        probe[i] = origin;

        grad[i] = match (forward.is_finite(), backward.is_finite()) {
            (true, true) => (forward - backward) / (2.0 * h),
            (true, false) => (forward - fx) / h,
            (false, true) => (fx - backward) / h,
            (false, false) => return Err(SolverError::NonFiniteGradient),
        };
    }
    Ok(grad)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rosenbrock(v: &DVector<f64>) -> f64 {
        (1.0 - v[0]).powi(2) + 100.0 * (v[1] - v[0] * v[0]).powi(2)
    }

    #[test]
    fn finds_rosenbrock_minimum() {
        let start = DVector::from_vec(vec![-1.2, 1.0]);
        let out = minimize(rosenbrock, &start, 500, 1e-7).expect("bfgs");
        assert!((out.point[0] - 1.0).abs() < 1e-4, "x = {}", out.point[0]);
        assert!((out.point[1] - 1.0).abs() < 1e-4, "y = {}", out.point[1]);
    }

    #[test]
    fn respects_iteration_budget() {
        let start = DVector::from_vec(vec![-1.2, 1.0]);
        let out = minimize(rosenbrock, &start, 3, 1e-12).expect("bfgs");
        assert_eq!(out.iterations, 3);
        assert_eq!(out.status, InnerStatus::Budget);
    }

    #[test]
    fn line_search_stays_inside_log_domain() {
        // Minimum of x - 2 ln x sits at x = 2; ln is NaN for x <= 0.
        let f = |v: &DVector<f64>| v[0] - 2.0 * v[0].ln();
        let start = DVector::from_vec(vec![0.1]);
        let out = minimize(f, &start, 200, 1e-8).expect("bfgs");
        assert!((out.point[0] - 2.0).abs() < 1e-5);
    }

    #[test]
    fn non_finite_start_is_reported() {
        let f = |v: &DVector<f64>| v[0].ln();
        let start = DVector::from_vec(vec![-1.0]);
        assert_eq!(
            minimize(f, &start, 10, 1e-8).err(),
            Some(SolverError::NonFiniteStart)
        );
    }
}
