//! Augmented-Lagrangian outer loop.
//!
//! Each outer iteration minimizes the Powell–Hestenes–Rockafellar merit function
//!
//! ```text
//! f(z)/f0 + Σ_eq   (-λ r + ρ/2 r²)
//!         + Σ_ineq (-λ r + ρ/2 r²)   if r < λ/ρ
//!                  (-λ²/2ρ)          otherwise
//! ```
//!
//! over the scaled unknowns `z = x / scale`, then updates the multipliers. The penalty `ρ` grows
//! whenever the scaled infeasibility did not shrink by the configured fraction.

use nalgebra::DVector;
use tracing::{debug, warn};

use crate::bfgs::{self, InnerStatus};
use crate::error::{SolveFailure, SolverError};
use crate::options::{MuStrategy, SolverOptions};
use crate::problem::{Problem, Relation};
use crate::{NlpSolver, SolverOutput};

const MAX_OUTER_ITERATIONS: usize = 100;
const MAX_PENALTY: f64 = 1e12;
const MAX_MULTIPLIER: f64 = 1e10;
/// A stalled line search still counts as converged if the gradient is this close.
const STALLED_GRADIENT_FACTOR: f64 = 1e3;
/// Relative objective change between feasible outer iterations below which the iterate has
/// settled to within finite-difference noise.
const SETTLED_OBJECTIVE_CHANGE: f64 = 1e-8;

/// Augmented-Lagrangian solver with BFGS subproblems.
#[derive(Debug, Clone, Copy, Default)]
pub struct AugmentedLagrangian {
    options: SolverOptions,
}

impl AugmentedLagrangian {
    pub fn new(options: SolverOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &SolverOptions {
        &self.options
    }
}

/// The problem seen through variable and objective scaling.
struct Scaled<'a> {
    problem: &'a Problem,
    scales: DVector<f64>,
    objective_scale: f64,
}

impl Scaled<'_> {
    fn unscale(&self, z: &DVector<f64>) -> Vec<f64> {
        z.component_mul(&self.scales).iter().copied().collect()
    }

    fn objective(&self, z: &DVector<f64>) -> f64 {
        self.problem.objective(&self.unscale(z)) / self.objective_scale
    }

    fn residuals(&self, z: &DVector<f64>) -> Vec<f64> {
        let x = self.unscale(z);
        self.problem
            .constraints()
            .iter()
            .map(|c| c.scaled_residual(&x))
            .collect()
    }

    fn violation(&self, residuals: &[f64]) -> f64 {
        self.problem
            .constraints()
            .iter()
            .zip(residuals)
            .fold(0.0, |worst, (c, &r)| worst.max(c.relation.violation(r)))
    }

    fn merit(&self, z: &DVector<f64>, multipliers: &[f64], penalty: f64) -> f64 {
        let mut total = self.objective(z);
        if !total.is_finite() {
            return f64::NAN;
        }
        for ((constraint, &r), &lambda) in self
            .problem
            .constraints()
            .iter()
            .zip(&self.residuals(z))
            .zip(multipliers)
        {
            if !r.is_finite() {
                return f64::NAN;
            }
            let active = match constraint.relation {
                Relation::Equal => true,
                Relation::AtLeast | Relation::Greater => r < lambda / penalty,
            };
            total += if active {
                -lambda * r + 0.5 * penalty * r * r
            } else {
                -lambda * lambda / (2.0 * penalty)
            };
        }
        total
    }

    /// Half the squared violation; minimized by the restoration phase.
    fn infeasibility(&self, z: &DVector<f64>) -> f64 {
        let residuals = self.residuals(z);
        let mut total = 0.0;
        for (constraint, r) in self.problem.constraints().iter().zip(residuals) {
            if !r.is_finite() {
                return f64::NAN;
            }
            let v = constraint.relation.violation(r);
            total += 0.5 * v * v;
        }
        total
    }
}

fn update_multipliers(problem: &Problem, multipliers: &mut [f64], residuals: &[f64], penalty: f64) {
    for ((lambda, constraint), &r) in multipliers.iter_mut().zip(problem.constraints()).zip(residuals)
    {
        let next = match constraint.relation {
            Relation::Equal => *lambda - penalty * r,
            Relation::AtLeast | Relation::Greater => (*lambda - penalty * r).max(0.0),
        };
        *lambda = next.clamp(-MAX_MULTIPLIER, MAX_MULTIPLIER);
    }
}

impl NlpSolver for AugmentedLagrangian {
    fn solve(&self, problem: &Problem) -> Result<SolverOutput, SolveFailure> {
        let opts = &self.options;
        let n = problem.dimension();
        let scales = DVector::from_iterator(n, problem.variables().iter().map(|v| v.scale));
        let mut z = DVector::from_iterator(
            n,
            problem.variables().iter().map(|v| v.initial / v.scale),
        );

        let x0 = problem.initial_point();
        let f0 = problem.objective(&x0);
        if !f0.is_finite() || !problem.max_violation(&x0).is_finite() {
            warn!("model is not finite at the seed point");
            return Err(SolveFailure {
                error: SolverError::NonFiniteStart,
                last_iterate: x0,
                iterations: 0,
            });
        }

        let scaled = Scaled {
            problem,
            scales,
            objective_scale: f0.abs().max(1.0),
        };
        let fail = |error: SolverError, z: &DVector<f64>, iterations: usize| {
            warn!(%error, iterations, "solve did not converge");
            SolveFailure {
                error,
                last_iterate: scaled.unscale(z),
                iterations,
            }
        };

        let tolerance = opts.constraint_tolerance();
        let mut iterations = 0;
        let mut violation = scaled.violation(&scaled.residuals(&z));

        if opts.expect_infeasible_problem() && violation > tolerance {
            let budget = (opts.max_iter() / 4).max(1);
            match bfgs::minimize(
                |v| scaled.infeasibility(v),
                &z,
                budget,
                opts.gradient_tolerance() * 1e-2,
            ) {
                Ok(restored) => {
                    iterations += restored.iterations;
                    if scaled.objective(&restored.point).is_finite() {
                        z = restored.point;
                    }
                    violation = scaled.violation(&scaled.residuals(&z));
                    debug!(iterations, violation, "feasibility restoration finished");
                }
                Err(error) => {
                    warn!(%error, "feasibility restoration failed, continuing from the seed");
                }
            }
        }

        let mut multipliers = vec![0.0; problem.constraints().len()];
        let mut penalty = opts.initial_penalty();
        let mut previous = violation;
        let mut previous_objective = f64::NAN;

        for outer in 1..=MAX_OUTER_ITERATIONS {
            let remaining = opts.max_iter().saturating_sub(iterations);
            if remaining == 0 {
                return Err(fail(
                    SolverError::IterationLimit(opts.max_iter()),
                    &z,
                    iterations,
                ));
            }

            let inner = bfgs::minimize(
                |v| scaled.merit(v, &multipliers, penalty),
                &z,
                remaining,
                opts.gradient_tolerance(),
            )
            .map_err(|error| fail(error, &z, iterations))?;
            iterations += inner.iterations;
            z = inner.point;

            let residuals = scaled.residuals(&z);
            violation = scaled.violation(&residuals);
            update_multipliers(problem, &mut multipliers, &residuals, penalty);

            let objective = scaled.objective(&z);
            debug!(
                outer,
                iterations,
                penalty,
                violation,
                objective,
                "outer iteration"
            );

            let inner_converged = match inner.status {
                InnerStatus::Converged => true,
                InnerStatus::Stalled => {
                    inner.gradient_norm <= STALLED_GRADIENT_FACTOR * opts.gradient_tolerance()
                }
                InnerStatus::Budget => false,
            };
            let settled = (objective - previous_objective).abs()
                <= SETTLED_OBJECTIVE_CHANGE * objective.abs().max(1.0);
            if violation <= tolerance && (inner_converged || settled) {
                let point = scaled.unscale(&z);
                return Ok(SolverOutput {
                    objective: problem.objective(&point),
                    max_violation: problem.max_violation(&point),
                    point,
                    iterations,
                });
            }

            let stalled = violation > tolerance
                && violation > (1.0 - opts.required_infeasibility_reduction()) * previous;
            if stalled {
                penalty *= match opts.mu_strategy() {
                    MuStrategy::Monotone => opts.penalty_growth(),
                    MuStrategy::Adaptive => {
                        let ratio = violation / previous.max(f64::MIN_POSITIVE);
                        (opts.penalty_growth() * ratio)
                            .clamp(2.0, opts.penalty_growth() * opts.penalty_growth())
                    }
                };
                penalty = penalty.min(MAX_PENALTY);
            }
            previous = violation;
            previous_objective = if violation <= tolerance {
                objective
            } else {
                f64::NAN
            };
        }

        Err(fail(
            SolverError::OuterLimit(MAX_OUTER_ITERATIONS),
            &z,
            iterations,
        ))
    }
}
