//! Constrained nonlinear minimization for small, smooth, dense problems.
//!
//! A [`Problem`] is an immutable description: named variables with seeds and nominal scales, a
//! scalar objective, and equality/inequality constraints written as residuals. Any
//! [`NlpSolver`] turns it into either a [`SolverOutput`] or a [`SolveFailure`] that still carries
//! the last iterate, so callers can decide whether an unconverged point is good enough.
//!
//! The bundled [`AugmentedLagrangian`] solver handles equalities and inequalities through a
//! Powell–Hestenes–Rockafellar merit function minimized with BFGS on central-difference
//! gradients. Trial points where the model is not finite are rejected by the line search, so an
//! expression may return `NaN` outside its domain instead of panicking.

mod augmented;
mod bfgs;
mod error;
mod options;
mod problem;

pub use augmented::AugmentedLagrangian;
pub use error::{ProblemError, SolveFailure, SolverError};
pub use options::{MuStrategy, OptionsError, SolverOptions};
pub use problem::{Constraint, Expression, Problem, ProblemBuilder, Relation, Variable};

/// Point returned by a converged solve, in the problem's physical units.
#[derive(Debug, Clone, PartialEq)]
pub struct SolverOutput {
    /// Variable values in declaration order.
    pub point: Vec<f64>,
    pub objective: f64,
    /// Largest scaled constraint violation at `point`.
    pub max_violation: f64,
    /// Inner iterations spent, restoration included.
    pub iterations: usize,
}

/// A constrained minimizer.
pub trait NlpSolver {
    /// Minimize the problem's objective subject to its constraints.
    ///
    /// # Errors
    ///
    /// Returns a [`SolveFailure`] when no converged point was found; the failure carries the
    /// solver's last iterate.
    fn solve(&self, problem: &Problem) -> Result<SolverOutput, SolveFailure>;
}
