use thiserror::Error;

/// Reasons a solve stops without a converged point.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SolverError {
    #[error("objective or constraints are not finite at the initial point")]
    NonFiniteStart,
    #[error("gradient could not be evaluated: model is not finite around the iterate")]
    NonFiniteGradient,
    #[error("iteration limit of {0} reached")]
    IterationLimit(usize),
    #[error("no convergence after {0} outer iterations")]
    OuterLimit(usize),
}

/// A failed solve together with the solver's last internal state.
#[derive(Debug, Error, Clone, PartialEq)]
#[error("{error} (after {iterations} iterations)")]
pub struct SolveFailure {
    #[source]
    pub error: SolverError,
    /// Last iterate in physical units, declaration order.
    pub last_iterate: Vec<f64>,
    pub iterations: usize,
}

/// Errors raised while assembling a [`crate::Problem`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProblemError {
    #[error("problem declares no variables")]
    NoVariables,
    #[error("problem has no objective")]
    MissingObjective,
    #[error("variable '{0}' declared twice")]
    DuplicateVariable(String),
    #[error("variable '{0}' needs a finite seed and a positive finite scale")]
    InvalidVariable(String),
    #[error("constraint '{0}' needs a positive finite scale")]
    InvalidConstraintScale(String),
}
