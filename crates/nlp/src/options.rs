use thiserror::Error;

/// How the penalty parameter reacts to slow feasibility progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MuStrategy {
    /// Grow the penalty by a fixed factor whenever infeasibility stalls.
    #[default]
    Monotone,
    /// Grow the penalty in proportion to how badly infeasibility stalled.
    Adaptive,
}

/// Configuration for the augmented-Lagrangian solver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverOptions {
    max_iter: usize,
    mu_strategy: MuStrategy,
    required_infeasibility_reduction: f64,
    expect_infeasible_problem: bool,
    constraint_tolerance: f64,
    gradient_tolerance: f64,
    initial_penalty: f64,
    penalty_growth: f64,
}

/// Errors that can occur when validating solver options.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum OptionsError {
    #[error("max_iter must be at least 1")]
    MaxIter,
    #[error("required_infeasibility_reduction must lie in (0, 1), got {0}")]
    InfeasibilityReduction(f64),
    #[error("constraint_tolerance must be finite and positive")]
    ConstraintTolerance,
    #[error("gradient_tolerance must be finite and positive")]
    GradientTolerance,
    #[error("initial_penalty must be finite and positive")]
    InitialPenalty,
    #[error("penalty_growth must be finite and greater than 1")]
    PenaltyGrowth,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            max_iter: 1_000,
            mu_strategy: MuStrategy::Monotone,
            required_infeasibility_reduction: 0.1,
            expect_infeasible_problem: true,
            constraint_tolerance: 1e-6,
            gradient_tolerance: 1e-6,
            initial_penalty: 10.0,
            penalty_growth: 10.0,
        }
    }
}

impl SolverOptions {
    /// Creates options with the given iteration cap, penalty strategy, and required
    /// per-iteration infeasibility reduction. Remaining settings keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the cap is zero or the reduction lies outside `(0, 1)`.
    pub fn new(
        max_iter: usize,
        mu_strategy: MuStrategy,
        required_infeasibility_reduction: f64,
        expect_infeasible_problem: bool,
    ) -> Result<Self, OptionsError> {
        if max_iter == 0 {
            return Err(OptionsError::MaxIter);
        }
        if !(required_infeasibility_reduction > 0.0 && required_infeasibility_reduction < 1.0) {
            return Err(OptionsError::InfeasibilityReduction(
                required_infeasibility_reduction,
            ));
        }
        Ok(Self {
            max_iter,
            mu_strategy,
            required_infeasibility_reduction,
            expect_infeasible_problem,
            ..Self::default()
        })
    }

    /// Override the convergence tolerances.
    ///
    /// # Errors
    ///
    /// Returns an error if either tolerance is non-positive or non-finite.
    pub fn with_tolerances(
        mut self,
        constraint_tolerance: f64,
        gradient_tolerance: f64,
    ) -> Result<Self, OptionsError> {
        if !constraint_tolerance.is_finite() || constraint_tolerance <= 0.0 {
            return Err(OptionsError::ConstraintTolerance);
        }
        if !gradient_tolerance.is_finite() || gradient_tolerance <= 0.0 {
            return Err(OptionsError::GradientTolerance);
        }
        self.constraint_tolerance = constraint_tolerance;
        self.gradient_tolerance = gradient_tolerance;
        Ok(self)
    }

    /// Override the starting penalty and its growth factor.
    ///
    /// # Errors
    ///
    /// Returns an error if the penalty is non-positive or the growth does not exceed one.
    pub fn with_penalty(mut self, initial: f64, growth: f64) -> Result<Self, OptionsError> {
        if !initial.is_finite() || initial <= 0.0 {
            return Err(OptionsError::InitialPenalty);
        }
        if !growth.is_finite() || growth <= 1.0 {
            return Err(OptionsError::PenaltyGrowth);
        }
        self.initial_penalty = initial;
        self.penalty_growth = growth;
        Ok(self)
    }

    #[must_use]
    pub fn max_iter(&self) -> usize {
        self.max_iter
    }

    #[must_use]
    pub fn mu_strategy(&self) -> MuStrategy {
        self.mu_strategy
    }

    #[must_use]
    pub fn required_infeasibility_reduction(&self) -> f64 {
        self.required_infeasibility_reduction
    }

    #[must_use]
    pub fn expect_infeasible_problem(&self) -> bool {
        self.expect_infeasible_problem
    }

    #[must_use]
    pub fn constraint_tolerance(&self) -> f64 {
        self.constraint_tolerance
    }

    #[must_use]
    pub fn gradient_tolerance(&self) -> f64 {
        self.gradient_tolerance
    }

    #[must_use]
    pub fn initial_penalty(&self) -> f64 {
        self.initial_penalty
    }

    #[must_use]
    pub fn penalty_growth(&self) -> f64 {
        self.penalty_growth
    }
}
