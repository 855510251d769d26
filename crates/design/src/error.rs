use catamaran_config::ConfigError;
use catamaran_nlp::{OptionsError, ProblemError};
use thiserror::Error;

/// Errors raised before the solver runs. Solver failures are reported through
/// [`crate::SolveStatus::FallbackIterate`] instead.
#[derive(Debug, Error)]
pub enum DesignError {
    #[error("{field} must be positive and finite, got {value}")]
    InvalidScenario { field: &'static str, value: f64 },
    #[error("invalid solver settings: {0}")]
    Options(#[from] OptionsError),
    #[error("failed to assemble the sizing problem: {0}")]
    Problem(#[from] ProblemError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}
