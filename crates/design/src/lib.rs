//! Minimum-mass sizing of a solar twin-hull boat.
//!
//! [`design`] builds the constrained problem for one [`Scenario`], hands it to an
//! [`NlpSolver`], and evaluates the physical model at whatever point comes back. A solver
//! failure does not abort the query: the solver's last iterate is used instead and the
//! result is flagged with [`SolveStatus::FallbackIterate`]. Use [`verify_feasibility`] when a
//! caller needs to know which constraints such a point breaks.

mod constraints;
mod cost;
mod error;
mod result;
mod settings;

use catamaran_config::CostConfig;
use catamaran_hull::{DesignVariables, PhysicalModel};
use catamaran_nlp::{AugmentedLagrangian, NlpSolver};
use tracing::{info, warn};

pub use catamaran_hull::Scenario;
pub use constraints::{
    MIN_BEAM_M, MIN_DRAFT_M, MIN_LENGTH_TO_WIDTH, MIN_POSITIVE, MIN_REYNOLDS, MIN_WIDTH_M,
    Violation, build_problem, verify_feasibility,
};
pub use cost::CostEstimate;
pub use error::DesignError;
pub use result::{Field, SolveStatus, SolverResult};
pub use settings::{scenario_from_config, solver_options};

/// Size a hull with the default solver settings and cost table.
pub fn design(scenario: &Scenario) -> Result<SolverResult, DesignError> {
    design_with(
        scenario,
        &AugmentedLagrangian::default(),
        &CostConfig::default(),
    )
}

/// Size a hull with an explicit solver and cost table.
///
/// # Errors
///
/// Fails only for invalid inputs: a non-positive or non-finite speed or hour count, or an
/// invalid cost table. Non-convergence yields a [`SolveStatus::FallbackIterate`] result.
pub fn design_with<S>(
    scenario: &Scenario,
    solver: &S,
    cost_table: &CostConfig,
) -> Result<SolverResult, DesignError>
where
    S: NlpSolver + ?Sized,
{
    validate_scenario(scenario)?;
    cost_table.validate()?;
    let problem = build_problem(scenario)?;

    info!(
        speed_m_s = scenario.boat_speed_m_s,
        sun_hours = scenario.sun_hours,
        battery_hours = scenario.battery_hours,
        solar = scenario.solar,
        "sizing hull"
    );

    let (point, status, iterations) = match solver.solve(&problem) {
        Ok(output) => {
            info!(
                iterations = output.iterations,
                mass_total_kg = output.objective,
                "design converged"
            );
            (output.point, SolveStatus::Converged, output.iterations)
        }
        Err(failure) => {
            warn!(error = %failure, "solver failed, falling back to its last iterate");
            let reason = failure.error.to_string();
            (
                failure.last_iterate,
                SolveStatus::FallbackIterate { reason },
                failure.iterations,
            )
        }
    };

    let model = PhysicalModel::evaluate(DesignVariables::from_slice(&point), *scenario);
    let cost = CostEstimate::for_model(&model, cost_table);
    Ok(SolverResult::from_model(
        &model,
        cost.total_usd,
        status,
        iterations,
    ))
}

/// Reject scenarios the model cannot represent.
pub fn validate_scenario(scenario: &Scenario) -> Result<(), DesignError> {
    let fields = [
        ("boat_speed", scenario.boat_speed_m_s),
        ("hrs_sun", scenario.sun_hours),
        ("battery_hours", scenario.battery_hours),
    ];
    for (field, value) in fields {
        if !(value.is_finite() && value > 0.0) {
            return Err(DesignError::InvalidScenario { field, value });
        }
    }
    Ok(())
}
