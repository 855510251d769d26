//! Conversions from configuration records to model and solver inputs.

use catamaran_config::{MuStrategyConfig, ScenarioConfig, SolverConfig};
use catamaran_hull::Scenario;
use catamaran_nlp::{MuStrategy, OptionsError, SolverOptions};

pub fn scenario_from_config(config: &ScenarioConfig) -> Scenario {
    Scenario {
        boat_speed_m_s: config.boat_speed_m_s,
        sun_hours: config.sun_hours,
        battery_hours: config.battery_hours,
        solar: config.solar,
    }
}

/// Apply configured overrides on top of [`SolverOptions::default`].
pub fn solver_options(config: &SolverConfig) -> Result<SolverOptions, OptionsError> {
    let defaults = SolverOptions::default();
    let mu_strategy = match config.mu_strategy {
        Some(MuStrategyConfig::Monotone) => MuStrategy::Monotone,
        Some(MuStrategyConfig::Adaptive) => MuStrategy::Adaptive,
        None => defaults.mu_strategy(),
    };

    SolverOptions::new(
        config.max_iter.unwrap_or(defaults.max_iter()),
        mu_strategy,
        config
            .required_infeasibility_reduction
            .unwrap_or(defaults.required_infeasibility_reduction()),
        config
            .expect_infeasible_problem
            .unwrap_or(defaults.expect_infeasible_problem()),
    )?
    .with_tolerances(
        config
            .constraint_tolerance
            .unwrap_or(defaults.constraint_tolerance()),
        config
            .gradient_tolerance
            .unwrap_or(defaults.gradient_tolerance()),
    )?
    .with_penalty(
        config.initial_penalty.unwrap_or(defaults.initial_penalty()),
        config.penalty_growth.unwrap_or(defaults.penalty_growth()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_overrides_keep_defaults() {
        let options = solver_options(&SolverConfig::default()).expect("options");
        assert_eq!(options, SolverOptions::default());
    }

    #[test]
    fn overrides_are_applied_and_validated() {
        let config = SolverConfig {
            max_iter: Some(50),
            mu_strategy: Some(MuStrategyConfig::Adaptive),
            ..SolverConfig::default()
        };
        let options = solver_options(&config).expect("options");
        assert_eq!(options.max_iter(), 50);
        assert_eq!(options.mu_strategy(), MuStrategy::Adaptive);

        let bad = SolverConfig {
            required_infeasibility_reduction: Some(1.5),
            ..SolverConfig::default()
        };
        assert_eq!(
            solver_options(&bad),
            Err(OptionsError::InfeasibilityReduction(1.5))
        );
    }
}
