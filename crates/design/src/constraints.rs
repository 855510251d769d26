//! Feasible region and objective of the hull sizing problem.
//!
//! Each rule is a residual over a fully evaluated [`PhysicalModel`], so the solver and the
//! post-solve feasibility check read the same formulas.

use catamaran_core::model::PAYLOAD_MASS_KG;
use catamaran_hull::{DesignVariables, PhysicalModel, Scenario};
use catamaran_nlp::{Constraint, Problem, ProblemError, Relation};
use serde::Serialize;

use crate::result::SolverResult;

pub const MIN_LENGTH_TO_WIDTH: f64 = 6.0;
pub const MIN_WIDTH_M: f64 = 0.1;
pub const MIN_BEAM_M: f64 = 0.01;
pub const MIN_DRAFT_M: f64 = 0.01;
/// Lower end of the turbulent flat-plate correlation's validity.
pub const MIN_REYNOLDS: f64 = 1.0e3;
pub const MIN_POSITIVE: f64 = 0.01;

struct Rule {
    name: &'static str,
    relation: Relation,
    scale: f64,
    solar_only: bool,
    residual: fn(&PhysicalModel) -> f64,
}

static RULES: [Rule; 12] = [
    Rule {
        name: "L/W >= 6",
        relation: Relation::AtLeast,
        scale: 1.0,
        solar_only: false,
        residual: |m| m.variables.length_m / m.variables.width_m - MIN_LENGTH_TO_WIDTH,
    },
    Rule {
        name: "L/B > 1",
        relation: Relation::Greater,
        scale: 1.0,
        solar_only: false,
        residual: |m| m.variables.length_m / m.variables.beam_m - 1.0,
    },
    Rule {
        name: "solar_area/(L*B) < 1",
        relation: Relation::Greater,
        scale: 1.0,
        solar_only: true,
        residual: |m| {
            1.0 - m.power.solar_area_m2 / (m.variables.length_m * m.variables.beam_m)
        },
    },
    Rule {
        name: "L > 0",
        relation: Relation::Greater,
        scale: 10.0,
        solar_only: false,
        residual: |m| m.variables.length_m,
    },
    Rule {
        name: "W > 0.1",
        relation: Relation::Greater,
        scale: 1.0,
        solar_only: false,
        residual: |m| m.variables.width_m - MIN_WIDTH_M,
    },
    Rule {
        name: "B > 0.01",
        relation: Relation::Greater,
        scale: 5.0,
        solar_only: false,
        residual: |m| m.variables.beam_m - MIN_BEAM_M,
    },
    Rule {
        name: "x > 0.01",
        relation: Relation::Greater,
        scale: 0.1,
        solar_only: false,
        residual: |m| m.variables.draft_m - MIN_DRAFT_M,
    },
    Rule {
        name: "buoyant_force_mass == mass_total",
        relation: Relation::Equal,
        scale: PAYLOAD_MASS_KG,
        solar_only: false,
        residual: |m| m.mass.buoyant_force_mass_kg - m.mass.mass_total_kg,
    },
    Rule {
        name: "Re > 1e3",
        relation: Relation::Greater,
        scale: 1.0e6,
        solar_only: false,
        residual: |m| m.hydrodynamics.reynolds - MIN_REYNOLDS,
    },
    Rule {
        name: "mass_total > 0.01",
        relation: Relation::Greater,
        scale: PAYLOAD_MASS_KG,
        solar_only: false,
        residual: |m| m.mass.mass_total_kg - MIN_POSITIVE,
    },
    Rule {
        name: "battery_mass > 0.01",
        relation: Relation::Greater,
        scale: 100.0,
        solar_only: false,
        residual: |m| m.power.battery_mass_kg - MIN_POSITIVE,
    },
    Rule {
        name: "energy_req > 0.01",
        relation: Relation::Greater,
        scale: 1.0e4,
        solar_only: false,
        residual: |m| m.power.energy_req_wh - MIN_POSITIVE,
    },
];

fn active_rules(solar: bool) -> impl Iterator<Item = &'static Rule> {
    RULES.iter().filter(move |rule| solar || !rule.solar_only)
}

fn model_at(x: &[f64], scenario: Scenario) -> PhysicalModel {
    PhysicalModel::evaluate(DesignVariables::from_slice(x), scenario)
}

/// Minimum total mass over `L, W, x, B`, seeded and scaled at [`DesignVariables::SEED`].
pub fn build_problem(scenario: &Scenario) -> Result<Problem, ProblemError> {
    let scenario = *scenario;
    let seed = DesignVariables::SEED.to_array();

    let mut builder = Problem::builder();
    for (name, value) in DesignVariables::NAMES.into_iter().zip(seed) {
        builder = builder.variable(name, value, value);
    }

    builder
        .minimize(move |x| model_at(x, scenario).mass.mass_total_kg)
        .subject_to_all(active_rules(scenario.solar).map(|rule| {
            let residual = rule.residual;
            Constraint::new(rule.name, rule.relation, move |x| {
                residual(&model_at(x, scenario))
            })
            .with_scale(rule.scale)
        }))
        .build()
}

/// A constraint the resolved design breaks.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Violation {
    pub constraint: &'static str,
    pub relation: &'static str,
    /// Residual in physical units; `lhs - rhs`.
    pub residual: f64,
    /// Violation after constraint scaling, comparable to the solver tolerance.
    pub scaled_violation: f64,
}

/// Re-check a result against the constraint set.
///
/// Strict relations are accepted within `tolerance` like their non-strict forms, matching
/// what the solver enforces. Non-finite residuals are always violations.
pub fn verify_feasibility(result: &SolverResult, tolerance: f64) -> Vec<Violation> {
    let scenario = result.scenario();
    let model = PhysicalModel::evaluate(result.variables(), scenario);

    active_rules(scenario.solar)
        .filter_map(|rule| {
            let residual = (rule.residual)(&model);
            let scaled_violation = if residual.is_finite() {
                rule.relation.violation(residual / rule.scale)
            } else {
                f64::INFINITY
            };
            (scaled_violation > tolerance).then(|| Violation {
                constraint: rule.name,
                relation: rule.relation.symbol(),
                residual,
                scaled_violation,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::{Field, SolveStatus};

    fn scenario(solar: bool) -> Scenario {
        Scenario {
            boat_speed_m_s: 5.0,
            sun_hours: 5.0,
            battery_hours: 10.0,
            solar,
        }
    }

    #[test]
    fn solar_ratio_only_applies_with_panels() {
        let with = build_problem(&scenario(true)).expect("problem");
        let without = build_problem(&scenario(false)).expect("problem");
        assert_eq!(with.constraints().len(), 12);
        assert_eq!(without.constraints().len(), 11);
        assert!(
            without
                .constraints()
                .iter()
                .all(|c| c.name != "solar_area/(L*B) < 1")
        );
    }

    #[test]
    fn variables_follow_seed_order() {
        let problem = build_problem(&scenario(true)).expect("problem");
        let names: Vec<&str> = problem.variables().iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, DesignVariables::NAMES);
        assert_eq!(problem.initial_point(), DesignVariables::SEED.to_array());
        let model = PhysicalModel::evaluate(DesignVariables::SEED, scenario(true));
        assert_eq!(
            problem.objective(&problem.initial_point()),
            model.mass.mass_total_kg
        );
    }

    #[test]
    fn seed_point_breaks_buoyancy_and_solar_footprint() {
        let model = PhysicalModel::evaluate(DesignVariables::SEED, scenario(true));
        let result = SolverResult::from_model(&model, 0.0, SolveStatus::Converged, 0);

        let broken: Vec<&str> = verify_feasibility(&result, 1e-6)
            .into_iter()
            .map(|v| v.constraint)
            .collect();
        assert!(broken.contains(&"buoyant_force_mass == mass_total"));
        assert!(broken.contains(&"solar_area/(L*B) < 1"));
        assert!(!broken.contains(&"L/W >= 6"));
        assert!(result.get(Field::MassTotal) > result.get(Field::BuoyantForceMass));
    }

    #[test]
    fn non_finite_point_violates_everything_it_touches() {
        let vars = DesignVariables::from_slice(&[f64::NAN; 4]);
        let model = PhysicalModel::evaluate(vars, scenario(false));
        let result = SolverResult::from_model(&model, f64::NAN, SolveStatus::Converged, 0);

        let violations = verify_feasibility(&result, 1e-6);
        assert_eq!(violations.len(), 11);
        assert!(violations.iter().all(|v| v.scaled_violation.is_infinite()));
    }
}
