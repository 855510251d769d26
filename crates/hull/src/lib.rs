//! Physical model of a twin-hull solar boat.
//!
//! Every quantity is a pure function of [`DesignVariables`] and a fixed [`Scenario`]. The
//! optimizer evaluates [`PhysicalModel::evaluate`] while building constraints and again at the
//! resolved point, so both sides share one set of formulas.
//!
//! The model is only defined inside the region the optimizer's constraints describe: a Reynolds
//! number at or below 100 or a degenerate ellipse yields non-finite values rather than an error.

pub mod energy;
pub mod geometry;
pub mod hydrodynamics;

pub use energy::{MassBalance, PowerBudget};
pub use geometry::HullGeometry;
pub use hydrodynamics::Hydrodynamics;

/// The four unknowns sized by the optimizer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DesignVariables {
    /// Hull length `L` (m).
    pub length_m: f64,
    /// Hull width `W` (m).
    pub width_m: f64,
    /// Wetted draft `x` (m).
    pub draft_m: f64,
    /// Hull spacing `B` (m).
    pub beam_m: f64,
}

impl DesignVariables {
    /// Number of free variables.
    pub const COUNT: usize = 4;

    /// Seed point handed to the solver; also used as the nominal scale of each unknown.
    pub const SEED: Self = Self {
        length_m: 10.0,
        width_m: 1.0,
        draft_m: 0.1,
        beam_m: 5.0,
    };

    /// Solver-facing names, in slice order.
    pub const NAMES: [&'static str; Self::COUNT] = ["L", "W", "x", "B"];

    /// Rebuild the variables from a solver vector ordered as [`Self::NAMES`].
    ///
    /// Missing trailing entries read as `NaN` so the model reports them as non-finite.
    pub fn from_slice(values: &[f64]) -> Self {
        let at = |i: usize| values.get(i).copied().unwrap_or(f64::NAN);
        Self {
            length_m: at(0),
            width_m: at(1),
            draft_m: at(2),
            beam_m: at(3),
        }
    }

    /// Flatten into solver order.
    pub fn to_array(&self) -> [f64; Self::COUNT] {
        [self.length_m, self.width_m, self.draft_m, self.beam_m]
    }
}

/// Fixed operating requirements of one design query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scenario {
    /// Cruise speed (m/s).
    pub boat_speed_m_s: f64,
    /// Hours of full sun in which the panels must recharge the battery.
    pub sun_hours: f64,
    /// Hours the battery alone must sustain the cruise power.
    pub battery_hours: f64,
    /// Whether the boat carries solar panels.
    pub solar: bool,
}

/// All derived quantities of one design point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicalModel {
    pub variables: DesignVariables,
    pub scenario: Scenario,
    pub geometry: HullGeometry,
    pub hydrodynamics: Hydrodynamics,
    pub power: PowerBudget,
    pub mass: MassBalance,
}

impl PhysicalModel {
    /// Evaluate geometry, hydrodynamics, power, and mass balance in sequence.
    pub fn evaluate(variables: DesignVariables, scenario: Scenario) -> Self {
        let geometry = HullGeometry::from_dimensions(
            variables.length_m,
            variables.width_m,
            variables.draft_m,
        );
        let hydrodynamics = Hydrodynamics::at_speed(
            scenario.boat_speed_m_s,
            variables.length_m,
            geometry.wetted_area_total_m2,
        );
        let power = PowerBudget::for_drag(hydrodynamics.drag_n, &scenario);
        let mass = MassBalance::resolve(&geometry, &power, variables.draft_m);

        Self {
            variables,
            scenario,
            geometry,
            hydrodynamics,
            power,
            mass,
        }
    }

    /// True when every derived quantity is a finite number.
    pub fn is_finite(&self) -> bool {
        self.geometry.is_finite()
            && self.hydrodynamics.is_finite()
            && self.power.is_finite()
            && self.mass.is_finite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cruise() -> Scenario {
        Scenario {
            boat_speed_m_s: 5.0,
            sun_hours: 5.0,
            battery_hours: 10.0,
            solar: true,
        }
    }

    #[test]
    fn seed_point_is_inside_model_domain() {
        let model = PhysicalModel::evaluate(DesignVariables::SEED, cruise());
        assert!(model.is_finite());
        assert!(model.hydrodynamics.reynolds > 1.0e3);
        assert!(model.mass.mass_total_kg > catamaran_core::model::PAYLOAD_MASS_KG);
    }

    #[test]
    fn slice_round_trip_keeps_solver_order() {
        let vars = DesignVariables::from_slice(&[12.0, 1.5, 0.8, 6.0]);
        assert_eq!(vars.length_m, 12.0);
        assert_eq!(vars.draft_m, 0.8);
        assert_eq!(vars.to_array(), [12.0, 1.5, 0.8, 6.0]);
    }

    #[test]
    fn short_slice_is_not_finite() {
        let model = PhysicalModel::evaluate(DesignVariables::from_slice(&[10.0]), cruise());
        assert!(!model.is_finite());
    }

    #[test]
    fn reynolds_below_log_domain_is_not_finite() {
        let vars = DesignVariables {
            length_m: -1.0,
            ..DesignVariables::SEED
        };
        let model = PhysicalModel::evaluate(vars, cruise());
        assert!(!model.is_finite());
    }
}
