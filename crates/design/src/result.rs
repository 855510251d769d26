//! The resolved design handed to the backtest and the exporters.

use std::fmt;

use catamaran_hull::{DesignVariables, PhysicalModel, Scenario};
use serde::Serialize;
use serde::ser::{SerializeMap, Serializer};

/// Named quantities of a resolved design, in reporting order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    Length,
    Width,
    Beam,
    Reynolds,
    WettedAreaPerHull,
    Draft,
    HullPerimeter,
    HullFaceArea,
    BuoyantForceMass,
    MassTotal,
    BatteryMass,
    SolarMass,
    FoamMass,
    PayloadMass,
    StarlinkMass,
    Power,
    DragForce,
    FrictionCoefficient,
    EnergyRequired,
    SolarArea,
    Froude,
    BatteryEnergy,
    TotalCost,
    BoatSpeed,
    SunHours,
    BatteryHours,
    Solar,
}

impl Field {
    pub const COUNT: usize = 27;

    pub const ALL: [Field; Self::COUNT] = [
        Field::Length,
        Field::Width,
        Field::Beam,
        Field::Reynolds,
        Field::WettedAreaPerHull,
        Field::Draft,
        Field::HullPerimeter,
        Field::HullFaceArea,
        Field::BuoyantForceMass,
        Field::MassTotal,
        Field::BatteryMass,
        Field::SolarMass,
        Field::FoamMass,
        Field::PayloadMass,
        Field::StarlinkMass,
        Field::Power,
        Field::DragForce,
        Field::FrictionCoefficient,
        Field::EnergyRequired,
        Field::SolarArea,
        Field::Froude,
        Field::BatteryEnergy,
        Field::TotalCost,
        Field::BoatSpeed,
        Field::SunHours,
        Field::BatteryHours,
        Field::Solar,
    ];

    /// Key used in printed tables and exported files.
    pub const fn as_str(self) -> &'static str {
        match self {
            Field::Length => "L",
            Field::Width => "W",
            Field::Beam => "B",
            Field::Reynolds => "Re_num",
            Field::WettedAreaPerHull => "S_hull_wetted",
            Field::Draft => "x",
            Field::HullPerimeter => "hull_perimeter",
            Field::HullFaceArea => "hull_face_area",
            Field::BuoyantForceMass => "buoyant_force_mass",
            Field::MassTotal => "mass_total",
            Field::BatteryMass => "battery_mass",
            Field::SolarMass => "solar_mass",
            Field::FoamMass => "foam_mass",
            Field::PayloadMass => "mass_payload",
            Field::StarlinkMass => "starlink_mass",
            Field::Power => "power",
            Field::DragForce => "F_drag",
            Field::FrictionCoefficient => "C_f",
            Field::EnergyRequired => "energy_req",
            Field::SolarArea => "solar_area",
            Field::Froude => "Fr_num",
            Field::BatteryEnergy => "battery_energy",
            Field::TotalCost => "total_cost",
            Field::BoatSpeed => "boat_speed",
            Field::SunHours => "hrs_sun",
            Field::BatteryHours => "battery_hours",
            Field::Solar => "solar",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.as_str() == name)
    }

    const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the resolved point was obtained.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SolveStatus {
    Converged,
    /// The solver failed and the point is its last iterate; constraints may be violated.
    FallbackIterate { reason: String },
}

impl SolveStatus {
    pub fn is_converged(&self) -> bool {
        matches!(self, SolveStatus::Converged)
    }
}

impl fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolveStatus::Converged => f.write_str("converged"),
            SolveStatus::FallbackIterate { reason } => write!(f, "fallback iterate ({reason})"),
        }
    }
}

/// Every tracked quantity at the resolved point, plus the echoed scenario.
///
/// Immutable once built; values are read by [`Field`] or by their reporting name.
#[derive(Debug, Clone, PartialEq)]
pub struct SolverResult {
    values: [f64; Field::COUNT],
    status: SolveStatus,
    iterations: usize,
}

impl SolverResult {
    pub(crate) fn from_model(
        model: &PhysicalModel,
        total_cost: f64,
        status: SolveStatus,
        iterations: usize,
    ) -> Self {
        let vars = &model.variables;
        let scenario = &model.scenario;
        let mut values = [f64::NAN; Field::COUNT];
        let mut set = |field: Field, value: f64| values[field.index()] = value;

        set(Field::Length, vars.length_m);
        set(Field::Width, vars.width_m);
        set(Field::Beam, vars.beam_m);
        set(Field::Reynolds, model.hydrodynamics.reynolds);
        set(Field::WettedAreaPerHull, model.geometry.wetted_area_m2);
        set(Field::Draft, vars.draft_m);
        set(Field::HullPerimeter, model.geometry.perimeter_m);
        set(Field::HullFaceArea, model.geometry.face_area_m2);
        set(Field::BuoyantForceMass, model.mass.buoyant_force_mass_kg);
        set(Field::MassTotal, model.mass.mass_total_kg);
        set(Field::BatteryMass, model.power.battery_mass_kg);
        set(Field::SolarMass, model.power.solar_mass_kg);
        set(Field::FoamMass, model.mass.foam_mass_kg);
        set(Field::PayloadMass, model.mass.payload_mass_kg);
        set(Field::StarlinkMass, model.mass.starlink_mass_kg);
        set(Field::Power, model.power.power_w);
        set(Field::DragForce, model.hydrodynamics.drag_n);
        set(Field::FrictionCoefficient, model.hydrodynamics.friction_coefficient);
        set(Field::EnergyRequired, model.power.energy_req_wh);
        set(Field::SolarArea, model.power.solar_area_m2);
        set(Field::Froude, model.hydrodynamics.froude);
        set(Field::BatteryEnergy, model.power.battery_energy_wh);
        set(Field::TotalCost, total_cost);
        set(Field::BoatSpeed, scenario.boat_speed_m_s);
        set(Field::SunHours, scenario.sun_hours);
        set(Field::BatteryHours, scenario.battery_hours);
        set(Field::Solar, if scenario.solar { 1.0 } else { 0.0 });

        Self {
            values,
            status,
            iterations,
        }
    }

    pub fn get(&self, field: Field) -> f64 {
        self.values[field.index()]
    }

    pub fn get_by_name(&self, name: &str) -> Option<f64> {
        Field::from_name(name).map(|field| self.get(field))
    }

    /// Fields and values in reporting order.
    pub fn iter(&self) -> impl Iterator<Item = (Field, f64)> + '_ {
        Field::ALL.into_iter().map(|field| (field, self.get(field)))
    }

    pub fn status(&self) -> &SolveStatus {
        &self.status
    }

    pub fn is_converged(&self) -> bool {
        self.status.is_converged()
    }

    /// Inner solver iterations spent, restoration included.
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Total electrical draw while cruising (W).
    pub fn power_w(&self) -> f64 {
        self.get(Field::Power)
    }

    /// Rated battery energy, which is also the backtest capacity (Wh).
    pub fn battery_energy_wh(&self) -> f64 {
        self.get(Field::BatteryEnergy)
    }

    pub fn solar_area_m2(&self) -> f64 {
        self.get(Field::SolarArea)
    }

    pub fn variables(&self) -> DesignVariables {
        DesignVariables {
            length_m: self.get(Field::Length),
            width_m: self.get(Field::Width),
            draft_m: self.get(Field::Draft),
            beam_m: self.get(Field::Beam),
        }
    }

    pub fn scenario(&self) -> Scenario {
        Scenario {
            boat_speed_m_s: self.get(Field::BoatSpeed),
            sun_hours: self.get(Field::SunHours),
            battery_hours: self.get(Field::BatteryHours),
            solar: self.get(Field::Solar) != 0.0,
        }
    }
}

impl Serialize for SolverResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(Field::COUNT + 2))?;
        for (field, value) in self.iter() {
            map.serialize_entry(field.as_str(), &value)?;
        }
        map.serialize_entry("status", &self.status)?;
        map.serialize_entry("iterations", &self.iterations)?;
        map.end()
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
            solar: false,
        }
    }

    fn seed_result() -> SolverResult {
        let model = PhysicalModel::evaluate(DesignVariables::SEED, cruise());
        SolverResult::from_model(&model, 1_234.0, SolveStatus::Converged, 7)
    }

    #[test]
    fn field_order_matches_discriminants() {
        for (i, field) in Field::ALL.into_iter().enumerate() {
            assert_eq!(field.index(), i);
            assert_eq!(Field::from_name(field.as_str()), Some(field));
        }
        assert_eq!(Field::from_name("hull_face_area_total"), None);
    }

    #[test]
    fn every_field_is_populated() {
        let result = seed_result();
        for (field, value) in result.iter() {
            assert!(value.is_finite(), "{field} is {value}");
        }
        assert_eq!(result.get(Field::TotalCost), 1_234.0);
        assert_eq!(result.get(Field::Solar), 0.0);
        assert_eq!(result.get(Field::SolarArea), 0.0);
    }

    #[test]
    fn variables_and_scenario_round_trip() {
        let result = seed_result();
        assert_eq!(result.variables(), DesignVariables::SEED);
        assert_eq!(result.scenario(), cruise());
        assert_eq!(result.get_by_name("L"), Some(10.0));
        assert_eq!(result.get_by_name("hrs_sun"), Some(5.0));
    }

    #[test]
    fn serializes_as_flat_map_with_status() {
        let json = serde_json::to_value(seed_result()).expect("serialize");
        let object = json.as_object().expect("object");
        for field in Field::ALL {
            assert!(object.contains_key(field.as_str()), "missing {field}");
        }
        assert_eq!(json["status"]["kind"], "converged");
        assert_eq!(json["iterations"], 7);
    }
}
