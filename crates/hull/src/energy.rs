//! Power, energy storage, and mass balance.
//!
//! The required energy divides by the propulsion efficiency a second time, on top of the
//! division already applied to the propulsion power.

use catamaran_core::constants::WATER_DENSITY_KG_M3;
use catamaran_core::model::{
    BATTERY_SPECIFIC_ENERGY_WH_KG, ETA_CHARGING, ETA_PROPULSION, ETA_SOLAR,
    FOAM_AREAL_DENSITY_KG_M2, FOAM_FREEBOARD_M, HOTEL_LOAD_W, PAYLOAD_MASS_KG,
    SOLAR_AREAL_DENSITY_KG_M2, SOLAR_INTENSITY_W_M2, STARLINK_MASS_KG,
};

use crate::Scenario;
use crate::geometry::HullGeometry;

/// Electrical demand and the storage/collection sized to meet it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PowerBudget {
    /// Propulsion plus hotel load (W).
    pub power_w: f64,
    /// Energy to cover the autonomy window (Wh).
    pub energy_req_wh: f64,
    pub battery_mass_kg: f64,
    /// Rated battery energy, recomputed from the battery mass (Wh).
    pub battery_energy_wh: f64,
    pub solar_area_m2: f64,
    pub solar_mass_kg: f64,
}

impl PowerBudget {
    pub fn for_drag(drag_n: f64, scenario: &Scenario) -> Self {
        let speed = scenario.boat_speed_m_s;
        let power_w = drag_n * speed / ETA_PROPULSION + HOTEL_LOAD_W;
        let energy_req_wh = power_w * scenario.battery_hours / ETA_PROPULSION / ETA_CHARGING;

        let battery_mass_kg = energy_req_wh / BATTERY_SPECIFIC_ENERGY_WH_KG;
        let battery_energy_wh = battery_mass_kg * BATTERY_SPECIFIC_ENERGY_WH_KG;

        let (solar_area_m2, solar_mass_kg) = if scenario.solar {
            let area = energy_req_wh / (SOLAR_INTENSITY_W_M2 * scenario.sun_hours * ETA_SOLAR);
            (area, SOLAR_AREAL_DENSITY_KG_M2 * area)
        } else {
            (0.0, 0.0)
        };

        Self {
            power_w,
            energy_req_wh,
            battery_mass_kg,
            battery_energy_wh,
            solar_area_m2,
            solar_mass_kg,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.power_w.is_finite()
            && self.energy_req_wh.is_finite()
            && self.battery_energy_wh.is_finite()
            && self.solar_area_m2.is_finite()
    }
}

/// Mass carried by the boat versus mass the hulls can float.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MassBalance {
    pub foam_mass_kg: f64,
    pub payload_mass_kg: f64,
    pub starlink_mass_kg: f64,
    /// Battery, solar, foam, satellite link, and payload (kg).
    pub mass_total_kg: f64,
    /// Mass supported by the displaced water at the current draft (kg).
    pub buoyant_force_mass_kg: f64,
}

impl MassBalance {
    pub fn resolve(geometry: &HullGeometry, power: &PowerBudget, draft_m: f64) -> Self {
        let foam_mass_kg =
            geometry.face_area_total_m2 * FOAM_AREAL_DENSITY_KG_M2 * (FOAM_FREEBOARD_M + draft_m);

        let mass_total_kg = power.battery_mass_kg
            + power.solar_mass_kg
            + foam_mass_kg
            + STARLINK_MASS_KG
            + PAYLOAD_MASS_KG;

        let buoyant_force_mass_kg =
            (WATER_DENSITY_KG_M3 - FOAM_AREAL_DENSITY_KG_M2) * geometry.face_area_total_m2 * draft_m;

        Self {
            foam_mass_kg,
            payload_mass_kg: PAYLOAD_MASS_KG,
            starlink_mass_kg: STARLINK_MASS_KG,
            mass_total_kg,
            buoyant_force_mass_kg,
        }
    }

    /// Foam volume of both hulls (m³), used by the cost estimate.
    pub fn foam_volume_m3(geometry: &HullGeometry, draft_m: f64) -> f64 {
        (FOAM_FREEBOARD_M + draft_m) * geometry.face_area_total_m2
    }

    pub fn is_finite(&self) -> bool {
        self.foam_mass_kg.is_finite()
            && self.mass_total_kg.is_finite()
            && self.buoyant_force_mass_kg.is_finite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario(solar: bool) -> Scenario {
        Scenario {
            boat_speed_m_s: 5.0,
            sun_hours: 5.0,
            battery_hours: 10.0,
            solar,
        }
    }

    #[test]
    fn battery_energy_round_trips_through_mass() {
        let budget = PowerBudget::for_drag(570.0, &scenario(true));
        let rebuilt = budget.battery_mass_kg * BATTERY_SPECIFIC_ENERGY_WH_KG;
        assert!((budget.battery_energy_wh - rebuilt).abs() < 1e-9);
        assert!((budget.battery_energy_wh - budget.energy_req_wh).abs() < 1e-9);
    }

    #[test]
    fn energy_applies_propulsion_efficiency_twice() {
        let budget = PowerBudget::for_drag(0.0, &scenario(false));
        assert!((budget.power_w - 325.0).abs() < 1e-12);
        let expected = 325.0 * 10.0 / 0.7 / 0.98;
        assert!((budget.energy_req_wh - expected).abs() < 1e-9);
    }

    #[test]
    fn solar_disabled_zeroes_panel_terms() {
        let budget = PowerBudget::for_drag(570.0, &scenario(false));
        assert_eq!(budget.solar_area_m2, 0.0);
        assert_eq!(budget.solar_mass_kg, 0.0);
    }

    #[test]
    fn solar_area_recharges_in_sun_hours() {
        let budget = PowerBudget::for_drag(570.0, &scenario(true));
        let harvested = budget.solar_area_m2 * 1_000.0 * 5.0 * 0.20;
        assert!((harvested - budget.energy_req_wh).abs() < 1e-6);
        assert!((budget.solar_mass_kg - 0.4 * budget.solar_area_m2).abs() < 1e-12);
    }

    #[test]
    fn buoyancy_uses_net_density_of_foam_hulls() {
        let geometry = HullGeometry::from_dimensions(10.0, 1.0, 2.0);
        let power = PowerBudget::for_drag(0.0, &scenario(false));
        let mass = MassBalance::resolve(&geometry, &power, 2.0);
        let expected = 997.0 * geometry.face_area_total_m2 * 2.0;
        assert!((mass.buoyant_force_mass_kg - expected).abs() < 1e-9);
        assert!(
            (mass.foam_mass_kg - 3.0 * 2.5 * geometry.face_area_total_m2).abs() < 1e-9,
            "foam {}",
            mass.foam_mass_kg
        );
    }
}
