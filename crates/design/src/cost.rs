//! Bill-of-materials estimate for a resolved design.

use catamaran_config::CostConfig;
use catamaran_hull::{MassBalance, PhysicalModel};
use serde::Serialize;

/// Cost split by component (USD).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CostEstimate {
    pub battery_usd: f64,
    pub solar_usd: f64,
    pub foam_usd: f64,
    /// Satellite link, MPPT, electronics, sensors, and motors when enabled.
    pub fixed_usd: f64,
    pub total_usd: f64,
}

impl CostEstimate {
    pub fn for_model(model: &PhysicalModel, table: &CostConfig) -> Self {
        let foam_volume_m3 = MassBalance::foam_volume_m3(&model.geometry, model.variables.draft_m);

        let battery_usd = table.battery_usd_per_kg * model.power.battery_mass_kg;
        let solar_usd = table.solar_usd_per_m2 * model.power.solar_area_m2;
        let foam_usd = table.foam_usd_per_m3 * foam_volume_m3;

        let mut fixed_usd =
            table.starlink_usd + table.mppt_usd + table.electronics_usd + table.sensors_usd;
        if table.include_motors {
            fixed_usd += table.motors_usd;
        }

        Self {
            battery_usd,
            solar_usd,
            foam_usd,
            fixed_usd,
            total_usd: battery_usd + solar_usd + foam_usd + fixed_usd,
        }
    }
}
