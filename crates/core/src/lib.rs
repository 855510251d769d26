//! Core constants for the Solar Catamaran workspace.

/// Physical constants expressed in SI units (unless stated otherwise).
pub mod constants {
    /// Gravitational acceleration used by the Froude number (m/s²).
    pub const G: f64 = 9.81;
    /// Density of water (kg/m³).
    pub const WATER_DENSITY_KG_M3: f64 = 1_000.0;
    /// Kinematic viscosity of water (m²/s).
    pub const WATER_KINEMATIC_VISCOSITY_M2_S: f64 = 1.0e-6;
    /// Hours per day.
    pub const HOURS_PER_DAY: f64 = 24.0;
}

/// Fixed parameters of the hull, power train, and payload model.
pub mod model {
    /// Areal density of the solar panels (kg/m²).
    pub const SOLAR_AREAL_DENSITY_KG_M2: f64 = 0.4;
    /// Areal density of the structural foam (kg/m²). Also enters buoyancy as a density.
    pub const FOAM_AREAL_DENSITY_KG_M2: f64 = 3.0;
    /// Foam thickness carried above the waterline (m).
    pub const FOAM_FREEBOARD_M: f64 = 0.5;
    /// Battery specific energy (Wh/kg).
    pub const BATTERY_SPECIFIC_ENERGY_WH_KG: f64 = 183.0;
    /// Fixed payload mass (kg).
    pub const PAYLOAD_MASS_KG: f64 = 30_000.0;
    /// Satellite-link terminal mass (kg).
    pub const STARLINK_MASS_KG: f64 = 3.0;
    /// Continuous electronics load: 25 W of sensors plus 300 W of satellite link.
    pub const HOTEL_LOAD_W: f64 = 25.0 + 300.0;
    /// Design-point solar irradiance (W/m²).
    pub const SOLAR_INTENSITY_W_M2: f64 = 1_000.0;
    /// Battery charging efficiency used while sizing.
    pub const ETA_CHARGING: f64 = 0.98;
    /// Drive-train efficiency.
    pub const ETA_PROPULSION: f64 = 0.7;
    /// Solar panel efficiency used while sizing.
    pub const ETA_SOLAR: f64 = 0.20;
    /// Numerator of the ITTC-1957 turbulent friction line.
    pub const ITTC_NUMERATOR: f64 = 0.075;
}
