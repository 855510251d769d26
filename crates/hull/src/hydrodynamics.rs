//! Frictional resistance of the wetted hulls.

use catamaran_core::constants::{G, WATER_DENSITY_KG_M3, WATER_KINEMATIC_VISCOSITY_M2_S};
use catamaran_core::model::ITTC_NUMERATOR;

/// Flow regime and resistance at cruise speed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hydrodynamics {
    /// Length-based Reynolds number.
    pub reynolds: f64,
    /// Skin-friction coefficient, used as the total resistance coefficient.
    pub friction_coefficient: f64,
    /// Drag on both hulls (N).
    pub drag_n: f64,
    /// Length-based Froude number.
    pub froude: f64,
}

impl Hydrodynamics {
    pub fn at_speed(speed_m_s: f64, length_m: f64, wetted_area_total_m2: f64) -> Self {
        let reynolds = reynolds_number(speed_m_s, length_m);
        let friction_coefficient = friction_coefficient(reynolds);
        let drag_n = drag_force(friction_coefficient, wetted_area_total_m2, speed_m_s);

        Self {
            reynolds,
            friction_coefficient,
            drag_n,
            froude: froude_number(speed_m_s, length_m),
        }
    }

    pub fn is_finite(&self) -> bool {
        self.reynolds.is_finite()
            && self.friction_coefficient.is_finite()
            && self.drag_n.is_finite()
            && self.froude.is_finite()
    }
}

#[inline]
pub fn reynolds_number(speed_m_s: f64, length_m: f64) -> f64 {
    speed_m_s * length_m / WATER_KINEMATIC_VISCOSITY_M2_S
}

/// ITTC-1957 friction line. Undefined for `reynolds <= 100`.
#[inline]
pub fn friction_coefficient(reynolds: f64) -> f64 {
    let denom = reynolds.log10() - 2.0;
    ITTC_NUMERATOR / (denom * denom)
}

#[inline]
pub fn drag_force(coefficient: f64, wetted_area_m2: f64, speed_m_s: f64) -> f64 {
    0.5 * WATER_DENSITY_KG_M3 * coefficient * wetted_area_m2 * speed_m_s * speed_m_s
}

#[inline]
pub fn froude_number(speed_m_s: f64, length_m: f64) -> f64 {
    speed_m_s / (G * length_m).sqrt()
}
