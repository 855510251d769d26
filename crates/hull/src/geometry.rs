//! Elliptical hull planform.

use std::f64::consts::PI;

/// Waterplane geometry of the two hulls.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HullGeometry {
    /// Face (waterplane) area of one hull (m²).
    pub face_area_m2: f64,
    /// Face area of both hulls (m²).
    pub face_area_total_m2: f64,
    /// Perimeter of one hull's ellipse (m).
    pub perimeter_m: f64,
    /// Wetted surface of one hull: bottom face plus submerged sides (m²).
    pub wetted_area_m2: f64,
    /// Wetted surface of both hulls (m²).
    pub wetted_area_total_m2: f64,
}

impl HullGeometry {
    /// Treat each hull as an ellipse of axes `length × width` immersed to `draft`.
    pub fn from_dimensions(length_m: f64, width_m: f64, draft_m: f64) -> Self {
        let a = length_m / 2.0;
        let b = width_m / 2.0;

        let face_area_m2 = ellipse_area(a, b);
        let perimeter_m = ramanujan_perimeter(a, b);
        let wetted_area_m2 = face_area_m2 + perimeter_m * draft_m;

        Self {
            face_area_m2,
            face_area_total_m2: 2.0 * face_area_m2,
            perimeter_m,
            wetted_area_m2,
            wetted_area_total_m2: 2.0 * wetted_area_m2,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.face_area_total_m2.is_finite()
            && self.perimeter_m.is_finite()
            && self.wetted_area_total_m2.is_finite()
    }
}

/// Area of an ellipse with semi-axes `a` and `b`.
#[inline]
pub fn ellipse_area(a: f64, b: f64) -> f64 {
    PI * a * b
}

/// Ramanujan's approximation of the ellipse perimeter.
///
/// The radicand `(3a + b)(a + 3b)` is negative for some sign combinations of the semi-axes, in
/// which case the result is `NaN`.
#[inline]
pub fn ramanujan_perimeter(a: f64, b: f64) -> f64 {
    PI * (3.0 * (a + b) - ((3.0 * a + b) * (a + 3.0 * b)).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn circle_perimeter_is_exact() {
        let r = 2.5;
        assert!((ramanujan_perimeter(r, r) - 2.0 * PI * r).abs() < 1e-12);
    }

    #[test]
    fn slender_hull_matches_reference_perimeter() {
        // Exact perimeter of the 10 m x 1 m ellipse is 20.3022 m.
        let p = ramanujan_perimeter(5.0, 0.5);
        assert!((p - 20.3022).abs() < 1e-2, "perimeter {p}");
    }

    #[test]
    fn wetted_area_adds_submerged_sides() {
        let g = HullGeometry::from_dimensions(10.0, 1.0, 0.1);
        assert!((g.face_area_m2 - PI * 5.0 * 0.5).abs() < 1e-12);
        assert!((g.wetted_area_m2 - (g.face_area_m2 + 0.1 * g.perimeter_m)).abs() < 1e-12);
        assert!((g.wetted_area_total_m2 - 2.0 * g.wetted_area_m2).abs() < 1e-12);
    }

    #[test]
    fn negative_radicand_yields_nan() {
        assert!(ramanujan_perimeter(1.0, -0.5).is_nan());
    }
}
