//! Radial plate distortion: ρ_d = ρ × (1 + c0 + c2·ρ²).
//!
//! Maps flat gnomonic focal-plane positions (mm, relative to the telescope
//! axis) to distorted positions before the spherical mask correction.

/// Radial distortion with a constant and a quadratic term.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadialDistortion {
    /// Constant scale offset.
    pub c0: f64,
    /// Quadratic coefficient, per mm².
    pub c2: f64,
}

impl RadialDistortion {
    pub fn new(c0: f64, c2: f64) -> Self {
        Self { c0, c2 }
    }

    /// Keck/DEIMOS telescope plate distortion.
    pub fn deimos() -> Self {
        Self::new(0.0, -1.111311e-8)
    }

    /// Forward distortion: gnomonic → distorted, both in mm.
    pub fn distort(&self, x: f64, y: f64) -> (f64, f64) {
        let rho2 = x * x + y * y;
        let f = 1.0 + self.c0 + self.c2 * rho2;
        (x * f, y * f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_value() {
        // At 300 mm the DEIMOS term pulls points in by 1 - 1.111311e-8 * 9e4.
        let d = RadialDistortion::deimos();
        let (xd, yd) = d.distort(300.0, 0.0);
        assert!((xd - 300.0 * (1.0 - 1.111311e-8 * 9.0e4)).abs() < 1e-12);
        assert_eq!(yd, 0.0);
    }

    #[test]
    fn test_zero_and_origin() {
        let d = RadialDistortion::new(0.0, 0.0);
        assert_eq!(d.distort(12.5, -3.0), (12.5, -3.0));
        let d = RadialDistortion::deimos();
        assert_eq!(d.distort(0.0, 0.0), (0.0, 0.0));
    }
}
