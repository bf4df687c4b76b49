//! Optical distortion models used by the mask projection.
//!
//! Two distinct corrections are involved:
//!
//! - [`RadialDistortion`]: the telescope plate distortion applied in the
//!   flat gnomonic plane, before the spherical mask correction.
//! - [`Distortion`]: an optional per-instrument calibration applied to the
//!   final mask-surface coordinates. [`Distortion::Polynomial`] holds a pair
//!   of fitted 2-D polynomials ([`PolynomialDistortion`]).

pub mod polynomial;
pub mod radial;

pub use polynomial::{Polynomial2D, PolynomialDistortion};
pub use radial::RadialDistortion;

/// Mask-surface calibration.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Distortion {
    /// Projected coordinates are used as they are.
    #[default]
    None,
    /// Fitted x/y calibration polynomials.
    Polynomial(PolynomialDistortion),
}

impl Distortion {
    /// Map projected mask coordinates (mm) to calibrated ones.
    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        match self {
            Distortion::None => (x, y),
            Distortion::Polynomial(p) => p.apply(x, y),
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Distortion::None)
    }
}
