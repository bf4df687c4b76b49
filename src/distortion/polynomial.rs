//! Calibration polynomial mapping projected mask coordinates to measured ones.
//!
//! Each axis has its own full 2-D polynomial of total degree `n`:
//!
//! ```text
//! x' = Σ cx_ij · x^i · y^j     (0 ≤ i+j ≤ n)
//! y' = Σ cy_ij · x^i · y^j
//! ```
//!
//! The polynomials are fitted externally against as-cut masks; this module
//! only evaluates them. Coefficients are stored in the order the calibration
//! files list them: `c0_0 … cn_0`, then `c0_1 … c0_n`, then the cross terms
//! `c1_1, c1_2, …` with `i` outer and `j` inner.

use crate::error::SlitmaskError;

/// A 2-D polynomial of fixed total degree.
#[derive(Debug, Clone, PartialEq)]
pub struct Polynomial2D {
    pub degree: u32,
    /// Flat coefficient vector, indexed by `coeff_index(degree, i, j)`.
    pub coeffs: Vec<f64>,
}

impl Polynomial2D {
    pub fn new(degree: u32, coeffs: Vec<f64>) -> Result<Self, SlitmaskError> {
        let expected = num_coeffs(degree);
        if coeffs.len() != expected {
            return Err(SlitmaskError::CoefficientCount {
                degree,
                expected,
                got: coeffs.len(),
            });
        }
        Ok(Self { degree, coeffs })
    }

    /// All-zero polynomial.
    pub fn zero(degree: u32) -> Self {
        Self {
            degree,
            coeffs: vec![0.0; num_coeffs(degree)],
        }
    }

    /// Polynomial returning `x` (`axis == 0`) or `y` (`axis == 1`) unchanged.
    pub fn identity(degree: u32, axis: usize) -> Self {
        let mut p = Self::zero(degree.max(1));
        let idx = if axis == 0 {
            coeff_index(p.degree, 1, 0)
        } else {
            coeff_index(p.degree, 0, 1)
        };
        p.coeffs[idx] = 1.0;
        p
    }

    /// Parse a comma-separated coefficient list; the degree is inferred from the count.
    pub fn parse(text: &str) -> Result<Self, SlitmaskError> {
        let coeffs = text
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                s.parse::<f64>()
                    .map_err(|_| SlitmaskError::InvalidCoefficient(s.to_string()))
            })
            .collect::<Result<Vec<f64>, SlitmaskError>>()?;

        let degree = degree_for_count(coeffs.len()).ok_or(SlitmaskError::CoefficientCount {
            degree: 0,
            expected: 1,
            got: coeffs.len(),
        })?;
        Self::new(degree, coeffs)
    }

    pub fn coeff(&self, i: u32, j: u32) -> f64 {
        self.coeffs[coeff_index(self.degree, i, j)]
    }

    pub fn eval(&self, x: f64, y: f64) -> f64 {
        term_pairs(self.degree)
            .into_iter()
            .zip(&self.coeffs)
            .map(|((i, j), c)| c * x.powi(i as i32) * y.powi(j as i32))
            .sum()
    }
}

/// Independent calibration polynomials for the x and y mask axes.
#[derive(Debug, Clone, PartialEq)]
pub struct PolynomialDistortion {
    pub x_poly: Polynomial2D,
    pub y_poly: Polynomial2D,
}

impl PolynomialDistortion {
    pub fn new(x_poly: Polynomial2D, y_poly: Polynomial2D) -> Self {
        Self { x_poly, y_poly }
    }

    /// Build from the two comma-separated coefficient strings of a calibration file.
    pub fn parse(x_coeffs: &str, y_coeffs: &str) -> Result<Self, SlitmaskError> {
        Ok(Self::new(
            Polynomial2D::parse(x_coeffs)?,
            Polynomial2D::parse(y_coeffs)?,
        ))
    }

    pub fn identity(degree: u32) -> Self {
        Self::new(
            Polynomial2D::identity(degree, 0),
            Polynomial2D::identity(degree, 1),
        )
    }

    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        (self.x_poly.eval(x, y), self.y_poly.eval(x, y))
    }
}

// ── Polynomial term helpers ─────────────────────────────────────────────────

/// Number of coefficients of a full 2-D polynomial of the given degree.
pub fn num_coeffs(degree: u32) -> usize {
    let n = degree as usize;
    (n + 1) * (n + 2) / 2
}

fn degree_for_count(count: usize) -> Option<u32> {
    (0..=16u32).find(|&d| num_coeffs(d) == count)
}

/// Enumerate `(i, j)` exponent pairs in storage order.
///
/// Degree 2: `(0,0) (1,0) (2,0) (0,1) (0,2) (1,1)`.
pub fn term_pairs(degree: u32) -> Vec<(u32, u32)> {
    let mut pairs = Vec::with_capacity(num_coeffs(degree));
    for i in 0..=degree {
        pairs.push((i, 0));
    }
    for j in 1..=degree {
        pairs.push((0, j));
    }
    for i in 1..degree {
        for j in 1..degree {
            if i + j <= degree {
                pairs.push((i, j));
            }
        }
    }
    pairs
}

/// Flat index of the `x^i · y^j` coefficient.
pub fn coeff_index(degree: u32, i: u32, j: u32) -> usize {
    assert!(i + j <= degree, "i+j must be <= degree");
    term_pairs(degree)
        .iter()
        .position(|&p| p == (i, j))
        .unwrap_or(0)
}
