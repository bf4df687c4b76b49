//! Error types.
//!
//! Two layers: [`SlitmaskError`] for configuration-level contract violations
//! that propagate to the caller, and [`RowError`] for a single malformed
//! catalog row, which the reader logs and skips.

use thiserror::Error;

/// Configuration-level failures that propagate to the caller.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SlitmaskError {
    #[error("invalid mask bounds: min_x {min_x} must be finite and less than max_x {max_x}")]
    InvalidMaskBounds { min_x: f64, max_x: f64 },

    #[error("invalid packing parameter {name}: {value}")]
    InvalidPackParameter { name: &'static str, value: f64 },

    #[error("unknown instrument layout: {0}")]
    UnknownInstrument(String),

    #[error("mask footprint has no vertices")]
    EmptyFootprint,

    #[error("mask footprint vertex ({x}, {y}) is not finite")]
    NonFiniteVertex { x: f64, y: f64 },

    #[error("polynomial of degree {degree} needs {expected} coefficients, got {got}")]
    CoefficientCount {
        degree: u32,
        expected: usize,
        got: usize,
    },

    #[error("invalid distortion coefficient {0:?}")]
    InvalidCoefficient(String),

    #[error("no target with object id {0:?}")]
    TargetNotFound(String),
}

/// A catalog row that could not be turned into a target.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RowError {
    #[error("row has {0} fields, need at least object id, RA and Dec")]
    TooFewFields(usize),

    #[error("cannot parse RA {0:?}")]
    InvalidRa(String),

    #[error("cannot parse Dec {0:?}")]
    InvalidDec(String),

    #[error("RA {0} h outside [0, 24]")]
    RaOutOfRange(f64),

    #[error("Dec {0} deg outside [-90, 90]")]
    DecOutOfRange(f64),

    #[error("cannot parse {field} from {value:?}")]
    InvalidNumber { field: &'static str, value: String },

    #[error("cannot parse mask center from {0:?}")]
    InvalidCenter(String),
}
