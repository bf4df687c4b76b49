//! Per-instrument configuration: footprint, optics and pointing policy.

use crate::catalogs::TargetListDefaults;
use crate::distortion::Distortion;
use crate::error::SlitmaskError;
use crate::footprint::MaskFootprint;
use crate::projection::MaskGeometry;
use crate::refraction::RefractionModel;

/// Corrections applied when reporting the telescope pointing for a mask.
#[derive(Debug, Clone, PartialEq)]
pub struct PointingPolicy {
    /// Point the telescope axis so the instrument field center lands on the
    /// mask center, and add the offset back in the pointing report.
    pub apply_field_center_offset: bool,
    /// Shift the reported pointing by atmospheric refraction.
    pub refraction: Option<RefractionModel>,
}

impl Default for PointingPolicy {
    fn default() -> Self {
        Self {
            apply_field_center_offset: true,
            refraction: None,
        }
    }
}

/// Everything the design engine needs to know about one instrument.
#[derive(Debug, Clone, PartialEq)]
pub struct InstrumentConfig {
    pub name: String,
    pub footprint: MaskFootprint,
    /// Offset of the instrument field center from the telescope axis, arcsec.
    pub field_center_as: [f64; 2],
    pub geometry: MaskGeometry,
    /// Calibration applied to projected mask coordinates.
    pub distortion: Distortion,
    pub policy: PointingPolicy,
    pub defaults: TargetListDefaults,
}

impl InstrumentConfig {
    /// Keck II / DEIMOS with the CCD-gap footprint.
    pub fn deimos() -> Result<Self, SlitmaskError> {
        Ok(Self {
            name: "deimos".to_string(),
            footprint: MaskFootprint::deimos()?,
            field_center_as: [0.0, 270.0],
            geometry: MaskGeometry::deimos(),
            distortion: Distortion::None,
            policy: PointingPolicy::default(),
            defaults: TargetListDefaults::default(),
        })
    }

    /// Look up a built-in instrument: `deimos`, `deimos_no_gap` or `lris`.
    ///
    /// All share the DEIMOS optics; LRIS has its field center on axis.
    pub fn for_name(name: &str) -> Result<Self, SlitmaskError> {
        let footprint = MaskFootprint::by_name(name)?;
        let mut config = Self::deimos()?;
        config.name = footprint.name().to_string();
        if footprint.name() == "lris" {
            config.field_center_as = [0.0, 0.0];
        }
        config.footprint = footprint;
        Ok(config)
    }

    pub fn with_policy(mut self, policy: PointingPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_distortion(mut self, distortion: Distortion) -> Self {
        self.distortion = distortion;
        self
    }

    /// Field-center offset used for the telescope axis, zero when the policy disables it.
    pub fn effective_field_center(&self) -> [f64; 2] {
        if self.policy.apply_field_center_offset {
            self.field_center_as
        } else {
            [0.0, 0.0]
        }
    }
}
