//! Focal plane (arcsec) → physical mask surface (mm).
//!
//! The slitmask is a cylindrically curved, tilted blank sitting near the
//! spherical image surface of the telescope. Projection is done in two steps:
//!
//! ```text
//! arcsec ─ plate scale ─▶ gnomonic mm ─ radial distortion ─▶ flat mm
//! flat mm ─ cylinder unroll + tilt + image/mask height correction ─▶ mask mm
//! ```
//!
//! The slit position angle is carried along so that a slit drawn at angle
//! `pa` on the sky gets the matching tilt on the unrolled mask.

use crate::distortion::RadialDistortion;

/// Mask blank geometry for one instrument. All lengths are in mm.
#[derive(Debug, Clone, PartialEq)]
pub struct MaskGeometry {
    /// Radius of curvature of the mask blank.
    pub curvature_radius_mm: f64,
    /// Radius of the telescope's spherical image surface.
    pub image_surface_radius_mm: f64,
    /// Tilt of the mask blank, in degrees.
    pub tilt_deg: f64,
    /// Distance from the telescope axis to the mask coordinate origin along y.
    pub axis_offset_y_mm: f64,
    /// Height of the mask surface above the image surface at the origin.
    pub mask_height_mm: f64,
    /// Distance from the mask to the exit pupil.
    pub pupil_distance_mm: f64,
    /// Telescope focal length, defines the plate scale.
    pub focal_length_mm: f64,
    /// Plate distortion applied in the flat gnomonic plane.
    pub plate_distortion: RadialDistortion,
}

impl Default for MaskGeometry {
    fn default() -> Self {
        Self::deimos()
    }
}

/// A projected point on the mask surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaskPoint {
    pub x_mm: f64,
    pub y_mm: f64,
    /// Local slit tilt on the unrolled mask, in degrees.
    pub pa_deg: f64,
}

impl MaskGeometry {
    /// Keck II / DEIMOS slitmask.
    pub fn deimos() -> Self {
        Self {
            curvature_radius_mm: 2120.9,
            image_surface_radius_mm: 2133.6,
            tilt_deg: 6.0,
            axis_offset_y_mm: 128.803,
            mask_height_mm: 3.378,
            pupil_distance_mm: 20018.4,
            focal_length_mm: 150280.0,
            plate_distortion: RadialDistortion::deimos(),
        }
    }

    /// Plate scale in arcsec per mm.
    pub fn arcsec_per_mm(&self) -> f64 {
        (3600.0 / self.focal_length_mm).to_degrees()
    }

    /// Convert focal-plane arcsec to flat, plate-distorted mm.
    pub fn gnomonic_to_flat(&self, x_as: f64, y_as: f64) -> (f64, f64) {
        let mm_per_as = 1.0 / self.arcsec_per_mm();
        self.plate_distortion.distort(x_as * mm_per_as, y_as * mm_per_as)
    }

    /// Map a flat-plane point (mm) and slit angle onto the curved, tilted mask.
    pub fn flat_to_mask(&self, xp: f64, yp: f64, pa_deg: f64) -> MaskPoint {
        let rcurv = self.curvature_radius_mm;
        let rim = self.image_surface_radius_mm;
        let tilt = self.tilt_deg.to_radians();

        let mu = (xp / rcurv).clamp(-1.0, 1.0).asin();
        let cosm = mu.cos();
        let cost = tilt.cos();
        let tant = tilt.tan();

        // Unroll the cylinder and remove the tilt
        let xx = rcurv * mu;
        let yy = (yp - self.axis_offset_y_mm) / cost + rcurv * tant * (1.0 - cosm);

        let tanpa = pa_deg.to_radians().tan() * cosm / cost + tant * xp / rcurv;
        let pa = tanpa.atan().to_degrees();

        // Height of the spherical image surface and of the mask surface
        let rho = (xp * xp + yp * yp).sqrt().min(rim);
        let hs = rim * (1.0 - (1.0 - (rho / rim).powi(2)).sqrt());
        let hm = self.mask_height_mm + yy * tilt.sin() + rcurv * (1.0 - cosm);

        // Chief rays converge on the pupil, so the height mismatch shifts the point radially
        let yc = yy + (hs - hm) * yp / self.pupil_distance_mm / cost;
        let xc = xx + (hs - hm) * xp / self.pupil_distance_mm / cosm;
        MaskPoint {
            x_mm: xc,
            y_mm: yc,
            pa_deg: pa,
        }
    }

    /// Full focal plane → mask surface transform.
    pub fn project(&self, x_as: f64, y_as: f64, pa_deg: f64) -> MaskPoint {
        let (xp, yp) = self.gnomonic_to_flat(x_as, y_as);
        self.flat_to_mask(xp, yp, pa_deg)
    }
}
