//! Sky → focal plane → mask surface coordinate pipeline.
//!
//! All functions here are pure: identical inputs give bit-identical outputs and
//! every target is transformed independently of the others.
//!
//! # Frames
//!
//! - **Sky**: RA/Dec in radians (degrees for the pointing inputs).
//! - **Focal plane**: arcsec offsets from the telescope axis, rotated by the
//!   mask position angle. At PA = 0, +x points north and +y points west.
//! - **Mask surface**: mm on the unrolled, curved slitmask blank
//!   (see [`mask_surface`]).
//!
//! # Pipeline
//!
//! ```text
//! pointing + field-center offset ─ telescope_axis ─▶ (tel RA, tel Dec)
//! (RA, Dec) ─ focal_plane_offset ─▶ (x″, y″) ─ MaskGeometry::project ─▶ (x mm, y mm)
//! (x mm, y mm) ─ calibration polynomial ─▶ calibrated mask mm
//! ```

pub mod mask_surface;

pub use mask_surface::{MaskGeometry, MaskPoint};

use tracing::debug;

use crate::distortion::Polynomial2D;

const ARCSEC_PER_RAD: f64 = 180.0 / std::f64::consts::PI * 3600.0;

/// Telescope axis for a requested field center.
///
/// The instrument field center sits `field_center_as = [x, y]` arcsec away
/// from the telescope axis in the instrument frame. Given the sky position
/// that should land on the field center and the mask position angle, returns
/// the `(ra, dec)` in radians the telescope must point at.
///
/// A zero offset returns the pointing itself.
pub fn telescope_axis(
    pointing_ra_deg: f64,
    pointing_dec_deg: f64,
    position_angle_deg: f64,
    field_center_as: [f64; 2],
) -> (f64, f64) {
    let [fx, fy] = field_center_as;
    if fx == 0.0 && fy == 0.0 {
        return (pointing_ra_deg.to_radians(), pointing_dec_deg.to_radians());
    }

    let r = (fx.hypot(fy) / 3600.0).to_radians();
    let pa_fld = fy.atan2(fx);
    let (sinr, cosr) = r.sin_cos();

    let (sind, cosd) = pointing_dec_deg.to_radians().sin_cos();
    let (sint, cost) = (position_angle_deg.to_radians() - pa_fld).sin_cos();

    // cosd vanishes only at the pole, where RA is meaningless anyway
    let sina = if cosd.abs() > 1e-12 {
        (sinr * sint / cosd).clamp(-1.0, 1.0)
    } else {
        debug!("telescope_axis: pointing at the pole, no RA correction");
        0.0
    };
    let cosa = (1.0 - sina * sina).sqrt();

    let tel_ra = pointing_ra_deg.to_radians() - sina.asin();
    let sin_tel_dec =
        (sind * cosd * cosa - cosr * sinr * cost) / (cosr * cosd * cosa - sinr * sind * cost);
    (tel_ra, sin_tel_dec.clamp(-1.0, 1.0).asin())
}

/// Focal-plane offset (arcsec) of one target from the telescope axis.
///
/// Computes the angular separation `r` and position angle `p` of the target
/// as seen from the axis, and returns `tan(r)` along direction `pa - p`.
/// A target exactly on the axis maps to the origin.
pub fn focal_plane_offset(
    tel_ra: f64,
    tel_dec: f64,
    ra: f64,
    dec: f64,
    position_angle_deg: f64,
) -> (f64, f64) {
    let (sin_dec, cos_dec) = dec.sin_cos();
    let (sin_dec0, cos_dec0) = tel_dec.sin_cos();
    let (sin_dra, cos_dra) = (ra - tel_ra).sin_cos();

    let cosr = sin_dec * sin_dec0 + cos_dec * cos_dec0 * cos_dra;
    let sinr = (1.0 - cosr * cosr).abs().sqrt();
    if sinr == 0.0 {
        return (0.0, 0.0);
    }

    let sinp = cos_dec * sin_dra / sinr;
    let sign = if dec < tel_dec { -1.0 } else { 1.0 };
    let cosp = (1.0 - sinp * sinp).abs().sqrt() * sign;
    let p = sinp.atan2(cosp);

    let r_as = sinr / cosr * ARCSEC_PER_RAD;
    let dpa = position_angle_deg.to_radians() - p;
    (r_as * dpa.cos(), r_as * dpa.sin())
}

/// Vectorized [`focal_plane_offset`]. Output order matches input order.
pub fn project_to_focal_plane(
    tel_ra: f64,
    tel_dec: f64,
    ras: &[f64],
    decs: &[f64],
    position_angle_deg: f64,
) -> (Vec<f64>, Vec<f64>) {
    ras.iter()
        .zip(decs)
        .map(|(&ra, &dec)| focal_plane_offset(tel_ra, tel_dec, ra, dec, position_angle_deg))
        .unzip()
}

/// Vectorized focal plane → mask surface transform with zero slit angle.
///
/// Returns `(x_mm, y_mm, slit_angle_deg)`.
pub fn project_to_mask_surface(
    geometry: &MaskGeometry,
    xs_as: &[f64],
    ys_as: &[f64],
) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
    let n = xs_as.len().min(ys_as.len());
    let mut out_x = Vec::with_capacity(n);
    let mut out_y = Vec::with_capacity(n);
    let mut out_pa = Vec::with_capacity(n);
    for (&x, &y) in xs_as.iter().zip(ys_as) {
        let p = geometry.project(x, y, 0.0);
        out_x.push(p.x_mm);
        out_y.push(p.y_mm);
        out_pa.push(p.pa_deg);
    }
    (out_x, out_y, out_pa)
}

/// Evaluate the calibration polynomials over projected mask coordinates.
pub fn apply_distortion_correction(
    xs_mm: &[f64],
    ys_mm: &[f64],
    x_poly: &Polynomial2D,
    y_poly: &Polynomial2D,
) -> (Vec<f64>, Vec<f64>) {
    xs_mm
        .iter()
        .zip(ys_mm)
        .map(|(&x, &y)| (x_poly.eval(x, y), y_poly.eval(x, y)))
        .unzip()
}

#[cfg(test)]
mod tests {
    use super::*;

    const AS: f64 = std::f64::consts::PI / 180.0 / 3600.0;

    #[test]
    fn zero_offset_axis_is_pointing() {
        let (ra, dec) = telescope_axis(150.25, -12.5, 33.0, [0.0, 0.0]);
        assert_eq!(ra, 150.25_f64.to_radians());
        assert_eq!(dec, (-12.5_f64).to_radians());
    }

    #[test]
    fn pointing_lands_on_field_center() {
        for &(fx, fy, pa) in &[(0.0, 270.0, 0.0), (0.0, 270.0, 30.0), (100.0, 50.0, 10.0)] {
            let (tra, tdec) = telescope_axis(150.0, 20.0, pa, [fx, fy]);
            let (x, y) =
                focal_plane_offset(tra, tdec, 150.0_f64.to_radians(), 20.0_f64.to_radians(), pa);
            assert!(
                (x - fx).abs() < 5e-3 && (y - fy).abs() < 5e-3,
                "field center ({}, {}) at pa {}: got ({}, {})",
                fx,
                fy,
                pa,
                x,
                y
            );
        }
    }

    #[test]
    fn on_axis_target_maps_to_origin() {
        let (x, y) = focal_plane_offset(1.0, 0.5, 1.0, 0.5, 45.0);
        assert_eq!((x, y), (0.0, 0.0));
    }

    #[test]
    fn focal_plane_orientation() {
        // 10″ north at PA 0 lands on +x, at PA 90 on +y.
        let (x, y) = focal_plane_offset(1.0, 0.5, 1.0, 0.5 + 10.0 * AS, 0.0);
        assert!((x - 10.0).abs() < 1e-5 && y.abs() < 1e-9, "({}, {})", x, y);
        let (x, y) = focal_plane_offset(1.0, 0.5, 1.0, 0.5 + 10.0 * AS, 90.0);
        assert!(x.abs() < 1e-9 && (y - 10.0).abs() < 1e-5, "({}, {})", x, y);
        // 10″ east at PA 0 lands on -y.
        let (x, y) = focal_plane_offset(1.0, 0.5, 1.0 + 10.0 * AS / 0.5_f64.cos(), 0.5, 0.0);
        assert!(x.abs() < 1e-2 && (y + 10.0).abs() < 1e-5, "({}, {})", x, y);
    }

    #[test]
    fn vectorized_matches_scalar_and_order() {
        let ras = [1.0, 1.0 + 30.0 * AS, 1.0 - 45.0 * AS];
        let decs = [0.5 + 100.0 * AS, 0.5, 0.5 - 12.0 * AS];
        let (xs, ys) = project_to_focal_plane(1.0, 0.5, &ras, &decs, 17.0);
        for i in 0..3 {
            let (x, y) = focal_plane_offset(1.0, 0.5, ras[i], decs[i], 17.0);
            assert_eq!((xs[i], ys[i]), (x, y));
        }

        let rev_ras: Vec<f64> = ras.iter().rev().copied().collect();
        let rev_decs: Vec<f64> = decs.iter().rev().copied().collect();
        let (rxs, rys) = project_to_focal_plane(1.0, 0.5, &rev_ras, &rev_decs, 17.0);
        assert_eq!(rxs[0], xs[2]);
        assert_eq!(rys[2], ys[0]);
    }

    #[test]
    fn mask_surface_vectorized() {
        let g = MaskGeometry::deimos();
        let (xs, ys, pas) = project_to_mask_surface(&g, &[0.0, 350.0], &[270.0, 300.0]);
        assert_eq!(xs.len(), 2);
        assert!(xs[0].abs() < 1e-12);
        assert!((ys[0] - 68.188).abs() < 1e-2, "y = {}", ys[0]);
        assert!((xs[1] - 255.276).abs() < 1e-2, "x = {}", xs[1]);
        assert!((ys[1] - 91.583).abs() < 1e-2, "y = {}", ys[1]);
        assert!(pas[1] > 0.0);
    }

    #[test]
    fn distortion_correction_identity() {
        let px = Polynomial2D::identity(4, 0);
        let py = Polynomial2D::identity(4, 1);
        let (xs, ys) = apply_distortion_correction(&[1.5, -2.0], &[3.0, 4.25], &px, &py);
        assert_eq!(xs, vec![1.5, -2.0]);
        assert_eq!(ys, vec![3.0, 4.25]);
    }
}
