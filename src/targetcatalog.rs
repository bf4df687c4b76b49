//! The mask design: targets, pointing and instrument, tied together.
//!
//! `TargetCatalog` owns the target table and drives the pipeline:
//!
//! ```text
//! reproject ─▶ focal plane + mask coordinates ─▶ mark_inside
//! pack      ─▶ selection + slit lengths + leftover gaps
//! slit_corners ─▶ four mask-surface corners per selected slit
//! ```
//!
//! Target order is the load order and is never changed by packing.

use nalgebra::{Rotation2, Vector2};
use tracing::{debug, info};

use crate::catalogs::{MaskHeader, TargetList};
use crate::distortion::Distortion;
use crate::error::SlitmaskError;
use crate::footprint::FootprintIndex;
use crate::instrument::InstrumentConfig;
use crate::packer::{self, Candidate, Gap, PackParams};
use crate::projection;
use crate::target::{SlitCorners, Target};

/// Counts describing the current design.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DesignSummary {
    pub targets: usize,
    pub inside: usize,
    pub selected_slits: usize,
    pub selected_boxes: usize,
    pub gaps: usize,
    /// Total width of the leftover gaps, arcsec.
    pub unused_length_as: f64,
}

#[derive(Debug, Clone)]
pub struct TargetCatalog {
    config: InstrumentConfig,
    index: FootprintIndex,
    mask_name: String,
    center_ra_deg: f64,
    center_dec_deg: f64,
    position_angle_deg: f64,
    tel_ra_rad: f64,
    tel_dec_rad: f64,
    targets: Vec<Target>,
    gaps: Vec<Gap>,
}

impl TargetCatalog {
    /// Build a design and project every target for the header's pointing.
    pub fn new(config: InstrumentConfig, header: MaskHeader, targets: Vec<Target>) -> Self {
        let index = config.footprint.index();
        let mut catalog = Self {
            config,
            index,
            mask_name: header.name,
            center_ra_deg: header.center_ra_deg,
            center_dec_deg: header.center_dec_deg,
            position_angle_deg: header.position_angle_deg,
            tel_ra_rad: 0.0,
            tel_dec_rad: 0.0,
            targets,
            gaps: Vec::new(),
        };
        catalog.reproject(
            header.center_ra_deg,
            header.center_dec_deg,
            header.position_angle_deg,
        );
        info!(
            "Mask {} on {}: {} targets, {} inside",
            catalog.mask_name,
            catalog.config.name,
            catalog.targets.len(),
            catalog.targets.iter().filter(|t| t.inside_mask).count()
        );
        catalog
    }

    pub fn from_target_list(config: InstrumentConfig, list: TargetList) -> Self {
        Self::new(config, list.header, list.targets)
    }

    pub fn config(&self) -> &InstrumentConfig {
        &self.config
    }

    pub fn mask_name(&self) -> &str {
        &self.mask_name
    }

    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    pub fn target(&self, index: usize) -> Option<&Target> {
        self.targets.get(index)
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Current mask center and position angle, degrees.
    pub fn pointing(&self) -> (f64, f64, f64) {
        (
            self.center_ra_deg,
            self.center_dec_deg,
            self.position_angle_deg,
        )
    }

    /// Telescope axis for the current pointing, radians.
    pub fn telescope_axis(&self) -> (f64, f64) {
        (self.tel_ra_rad, self.tel_dec_rad)
    }

    /// Leftover gaps from the last packing run.
    pub fn gaps(&self) -> &[Gap] {
        &self.gaps
    }

    /// Move the mask and recompute focal-plane, mask and membership state.
    ///
    /// Slit corners and leftover gaps from earlier runs are dropped.
    pub fn reproject(&mut self, ra_deg: f64, dec_deg: f64, position_angle_deg: f64) {
        self.center_ra_deg = ra_deg;
        self.center_dec_deg = dec_deg;
        self.position_angle_deg = position_angle_deg;

        let (tel_ra, tel_dec) = projection::telescope_axis(
            ra_deg,
            dec_deg,
            position_angle_deg,
            self.config.effective_field_center(),
        );
        self.tel_ra_rad = tel_ra;
        self.tel_dec_rad = tel_dec;

        let ras: Vec<f64> = self.targets.iter().map(|t| t.ra_rad).collect();
        let decs: Vec<f64> = self.targets.iter().map(|t| t.dec_rad).collect();
        let (xs, ys) =
            projection::project_to_focal_plane(tel_ra, tel_dec, &ras, &decs, position_angle_deg);
        let (mut mxs, mut mys, _) =
            projection::project_to_mask_surface(&self.config.geometry, &xs, &ys);
        if let Distortion::Polynomial(poly) = &self.config.distortion {
            (mxs, mys) =
                projection::apply_distortion_correction(&mxs, &mys, &poly.x_poly, &poly.y_poly);
        }

        for (i, t) in self.targets.iter_mut().enumerate() {
            t.focal_x = xs[i];
            t.focal_y = ys[i];
            t.mask_x = mxs[i];
            t.mask_y = mys[i];
            t.corners = None;
        }
        self.gaps.clear();
        debug!(
            "Reprojected {} targets: RA={:.6} Dec={:.6} PA={:.3}",
            self.targets.len(),
            ra_deg,
            dec_deg,
            position_angle_deg
        );
        self.mark_inside();
    }

    /// Flag each target as inside or outside the footprint.
    ///
    /// Targets that fall outside lose their selection.
    pub fn mark_inside(&mut self) {
        for t in &mut self.targets {
            t.inside_mask = self.index.contains(t.focal_x, t.focal_y);
            if !t.inside_mask {
                t.selected = false;
            }
        }
    }

    /// Select and size slits for all inside targets. Returns the leftover gaps.
    pub fn pack(&mut self, params: &PackParams) -> Result<&[Gap], SlitmaskError> {
        let candidates: Vec<Candidate> = self
            .targets
            .iter()
            .enumerate()
            .filter(|(_, t)| t.inside_mask)
            .filter(|(_, t)| {
                let p = t.priority();
                p.is_box() || p.is_science()
            })
            .map(|(index, t)| Candidate {
                index,
                x: t.focal_x,
                pcode: t.pcode,
            })
            .collect();

        let fp = &self.config.footprint;
        let result = packer::pack(&candidates, fp.min_x(), fp.max_x(), params)?;

        for t in &mut self.targets {
            t.reset_selection();
        }
        for p in &result.placements {
            let t = &mut self.targets[p.index];
            t.selected = true;
            t.length1 = p.length1;
            t.length2 = p.length2;
        }
        self.gaps = result.gaps;

        let summary = self.summary();
        info!(
            "Packed mask {}: {} slits, {} boxes, {} gaps ({:.1} arcsec unused)",
            self.mask_name,
            summary.selected_slits,
            summary.selected_boxes,
            summary.gaps,
            summary.unused_length_as
        );
        Ok(&self.gaps)
    }

    /// Compute and store slit corners for every selected target.
    ///
    /// Returns `(target index, corners)` pairs in target order.
    pub fn slit_corners(&mut self) -> Vec<(usize, SlitCorners)> {
        let mask_pa = self.position_angle_deg;
        let mut out = Vec::new();
        for (i, t) in self.targets.iter_mut().enumerate() {
            if !t.selected {
                t.corners = None;
                continue;
            }
            let corners = corners_for(t, mask_pa, &self.config);
            t.corners = Some(corners);
            out.push((i, corners));
        }
        out
    }

    pub fn find_target(&self, object_id: &str) -> Option<usize> {
        self.targets.iter().position(|t| t.object_id == object_id)
    }

    /// Replace the target with the same object id, or append it.
    ///
    /// The design is reprojected afterwards; returns the target's index.
    pub fn upsert_target(&mut self, target: Target) -> usize {
        let index = match self.find_target(&target.object_id) {
            Some(i) => {
                self.targets[i] = target;
                i
            }
            None => {
                self.targets.push(target);
                self.targets.len() - 1
            }
        };
        self.reproject(
            self.center_ra_deg,
            self.center_dec_deg,
            self.position_angle_deg,
        );
        index
    }

    /// Remove and return the target at `index`.
    pub fn delete_target(&mut self, index: usize) -> Result<Target, SlitmaskError> {
        if index >= self.targets.len() {
            return Err(SlitmaskError::TargetNotFound(format!("#{}", index)));
        }
        let t = self.targets.remove(index);
        self.gaps.clear();
        Ok(t)
    }

    /// Telescope pointing to record for this mask at the given hour angle, degrees.
    pub fn pointing_center(&self, hour_angle_deg: f64) -> (f64, f64) {
        let (mut ra, mut dec) = (self.center_ra_deg, self.center_dec_deg);
        if let Some(model) = &self.config.policy.refraction {
            (ra, dec) = model.refracted_position(ra, dec, hour_angle_deg);
        }
        if self.config.policy.apply_field_center_offset {
            let [fx, fy] = self.config.field_center_as;
            let rot = Rotation2::new((-self.position_angle_deg - 90.0).to_radians());
            let off = rot * Vector2::new(fx, fy);
            let mut dra = off.x;
            let cosd = dec.to_radians().cos();
            if cosd.abs() > 1e-5 {
                dra /= cosd;
            }
            ra += dra / 3600.0;
            dec += off.y / 3600.0;
        }
        (ra, dec)
    }

    pub fn summary(&self) -> DesignSummary {
        let mut s = DesignSummary {
            targets: self.targets.len(),
            gaps: self.gaps.len(),
            unused_length_as: self.gaps.iter().map(Gap::width).sum(),
            ..Default::default()
        };
        for t in &self.targets {
            if t.inside_mask {
                s.inside += 1;
            }
            if t.selected {
                if t.priority().is_box() {
                    s.selected_boxes += 1;
                } else {
                    s.selected_slits += 1;
                }
            }
        }
        s
    }

    /// Snapshot of the design in target-list form.
    pub fn to_target_list(&self) -> TargetList {
        TargetList {
            header: MaskHeader {
                name: self.mask_name.clone(),
                center_ra_deg: self.center_ra_deg,
                center_dec_deg: self.center_dec_deg,
                position_angle_deg: self.position_angle_deg,
            },
            targets: self.targets.clone(),
            skipped: Vec::new(),
        }
    }
}

/// Corners of one slit, projected onto the mask surface.
fn corners_for(t: &Target, mask_pa_deg: f64, config: &InstrumentConfig) -> SlitCorners {
    let is_box = t.priority().is_box();
    let slit_pa = if is_box {
        mask_pa_deg
    } else {
        t.slit_pa_deg.unwrap_or(mask_pa_deg)
    };
    let half_width = if is_box {
        0.5 * (t.length1 + t.length2)
    } else {
        0.5 * t.slit_width
    };

    let rot = Rotation2::new((mask_pa_deg - slit_pa).to_radians());
    let center = Vector2::new(t.focal_x, t.focal_y);
    let end1 = center - rot * Vector2::new(t.length1, 0.0);
    let end2 = center + rot * Vector2::new(t.length2, 0.0);
    let up = Vector2::new(0.0, half_width);

    let to_mask = |p: Vector2<f64>| {
        let m = config.geometry.project(p.x, p.y, 0.0);
        config.distortion.apply(m.x_mm, m.y_mm)
    };
    SlitCorners {
        corners: [
            to_mask(end2 + up),
            to_mask(end1 + up),
            to_mask(end1 - up),
            to_mask(end2 - up),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distortion::PolynomialDistortion;
    use crate::instrument::PointingPolicy;

    const AS_DEG: f64 = 1.0 / 3600.0;

    /// Targets laid out on a focal-plane grid around the LRIS field.
    fn lris_catalog() -> TargetCatalog {
        lris_catalog_with(InstrumentConfig::for_name("lris").unwrap())
    }

    fn lris_catalog_with(config: InstrumentConfig) -> TargetCatalog {
        let header = MaskHeader {
            name: "test".to_string(),
            center_ra_deg: 150.0,
            center_dec_deg: 0.0,
            position_angle_deg: 0.0,
        };
        let targets = vec![
            // +x is north at PA 0
            Target::new("a", 10.0, -60.0 * AS_DEG, 100, 4.0, 1.0),
            Target::new("b", 10.0, 0.0, 50, 4.0, 1.0),
            Target::new("c", 10.0, 40.0 * AS_DEG, -2, 2.0, 1.0),
            Target::new("out", 10.0, 300.0 * AS_DEG, 100, 4.0, 1.0),
        ];
        TargetCatalog::new(config, header, targets)
    }

    #[test]
    fn test_reproject_places_targets() {
        let cat = lris_catalog();
        let b = cat.target(1).unwrap();
        assert!(b.focal_x.abs() < 1e-9 && b.focal_y.abs() < 1e-9);
        let a = cat.target(0).unwrap();
        assert!((a.focal_x + 60.0).abs() < 1e-4, "x = {}", a.focal_x);
        assert!(a.inside_mask);
        assert!(!cat.target(3).unwrap().inside_mask);
        assert_eq!(cat.summary().inside, 3);
    }

    #[test]
    fn test_reproject_idempotent() {
        let mut cat = lris_catalog();
        cat.reproject(150.001, 0.002, 12.0);
        let first: Vec<(f64, f64, f64, f64)> = cat
            .targets()
            .iter()
            .map(|t| (t.focal_x, t.focal_y, t.mask_x, t.mask_y))
            .collect();
        cat.reproject(150.001, 0.002, 12.0);
        let second: Vec<(f64, f64, f64, f64)> = cat
            .targets()
            .iter()
            .map(|t| (t.focal_x, t.focal_y, t.mask_x, t.mask_y))
            .collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_pack_and_corners() {
        let mut cat = lris_catalog();
        let params = PackParams {
            min_slit_length_as: 8.0,
            min_sep_as: 1.0,
            box_size_as: 4.0,
            extend: false,
        };
        let gaps = cat.pack(&params).unwrap().to_vec();
        assert!(!gaps.is_empty());

        let s = cat.summary();
        assert_eq!(s.selected_slits, 2);
        assert_eq!(s.selected_boxes, 1);
        assert!(!cat.target(3).unwrap().selected);

        let corners = cat.slit_corners();
        assert_eq!(corners.len(), 3);
        let (i, c) = corners[0];
        assert_eq!(i, 0);
        let [c1, c2, c3, c4] = c.corners;
        // right side is +x, top is +y
        assert!(c1.0 > c2.0 && c4.0 > c3.0);
        assert!(c1.1 > c4.1 && c2.1 > c3.1);

        // box corners form a square of side length1 + length2
        let (_, bc) = corners[2];
        let side_x = bc.corners[0].0 - bc.corners[1].0;
        let side_y = bc.corners[0].1 - bc.corners[3].1;
        assert!((side_x - side_y).abs() / side_x < 0.02, "{} vs {}", side_x, side_y);
    }

    #[test]
    fn test_calibration_polynomial_shifts_mask_coordinates() {
        // degree 4: x' = 0.25 + x, y' = -0.5 + y
        let poly = PolynomialDistortion::parse(
            "0.25, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0",
            "-0.5, 0, 0, 0, 0, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0",
        )
        .unwrap();
        assert_eq!(poly.x_poly.degree, 4);
        let config = InstrumentConfig::for_name("lris")
            .unwrap()
            .with_distortion(Distortion::Polynomial(poly));

        let mut plain = lris_catalog();
        let mut calibrated = lris_catalog_with(config);
        for (a, b) in plain.targets().iter().zip(calibrated.targets()) {
            assert_eq!((a.focal_x, a.focal_y), (b.focal_x, b.focal_y));
            assert!((b.mask_x - a.mask_x - 0.25).abs() < 1e-12, "{}", b.object_id);
            assert!((b.mask_y - a.mask_y + 0.5).abs() < 1e-12, "{}", b.object_id);
        }

        let params = PackParams::default();
        plain.pack(&params).unwrap();
        calibrated.pack(&params).unwrap();
        let pc = plain.slit_corners();
        let cc = calibrated.slit_corners();
        assert_eq!(pc.len(), cc.len());
        assert!(!pc.is_empty());
        for ((ia, a), (ib, b)) in pc.iter().zip(&cc) {
            assert_eq!(ia, ib);
            for (p, q) in a.corners.iter().zip(&b.corners) {
                assert!((q.0 - p.0 - 0.25).abs() < 1e-12, "corner x {} vs {}", q.0, p.0);
                assert!((q.1 - p.1 + 0.5).abs() < 1e-12, "corner y {} vs {}", q.1, p.1);
            }
        }
    }

    #[test]
    fn test_pack_rejects_bad_params() {
        let mut cat = lris_catalog();
        let params = PackParams {
            min_slit_length_as: f64::NAN,
            ..Default::default()
        };
        assert!(matches!(
            cat.pack(&params),
            Err(SlitmaskError::InvalidPackParameter { .. })
        ));
    }

    #[test]
    fn test_edit_targets() {
        let mut cat = lris_catalog();
        assert_eq!(cat.find_target("b"), Some(1));
        assert_eq!(cat.find_target("zzz"), None);

        let moved = Target::new("b", 10.0, 20.0 * AS_DEG, 50, 4.0, 1.0);
        assert_eq!(cat.upsert_target(moved), 1);
        assert!((cat.target(1).unwrap().focal_x - 20.0).abs() < 1e-4);

        let new = Target::new("d", 10.0, -20.0 * AS_DEG, 10, 4.0, 1.0);
        assert_eq!(cat.upsert_target(new), 4);
        assert!(cat.target(4).unwrap().inside_mask);

        let removed = cat.delete_target(0).unwrap();
        assert_eq!(removed.object_id, "a");
        assert_eq!(cat.len(), 4);
        assert!(matches!(
            cat.delete_target(10),
            Err(SlitmaskError::TargetNotFound(_))
        ));
    }

    #[test]
    fn test_pointing_center_matches_telescope_axis() {
        let config = InstrumentConfig::deimos().unwrap();
        let header = MaskHeader {
            name: "d".to_string(),
            center_ra_deg: 150.0,
            center_dec_deg: 20.0,
            position_angle_deg: 0.0,
        };
        let cat = TargetCatalog::new(config, header, Vec::new());
        let (ra, dec) = cat.pointing_center(0.0);
        let (tra, tdec) = cat.telescope_axis();
        assert!((ra - tra.to_degrees()).abs() < 1e-4, "{} vs {}", ra, tra.to_degrees());
        assert!((dec - tdec.to_degrees()).abs() < 1e-4, "{} vs {}", dec, tdec.to_degrees());
        assert!(ra > 150.0);
    }

    #[test]
    fn test_pointing_center_policy() {
        let config = InstrumentConfig::deimos().unwrap().with_policy(PointingPolicy {
            apply_field_center_offset: false,
            refraction: None,
        });
        let header = MaskHeader {
            name: "d".to_string(),
            center_ra_deg: 150.0,
            center_dec_deg: 20.0,
            position_angle_deg: 45.0,
        };
        let cat = TargetCatalog::new(config, header, Vec::new());
        assert_eq!(cat.pointing_center(15.0), (150.0, 20.0));
        assert_eq!(
            cat.telescope_axis(),
            (150.0_f64.to_radians(), 20.0_f64.to_radians())
        );
    }
}
