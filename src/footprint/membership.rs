//! Scanline point-in-footprint test.
//!
//! For every integer scanline `y` in `[y_min, y_max)` the index stores the
//! sorted x positions where footprint edges cross it. A point is inside when
//! its x lies strictly between crossing `2k` and `2k+1` of the scanline
//! `floor(y)` (even-odd rule).
//!
//! Rows are stored flattened: `row_offsets[r]..row_offsets[r + 1]` selects the
//! crossings of scanline `y_min + r`.

use super::MaskFootprint;

#[derive(Debug, Clone, PartialEq)]
pub struct FootprintIndex {
    y_min: i64,
    y_max: i64,
    row_offsets: Vec<u32>,
    crossings: Vec<f64>,
}

impl FootprintIndex {
    /// Build the scanline table for a footprint.
    ///
    /// An edge from `y1` to `y2` (`y1 < y2`) contributes one crossing on each
    /// integer scanline in `[floor(y1), floor(y2))`, interpolated linearly
    /// along the edge. Horizontal edges contribute nothing.
    pub fn build(footprint: &MaskFootprint) -> Self {
        let y_min = footprint.min_y().floor() as i64;
        let y_max = footprint.max_y().floor() as i64;
        let n_rows = (y_max - y_min).max(0) as usize;

        let mut rows: Vec<Vec<f64>> = vec![Vec::new(); n_rows];
        for ((x1, y1), (x2, y2)) in footprint.edges() {
            let ((xa, ya), (xb, yb)) = if y1 > y2 {
                ((x2, y2), (x1, y1))
            } else {
                ((x1, y1), (x2, y2))
            };
            let lo = ya.floor() as i64;
            let hi = yb.floor() as i64;
            if lo == hi {
                continue;
            }
            let slope = (xb - xa) / (yb - ya);
            for yi in lo..hi {
                let x = xa + slope * (yi as f64 - ya);
                rows[(yi - y_min) as usize].push(x);
            }
        }

        let mut row_offsets = Vec::with_capacity(n_rows + 1);
        let mut crossings = Vec::new();
        row_offsets.push(0);
        for mut row in rows {
            row.sort_by(|a, b| a.total_cmp(b));
            crossings.extend(row);
            row_offsets.push(crossings.len() as u32);
        }

        Self {
            y_min,
            y_max,
            row_offsets,
            crossings,
        }
    }

    /// Scanline range covered by the index, `[y_min, y_max)`.
    pub fn y_range(&self) -> (i64, i64) {
        (self.y_min, self.y_max)
    }

    /// Sorted crossings of the scanline containing `y`, if it is covered.
    pub fn row(&self, y: f64) -> Option<&[f64]> {
        if !y.is_finite() {
            return None;
        }
        let yi = y.floor() as i64;
        if yi < self.y_min || yi >= self.y_max {
            return None;
        }
        let r = (yi - self.y_min) as usize;
        let start = self.row_offsets[r] as usize;
        let end = self.row_offsets[r + 1] as usize;
        self.crossings.get(start..end)
    }

    /// Even-odd membership test. Points off the covered scanlines are outside.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        match self.row(y) {
            Some(row) => row.chunks_exact(2).any(|pair| pair[0] < x && x < pair[1]),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};

    /// Ray-casting check straight from the polygon loops.
    fn ray_cast(footprint: &MaskFootprint, x: f64, y: f64) -> bool {
        let mut inside = false;
        for poly in footprint.loops() {
            let n = poly.len();
            for i in 0..n {
                let (xi, yi) = poly[i];
                let (xj, yj) = poly[(i + n - 1) % n];
                if (yi > y) != (yj > y) && x < (xj - xi) * (y - yi) / (yj - yi) + xi {
                    inside = !inside;
                }
            }
        }
        inside
    }

    #[test]
    fn test_square() {
        let idx = MaskFootprint::lris().unwrap().index();
        assert_eq!(idx.y_range(), (-100, 100));
        assert!(idx.contains(0.0, 0.0));
        assert!(idx.contains(99.5, -99.5));
        assert!(!idx.contains(100.0, 0.0), "crossing itself is not inside");
        assert!(!idx.contains(150.0, 0.0));
        assert!(!idx.contains(0.0, 100.0), "top scanline is excluded");
        assert!(!idx.contains(0.0, -100.5));
        assert!(!idx.contains(0.0, f64::NAN));
    }

    #[test]
    fn test_even_crossings() {
        for fp in [
            MaskFootprint::deimos().unwrap(),
            MaskFootprint::deimos_no_gap().unwrap(),
            MaskFootprint::lris().unwrap(),
        ] {
            let idx = fp.index();
            let (lo, hi) = idx.y_range();
            for y in lo..hi {
                let row = idx.row(y as f64).unwrap();
                assert_eq!(row.len() % 2, 0, "{}: odd crossings at y = {}", fp.name(), y);
            }
        }
    }

    #[test]
    fn test_deimos_ccd_gaps() {
        let idx = MaskFootprint::deimos().unwrap().index();
        assert!(idx.contains(-100.0, 300.0));
        assert!(idx.contains(100.0, 300.0));
        assert!(!idx.contains(0.0, 300.0), "center gap");
        assert!(!idx.contains(-255.0, 300.0), "left gap");
        assert!(!idx.contains(100.0, 100.0), "below the mask");

        let no_gap = MaskFootprint::deimos_no_gap().unwrap().index();
        assert!(no_gap.contains(0.0, 300.0));
        // cut corner: (-460, 385) to (-420, 428)
        assert!(!no_gap.contains(-470.0, 420.0));
        assert!(no_gap.contains(-400.0, 420.0));
    }

    #[test]
    fn test_matches_ray_cast_on_scanlines() {
        // On integer scanlines the interpolated crossings are exact.
        let mut rng = rand::rngs::StdRng::seed_from_u64(7);
        for fp in [
            MaskFootprint::deimos().unwrap(),
            MaskFootprint::deimos_no_gap().unwrap(),
        ] {
            let idx = fp.index();
            for _ in 0..5000 {
                let x: f64 = rng.gen_range(-520.0..520.0);
                let y = rng.gen_range(180..490) as f64;
                if y == fp.min_y() {
                    continue;
                }
                assert_eq!(
                    idx.contains(x, y),
                    ray_cast(&fp, x, y),
                    "{} disagrees at ({}, {})",
                    fp.name(),
                    x,
                    y
                );
            }
        }
    }
}
