//! Interval bookkeeping for the packer: occupied segments and free gaps.
//!
//! Every occupied interval is padded by `min_sep / 2` on each side, so two
//! padded intervals that touch leave exactly `min_sep` between the slits
//! they hold.

/// A closed interval `[start, end]` along the dispersion axis, arcsec.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    pub start: f64,
    pub end: f64,
}

/// Unoccupied space left on the mask.
pub type Gap = Interval;

impl Interval {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    pub fn width(&self) -> f64 {
        self.end - self.start
    }
}

/// Merge segments that overlap or touch. Input need not be sorted.
///
/// Two segments merge when the next one starts at or before the end of the
/// current one. A segment fully covered by its predecessor is absorbed.
pub fn merge_segments(mut segments: Vec<Interval>) -> Vec<Interval> {
    segments.sort_by(|a, b| a.start.total_cmp(&b.start));
    let mut merged: Vec<Interval> = Vec::with_capacity(segments.len());
    for seg in segments {
        match merged.last_mut() {
            Some(cur) if seg.start <= cur.end => cur.end = cur.end.max(seg.end),
            _ => merged.push(seg),
        }
    }
    merged
}

/// Free space of `[min_x, max_x]` not covered by sorted, disjoint segments.
pub fn segments_to_gaps(segments: &[Interval], min_x: f64, max_x: f64) -> Vec<Gap> {
    let mut gaps = Vec::with_capacity(segments.len() + 1);
    let mut cur = min_x;
    for seg in segments {
        if cur >= max_x {
            break;
        }
        if seg.end < cur {
            continue;
        }
        if seg.start > cur {
            gaps.push(Gap::new(cur, seg.start.min(max_x)));
        }
        cur = seg.end;
    }
    if cur < max_x {
        gaps.push(Gap::new(cur, max_x));
    }
    gaps
}

/// Outcome of looking for room for one slit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fit {
    /// The slit fits in the gap at this index.
    Gap(usize),
    /// No gap can take the slit.
    None,
}

/// Find the gap that can hold a slit of `slit_length` centered near `x`.
///
/// Gaps are visited left to right. `x` must clear both gap edges by more
/// than `min_sep`, and the gap must leave `slit_length` after removing
/// `min_sep`. Once `x` lies at or left of `start + min_sep` no later gap can
/// qualify, so the search stops there.
pub fn can_fit(gaps: &[Gap], x: f64, slit_length: f64, min_sep: f64) -> Fit {
    for (i, gap) in gaps.iter().enumerate() {
        if x <= gap.start + min_sep {
            return Fit::None;
        }
        if x >= gap.end - min_sep {
            continue;
        }
        if gap.width() - min_sep < slit_length {
            return Fit::None;
        }
        return Fit::Gap(i);
    }
    Fit::None
}

/// Place a slit in `gaps[idx]` and replace that gap with what is left.
///
/// The padded slit `[x - L/2 - h, x + L/2 + h]` (with `h = min_sep / 2`) is
/// shifted to stay inside the gap. Returns the slit's left and right edges
/// (unpadded). Residual gaps of zero width are dropped.
pub fn split_gap(
    gaps: &mut Vec<Gap>,
    idx: usize,
    x: f64,
    slit_length: f64,
    min_sep: f64,
) -> (f64, f64) {
    let gap = gaps[idx];
    let half_sep = min_sep / 2.0;
    let padded = slit_length + min_sep;

    let mut left = x - slit_length / 2.0 - half_sep;
    let mut right = x + slit_length / 2.0 + half_sep;
    if left < gap.start {
        left = gap.start;
        right = left + padded;
    } else if right > gap.end {
        right = gap.end;
        left = right - padded;
    }

    let residual: Vec<Gap> = [Gap::new(gap.start, left), Gap::new(right, gap.end)]
        .into_iter()
        .filter(|g| g.width() > 0.0)
        .collect();
    gaps.splice(idx..=idx, residual);

    (left + half_sep, right - half_sep)
}
