//! One-dimensional slit packing along the dispersion axis.
//!
//! Given candidate positions (focal-plane x, arcsec) and priority codes,
//! selects a non-overlapping set of slits and sizes each one:
//!
//! 1. Candidates are ordered by `(pcode descending, x ascending)`; ties keep
//!    input order.
//! 2. Alignment boxes and guide stars become fixed-size segments padded by
//!    `min_sep / 2`; overlapping segments merge. Boxes are always selected.
//! 3. The free space of `[min_x, max_x]` outside the box segments forms the
//!    initial gap list.
//! 4. Science targets are placed in order. A target needs a gap whose edges it
//!    clears by more than `min_sep` and whose width minus `min_sep` is at
//!    least the minimum slit length. The slit is centered on the target when
//!    possible and shifted to stay inside the gap otherwise.
//! 5. Optionally, placed slits grow into the gaps that touch them
//!    (see [`extend`]).
//!
//! Packing never fails for lack of room: a target that does not fit is just
//! left out of the result. Results are keyed by the caller's candidate
//! index and returned in that order.

pub mod extend;
pub mod gaps;

pub use extend::SlitExtent;
pub use gaps::{Gap, Interval};

use tracing::debug;

use crate::error::SlitmaskError;
use crate::target::PriorityClass;
use gaps::Fit;

/// Packing configuration, all lengths in arcsec.
#[derive(Debug, Clone, PartialEq)]
pub struct PackParams {
    /// Minimum total length of a science slit.
    pub min_slit_length_as: f64,
    /// Minimum separation between adjacent slits.
    pub min_sep_as: f64,
    /// Full side length of an alignment box.
    pub box_size_as: f64,
    /// Grow placed slits into the remaining free space.
    pub extend: bool,
}

impl Default for PackParams {
    fn default() -> Self {
        Self {
            min_slit_length_as: 8.0,
            min_sep_as: 0.5,
            box_size_as: 4.0,
            extend: false,
        }
    }
}

impl PackParams {
    pub fn validate(&self) -> Result<(), SlitmaskError> {
        let checks = [
            ("min_slit_length_as", self.min_slit_length_as),
            ("min_sep_as", self.min_sep_as),
            ("box_size_as", self.box_size_as),
        ];
        for (name, value) in checks {
            if !value.is_finite() || value < 0.0 {
                return Err(SlitmaskError::InvalidPackParameter { name, value });
            }
        }
        Ok(())
    }
}

/// One packing candidate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    /// Caller-side index, echoed back in [`Placement::index`].
    pub index: usize,
    /// Focal-plane x, arcsec.
    pub x: f64,
    pub pcode: i32,
}

/// A selected slit or box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub index: usize,
    pub length1: f64,
    pub length2: f64,
    pub is_box: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PackResult {
    /// Selected entries, sorted by candidate index.
    pub placements: Vec<Placement>,
    /// Free space left on the mask after packing.
    pub gaps: Vec<Gap>,
}

impl PackResult {
    pub fn is_selected(&self, index: usize) -> bool {
        self.placement(index).is_some()
    }

    pub fn placement(&self, index: usize) -> Option<&Placement> {
        self.placements
            .binary_search_by_key(&index, |p| p.index)
            .ok()
            .map(|i| &self.placements[i])
    }

    /// Total width of the leftover gaps.
    pub fn unused_length(&self) -> f64 {
        self.gaps.iter().map(Gap::width).sum()
    }
}

/// Stages of one packing run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackStage {
    Init,
    BoxesPlaced,
    TargetsPlaced,
    Extended,
    Done,
}

/// Run the full packing pipeline over `candidates` within `[min_x, max_x]`.
///
/// Fails only on invalid bounds or parameters.
pub fn pack(
    candidates: &[Candidate],
    min_x: f64,
    max_x: f64,
    params: &PackParams,
) -> Result<PackResult, SlitmaskError> {
    if !(min_x.is_finite() && max_x.is_finite() && min_x < max_x) {
        return Err(SlitmaskError::InvalidMaskBounds { min_x, max_x });
    }
    params.validate()?;

    let min_sep = params.min_sep_as;
    let half_sep = min_sep / 2.0;
    debug!(
        "Packing {:?}: {} candidates in [{:.2}, {:.2}]",
        PackStage::Init,
        candidates.len(),
        min_x,
        max_x
    );

    let mut order: Vec<usize> = (0..candidates.len()).collect();
    order.sort_by(|&a, &b| {
        let (ca, cb) = (&candidates[a], &candidates[b]);
        cb.pcode.cmp(&ca.pcode).then(ca.x.total_cmp(&cb.x))
    });

    // Boxes
    let box_half = params.box_size_as / 2.0;
    let mut placements = Vec::with_capacity(candidates.len());
    let mut box_segments = Vec::new();
    for &i in &order {
        let c = &candidates[i];
        if !PriorityClass::from_code(c.pcode).is_box() {
            continue;
        }
        box_segments.push(Interval::new(
            c.x - box_half - half_sep,
            c.x + box_half + half_sep,
        ));
        placements.push(Placement {
            index: c.index,
            length1: box_half,
            length2: box_half,
            is_box: true,
        });
    }
    let box_segments = gaps::merge_segments(box_segments);
    let mut free = gaps::segments_to_gaps(&box_segments, min_x, max_x);
    debug!(
        "Packing {:?}: {} boxes in {} segments, {} gaps",
        PackStage::BoxesPlaced,
        placements.len(),
        box_segments.len(),
        free.len()
    );

    // Science targets
    let mut slits: Vec<SlitExtent> = Vec::new();
    let mut slit_index: Vec<usize> = Vec::new();
    for &i in &order {
        let c = &candidates[i];
        if !PriorityClass::from_code(c.pcode).is_science() {
            continue;
        }
        if let Fit::Gap(g) = gaps::can_fit(&free, c.x, params.min_slit_length_as, min_sep) {
            let (left, right) =
                gaps::split_gap(&mut free, g, c.x, params.min_slit_length_as, min_sep);
            slits.push(SlitExtent {
                x: c.x,
                length1: c.x - left,
                length2: right - c.x,
            });
            slit_index.push(c.index);
        }
    }
    debug!(
        "Packing {:?}: {} slits placed, {} gaps left",
        PackStage::TargetsPlaced,
        slits.len(),
        free.len()
    );

    if params.extend {
        free = extend::extend_slits(&free, &mut slits, &box_segments, min_sep);
        debug!(
            "Packing {:?}: {} gaps left after extension",
            PackStage::Extended,
            free.len()
        );
    }

    placements.extend(slits.iter().zip(&slit_index).map(|(s, &index)| Placement {
        index,
        length1: s.length1,
        length2: s.length2,
        is_box: false,
    }));
    placements.sort_by_key(|p| p.index);

    debug!(
        "Packing {:?}: {} selected, {:.2} arcsec unused",
        PackStage::Done,
        placements.len(),
        free.iter().map(Gap::width).sum::<f64>()
    );
    Ok(PackResult {
        placements,
        gaps: free,
    })
}
