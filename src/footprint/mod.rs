//! Instrument mask footprints.
//!
//! A footprint is a set of closed polygon loops in focal-plane arcsec. Each
//! vertex carries a [`VertexTag`]: `Start` opens a loop, `Continue` adds a
//! vertex, and `Close` adds the final vertex and joins it back to the loop's
//! start. Built-in layouts are provided for DEIMOS (with and without the CCD
//! gaps) and LRIS.
//!
//! Membership queries go through [`FootprintIndex`], a scanline table built
//! once per footprint.

pub mod membership;

pub use membership::FootprintIndex;

use crate::error::SlitmaskError;

/// Role of a vertex within its loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexTag {
    Start,
    Continue,
    Close,
}

impl VertexTag {
    /// Tag from the numeric flag used by layout tables (0, 1, 2).
    pub fn from_flag(flag: u8) -> Option<Self> {
        match flag {
            0 => Some(VertexTag::Start),
            1 => Some(VertexTag::Continue),
            2 => Some(VertexTag::Close),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub x: f64,
    pub y: f64,
    pub tag: VertexTag,
}

/// Closed polygon loops describing the usable area of a slitmask.
#[derive(Debug, Clone, PartialEq)]
pub struct MaskFootprint {
    name: String,
    vertices: Vec<Vertex>,
    min_x: f64,
    max_x: f64,
    min_y: f64,
    max_y: f64,
}

impl MaskFootprint {
    /// Build a footprint from tagged vertices.
    ///
    /// Fails with [`SlitmaskError::EmptyFootprint`] if there are no vertices
    /// or if the bounding box has no extent in x or y, and with
    /// [`SlitmaskError::NonFiniteVertex`] if any coordinate is NaN or infinite.
    pub fn new(name: &str, vertices: Vec<Vertex>) -> Result<Self, SlitmaskError> {
        if vertices.is_empty() {
            return Err(SlitmaskError::EmptyFootprint);
        }
        if let Some(v) = vertices.iter().find(|v| !(v.x.is_finite() && v.y.is_finite())) {
            return Err(SlitmaskError::NonFiniteVertex { x: v.x, y: v.y });
        }
        let (mut min_x, mut max_x) = (f64::INFINITY, f64::NEG_INFINITY);
        let (mut min_y, mut max_y) = (f64::INFINITY, f64::NEG_INFINITY);
        for v in &vertices {
            min_x = min_x.min(v.x);
            max_x = max_x.max(v.x);
            min_y = min_y.min(v.y);
            max_y = max_y.max(v.y);
        }
        if !(min_x < max_x && min_y < max_y) {
            return Err(SlitmaskError::EmptyFootprint);
        }
        Ok(Self {
            name: name.to_string(),
            vertices,
            min_x,
            max_x,
            min_y,
            max_y,
        })
    }

    /// Build from `(x, y, flag)` triples with flags 0 = start, 1 = continue, 2 = close.
    pub fn from_flagged(name: &str, points: &[(f64, f64, u8)]) -> Result<Self, SlitmaskError> {
        let vertices = points
            .iter()
            .filter_map(|&(x, y, flag)| VertexTag::from_flag(flag).map(|tag| Vertex { x, y, tag }))
            .collect();
        Self::new(name, vertices)
    }

    /// Look up a built-in layout by instrument name.
    pub fn by_name(name: &str) -> Result<Self, SlitmaskError> {
        match name.to_ascii_lowercase().as_str() {
            "deimos" => Self::deimos(),
            "deimos_no_gap" => Self::deimos_no_gap(),
            "lris" => Self::lris(),
            _ => Err(SlitmaskError::UnknownInstrument(name.to_string())),
        }
    }

    /// DEIMOS: four slit regions separated by the CCD gaps.
    pub fn deimos() -> Result<Self, SlitmaskError> {
        Self::from_flagged("deimos", DEIMOS)
    }

    /// DEIMOS outline as one polygon, ignoring the CCD gaps.
    pub fn deimos_no_gap() -> Result<Self, SlitmaskError> {
        Self::from_flagged("deimos_no_gap", DEIMOS_NO_GAP)
    }

    /// LRIS: a 200″ square centered on the field.
    pub fn lris() -> Result<Self, SlitmaskError> {
        Self::from_flagged("lris", LRIS)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn min_x(&self) -> f64 {
        self.min_x
    }

    pub fn max_x(&self) -> f64 {
        self.max_x
    }

    pub fn min_y(&self) -> f64 {
        self.min_y
    }

    pub fn max_y(&self) -> f64 {
        self.max_y
    }

    /// Polygon edges in loop order.
    ///
    /// `Close` contributes the edge into the close vertex and the edge from
    /// it back to the loop start, so its coordinates are a real vertex. Older
    /// layout tools ignored them and closed straight from the previous
    /// vertex; the LRIS square here relies on the close vertex counting.
    /// Zero-length edges are dropped.
    pub fn edges(&self) -> Vec<((f64, f64), (f64, f64))> {
        let mut edges = Vec::with_capacity(self.vertices.len() + 4);
        let mut start = (0.0, 0.0);
        let mut prev = (0.0, 0.0);
        let mut open = false;
        for v in &self.vertices {
            let p = (v.x, v.y);
            match v.tag {
                VertexTag::Start => {
                    start = p;
                    prev = p;
                    open = true;
                }
                VertexTag::Continue => {
                    if open {
                        edges.push((prev, p));
                    }
                    prev = p;
                }
                VertexTag::Close => {
                    if open {
                        edges.push((prev, p));
                        edges.push((p, start));
                    }
                    prev = start;
                    open = false;
                }
            }
        }
        edges.retain(|(a, b)| a != b);
        edges
    }

    /// Vertex lists per loop, with a trailing copy of the start vertex removed.
    pub fn loops(&self) -> Vec<Vec<(f64, f64)>> {
        let mut loops = Vec::new();
        let mut current: Vec<(f64, f64)> = Vec::new();
        for v in &self.vertices {
            if v.tag == VertexTag::Start && !current.is_empty() {
                loops.push(std::mem::take(&mut current));
            }
            current.push((v.x, v.y));
            if v.tag == VertexTag::Close {
                if current.len() > 1 && current.first() == current.last() {
                    current.pop();
                }
                loops.push(std::mem::take(&mut current));
            }
        }
        if !current.is_empty() {
            loops.push(current);
        }
        loops
    }

    /// Precompute the scanline index for membership queries.
    pub fn index(&self) -> FootprintIndex {
        FootprintIndex::build(self)
    }
}

// Vertices are focal-plane arcsec, y measured from the telescope axis.
const DEIMOS: &[(f64, f64, u8)] = &[
    (-498.0, 187.0, 0),
    (-498.0, 332.0, 1),
    (-460.0, 385.0, 1),
    (-420.0, 428.0, 1),
    (-360.0, 479.0, 1),
    (-259.7, 479.0, 1),
    (-259.7, 187.0, 1),
    (-498.0, 187.0, 2),
    (-249.3, 187.0, 0),
    (-249.3, 479.0, 1),
    (-5.2, 479.0, 1),
    (-5.2, 187.0, 1),
    (-249.3, 187.0, 2),
    (5.2, 187.0, 0),
    (5.2, 479.0, 1),
    (249.3, 479.0, 1),
    (249.3, 187.0, 1),
    (5.2, 187.0, 2),
    (259.7, 187.0, 0),
    (259.7, 479.0, 1),
    (360.0, 479.0, 1),
    (420.0, 428.0, 1),
    (460.0, 385.0, 1),
    (498.0, 332.0, 1),
    (498.0, 187.0, 1),
    (259.7, 187.0, 2),
];

const DEIMOS_NO_GAP: &[(f64, f64, u8)] = &[
    (-498.0, 187.0, 0),
    (-498.0, 332.0, 1),
    (-460.0, 385.0, 1),
    (-420.0, 428.0, 1),
    (-360.0, 479.0, 1),
    (360.0, 479.0, 1),
    (420.0, 428.0, 1),
    (460.0, 385.0, 1),
    (498.0, 332.0, 1),
    (498.0, 187.0, 1),
    (-498.0, 187.0, 2),
];

const LRIS: &[(f64, f64, u8)] = &[
    (-100.0, -100.0, 0),
    (100.0, -100.0, 1),
    (100.0, 100.0, 1),
    (-100.0, 100.0, 2),
];
