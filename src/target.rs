/// Classification of a catalog row by its priority code.
///
/// Positive codes are science targets ranked by value (higher first),
/// `-1` marks a guide star, `-2` an alignment box, everything else is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriorityClass {
    Science(i32),
    GuideStar,
    AlignmentBox,
    Ignored,
}

impl PriorityClass {
    pub fn from_code(pcode: i32) -> Self {
        match pcode {
            p if p > 0 => PriorityClass::Science(p),
            -1 => PriorityClass::GuideStar,
            -2 => PriorityClass::AlignmentBox,
            _ => PriorityClass::Ignored,
        }
    }

    /// Guide stars and alignment boxes are packed as fixed-size boxes.
    pub fn is_box(&self) -> bool {
        matches!(self, PriorityClass::GuideStar | PriorityClass::AlignmentBox)
    }

    pub fn is_science(&self) -> bool {
        matches!(self, PriorityClass::Science(_))
    }
}

/// Four corners of a slit on the mask surface, in mm.
///
/// Corner 1 is right-top, 2 left-top, 3 left-bottom, 4 right-bottom,
/// where left/right run along the slit axis from `length1` to `length2`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlitCorners {
    pub corners: [(f64, f64); 4],
}

/// One catalog entry together with its projected and packed state.
///
/// Sky position, photometry and selection inputs come from the catalog and
/// only change through an explicit edit. Everything under "derived state"
/// is recomputed on every reprojection or packing run.
#[derive(Debug, Clone, PartialEq)]
pub struct Target {
    pub object_id: String,
    /// Right ascension as read, in hours.
    pub ra_hour: f64,
    /// Declination as read, in degrees.
    pub dec_deg: f64,
    pub ra_rad: f64,
    pub dec_rad: f64,
    pub equinox: f64,
    pub mag: f32,
    pub band: String,
    pub pcode: i32,
    pub sample_nr: i32,
    /// Slit position angle in degrees; `None` follows the mask position angle.
    pub slit_pa_deg: Option<f64>,
    /// Desired half-extent toward `-x` along the slit, arcsec.
    pub min_length1: f64,
    /// Desired half-extent toward `+x` along the slit, arcsec.
    pub min_length2: f64,
    pub slit_width: f64,

    // derived state
    pub focal_x: f64,
    pub focal_y: f64,
    pub mask_x: f64,
    pub mask_y: f64,
    pub inside_mask: bool,
    pub selected: bool,
    /// Final half-extent toward `-x` after packing, arcsec.
    pub length1: f64,
    /// Final half-extent toward `+x` after packing, arcsec.
    pub length2: f64,
    pub corners: Option<SlitCorners>,
}

impl Target {
    /// Create a target from catalog values (RA in hours, Dec in degrees).
    ///
    /// Slit lengths start at the desired half-extents; derived state is zeroed
    /// until the owning catalog reprojects.
    pub fn new(
        object_id: impl Into<String>,
        ra_hour: f64,
        dec_deg: f64,
        pcode: i32,
        half_length: f64,
        slit_width: f64,
    ) -> Self {
        Self {
            object_id: object_id.into(),
            ra_hour,
            dec_deg,
            ra_rad: (ra_hour * 15.0).to_radians(),
            dec_rad: dec_deg.to_radians(),
            equinox: 2000.0,
            mag: 99.0,
            band: "I".to_string(),
            pcode,
            sample_nr: -1,
            slit_pa_deg: None,
            min_length1: half_length,
            min_length2: half_length,
            slit_width,
            focal_x: 0.0,
            focal_y: 0.0,
            mask_x: 0.0,
            mask_y: 0.0,
            inside_mask: false,
            selected: false,
            length1: half_length,
            length2: half_length,
            corners: None,
        }
    }

    pub fn priority(&self) -> PriorityClass {
        PriorityClass::from_code(self.pcode)
    }

    /// Move the target to a new sky position (RA in hours, Dec in degrees).
    pub fn set_position(&mut self, ra_hour: f64, dec_deg: f64) {
        self.ra_hour = ra_hour;
        self.dec_deg = dec_deg;
        self.ra_rad = (ra_hour * 15.0).to_radians();
        self.dec_rad = dec_deg.to_radians();
    }

    /// Total slit length, arcsec.
    pub fn slit_length(&self) -> f64 {
        self.length1 + self.length2
    }

    /// Drop packing results, restoring the desired half-extents.
    pub(crate) fn reset_selection(&mut self) {
        self.selected = false;
        self.length1 = self.min_length1;
        self.length2 = self.min_length2;
        self.corners = None;
    }
}
