//! # slitmask
//!
//! Target projection and slit packing for multi-object spectrograph
//! slitmasks.
//!
//! Given a catalog of sky targets, a telescope pointing and an instrument
//! footprint, `slitmask` computes where each slit goes on the physical mask
//! and how long it can be. The output drives mask-cutting hardware, so every
//! step is deterministic and ties are broken the same way on every run.
//!
//! ## Example
//!
//! ```no_run
//! use slitmask::{parse_target_list, InstrumentConfig, PackParams, TargetCatalog};
//!
//! let text = std::fs::read_to_string("targets.lst").unwrap();
//! let config = InstrumentConfig::deimos().unwrap();
//! let list = parse_target_list(&text, &config.defaults);
//!
//! let mut design = TargetCatalog::from_target_list(config, list);
//! let params = PackParams { extend: true, ..Default::default() };
//! let gaps = design.pack(&params).unwrap();
//! println!("{} gaps left", gaps.len());
//!
//! for (i, c) in design.slit_corners() {
//!     println!("{}: {:?}", design.targets()[i].object_id, c.corners);
//! }
//! ```
//!
//! ## Pipeline
//!
//! 1. **Projection**: RA/Dec to focal-plane arcsec relative to the telescope
//!    axis, then onto the curved mask surface in mm ([`projection`]).
//! 2. **Membership**: Flag targets inside the instrument footprint with a
//!    scanline even-odd test ([`footprint`]).
//! 3. **Packing**: Place alignment boxes, then science slits in priority
//!    order, then optionally stretch slits into leftover space ([`packer`]).
//! 4. **Corners**: Four mask-surface corners per selected slit
//!    ([`TargetCatalog::slit_corners`]).

pub mod catalogs;
pub mod distortion;
pub mod error;
pub mod footprint;
pub mod instrument;
pub mod packer;
pub mod projection;
pub mod refraction;
pub mod target;
pub mod targetcatalog;

pub use catalogs::{
    parse_target_list, read_target_list_file, write_target_list, write_target_list_file,
    MaskHeader, TargetList, TargetListDefaults,
};
pub use distortion::{Distortion, Polynomial2D, PolynomialDistortion, RadialDistortion};
pub use error::{RowError, SlitmaskError};
pub use footprint::{FootprintIndex, MaskFootprint, VertexTag};
pub use instrument::{InstrumentConfig, PointingPolicy};
pub use packer::{pack, Candidate, Gap, PackParams, PackResult, Placement};
pub use projection::{MaskGeometry, MaskPoint};
pub use refraction::RefractionModel;
pub use target::{PriorityClass, SlitCorners, Target};
pub use targetcatalog::{DesignSummary, TargetCatalog};
