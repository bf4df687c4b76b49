//! Target list reading and writing.

pub mod sexagesimal;
pub mod target_list;

pub use sexagesimal::{parse_sexagesimal, to_sexagesimal};
pub use target_list::{
    parse_mask_header, parse_target_list, parse_target_row, read_target_list_file,
    write_target_list, write_target_list_file, MaskHeader, SkippedRow, TargetList,
    TargetListDefaults,
};
