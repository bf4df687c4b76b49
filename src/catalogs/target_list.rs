//! Whitespace-delimited target list format.
//!
//! One target per line:
//!
//! ```text
//! name  ra(h)  dec(deg)  equinox  mag  band  pcode  sampleNr  selected  slitPA  length1  length2  slitWidth
//! ```
//!
//! RA and Dec are sexagesimal. Only name, RA and Dec are required; missing
//! trailing columns take their defaults. `#` starts a comment. A line with a
//! `PA=` token is the mask line instead: `name ra dec equinox PA=value`.
//!
//! Rows that fail to parse are logged and skipped; they never abort a load.

use std::fmt::Write as _;
use std::path::Path;
use std::str::FromStr;

use anyhow::Context;
use tracing::{info, warn};

use super::sexagesimal::{parse_sexagesimal, to_sexagesimal};
use crate::error::RowError;
use crate::target::Target;

/// Values for columns a row leaves out.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetListDefaults {
    /// Total slit length, split evenly into `length1` and `length2`.
    pub slit_length_as: f64,
    pub slit_width_as: f64,
    /// `None` makes slits follow the mask position angle.
    pub slit_pa_deg: Option<f64>,
}

impl Default for TargetListDefaults {
    fn default() -> Self {
        Self {
            slit_length_as: 10.0,
            slit_width_as: 1.0,
            slit_pa_deg: None,
        }
    }
}

/// Mask name, center and position angle.
#[derive(Debug, Clone, PartialEq)]
pub struct MaskHeader {
    pub name: String,
    pub center_ra_deg: f64,
    pub center_dec_deg: f64,
    pub position_angle_deg: f64,
}

impl Default for MaskHeader {
    fn default() -> Self {
        Self {
            name: "mask".to_string(),
            center_ra_deg: 0.0,
            center_dec_deg: 0.0,
            position_angle_deg: 0.0,
        }
    }
}

/// A row that was dropped while reading.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedRow {
    /// 1-based line number.
    pub line: usize,
    pub error: RowError,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TargetList {
    pub header: MaskHeader,
    pub targets: Vec<Target>,
    pub skipped: Vec<SkippedRow>,
}

const INDEF: &str = "INDEF";

fn strip_comment(line: &str) -> &str {
    line.split('#').next().unwrap_or("")
}

fn is_header_line(line: &str) -> bool {
    strip_comment(line).to_ascii_uppercase().contains("PA=")
}

/// Parse the mask line `name ra dec equinox PA=value` (also `PA= value`).
pub fn parse_mask_header(line: &str) -> Result<MaskHeader, RowError> {
    let fields: Vec<&str> = strip_comment(line).split_whitespace().collect();
    let invalid = || RowError::InvalidCenter(line.trim().to_string());

    let i = fields
        .iter()
        .position(|f| f.to_ascii_uppercase().contains("PA="))
        .ok_or_else(invalid)?;
    if i < 3 {
        return Err(invalid());
    }

    let tail = fields[i..].join(" ");
    let pa_text = tail
        .split_once('=')
        .and_then(|(_, v)| v.split_whitespace().next())
        .ok_or_else(invalid)?;
    let position_angle_deg: f64 = pa_text.parse().map_err(|_| invalid())?;

    let ra_hour = parse_sexagesimal(fields[i - 3]).ok_or_else(invalid)?;
    let dec_deg = parse_sexagesimal(fields[i - 2]).ok_or_else(invalid)?;
    let name = if i >= 4 { fields[i - 4] } else { "" };

    Ok(MaskHeader {
        name: name.to_string(),
        center_ra_deg: ra_hour * 15.0,
        center_dec_deg: dec_deg,
        position_angle_deg,
    })
}

fn column<T: FromStr>(
    cols: &[String],
    i: usize,
    field: &'static str,
    default: T,
) -> Result<T, RowError> {
    match cols.get(i) {
        None => Ok(default),
        Some(s) => s.parse().map_err(|_| RowError::InvalidNumber {
            field,
            value: s.clone(),
        }),
    }
}

/// Parse one target row. Blank and comment-only lines give `Ok(None)`.
pub fn parse_target_row(
    line: &str,
    defaults: &TargetListDefaults,
) -> Result<Option<Target>, RowError> {
    let fields: Vec<&str> = strip_comment(line).split_whitespace().collect();
    if fields.is_empty() {
        return Ok(None);
    }
    if fields.len() < 3 {
        return Err(RowError::TooFewFields(fields.len()));
    }

    let object_id = fields[0];
    let ra_hour =
        parse_sexagesimal(fields[1]).ok_or_else(|| RowError::InvalidRa(fields[1].to_string()))?;
    if !(0.0..=24.0).contains(&ra_hour) {
        return Err(RowError::RaOutOfRange(ra_hour));
    }
    let dec_deg =
        parse_sexagesimal(fields[2]).ok_or_else(|| RowError::InvalidDec(fields[2].to_string()))?;
    if !(-90.0..=90.0).contains(&dec_deg) {
        return Err(RowError::DecOutOfRange(dec_deg));
    }

    // Columns from the equinox on. An equinox glued to the magnitude
    // (`200019.5`) is split into two columns.
    let mut cols: Vec<String> = fields[3..].iter().map(|s| s.to_string()).collect();
    if let Some(first) = cols.first().cloned() {
        let eqx: f64 = first.parse().map_err(|_| RowError::InvalidNumber {
            field: "equinox",
            value: first.clone(),
        })?;
        if eqx > 3000.0 && first.len() > 4 && first.is_char_boundary(4) {
            let (eqx_text, mag_text) = first.split_at(4);
            cols[0] = eqx_text.to_string();
            cols.insert(1, mag_text.to_string());
        }
    }

    let half = defaults.slit_length_as / 2.0;
    let equinox = column(&cols, 0, "equinox", 2000.0)?;
    let mag = column(&cols, 1, "mag", 99.0f32)?;
    let band = cols.get(2).map(|s| s.to_uppercase()).unwrap_or_else(|| "I".to_string());
    let pcode = column(&cols, 3, "pcode", 0i32)?;
    let sample_nr = column(&cols, 4, "sampleNr", -1i32)?;
    let selected = column(&cols, 5, "selected", 0i32)? != 0;
    let slit_pa_deg = match cols.get(6) {
        Some(s) if s.eq_ignore_ascii_case(INDEF) => None,
        Some(_) => Some(column(&cols, 6, "slitPA", 0.0)?),
        None => defaults.slit_pa_deg,
    };
    let length1 = column(&cols, 7, "length1", half)?;
    let length2 = column(&cols, 8, "length2", half)?;
    let slit_width = column(&cols, 9, "slitWidth", defaults.slit_width_as)?;

    let mut target = Target::new(object_id, ra_hour, dec_deg, pcode, half, slit_width);
    target.equinox = equinox;
    target.mag = mag;
    target.band = band;
    target.sample_nr = sample_nr;
    target.selected = selected;
    target.slit_pa_deg = slit_pa_deg;
    target.min_length1 = length1;
    target.min_length2 = length2;
    target.length1 = length1;
    target.length2 = length2;
    Ok(Some(target))
}

/// Parse a whole target list.
///
/// Without a mask line the center is the mean target position and the
/// position angle is 0.
pub fn parse_target_list(text: &str, defaults: &TargetListDefaults) -> TargetList {
    let mut header: Option<MaskHeader> = None;
    let mut targets = Vec::new();
    let mut skipped = Vec::new();

    for (nr, line) in text.lines().enumerate() {
        let line_nr = nr + 1;
        if is_header_line(line) {
            match parse_mask_header(line) {
                Ok(h) => header = Some(h),
                Err(error) => {
                    warn!("line {}: {}", line_nr, error);
                    skipped.push(SkippedRow {
                        line: line_nr,
                        error,
                    });
                }
            }
            continue;
        }
        match parse_target_row(line, defaults) {
            Ok(Some(t)) => targets.push(t),
            Ok(None) => {}
            Err(error) => {
                warn!("line {}: {}, skipped", line_nr, error);
                skipped.push(SkippedRow {
                    line: line_nr,
                    error,
                });
            }
        }
    }

    let header = match header {
        Some(h) => h,
        None => {
            let mut h = MaskHeader::default();
            if !targets.is_empty() {
                let n = targets.len() as f64;
                h.center_ra_deg = targets.iter().map(|t| t.ra_hour * 15.0).sum::<f64>() / n;
                h.center_dec_deg = targets.iter().map(|t| t.dec_deg).sum::<f64>() / n;
            }
            info!(
                "No mask center given, using mean target position RA={:.5} Dec={:.5}",
                h.center_ra_deg, h.center_dec_deg
            );
            h
        }
    };

    info!(
        "Read {} targets ({} rows skipped) for mask {}",
        targets.len(),
        skipped.len(),
        header.name
    );
    TargetList {
        header,
        targets,
        skipped,
    }
}

/// Format a target list; the output parses back to the same targets.
pub fn write_target_list(list: &TargetList) -> String {
    let h = &list.header;
    let mut out = String::new();
    out.push_str("# Mask name, center:\n#\n");
    let _ = writeln!(
        out,
        "{:20} {} {} 2000.0 PA={:.3}",
        h.name,
        to_sexagesimal(h.center_ra_deg / 15.0, false, 3),
        to_sexagesimal(h.center_dec_deg, true, 2),
        h.position_angle_deg
    );
    out.push_str("#\n# Columns\n");
    out.push_str("# Obj_Id, RA, DEC, EQX, Magn, pBand, pCode, sampleNr, selected, slitLPA, length1, length2, slitWidth\n#\n");

    for t in &list.targets {
        let slit_pa = match t.slit_pa_deg {
            Some(pa) => format!("{:.2}", pa),
            None => INDEF.to_string(),
        };
        let _ = writeln!(
            out,
            "{:20} {} {} {:.1} {:.3} {} {:5} {} {} {} {:.2} {:.2} {:.2}",
            t.object_id,
            to_sexagesimal(t.ra_hour, false, 3),
            to_sexagesimal(t.dec_deg, true, 2),
            t.equinox,
            t.mag,
            t.band,
            t.pcode,
            t.sample_nr,
            u8::from(t.selected),
            slit_pa,
            t.length1,
            t.length2,
            t.slit_width
        );
    }
    out
}

/// Read and parse a target list file.
pub fn read_target_list_file<P: AsRef<Path>>(
    path: P,
    defaults: &TargetListDefaults,
) -> anyhow::Result<TargetList> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading target list {}", path.display()))?;
    Ok(parse_target_list(&text, defaults))
}

/// Write a target list file.
pub fn write_target_list_file<P: AsRef<Path>>(path: P, list: &TargetList) -> anyhow::Result<()> {
    let path = path.as_ref();
    std::fs::write(path, write_target_list(list))
        .with_context(|| format!("writing target list {}", path.display()))?;
    info!("Wrote {} targets to {}", list.targets.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
# test mask
cosmos1   10:00:28.600 +02:12:21.00 2000.0 PA=30.5
#
gal1      10:00:30.000 +02:10:00.00 2000 21.5 r 500 1 0 INDEF 5.0 5.0 1.0
box1      10:00:25.000 +02:14:00.00 2000 17.2 I -2 1 1 30 2 2 4
gal2      10:00:31.500 +02:11:30.00 200019.25 i 300
star      10:00:27.000 +02:13:00.00
bad1      25:00:00.000 +02:10:00.00 2000
bad2      10:00:30.000 +91:00:00.00 2000
bad3      10:00:30.000 +02:10:00.00 2000 xx
bad4      10:00:30.000
";

    #[test]
    fn test_parse_sample() {
        let list = parse_target_list(SAMPLE, &TargetListDefaults::default());
        assert_eq!(list.header.name, "cosmos1");
        assert!((list.header.center_ra_deg - 150.119166666).abs() < 1e-6);
        assert!((list.header.center_dec_deg - 2.205833333).abs() < 1e-6);
        assert_eq!(list.header.position_angle_deg, 30.5);

        assert_eq!(list.targets.len(), 4);
        let g1 = &list.targets[0];
        assert_eq!(g1.object_id, "gal1");
        assert_eq!(g1.band, "R");
        assert_eq!(g1.pcode, 500);
        assert_eq!(g1.slit_pa_deg, None);
        assert_eq!((g1.length1, g1.length2), (5.0, 5.0));

        let b = &list.targets[1];
        assert_eq!(b.pcode, -2);
        assert!(b.selected);
        assert_eq!(b.slit_pa_deg, Some(30.0));
        assert_eq!(b.slit_width, 4.0);

        // glued equinox and magnitude
        let g2 = &list.targets[2];
        assert_eq!(g2.equinox, 2000.0);
        assert_eq!(g2.mag, 19.25);
        assert_eq!(g2.band, "I");
        assert_eq!(g2.pcode, 300);

        // defaults for missing columns
        let s = &list.targets[3];
        assert_eq!(s.equinox, 2000.0);
        assert_eq!(s.mag, 99.0);
        assert_eq!(s.pcode, 0);
        assert_eq!(s.sample_nr, -1);
        assert_eq!((s.length1, s.length2, s.slit_width), (5.0, 5.0, 1.0));

        let errors: Vec<&RowError> = list.skipped.iter().map(|s| &s.error).collect();
        assert_eq!(errors.len(), 4);
        assert!(matches!(errors[0], RowError::RaOutOfRange(_)));
        assert!(matches!(errors[1], RowError::DecOutOfRange(_)));
        assert!(matches!(errors[2], RowError::InvalidNumber { field: "mag", .. }));
        assert_eq!(*errors[3], RowError::TooFewFields(2));
        assert_eq!(list.skipped[0].line, 8);
    }

    #[test]
    fn test_header_variants() {
        let h = parse_mask_header("m1 12:00:00 -30:00:00 2000 PA= -45.0").unwrap();
        assert_eq!(h.name, "m1");
        assert_eq!(h.center_ra_deg, 180.0);
        assert_eq!(h.center_dec_deg, -30.0);
        assert_eq!(h.position_angle_deg, -45.0);

        let h = parse_mask_header("12:00:00 -30:00:00 2000 pa=10").unwrap();
        assert_eq!(h.name, "");
        assert_eq!(h.position_angle_deg, 10.0);

        assert!(matches!(
            parse_mask_header("PA=10"),
            Err(RowError::InvalidCenter(_))
        ));
    }

    #[test]
    fn test_mean_center_without_header() {
        let text = "a 01:00:00 +10:00:00\nb 03:00:00 +20:00:00\n";
        let list = parse_target_list(text, &TargetListDefaults::default());
        assert!((list.header.center_ra_deg - 30.0).abs() < 1e-12);
        assert!((list.header.center_dec_deg - 15.0).abs() < 1e-12);
        assert_eq!(list.header.position_angle_deg, 0.0);
    }

    #[test]
    fn test_write_then_read() {
        let list = parse_target_list(SAMPLE, &TargetListDefaults::default());
        let text = write_target_list(&list);
        let back = parse_target_list(&text, &TargetListDefaults::default());
        assert!(back.skipped.is_empty(), "skipped: {:?}", back.skipped);
        assert_eq!(back.header.name, list.header.name);
        assert!((back.header.center_ra_deg - list.header.center_ra_deg).abs() < 1e-5);
        assert_eq!(back.targets.len(), list.targets.len());
        for (a, b) in list.targets.iter().zip(&back.targets) {
            assert_eq!(a.object_id, b.object_id);
            assert!((a.ra_hour - b.ra_hour).abs() < 1e-6);
            assert!((a.dec_deg - b.dec_deg).abs() < 1e-5);
            assert_eq!(a.pcode, b.pcode);
            assert_eq!(a.band, b.band);
            assert_eq!(a.selected, b.selected);
            assert_eq!(a.slit_pa_deg, b.slit_pa_deg);
            assert_eq!((a.length1, a.length2), (b.length1, b.length2));
            assert!((a.mag - b.mag).abs() < 1e-3);
        }
    }

    #[test]
    fn test_file_io() {
        let dir = std::env::temp_dir().join(format!("slitmask-list-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("targets.lst");
        let list = parse_target_list(SAMPLE, &TargetListDefaults::default());
        write_target_list_file(&path, &list).unwrap();
        let back = read_target_list_file(&path, &TargetListDefaults::default()).unwrap();
        assert_eq!(back.targets.len(), 4);
        std::fs::remove_dir_all(&dir).unwrap();

        assert!(read_target_list_file(dir.join("missing.lst"), &TargetListDefaults::default()).is_err());
    }
}
