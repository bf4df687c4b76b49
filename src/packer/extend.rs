//! Gap-filling pass: grow placed slits into the free space beside them.
//!
//! Free gaps, placed science slits and fixed box segments are laid out in one
//! position-sorted list. Each gap at least `min_sep` wide is handed to the
//! extendable slits directly touching it: split at its midpoint when both
//! neighbours are slits, taken whole when only one is. Boxes never grow. The
//! pass runs once, left to right.

use super::gaps::{Gap, Interval};

/// Tolerance when deciding that a gap edge touches a segment.
const TOUCH_EPS: f64 = 1e-4;

/// A placed science slit: center and half-extents, arcsec.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlitExtent {
    pub x: f64,
    pub length1: f64,
    pub length2: f64,
}

impl SlitExtent {
    fn padded(&self, half_sep: f64) -> Interval {
        Interval::new(
            self.x - self.length1 - half_sep,
            self.x + self.length2 + half_sep,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum SpanKind {
    Gap,
    Slit(usize),
    Fixed,
}

#[derive(Debug, Clone, Copy)]
struct Span {
    start: f64,
    end: f64,
    kind: SpanKind,
}

/// Extend `slits` into neighbouring `gaps`, returning the gaps nobody took.
pub fn extend_slits(
    gaps: &[Gap],
    slits: &mut [SlitExtent],
    fixed: &[Interval],
    min_sep: f64,
) -> Vec<Gap> {
    let half_sep = min_sep / 2.0;

    let mut spans: Vec<Span> = Vec::with_capacity(gaps.len() + slits.len() + fixed.len());
    spans.extend(gaps.iter().map(|g| Span {
        start: g.start,
        end: g.end,
        kind: SpanKind::Gap,
    }));
    spans.extend(slits.iter().enumerate().map(|(i, s)| {
        let iv = s.padded(half_sep);
        Span {
            start: iv.start,
            end: iv.end,
            kind: SpanKind::Slit(i),
        }
    }));
    spans.extend(fixed.iter().map(|f| Span {
        start: f.start,
        end: f.end,
        kind: SpanKind::Fixed,
    }));
    spans.sort_by(|a, b| a.start.total_cmp(&b.start));

    let mut leftover = Vec::new();
    for i in 0..spans.len() {
        let span = spans[i];
        if span.kind != SpanKind::Gap {
            continue;
        }
        let gap = Gap::new(span.start, span.end);
        if gap.width() < min_sep {
            leftover.push(gap);
            continue;
        }

        let left = i
            .checked_sub(1)
            .and_then(|j| touching_slit(&spans[j], spans[j].end, gap.start));
        let right = spans
            .get(i + 1)
            .and_then(|s| touching_slit(s, s.start, gap.end));

        match (left, right) {
            (Some(l), Some(r)) => {
                let mid = 0.5 * (gap.start + gap.end);
                slits[l].length2 = mid - half_sep - slits[l].x;
                slits[r].length1 = slits[r].x - (mid + half_sep);
                spans[i - 1].end = mid;
                spans[i + 1].start = mid;
            }
            (Some(l), None) => {
                slits[l].length2 = gap.end - half_sep - slits[l].x;
                spans[i - 1].end = gap.end;
            }
            (None, Some(r)) => {
                slits[r].length1 = slits[r].x - (gap.start + half_sep);
                spans[i + 1].start = gap.start;
            }
            (None, None) => leftover.push(gap),
        }
    }
    leftover
}

fn touching_slit(span: &Span, edge: f64, reference: f64) -> Option<usize> {
    match span.kind {
        SpanKind::Slit(i) if (edge - reference).abs() < TOUCH_EPS => Some(i),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slit(x: f64, l1: f64, l2: f64) -> SlitExtent {
        SlitExtent {
            x,
            length1: l1,
            length2: l2,
        }
    }

    #[test]
    fn test_gap_between_slits_is_split() {
        // Padded slits [5.5, 14.5] and [25.5, 34.5] with a gap [14.5, 25.5] between.
        let mut slits = [slit(10.0, 4.0, 4.0), slit(30.0, 4.0, 4.0)];
        let gaps = [Gap::new(14.5, 25.5)];
        let left = extend_slits(&gaps, &mut slits, &[], 1.0);
        assert!(left.is_empty());
        assert!((slits[0].length2 - 9.5).abs() < 1e-12);
        assert!((slits[1].length1 - 9.5).abs() < 1e-12);
        assert_eq!(slits[0].length1, 4.0);
        assert_eq!(slits[1].length2, 4.0);
        // edges stay min_sep apart
        let gap_between = (slits[1].x - slits[1].length1) - (slits[0].x + slits[0].length2);
        assert!((gap_between - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_single_neighbour_takes_all() {
        // mask edge gaps on both sides of one slit
        let mut slits = [slit(50.0, 4.0, 4.0)];
        let gaps = [Gap::new(0.0, 45.5), Gap::new(54.5, 100.0)];
        let left = extend_slits(&gaps, &mut slits, &[], 1.0);
        assert!(left.is_empty());
        assert!((slits[0].length1 - 49.5).abs() < 1e-12);
        assert!((slits[0].length2 - 49.5).abs() < 1e-12);
    }

    #[test]
    fn test_boxes_do_not_grow() {
        // box segment [20, 30] next to gap [14.5, 20]: the slit takes the whole gap
        let mut slits = [slit(10.0, 4.0, 4.0)];
        let gaps = [Gap::new(14.5, 20.0), Gap::new(30.0, 40.0)];
        let fixed = [Interval::new(20.0, 30.0)];
        let left = extend_slits(&gaps, &mut slits, &fixed, 1.0);
        assert!((slits[0].length2 - 9.5).abs() < 1e-12);
        assert_eq!(left, vec![Gap::new(30.0, 40.0)]);
    }

    #[test]
    fn test_narrow_gap_untouched() {
        let mut slits = [slit(10.0, 4.0, 4.0), slit(20.0, 4.0, 4.0)];
        // padded slits end at 14.5 and start at 15.5
        let gaps = [Gap::new(14.5, 15.3)];
        let left = extend_slits(&gaps, &mut slits, &[], 1.0);
        assert_eq!(left, gaps.to_vec());
        assert_eq!(slits[0].length2, 4.0);
        assert_eq!(slits[1].length1, 4.0);
    }
}
