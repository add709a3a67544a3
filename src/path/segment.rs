//! Path segments: one resolved command each, with its local geometry.

use std::cell::Cell;

use glam::DVec2;

use super::arc::{ArcParameterization, EllipticalArc};
use super::cubic::{CubicBez, distance_to_segment};
use crate::parse::PathCommand;
use crate::render::RenderContext;
use crate::types::{BBox, Width};

/// Geometry of a segment in absolute coordinates.
///
/// Relative commands and the shorthand forms (`H`, `V`, `S`, `T`) are gone
/// by the time a segment exists: they resolve to the variants below.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SegmentKind {
    MoveTo,
    Line,
    Quad { ctrl: DVec2 },
    Cubic { ctrl1: DVec2, ctrl2: DVec2 },
    Arc(EllipticalArc),
    Close,
}

#[derive(Debug, Clone)]
pub struct PathSegment {
    command: char,
    kind: SegmentKind,
    from: DVec2,
    to: DVec2,
    index: usize,
    is_last: bool,
    box_cache: Cell<Option<(Width, Option<BBox>)>>,
}

impl PathSegment {
    fn new(command: char, kind: SegmentKind, from: DVec2, to: DVec2, index: usize) -> Self {
        PathSegment {
            command,
            kind,
            from,
            to,
            index,
            is_last: false,
            box_cache: Cell::new(None),
        }
    }

    /// Command letter as written in the path data.
    pub fn command(&self) -> char {
        self.command
    }

    pub fn kind(&self) -> &SegmentKind {
        &self.kind
    }

    /// Current point before this segment.
    pub fn from(&self) -> DVec2 {
        self.from
    }

    /// Current point after this segment.
    pub fn to(&self) -> DVec2 {
        self.to
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Index of the predecessor in the owning segment list.
    pub fn prev(&self) -> Option<usize> {
        self.index.checked_sub(1)
    }

    pub fn is_last(&self) -> bool {
        self.is_last
    }

    /// Box around the drawn geometry, grown by half of `width`.
    ///
    /// A move-to draws nothing and has no box. Cached until asked for with
    /// a different width.
    pub fn local_box(&self, width: Width) -> Option<BBox> {
        match self.box_cache.get() {
            Some((cached_width, bb)) if cached_width == width => return bb,
            _ => {}
        }
        let bb = self.compute_box(width);
        self.box_cache.set(Some((width, bb)));
        bb
    }

    fn compute_box(&self, width: Width) -> Option<BBox> {
        let half = width.half();
        let bb = match self.kind {
            SegmentKind::MoveTo => return None,
            SegmentKind::Line | SegmentKind::Close => BBox::from_corners(self.from, self.to),
            SegmentKind::Quad { .. } | SegmentKind::Cubic { .. } | SegmentKind::Arc(_) => {
                let pieces = self.to_cubics();
                let mut iter = pieces.iter();
                let mut bb = iter.next()?.bbox();
                for piece in iter {
                    bb = bb.union(piece.bbox());
                }
                bb
            }
        };
        Some(bb.inflate(half))
    }

    /// Whether `p` lies within half of `width` of the drawn geometry.
    pub fn is_inside_stroke(&self, p: DVec2, width: Width) -> bool {
        if matches!(self.kind, SegmentKind::MoveTo) {
            return false;
        }
        match self.local_box(width) {
            Some(bb) if bb.contains(p) => {}
            _ => return false,
        }
        let half = width.half();
        match self.kind {
            SegmentKind::MoveTo => false,
            SegmentKind::Line | SegmentKind::Close => {
                distance_to_segment(p, self.from, self.to) <= half
            }
            _ => self.to_cubics().iter().any(|c| c.nearest_distance(p) <= half),
        }
    }

    /// Unit direction of travel at the endpoint.
    ///
    /// `None` for move-to and for segments that do not move.
    pub fn end_tangent(&self) -> Option<DVec2> {
        let dir = match self.kind {
            SegmentKind::MoveTo => return None,
            SegmentKind::Line | SegmentKind::Close => self.to - self.from,
            SegmentKind::Quad { ctrl } => first_nonzero([self.to - ctrl, self.to - self.from]),
            SegmentKind::Cubic { ctrl1, ctrl2 } => {
                first_nonzero([self.to - ctrl2, self.to - ctrl1, self.to - self.from])
            }
            SegmentKind::Arc(arc) => arc.end_direction(),
        };
        dir.try_normalize()
    }

    /// Copy of this segment ending at `end` instead.
    ///
    /// Used to pull the last segment back under an arrowhead; a close-path
    /// becomes a plain line so the shortened end is honored.
    pub fn with_end(&self, end: DVec2) -> PathSegment {
        let kind = match self.kind {
            SegmentKind::Close => SegmentKind::Line,
            SegmentKind::Arc(arc) => SegmentKind::Arc(EllipticalArc { to: end, ..arc }),
            other => other,
        };
        PathSegment {
            kind,
            to: end,
            box_cache: Cell::new(None),
            ..self.clone()
        }
    }

    /// The segment as cubic pieces; empty for move-to and omitted arcs.
    pub fn to_cubics(&self) -> Vec<CubicBez> {
        match self.kind {
            SegmentKind::MoveTo => Vec::new(),
            SegmentKind::Line | SegmentKind::Close => vec![CubicBez::line(self.from, self.to)],
            SegmentKind::Quad { ctrl } => vec![CubicBez::from_quad(self.from, ctrl, self.to)],
            SegmentKind::Cubic { ctrl1, ctrl2 } => {
                vec![CubicBez::new(self.from, ctrl1, ctrl2, self.to)]
            }
            SegmentKind::Arc(arc) => arc.to_cubics(),
        }
    }

    /// Issue the drawing primitive for this segment.
    pub fn draw(&self, ctx: &mut dyn RenderContext) {
        match self.kind {
            SegmentKind::MoveTo => ctx.move_to(self.to),
            SegmentKind::Line => ctx.line_to(self.to),
            SegmentKind::Quad { ctrl } => ctx.quadratic_curve_to(ctrl, self.to),
            SegmentKind::Cubic { ctrl1, ctrl2 } => ctx.bezier_curve_to(ctrl1, ctrl2, self.to),
            SegmentKind::Arc(arc) => match arc.center_parameterization() {
                ArcParameterization::LineTo => ctx.line_to(self.to),
                ArcParameterization::Omit => {}
                ArcParameterization::CenterParameters { .. } => {
                    for piece in arc.to_cubics() {
                        ctx.bezier_curve_to(piece.p1, piece.p2, piece.p3);
                    }
                }
            },
            SegmentKind::Close => ctx.close_path(),
        }
    }
}

fn first_nonzero<const N: usize>(candidates: [DVec2; N]) -> DVec2 {
    candidates
        .into_iter()
        .find(|d| d.length_squared() > 0.0)
        .unwrap_or(DVec2::ZERO)
}

/// What the previous command left behind for smooth-curve reflection.
#[derive(Clone, Copy)]
enum LastControl {
    None,
    Cubic(DVec2),
    Quad(DVec2),
}

/// Resolve validated commands into absolute segments.
///
/// Expects the output of [`tokenize`](crate::parse::tokenize): one repetition
/// per command, first command a move-to.
pub(crate) fn resolve(commands: &[PathCommand]) -> Vec<PathSegment> {
    let mut segments = Vec::with_capacity(commands.len());
    let mut current = DVec2::ZERO;
    let mut subpath_start = DVec2::ZERO;
    let mut last_ctrl = LastControl::None;

    for (index, cmd) in commands.iter().enumerate() {
        let a = &cmd.args;
        let base = if cmd.is_relative() { current } else { DVec2::ZERO };
        let pt = |i: usize| base + DVec2::new(a[i], a[i + 1]);

        let (kind, to, next_ctrl) = match cmd.letter.to_ascii_uppercase() {
            'M' => {
                let to = pt(0);
                subpath_start = to;
                (SegmentKind::MoveTo, to, LastControl::None)
            }
            'L' => (SegmentKind::Line, pt(0), LastControl::None),
            'H' => {
                let x = if cmd.is_relative() { current.x + a[0] } else { a[0] };
                (SegmentKind::Line, DVec2::new(x, current.y), LastControl::None)
            }
            'V' => {
                let y = if cmd.is_relative() { current.y + a[0] } else { a[0] };
                (SegmentKind::Line, DVec2::new(current.x, y), LastControl::None)
            }
            'C' => {
                let (ctrl1, ctrl2) = (pt(0), pt(2));
                (SegmentKind::Cubic { ctrl1, ctrl2 }, pt(4), LastControl::Cubic(ctrl2))
            }
            'S' => {
                let ctrl1 = match last_ctrl {
                    LastControl::Cubic(c) => 2.0 * current - c,
                    _ => current,
                };
                let ctrl2 = pt(0);
                (SegmentKind::Cubic { ctrl1, ctrl2 }, pt(2), LastControl::Cubic(ctrl2))
            }
            'Q' => {
                let ctrl = pt(0);
                (SegmentKind::Quad { ctrl }, pt(2), LastControl::Quad(ctrl))
            }
            'T' => {
                let ctrl = match last_ctrl {
                    LastControl::Quad(c) => 2.0 * current - c,
                    _ => current,
                };
                (SegmentKind::Quad { ctrl }, pt(0), LastControl::Quad(ctrl))
            }
            'A' => {
                let to = pt(5);
                let arc = EllipticalArc {
                    radii: DVec2::new(a[0], a[1]),
                    x_axis_rotation: a[2],
                    large_arc: a[3] != 0.0,
                    sweep: a[4] != 0.0,
                    from: current,
                    to,
                };
                (SegmentKind::Arc(arc), to, LastControl::None)
            }
            // 'Z' is the only letter left after tokenizing
            _ => (SegmentKind::Close, subpath_start, LastControl::None),
        };

        segments.push(PathSegment::new(cmd.letter, kind, current, to, index));
        current = to;
        last_ctrl = next_ctrl;
    }

    if let Some(last) = segments.last_mut() {
        last.is_last = true;
    }
    segments
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::tokenize;
    use glam::dvec2;

    fn segments(d: &str) -> Vec<PathSegment> {
        resolve(&tokenize(&d.into()).unwrap())
    }

    fn w(v: f64) -> Width {
        Width::try_new(v).unwrap()
    }

    #[test]
    fn relative_commands_resolve_to_absolute() {
        let segs = segments("m10 10 l5 0 v5 h-5 z");
        let ends: Vec<DVec2> = segs.iter().map(|s| s.to()).collect();
        assert_eq!(
            ends,
            vec![
                dvec2(10.0, 10.0),
                dvec2(15.0, 10.0),
                dvec2(15.0, 15.0),
                dvec2(10.0, 15.0),
                dvec2(10.0, 10.0),
            ]
        );
        assert_eq!(*segs[4].kind(), SegmentKind::Close);
    }

    #[test]
    fn predecessor_and_last_flags() {
        let segs = segments("M0 0 L1 1 L2 2");
        assert_eq!(segs[0].prev(), None);
        assert_eq!(segs[2].prev(), Some(1));
        assert!(segs[2].is_last());
        assert!(!segs[1].is_last());
    }

    #[test]
    fn smooth_cubic_reflects_previous_control() {
        let segs = segments("M0 0 C0 10 10 10 10 0 S20 -10 20 0");
        match segs[2].kind() {
            SegmentKind::Cubic { ctrl1, .. } => assert_eq!(*ctrl1, dvec2(10.0, -10.0)),
            other => panic!("expected cubic, got {other:?}"),
        }
    }

    #[test]
    fn smooth_quad_without_predecessor_uses_current_point() {
        let segs = segments("M5 5 T10 10");
        assert_eq!(*segs[1].kind(), SegmentKind::Quad { ctrl: dvec2(5.0, 5.0) });
    }

    #[test]
    fn line_box_is_grown_by_half_width() {
        let segs = segments("M0 0 L10 0");
        let bb = segs[1].local_box(w(2.0)).unwrap();
        assert_eq!(bb.min, dvec2(-1.0, -1.0));
        assert_eq!(bb.max, dvec2(11.0, 1.0));
    }

    #[test]
    fn box_cache_follows_width() {
        let segs = segments("M0 0 L10 0");
        let thin = segs[1].local_box(w(0.0)).unwrap();
        let thick = segs[1].local_box(w(4.0)).unwrap();
        assert_eq!(thin.height(), 0.0);
        assert_eq!(thick.height(), 4.0);
    }

    #[test]
    fn move_to_has_no_box() {
        let segs = segments("M3 4");
        assert_eq!(segs[0].local_box(w(10.0)), None);
    }

    #[test]
    fn trailing_move_does_not_stretch_box() {
        let segs = segments("M0 0 L10 0 M100 100");
        let bb = segs
            .iter()
            .filter_map(|s| s.local_box(w(2.0)))
            .reduce(BBox::union)
            .unwrap();
        assert_eq!(bb.min, dvec2(-1.0, -1.0));
        assert_eq!(bb.max, dvec2(11.0, 1.0));
    }

    #[test]
    fn stroke_hit_on_line() {
        let segs = segments("M0 0 L10 0");
        assert!(segs[1].is_inside_stroke(dvec2(5.0, 0.9), w(2.0)));
        assert!(!segs[1].is_inside_stroke(dvec2(5.0, 1.1), w(2.0)));
        assert!(!segs[0].is_inside_stroke(dvec2(0.0, 0.0), w(2.0)));
    }

    #[test]
    fn stroke_hit_on_close_uses_closing_line() {
        let segs = segments("M0 0 L10 0 L10 10 Z");
        assert!(segs[3].is_inside_stroke(dvec2(5.0, 5.0), w(1.0)));
    }

    #[test]
    fn tangents() {
        let segs = segments("M0 0 L0 10 Q10 10 10 0 L10 0");
        assert_eq!(segs[0].end_tangent(), None);
        assert_eq!(segs[1].end_tangent(), Some(dvec2(0.0, 1.0)));
        assert_eq!(segs[2].end_tangent(), Some(dvec2(0.0, -1.0)));
        // zero-length line
        assert_eq!(segs[3].end_tangent(), None);
    }

    #[test]
    fn with_end_leaves_original_untouched() {
        let segs = segments("M0 0 L10 0 Z");
        let short = segs[2].with_end(dvec2(1.0, 0.0));
        assert_eq!(*short.kind(), SegmentKind::Line);
        assert_eq!(short.to(), dvec2(1.0, 0.0));
        assert_eq!(segs[2].to(), dvec2(0.0, 0.0));
        assert_eq!(*segs[2].kind(), SegmentKind::Close);
    }
}
