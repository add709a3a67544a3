//! In-memory rendering context.
//!
//! Records every call it receives and keeps a flattened copy of the
//! current path, which is enough to answer fill containment without a
//! real canvas.

use std::fmt::{self, Write as _};

use glam::{DAffine2, DVec2};

use super::RenderContext;
use crate::path::CubicBez;
use crate::types::Color;

/// Line segments per curve when flattening for containment tests
const FLATTEN_STEPS: usize = 24;

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    BeginPath,
    MoveTo(DVec2),
    LineTo(DVec2),
    QuadTo { ctrl: DVec2, to: DVec2 },
    CubicTo { ctrl1: DVec2, ctrl2: DVec2, to: DVec2 },
    ClosePath,
    /// Fill with the global alpha in effect at the time
    Fill { alpha: f64 },
    Stroke { alpha: f64 },
    GlobalAlpha(f64),
    LineWidth(f64),
    FillStyle(String),
    StrokeStyle(String),
    Transform(DAffine2),
}

impl fmt::Display for DrawOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let p = |v: &DVec2| format!("{},{}", v.x, v.y);
        match self {
            DrawOp::BeginPath => write!(f, "begin"),
            DrawOp::MoveTo(to) => write!(f, "M {}", p(to)),
            DrawOp::LineTo(to) => write!(f, "L {}", p(to)),
            DrawOp::QuadTo { ctrl, to } => write!(f, "Q {} {}", p(ctrl), p(to)),
            DrawOp::CubicTo { ctrl1, ctrl2, to } => {
                write!(f, "C {} {} {}", p(ctrl1), p(ctrl2), p(to))
            }
            DrawOp::ClosePath => write!(f, "Z"),
            DrawOp::Fill { alpha } => write!(f, "fill alpha={}", alpha),
            DrawOp::Stroke { alpha } => write!(f, "stroke alpha={}", alpha),
            DrawOp::GlobalAlpha(a) => write!(f, "globalAlpha={}", a),
            DrawOp::LineWidth(w) => write!(f, "lineWidth={}", w),
            DrawOp::FillStyle(c) => write!(f, "fillStyle={}", c),
            DrawOp::StrokeStyle(c) => write!(f, "strokeStyle={}", c),
            DrawOp::Transform(m) => write!(
                f,
                "transform [{} {} {} {} {} {}]",
                m.matrix2.x_axis.x,
                m.matrix2.x_axis.y,
                m.matrix2.y_axis.x,
                m.matrix2.y_axis.y,
                m.translation.x,
                m.translation.y
            ),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RecordingContext {
    ops: Vec<DrawOp>,
    global_alpha: f64,
    transform: DAffine2,
    /// Current path flattened into device space, one polyline per subpath
    subpaths: Vec<Vec<DVec2>>,
    /// Current point in user space
    current: Option<DVec2>,
}

impl Default for RecordingContext {
    fn default() -> Self {
        RecordingContext {
            ops: Vec::new(),
            global_alpha: 1.0,
            transform: DAffine2::IDENTITY,
            subpaths: Vec::new(),
            current: None,
        }
    }
}

impl RecordingContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    pub fn clear(&mut self) {
        self.ops.clear();
    }

    /// One op per line, for snapshots.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        for op in &self.ops {
            let _ = writeln!(out, "{}", op);
        }
        out
    }

    fn device(&self, p: DVec2) -> DVec2 {
        self.transform.transform_point2(p)
    }

    /// Append a point to the open subpath, starting one if needed.
    fn push_point(&mut self, p: DVec2) {
        let d = self.device(p);
        match self.subpaths.last_mut() {
            Some(sub) if self.current.is_some() => sub.push(d),
            _ => self.subpaths.push(vec![d]),
        }
        self.current = Some(p);
    }

    fn push_cubic(&mut self, c: CubicBez) {
        for i in 1..=FLATTEN_STEPS {
            self.push_point(c.eval(i as f64 / FLATTEN_STEPS as f64));
        }
    }
}

impl RenderContext for RecordingContext {
    fn begin_path(&mut self) {
        self.ops.push(DrawOp::BeginPath);
        self.subpaths.clear();
        self.current = None;
    }

    fn move_to(&mut self, p: DVec2) {
        self.ops.push(DrawOp::MoveTo(p));
        self.subpaths.push(vec![self.device(p)]);
        self.current = Some(p);
    }

    fn line_to(&mut self, p: DVec2) {
        self.ops.push(DrawOp::LineTo(p));
        self.push_point(p);
    }

    fn quadratic_curve_to(&mut self, ctrl: DVec2, to: DVec2) {
        self.ops.push(DrawOp::QuadTo { ctrl, to });
        let from = self.current.unwrap_or(ctrl);
        self.push_cubic(CubicBez::from_quad(from, ctrl, to));
    }

    fn bezier_curve_to(&mut self, ctrl1: DVec2, ctrl2: DVec2, to: DVec2) {
        self.ops.push(DrawOp::CubicTo { ctrl1, ctrl2, to });
        let from = self.current.unwrap_or(ctrl1);
        self.push_cubic(CubicBez::new(from, ctrl1, ctrl2, to));
    }

    fn close_path(&mut self) {
        self.ops.push(DrawOp::ClosePath);
        // The next drawing command continues from the subpath start
        if let Some(start) = self.subpaths.last().and_then(|s| s.first()).copied() {
            let user = self.transform.inverse().transform_point2(start);
            self.subpaths.push(vec![start]);
            self.current = Some(user);
        }
    }

    fn fill(&mut self) {
        self.ops.push(DrawOp::Fill {
            alpha: self.global_alpha,
        });
    }

    fn stroke(&mut self) {
        self.ops.push(DrawOp::Stroke {
            alpha: self.global_alpha,
        });
    }

    fn is_point_in_path(&self, p: DVec2) -> bool {
        let mut inside = false;
        for sub in &self.subpaths {
            let n = sub.len();
            if n < 3 {
                continue;
            }
            // Each subpath is closed implicitly
            let mut j = n - 1;
            for i in 0..n {
                let (a, b) = (sub[i], sub[j]);
                if (a.y > p.y) != (b.y > p.y) {
                    let x = (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x;
                    if p.x < x {
                        inside = !inside;
                    }
                }
                j = i;
            }
        }
        inside
    }

    fn global_alpha(&self) -> f64 {
        self.global_alpha
    }

    fn set_global_alpha(&mut self, alpha: f64) {
        self.ops.push(DrawOp::GlobalAlpha(alpha));
        self.global_alpha = alpha;
    }

    fn set_line_width(&mut self, width: f64) {
        self.ops.push(DrawOp::LineWidth(width));
    }

    fn set_fill_style(&mut self, color: &Color) {
        self.ops.push(DrawOp::FillStyle(color.to_string()));
    }

    fn set_stroke_style(&mut self, color: &Color) {
        self.ops.push(DrawOp::StrokeStyle(color.to_string()));
    }

    fn transform(&self) -> DAffine2 {
        self.transform
    }

    fn set_transform(&mut self, m: DAffine2) {
        self.ops.push(DrawOp::Transform(m));
        self.transform = m;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::dvec2;

    fn square(ctx: &mut RecordingContext) {
        ctx.begin_path();
        ctx.move_to(dvec2(0.0, 0.0));
        ctx.line_to(dvec2(10.0, 0.0));
        ctx.line_to(dvec2(10.0, 10.0));
        ctx.line_to(dvec2(0.0, 10.0));
        ctx.close_path();
    }

    #[test]
    fn square_containment() {
        let mut ctx = RecordingContext::new();
        square(&mut ctx);
        assert!(ctx.is_point_in_path(dvec2(5.0, 5.0)));
        assert!(!ctx.is_point_in_path(dvec2(15.0, 5.0)));
    }

    #[test]
    fn even_odd_hole() {
        let mut ctx = RecordingContext::new();
        square(&mut ctx);
        ctx.move_to(dvec2(2.0, 2.0));
        ctx.line_to(dvec2(8.0, 2.0));
        ctx.line_to(dvec2(8.0, 8.0));
        ctx.line_to(dvec2(2.0, 8.0));
        ctx.close_path();
        assert!(!ctx.is_point_in_path(dvec2(5.0, 5.0)));
        assert!(ctx.is_point_in_path(dvec2(1.0, 5.0)));
    }

    #[test]
    fn begin_path_forgets_previous_path() {
        let mut ctx = RecordingContext::new();
        square(&mut ctx);
        ctx.begin_path();
        assert!(!ctx.is_point_in_path(dvec2(5.0, 5.0)));
    }

    #[test]
    fn curves_are_flattened() {
        let mut ctx = RecordingContext::new();
        ctx.begin_path();
        ctx.move_to(dvec2(0.0, 0.0));
        ctx.quadratic_curve_to(dvec2(5.0, 10.0), dvec2(10.0, 0.0));
        ctx.close_path();
        assert!(ctx.is_point_in_path(dvec2(5.0, 4.0)));
        assert!(!ctx.is_point_in_path(dvec2(5.0, 5.5)));
    }

    #[test]
    fn transform_applies_to_path() {
        let mut ctx = RecordingContext::new();
        ctx.set_transform(DAffine2::from_translation(dvec2(100.0, 0.0)));
        square(&mut ctx);
        assert!(ctx.is_point_in_path(dvec2(105.0, 5.0)));
        assert!(!ctx.is_point_in_path(dvec2(5.0, 5.0)));
    }

    #[test]
    fn fill_records_alpha() {
        let mut ctx = RecordingContext::new();
        ctx.set_global_alpha(0.5);
        ctx.fill();
        assert_eq!(ctx.ops().last(), Some(&DrawOp::Fill { alpha: 0.5 }));
        assert_eq!(ctx.dump(), "globalAlpha=0.5\nfill alpha=0.5\n");
    }
}
