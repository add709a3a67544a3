//! The closed set of shape geometries.
//!
//! Each variant knows how to measure itself, trace its outline into a
//! [`RenderContext`] and answer containment; [`Shape`](super::Shape) owns
//! the caches, attributes and transforms around it.

use enum_dispatch::enum_dispatch;
use glam::DVec2;

use super::hit::HitProbe;
use super::marker::MarkerGeometry;
use super::path::PathGeometry;
use crate::render::RenderContext;
use crate::types::{BBox, Width};

#[enum_dispatch]
pub trait Geometry {
    /// Short name used in diagnostics ("path", "marker")
    fn kind_name(&self) -> &'static str;

    /// Local bounding box with strokes of `width` taken into account.
    fn calculate_box(&self, width: Width) -> Option<BBox>;

    /// Whether `p` (local space) is on the stroked outline.
    fn is_point_in_stroke(&self, p: DVec2, width: Width) -> bool;

    /// Trace the outline. `arrow` carries the line width when the shape
    /// ends in an arrowhead.
    fn create_path(&self, ctx: &mut dyn RenderContext, arrow: Option<Width>);

    /// Whether hits are pre-filtered by the bounding box.
    fn is_hit_box(&self) -> bool {
        true
    }

    /// Arc-length parameterized position, for geometries that have one.
    fn point_at(&self, _t: f64) -> Option<DVec2> {
        None
    }

    /// Containment for `p` in local space.
    ///
    /// Fill and stroke are tested according to which of the two the
    /// shape paints; a shape painting neither is never hit.
    fn is_point_in_path(&self, p: DVec2, probe: &HitProbe<'_>) -> bool {
        let in_fill = || {
            probe
                .fill_test(p, |ctx| self.create_path(ctx, probe.arrow))
                .is_inside()
        };
        let in_stroke = || self.is_point_in_stroke(p, probe.hit_width());

        match (probe.has_fill(), probe.has_stroke()) {
            (true, true) => in_fill() || in_stroke(),
            (true, false) => in_fill(),
            (false, true) => in_stroke(),
            (false, false) => false,
        }
    }
}

#[enum_dispatch(Geometry)]
#[derive(Debug, Clone)]
pub enum ShapeKind {
    Path(PathGeometry),
    Marker(MarkerGeometry),
}

impl ShapeKind {
    pub fn as_path(&self) -> Option<&PathGeometry> {
        match self {
            ShapeKind::Path(p) => Some(p),
            ShapeKind::Marker(_) => None,
        }
    }

    pub fn as_marker(&self) -> Option<&MarkerGeometry> {
        match self {
            ShapeKind::Marker(m) => Some(m),
            ShapeKind::Path(_) => None,
        }
    }
}
