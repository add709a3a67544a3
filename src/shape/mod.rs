//! Retained shapes: attributes, cached geometry and hit-testing.
//!
//! A [`Shape`] keeps two independent caches. The local bounding box
//! depends on geometry and stroke widths; the total transform (and the
//! world-space region derived from it) depends on the shape's own matrix
//! and its ancestors'. Reads fill the caches through `&self`; anything
//! that invalidates them takes `&mut self`.

mod attrs;
mod geometry;
mod hit;
mod marker;
mod path;

pub use attrs::{AttrUpdate, ShapeAttrs};
pub use geometry::{Geometry, ShapeKind};
pub use hit::{ClipRegion, Containment, HitProbe};
pub use marker::{MarkerGeometry, MarkerSymbol};
pub use path::PathGeometry;

use std::cell::{OnceCell, RefCell};
use std::fmt;
use std::rc::Rc;

use glam::{DAffine2, DVec2, dvec2};

use crate::errors::{AttrError, PathDataError};
use crate::log::debug;
use crate::parse::PathInput;
use crate::render::RenderContext;
use crate::types::{BBox, NumericError, Opacity, Width, try_coord, try_positive};

/// Determinants smaller than this are treated as singular
const SINGULAR_EPSILON: f64 = 1e-12;

#[derive(Debug, Clone, Copy)]
struct TotalTransform {
    matrix: DAffine2,
    inverse: Option<DAffine2>,
}

impl TotalTransform {
    fn new(matrix: DAffine2) -> Self {
        let det = matrix.matrix2.determinant();
        let inverse = (det.is_finite() && det.abs() > SINGULAR_EPSILON).then(|| matrix.inverse());
        TotalTransform { matrix, inverse }
    }
}

pub struct Shape {
    kind: ShapeKind,
    attrs: ShapeAttrs,
    /// Own transform, relative to the parent
    matrix: DAffine2,
    /// Composed transform of all ancestors
    inherited: DAffine2,
    context: Option<Rc<RefCell<dyn RenderContext>>>,
    bbox: OnceCell<Option<BBox>>,
    total: OnceCell<TotalTransform>,
    region: OnceCell<Option<BBox>>,
}

impl fmt::Debug for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Shape")
            .field("kind", &self.kind)
            .field("attrs", &self.attrs)
            .field("matrix", &self.matrix)
            .field("inherited", &self.inherited)
            .field("context", &self.context.is_some())
            .finish()
    }
}

impl Shape {
    pub fn new(kind: impl Into<ShapeKind>) -> Self {
        Shape {
            kind: kind.into(),
            attrs: ShapeAttrs::default(),
            matrix: DAffine2::IDENTITY,
            inherited: DAffine2::IDENTITY,
            context: None,
            bbox: OnceCell::new(),
            total: OnceCell::new(),
            region: OnceCell::new(),
        }
    }

    /// A path shape. Bad path data gives an empty path, see
    /// [`path_diagnostic`](Shape::path_diagnostic).
    pub fn path(input: impl Into<PathInput>) -> Self {
        Shape::new(PathGeometry::new(input))
    }

    pub fn marker(center: DVec2, radius: f64) -> Result<Self, AttrError> {
        let x = try_coord(center.x).map_err(|e| AttrError::invalid("x", center.x, e))?;
        let y = try_coord(center.y).map_err(|e| AttrError::invalid("y", center.y, e))?;
        let radius = try_positive(radius).map_err(|e| AttrError::invalid("radius", radius, e))?;
        Ok(Shape::new(MarkerGeometry::new(dvec2(x, y), radius)))
    }

    pub fn kind(&self) -> &ShapeKind {
        &self.kind
    }

    pub fn attrs(&self) -> &ShapeAttrs {
        &self.attrs
    }

    /// Why the current path data produced no geometry, if it didn't.
    pub fn path_diagnostic(&self) -> Option<&PathDataError> {
        self.kind.as_path()?.diagnostic()
    }

    /// Validate and apply a batch of attribute changes.
    ///
    /// Nothing changes when any value is rejected. Bad path data is not an
    /// error here: it leaves the path empty and records a diagnostic.
    pub fn apply(&mut self, update: AttrUpdate) -> Result<(), AttrError> {
        let kind = self.kind.kind_name();
        match self.kind {
            ShapeKind::Path(_) if update.touches_marker() => {
                let name = if update.x.is_some() {
                    "x"
                } else if update.y.is_some() {
                    "y"
                } else if update.radius.is_some() {
                    "radius"
                } else {
                    "symbol"
                };
                return Err(AttrError::WrongKind { name, kind });
            }
            ShapeKind::Marker(_) if update.path.is_some() => {
                return Err(AttrError::WrongKind { name: "path", kind });
            }
            _ => {}
        }

        let line_width = check("line_width", update.line_width, Width::try_new)?;
        let line_append_width = check(
            "line_append_width",
            update.line_append_width,
            Width::try_new,
        )?;
        let fill_opacity = check("fill_opacity", update.fill_opacity, Opacity::try_new)?;
        let stroke_opacity = check("stroke_opacity", update.stroke_opacity, Opacity::try_new)?;
        let x = check("x", update.x, try_coord)?;
        let y = check("y", update.y, try_coord)?;
        let radius = check("radius", update.radius, try_positive)?;

        let geometry_changed = update.touches_geometry();
        let attrs = &mut self.attrs;
        if let Some(w) = line_width {
            attrs.line_width = w;
        }
        if let Some(w) = line_append_width {
            attrs.line_append_width = w;
        }
        if let Some(o) = fill_opacity {
            attrs.fill_opacity = o;
        }
        if let Some(o) = stroke_opacity {
            attrs.stroke_opacity = o;
        }
        if let Some(fill) = update.fill {
            attrs.fill = fill;
        }
        if let Some(stroke) = update.stroke {
            attrs.stroke = stroke;
        }
        if let Some(clip) = update.clip {
            attrs.clip = clip;
        }
        if let Some(arrow) = update.arrow {
            attrs.arrow = arrow;
        }

        match &mut self.kind {
            ShapeKind::Path(path) => {
                if let Some(input) = update.path {
                    path.set_path(input);
                }
            }
            ShapeKind::Marker(marker) => {
                if let Some(x) = x {
                    marker.center.x = x;
                }
                if let Some(y) = y {
                    marker.center.y = y;
                }
                if let Some(r) = radius {
                    marker.radius = r;
                }
                if let Some(symbol) = update.symbol {
                    marker.symbol = symbol;
                }
            }
        }

        if geometry_changed {
            self.clear_bbox();
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Geometry
    // ------------------------------------------------------------------

    /// Local bounding box, stroke included. `None` when there is no geometry.
    pub fn bbox(&self) -> Option<BBox> {
        *self.bbox.get_or_init(|| {
            let bb = self.kind.calculate_box(self.attrs.hit_width());
            debug!(kind = self.kind.kind_name(), ?bb, "computed bounding box");
            bb
        })
    }

    /// Bounding box in world space.
    pub fn region(&self) -> Option<BBox> {
        *self
            .region
            .get_or_init(|| self.bbox().map(|bb| bb.transformed(&self.total_matrix())))
    }

    pub fn clear_bbox(&mut self) {
        self.bbox.take();
        self.region.take();
    }

    pub fn has_fill(&self) -> bool {
        self.attrs.fill.as_ref().is_some_and(|c| !c.is_transparent())
    }

    pub fn has_stroke(&self) -> bool {
        self.attrs
            .stroke
            .as_ref()
            .is_some_and(|c| !c.is_transparent())
            && self.attrs.line_width.raw() > 0.0
    }

    /// Point `t` of the way along the outline, in local space.
    pub fn point_at(&self, t: f64) -> Option<DVec2> {
        self.kind.point_at(t)
    }

    // ------------------------------------------------------------------
    // Transforms
    // ------------------------------------------------------------------

    pub fn matrix(&self) -> DAffine2 {
        self.matrix
    }

    pub fn set_matrix(&mut self, m: DAffine2) {
        self.matrix = m;
        self.clear_total_matrix();
    }

    pub fn reset_matrix(&mut self) {
        self.set_matrix(DAffine2::IDENTITY);
    }

    /// Move by `(dx, dy)` in the parent's space.
    pub fn translate(&mut self, dx: f64, dy: f64) {
        self.set_matrix(DAffine2::from_translation(dvec2(dx, dy)) * self.matrix);
    }

    /// Scale about the parent's origin.
    pub fn scale(&mut self, sx: f64, sy: f64) {
        self.set_matrix(DAffine2::from_scale(dvec2(sx, sy)) * self.matrix);
    }

    /// Rotate by `radians` about the parent's origin.
    pub fn rotate(&mut self, radians: f64) {
        self.set_matrix(DAffine2::from_angle(radians) * self.matrix);
    }

    /// Composed transform of every ancestor; set by the owning scene.
    pub fn set_inherited_transform(&mut self, m: DAffine2) {
        self.inherited = m;
        self.clear_total_matrix();
    }

    /// Local to world transform.
    pub fn total_matrix(&self) -> DAffine2 {
        self.total_transform().matrix
    }

    fn total_transform(&self) -> &TotalTransform {
        self.total
            .get_or_init(|| TotalTransform::new(self.inherited * self.matrix))
    }

    pub fn clear_total_matrix(&mut self) {
        self.total.take();
        self.region.take();
    }

    // ------------------------------------------------------------------
    // Hit-testing
    // ------------------------------------------------------------------

    /// Attach the context used to answer fill containment.
    pub fn set_context(&mut self, ctx: Rc<RefCell<dyn RenderContext>>) {
        self.context = Some(ctx);
    }

    pub fn clear_context(&mut self) {
        self.context = None;
    }

    fn probe(&self) -> HitProbe<'_> {
        HitProbe {
            line_width: self.attrs.line_width,
            hit_width: self.attrs.hit_width(),
            fill: self.has_fill(),
            stroke: self.has_stroke(),
            arrow: self.attrs.arrow.then_some(self.attrs.line_width),
            context: self.context.as_ref(),
        }
    }

    /// Whether the world point `(x, y)` hits this shape.
    pub fn is_hit(&self, x: f64, y: f64) -> bool {
        let Some(inverse) = self.total_transform().inverse else {
            return false;
        };
        let local = inverse.transform_point2(dvec2(x, y));

        if self.kind.is_hit_box() {
            match self.bbox() {
                Some(bb) if bb.contains(local) => {}
                _ => return false,
            }
        }
        if let Some(clip) = &self.attrs.clip {
            if !clip.inside(x, y) {
                return false;
            }
        }
        self.kind.is_point_in_path(local, &self.probe())
    }

    /// Fill containment of a local point, answered by the attached context.
    pub fn is_point_in_fill(&self, p: DVec2) -> Containment {
        let probe = self.probe();
        probe.fill_test(p, |ctx| self.kind.create_path(ctx, probe.arrow))
    }

    /// Whether a local point is on the stroke, append width included.
    pub fn is_point_in_stroke(&self, p: DVec2) -> bool {
        self.kind.is_point_in_stroke(p, self.attrs.hit_width())
    }

    // ------------------------------------------------------------------
    // Drawing
    // ------------------------------------------------------------------

    /// Trace the outline into `ctx` without painting.
    pub fn create_path(&self, ctx: &mut dyn RenderContext) {
        let arrow = self.attrs.arrow.then_some(self.attrs.line_width);
        self.kind.create_path(ctx, arrow);
    }

    /// Draw the shape: outline, then fill, then stroke.
    ///
    /// Opacities apply as a temporary global alpha; the context's alpha is
    /// the same afterwards as before.
    pub fn render(&self, ctx: &mut dyn RenderContext) {
        let fill = self.has_fill();
        let stroke = self.has_stroke();

        ctx.set_transform(self.total_matrix());
        ctx.set_line_width(self.attrs.line_width.raw());
        if let Some(color) = self.attrs.fill.as_ref().filter(|_| fill) {
            ctx.set_fill_style(color);
        }
        if let Some(color) = self.attrs.stroke.as_ref().filter(|_| stroke) {
            ctx.set_stroke_style(color);
        }
        self.create_path(ctx);

        let original = ctx.global_alpha();
        if fill {
            paint(ctx, self.attrs.fill_opacity, original, |c| c.fill());
        }
        if stroke {
            paint(ctx, self.attrs.stroke_opacity, original, |c| c.stroke());
        }
    }
}

fn paint(
    ctx: &mut dyn RenderContext,
    opacity: Opacity,
    original: f64,
    op: fn(&mut dyn RenderContext),
) {
    if opacity.is_opaque() {
        op(ctx);
        return;
    }
    ctx.set_global_alpha(opacity.raw());
    op(ctx);
    ctx.set_global_alpha(original);
}

fn check<T>(
    name: &'static str,
    value: Option<f64>,
    validate: fn(f64) -> Result<T, NumericError>,
) -> Result<Option<T>, AttrError> {
    value
        .map(|v| validate(v).map_err(|e| AttrError::invalid(name, v, e)))
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{DrawOp, RecordingContext};
    use std::f64::consts::FRAC_PI_2;

    fn stroked(d: &str) -> Shape {
        let mut s = Shape::path(d);
        s.apply(AttrUpdate::new().stroke("black")).unwrap();
        s
    }

    fn with_context(shape: &mut Shape) -> Rc<RefCell<dyn RenderContext>> {
        let ctx: Rc<RefCell<dyn RenderContext>> = Rc::new(RefCell::new(RecordingContext::new()));
        shape.set_context(ctx.clone());
        ctx
    }

    #[test]
    fn bbox_includes_stroke_and_append_width() {
        let mut s = stroked("M0 0 L10 0");
        s.apply(AttrUpdate::new().line_width(2.0).line_append_width(2.0))
            .unwrap();
        let bb = s.bbox().unwrap();
        assert_eq!(bb.min, dvec2(-2.0, -2.0));
        assert_eq!(bb.max, dvec2(12.0, 2.0));
    }

    #[test]
    fn width_change_invalidates_bbox() {
        let mut s = stroked("M0 0 L10 0");
        assert_eq!(s.bbox().map(|b| b.height()), Some(1.0));
        s.apply(AttrUpdate::new().line_width(4.0)).unwrap();
        assert_eq!(s.bbox().map(|b| b.height()), Some(4.0));
    }

    #[test]
    fn color_change_keeps_bbox_cache() {
        let mut s = stroked("M0 0 L10 0");
        let before = s.bbox();
        s.apply(AttrUpdate::new().stroke("red")).unwrap();
        assert!(s.bbox.get().is_some());
        assert_eq!(s.bbox(), before);
    }

    #[test]
    fn rejected_update_changes_nothing() {
        let mut s = stroked("M0 0 L10 0");
        let err = s
            .apply(AttrUpdate::new().fill("red").line_width(-1.0))
            .unwrap_err();
        assert!(matches!(err, AttrError::InvalidValue { name: "line_width", .. }));
        assert!(!s.has_fill());
        assert_eq!(s.attrs().line_width(), Width::ONE);
    }

    #[test]
    fn marker_attrs_on_path_are_rejected() {
        let mut s = Shape::path("M0 0");
        let err = s.apply(AttrUpdate::new().radius(3.0)).unwrap_err();
        assert_eq!(err, AttrError::WrongKind { name: "radius", kind: "path" });
    }

    #[test]
    fn has_stroke_needs_width() {
        let mut s = stroked("M0 0 L10 0");
        assert!(s.has_stroke());
        s.apply(AttrUpdate::new().line_width(0.0)).unwrap();
        assert!(!s.has_stroke());
        s.apply(AttrUpdate::new().line_width(1.0).stroke("none")).unwrap();
        assert!(!s.has_stroke());
    }

    #[test]
    fn stroke_hit_through_transform() {
        let mut s = stroked("M0 0 L10 0");
        s.translate(100.0, 50.0);
        assert!(s.is_hit(105.0, 50.0));
        assert!(!s.is_hit(5.0, 0.0));
    }

    #[test]
    fn rotation_is_undone_for_hits() {
        let mut s = stroked("M0 0 L10 0");
        s.rotate(FRAC_PI_2);
        assert!(s.is_hit(0.0, 5.0));
        assert!(!s.is_hit(5.0, 0.0));
    }

    #[test]
    fn singular_transform_never_hits() {
        let mut s = stroked("M0 0 L10 0");
        s.scale(0.0, 1.0);
        assert!(!s.is_hit(0.0, 0.0));
    }

    #[test]
    fn matrix_change_invalidates_region() {
        let mut s = stroked("M0 0 L10 0");
        let before = s.region().unwrap();
        s.translate(5.0, 0.0);
        let after = s.region().unwrap();
        assert_eq!(after.min.x, before.min.x + 5.0);
    }

    #[test]
    fn fill_without_context_is_indeterminate() {
        let mut s = Shape::path("M0 0 L10 0 L10 10 Z");
        s.apply(AttrUpdate::new().fill("red")).unwrap();
        assert_eq!(s.is_point_in_fill(dvec2(8.0, 2.0)), Containment::Indeterminate);
        assert!(!s.is_hit(8.0, 2.0));
    }

    #[test]
    fn fill_with_context() {
        let mut s = Shape::path("M0 0 L10 0 L10 10 Z");
        s.apply(AttrUpdate::new().fill("red")).unwrap();
        with_context(&mut s);
        assert!(s.is_hit(8.0, 2.0));
        assert!(!s.is_hit(2.0, 8.0));
    }

    #[test]
    fn fill_or_stroke_when_both() {
        let mut s = Shape::path("M0 0 L10 0 L10 10 Z");
        s.apply(AttrUpdate::new().fill("red").stroke("blue").line_width(2.0))
            .unwrap();
        with_context(&mut s);
        assert!(s.is_hit(8.0, 2.0));
        // just outside the triangle but on its stroke
        assert!(s.is_hit(10.5, 5.0));
    }

    #[test]
    fn neither_fill_nor_stroke_never_hits() {
        let s = Shape::path("M0 0 L10 0");
        assert!(!s.is_hit(5.0, 0.0));
    }

    #[test]
    fn clip_gates_hits() {
        let mut s = stroked("M0 0 L10 0");
        let clip: Rc<dyn ClipRegion> = Rc::new(|x: f64, _y: f64| x < 5.0);
        s.apply(AttrUpdate::new().clip(clip)).unwrap();
        assert!(s.is_hit(2.0, 0.0));
        assert!(!s.is_hit(7.0, 0.0));
    }

    #[test]
    fn render_restores_global_alpha() {
        let mut s = Shape::path("M0 0 L10 0 L10 10 Z");
        s.apply(
            AttrUpdate::new()
                .fill("red")
                .stroke("blue")
                .fill_opacity(0.5)
                .stroke_opacity(0.25),
        )
        .unwrap();
        let mut ctx = RecordingContext::new();
        ctx.set_global_alpha(0.8);
        s.render(&mut ctx);
        assert_eq!(ctx.global_alpha(), 0.8);
        let paints: Vec<&DrawOp> = ctx
            .ops()
            .iter()
            .filter(|op| matches!(op, DrawOp::Fill { .. } | DrawOp::Stroke { .. }))
            .collect();
        assert_eq!(paints, vec![&DrawOp::Fill { alpha: 0.5 }, &DrawOp::Stroke { alpha: 0.25 }]);
    }

    #[test]
    fn marker_hit() {
        let mut m = Shape::marker(dvec2(20.0, 20.0), 10.0).unwrap();
        m.apply(AttrUpdate::new().fill("blue")).unwrap();
        assert!(m.is_hit(20.0, 20.0));
        assert!(!m.is_hit(10.0, 10.0));
    }

    #[test]
    fn marker_rejects_bad_radius() {
        assert!(Shape::marker(dvec2(0.0, 0.0), 0.0).is_err());
        let mut m = Shape::marker(dvec2(0.0, 0.0), 1.0).unwrap();
        assert!(m.apply(AttrUpdate::new().path("M0 0")).is_err());
        assert!(m.apply(AttrUpdate::new().radius(-2.0)).is_err());
        assert_eq!(m.kind().as_marker().map(|g| g.radius()), Some(1.0));
    }

    #[test]
    fn shape_as_clip() {
        let clip = Rc::new(Shape::marker(dvec2(0.0, 0.0), 5.0).unwrap());
        let mut s = stroked("M-10 0 L10 0");
        s.apply(AttrUpdate::new().clip(clip)).unwrap();
        assert!(s.is_hit(0.0, 0.0));
        assert!(!s.is_hit(8.0, 0.0));
    }
}
